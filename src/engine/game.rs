//! The day/night state machine. Owns the board for the whole session.

use super::error::Rejection;
use super::state::{Outcome, PendingMove, Phase, PopulationRatio, Snapshot};
use crate::board::{BoardGenerator, EntityType, GameRng, Grid, Position, Terrain};
use crate::rules::{Direction, MoveCalculator, ResolutionReport, Resolver};
use anyhow::Result;
use itertools::Itertools;
use rand::SeedableRng;
use tracing::{debug, info};

/// A running game session
#[derive(Debug)]
pub struct Game {
    grid: Grid,
    phase: Phase,
    day: u32,
    active_prey: Option<String>,
    pending: Option<PendingMove>,
    predator_moved: bool,
    rng: GameRng,
}

impl Game {
    /// Start a game on a freshly generated board.
    /// Without a seed the random source is seeded from the OS.
    pub fn new(generator: &BoardGenerator, seed: Option<u64>) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => GameRng::seed_from_u64(seed),
            None => GameRng::from_entropy(),
        };
        let grid = generator.generate(&mut rng)?;
        Self::from_parts(grid, rng)
    }

    /// Start a game on a prepared board
    pub fn from_grid(grid: Grid, seed: u64) -> Result<Self> {
        Self::from_parts(grid, GameRng::seed_from_u64(seed))
    }

    fn from_parts(mut grid: Grid, rng: GameRng) -> Result<Self> {
        if grid.rows < 2 || grid.cols < 2 {
            anyhow::bail!("Board must be at least 2x2, got {}x{}", grid.rows, grid.cols);
        }
        if grid.predator_count() != 1 {
            anyhow::bail!(
                "Board must hold exactly one predator, found {}",
                grid.predator_count()
            );
        }
        if let Some(pos) = grid.predator_position() {
            if grid.terrain(pos) == Some(Terrain::Nest) {
                anyhow::bail!("Predator cannot start in a nest at {}", pos);
            }
        }
        if !grid.prey().map(|(_, prey)| prey.id.as_str()).all_unique() {
            anyhow::bail!("Prey identifiers must be unique");
        }

        grid.clear_highlights();
        let mut game = Self {
            grid,
            phase: Phase::Day,
            day: 0,
            active_prey: None,
            pending: None,
            predator_moved: false,
            rng,
        };
        game.select_first_unmoved();
        game.log_state("initial board");
        Ok(game)
    }

    /// Current board, highlights included
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Whose turn it is
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Completed days
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Id of the prey that moves next during the day
    pub fn active_prey(&self) -> Option<&str> {
        self.active_prey.as_deref()
    }

    /// Move staged by `request_move`, if any
    pub fn pending_move(&self) -> Option<PendingMove> {
        self.pending
    }

    /// Whether the predator has used its move this night
    pub fn predator_moved(&self) -> bool {
        self.predator_moved
    }

    /// Prey still to move this day
    pub fn unmoved_prey_count(&self) -> usize {
        self.grid.unmoved_prey().count()
    }

    /// Whether `end_phase` would currently succeed
    pub fn can_end_phase(&self) -> bool {
        match self.phase {
            Phase::Day => self.unmoved_prey_count() == 0,
            Phase::Night => self.predator_moved,
        }
    }

    /// Prey and predator head counts
    pub fn ratio(&self) -> PopulationRatio {
        PopulationRatio::from_grid(&self.grid)
    }

    /// Prey per predator, the value handed to score persistence
    pub fn score(&self) -> f64 {
        self.ratio().score()
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid: &self.grid,
            phase: self.phase,
            day: self.day,
            active_prey: self.active_prey(),
            pending_move: self.pending,
            can_end_phase: self.can_end_phase(),
            unmoved_prey: self.unmoved_prey_count(),
            ratio: self.ratio(),
        }
    }

    /// Make `id` the prey that moves next
    pub fn select_prey(&mut self, id: &str) -> Result<Outcome, Rejection> {
        self.check_phase(EntityType::Prey)?;

        let (position, prey) = self
            .grid
            .prey()
            .find(|(_, prey)| prey.id == id)
            .ok_or_else(|| Rejection::UnknownPrey(id.to_string()))?;
        if prey.has_moved {
            debug!(prey = id, "selection refused: prey already moved");
            return Err(Rejection::AlreadyMoved);
        }

        self.pending = None;
        self.activate_prey(id.to_string(), position);
        Ok(Outcome::Selected {
            prey_id: id.to_string(),
            position,
        })
    }

    /// Stage a one-cell move awaiting `confirm_move`
    pub fn request_move(
        &mut self,
        entity: EntityType,
        direction: Direction,
    ) -> Result<Outcome, Rejection> {
        self.check_phase(entity)?;
        if entity == EntityType::Prey && self.active_prey.is_none() {
            return Err(Rejection::NoActiveEntity);
        }

        let pending = PendingMove { entity, direction };
        debug!(%entity, %direction, "move staged");
        self.pending = Some(pending);
        Ok(Outcome::Staged(pending))
    }

    /// Apply the staged move. The staged move is consumed even when refused.
    pub fn confirm_move(&mut self) -> Result<Outcome, Rejection> {
        let pending = self.pending.take().ok_or(Rejection::NothingStaged)?;
        self.check_phase(pending.entity)?;

        let from = self.mover_position(pending.entity)?;
        let (dr, dc) = pending.direction.delta();
        let to = self
            .grid
            .offset(from, dr, dc)
            .ok_or(Rejection::IllegalDestination)?;

        self.apply_move(pending.entity, from, to)
    }

    /// Move the current mover straight to a highlighted cell
    pub fn move_to(&mut self, target: Position) -> Result<Outcome, Rejection> {
        let entity = self.phase.mover();
        let cell = self.grid.get(target).ok_or(Rejection::IllegalDestination)?;

        let highlighted_for_mover = cell.is_potential()
            && cell.highlight.map(|highlight| highlight.entity) == Some(entity);
        if !highlighted_for_mover {
            return Err(Rejection::IllegalDestination);
        }
        if entity == EntityType::Predator && cell.terrain == Terrain::Nest {
            return Err(Rejection::IllegalDestination);
        }

        let from = self.mover_position(entity)?;
        self.pending = None;
        self.apply_move(entity, from, target)
    }

    /// Finish the current phase if its gate is met
    pub fn end_phase(&mut self) -> Result<Outcome, Rejection> {
        if !self.can_end_phase() {
            debug!(phase = %self.phase, "cannot end phase");
            return Err(Rejection::PhaseGateUnmet(self.phase));
        }

        match self.phase {
            Phase::Day => {
                self.begin_night();
                Ok(Outcome::PhaseChanged {
                    phase: Phase::Night,
                    resolution: None,
                })
            }
            Phase::Night => {
                let report = self.begin_day();
                Ok(Outcome::PhaseChanged {
                    phase: Phase::Day,
                    resolution: Some(report),
                })
            }
        }
    }

    fn check_phase(&self, entity: EntityType) -> Result<(), Rejection> {
        if self.phase.mover() == entity {
            Ok(())
        } else {
            Err(Rejection::InvalidPhase {
                phase: self.phase,
                entity,
            })
        }
    }

    /// Where the entity that may move right now is standing
    fn mover_position(&self, entity: EntityType) -> Result<Position, Rejection> {
        match entity {
            EntityType::Prey => self
                .active_prey
                .as_deref()
                .and_then(|id| self.grid.prey_position(id))
                .ok_or(Rejection::NoActiveEntity),
            EntityType::Predator => {
                if self.predator_moved {
                    return Err(Rejection::AlreadyMoved);
                }
                self.grid
                    .predator_position()
                    .ok_or(Rejection::NoActiveEntity)
            }
        }
    }

    /// Relocate an entity after every check has passed.
    /// No state changes before the last check.
    fn apply_move(
        &mut self,
        entity: EntityType,
        from: Position,
        to: Position,
    ) -> Result<Outcome, Rejection> {
        if !MoveCalculator::is_legal(&self.grid, from, to, entity) {
            debug!(%entity, %from, %to, "move refused: not a legal destination");
            return Err(Rejection::IllegalDestination);
        }
        let target = self.grid.get(to).ok_or(Rejection::IllegalDestination)?;
        match entity {
            EntityType::Prey if target.prey.is_some() => {
                return Err(Rejection::IllegalDestination);
            }
            EntityType::Predator if target.terrain == Terrain::Nest => {
                return Err(Rejection::IllegalDestination);
            }
            _ => {}
        }

        match entity {
            EntityType::Prey => {
                let mut prey = self
                    .grid
                    .get_mut(from)
                    .and_then(|cell| cell.prey.take())
                    .ok_or(Rejection::NoActiveEntity)?;
                prey.has_moved = true;
                if let Some(cell) = self.grid.get_mut(to) {
                    cell.prey = Some(prey);
                }
            }
            EntityType::Predator => {
                let predator = self
                    .grid
                    .get_mut(from)
                    .and_then(|cell| cell.predator.take())
                    .ok_or(Rejection::NoActiveEntity)?;
                if let Some(cell) = self.grid.get_mut(to) {
                    cell.predator = Some(predator);
                }
                self.predator_moved = true;
            }
        }

        self.grid.clear_highlights();
        info!(%entity, %from, %to, "moved");
        self.log_state("after move");

        let next_phase = match entity {
            EntityType::Prey => {
                self.active_prey = None;
                if self.select_first_unmoved() {
                    None
                } else {
                    info!("all prey have moved, night falls");
                    self.begin_night();
                    Some(Phase::Night)
                }
            }
            EntityType::Predator => None,
        };

        Ok(Outcome::Moved {
            entity,
            from,
            to,
            next_phase,
        })
    }

    fn begin_night(&mut self) {
        self.phase = Phase::Night;
        self.predator_moved = false;
        self.active_prey = None;
        self.pending = None;
        self.grid.clear_highlights();
        if let Some(position) = self.grid.predator_position() {
            self.show_highlights(position, EntityType::Predator);
        }
        info!(day = self.day, "night phase begins");
    }

    fn begin_day(&mut self) -> ResolutionReport {
        let report = Resolver::resolve(&mut self.grid, &mut self.rng);
        self.day += 1;
        self.phase = Phase::Day;
        self.predator_moved = false;
        self.pending = None;
        self.active_prey = None;

        for (_, cell) in self.grid.cells_mut() {
            if let Some(prey) = cell.prey.as_mut() {
                prey.has_moved = false;
            }
        }
        self.grid.clear_highlights();
        self.select_first_unmoved();

        info!(day = self.day, %report, "day phase begins");
        self.log_state("after resolution");
        report
    }

    /// Select the first unmoved prey in row-major order, if any
    fn select_first_unmoved(&mut self) -> bool {
        let next = self
            .grid
            .unmoved_prey()
            .next()
            .map(|(position, prey)| (prey.id.clone(), position));

        match next {
            Some((id, position)) => {
                self.activate_prey(id, position);
                true
            }
            None => false,
        }
    }

    fn activate_prey(&mut self, id: String, position: Position) {
        debug!(prey = %id, %position, "prey selected");
        self.active_prey = Some(id);
        self.grid.clear_highlights();
        self.show_highlights(position, EntityType::Prey);
    }

    fn show_highlights(&mut self, origin: Position, entity: EntityType) {
        for (position, highlight) in MoveCalculator::compute_highlights(&self.grid, origin, entity) {
            if let Some(cell) = self.grid.get_mut(position) {
                cell.highlight = Some(highlight);
            }
        }
    }

    fn log_state(&self, message: &str) {
        debug!(phase = %self.phase, day = self.day, "game state: {}", message);
        for (position, prey) in self.grid.prey() {
            debug!(
                id = %prey.id,
                %position,
                has_moved = prey.has_moved,
                days_on_grass = prey.days_on_grass,
                terrain = ?self.grid.terrain(position),
                "prey"
            );
        }
        if let (Some(position), Some(predator)) =
            (self.grid.predator_position(), self.grid.predator())
        {
            debug!(
                %position,
                hungry_turns = predator.hungry_turns,
                terrain = ?self.grid.terrain(position),
                "predator"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{HighlightKind, Predator, Prey};

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    /// 4x4 open board, predator in the cave, prey as given
    fn game_with_prey(prey: &[(&str, Position)]) -> Game {
        let mut grid = Grid::from_layout("c...\n....\n....\n...n").unwrap();
        grid.place_predator(pos(0, 0), Predator::default()).unwrap();
        for &(id, at) in prey {
            grid.place_prey(at, Prey::new(id)).unwrap();
        }
        Game::from_grid(grid, 5).unwrap()
    }

    fn potential_cells(game: &Game) -> Vec<Position> {
        game.grid()
            .cells()
            .filter(|(_, cell)| cell.is_potential())
            .map(|(position, _)| position)
            .collect()
    }

    #[test]
    fn test_new_game_selects_first_prey() {
        let game = game_with_prey(&[("a", pos(3, 3))]);
        assert_eq!(game.phase(), Phase::Day);
        assert_eq!(game.active_prey(), Some("a"));
        assert_eq!(game.day(), 0);

        let start = game.grid().get(pos(3, 3)).unwrap().highlight.unwrap();
        assert_eq!(start.kind, HighlightKind::Start);
        assert!(!potential_cells(&game).is_empty());
    }

    #[test]
    fn test_generated_game() {
        let game = Game::new(&BoardGenerator::new(5, 5), Some(9)).unwrap();
        assert_eq!(game.grid().predator_position(), Some(pos(0, 0)));
        assert_eq!(game.grid().prey_count(), 1);
        assert!(game.active_prey().is_some());
    }

    #[test]
    fn test_invalid_boards_rejected() {
        let grid = Grid::from_layout("..\n..").unwrap();
        assert!(Game::from_grid(grid, 0).is_err());

        let mut grid = Grid::from_layout("..\n.n").unwrap();
        grid.place_predator(pos(1, 1), Predator::default()).unwrap();
        assert!(Game::from_grid(grid, 0).is_err());

        let mut grid = Grid::from_layout("...\n...").unwrap();
        grid.place_predator(pos(0, 0), Predator::default()).unwrap();
        grid.place_prey(pos(1, 1), Prey::new("dup")).unwrap();
        grid.place_prey(pos(1, 2), Prey::new("dup")).unwrap();
        assert!(Game::from_grid(grid, 0).is_err());
    }

    #[test]
    fn test_request_move_phase_mismatch() {
        let mut game = game_with_prey(&[("a", pos(3, 3))]);
        let result = game.request_move(EntityType::Predator, Direction::Down);
        assert!(matches!(result, Err(Rejection::InvalidPhase { .. })));
        assert!(game.pending_move().is_none());
    }

    #[test]
    fn test_request_then_confirm_moves_one_cell() {
        let mut game = game_with_prey(&[("a", pos(3, 3)), ("b", pos(1, 1))]);
        // b comes first in row-major order
        assert_eq!(game.active_prey(), Some("b"));

        game.request_move(EntityType::Prey, Direction::Up).unwrap();
        assert!(game.grid().get(pos(1, 1)).unwrap().prey.is_some());

        let outcome = game.confirm_move().unwrap();
        assert_eq!(
            outcome,
            Outcome::Moved {
                entity: EntityType::Prey,
                from: pos(1, 1),
                to: pos(0, 1),
                next_phase: None,
            }
        );
        assert!(game.grid().get(pos(0, 1)).unwrap().prey.as_ref().unwrap().has_moved);
        assert_eq!(game.active_prey(), Some("a"));
    }

    #[test]
    fn test_failed_confirm_discards_pending_move() {
        let mut game = game_with_prey(&[("a", pos(3, 3))]);
        game.request_move(EntityType::Prey, Direction::Down).unwrap();

        assert_eq!(game.confirm_move(), Err(Rejection::IllegalDestination));
        assert!(game.pending_move().is_none());
        assert_eq!(game.grid().prey_position("a"), Some(pos(3, 3)));
        assert_eq!(game.confirm_move(), Err(Rejection::NothingStaged));
    }

    #[test]
    fn test_request_move_without_active_prey() {
        let mut game = game_with_prey(&[]);
        assert_eq!(game.phase(), Phase::Day);
        assert_eq!(game.active_prey(), None);
        let before = game.grid().clone();

        assert_eq!(
            game.request_move(EntityType::Prey, Direction::Up),
            Err(Rejection::NoActiveEntity)
        );
        assert!(game.pending_move().is_none());
        assert_eq!(game.grid(), &before);
        assert_eq!(game.phase(), Phase::Day);
    }

    #[test]
    fn test_confirm_move_without_active_prey() {
        let mut game = game_with_prey(&[("a", pos(3, 3))]);
        game.request_move(EntityType::Prey, Direction::Up).unwrap();
        game.active_prey = None;
        let before = game.grid().clone();

        assert_eq!(game.confirm_move(), Err(Rejection::NoActiveEntity));
        assert!(game.pending_move().is_none());
        assert_eq!(game.grid(), &before);
        assert_eq!(game.grid().prey_position("a"), Some(pos(3, 3)));
    }

    #[test]
    fn test_prey_cannot_land_on_other_prey() {
        let mut game = game_with_prey(&[("a", pos(2, 3)), ("b", pos(3, 3))]);
        assert_eq!(game.active_prey(), Some("a"));
        // (3,3) is highlighted because occupants do not block sliding
        assert!(game.grid().get(pos(3, 3)).unwrap().is_potential());

        assert_eq!(game.move_to(pos(3, 3)), Err(Rejection::IllegalDestination));
        assert_eq!(game.grid().prey_position("a"), Some(pos(2, 3)));
        assert_eq!(game.active_prey(), Some("a"));
    }

    #[test]
    fn test_select_prey_rules() {
        let mut game = game_with_prey(&[("a", pos(1, 1)), ("b", pos(3, 3))]);

        assert_eq!(
            game.select_prey("nobody"),
            Err(Rejection::UnknownPrey("nobody".to_string()))
        );

        game.select_prey("b").unwrap();
        assert_eq!(game.active_prey(), Some("b"));
        assert_eq!(
            game.grid().get(pos(3, 3)).unwrap().highlight.map(|h| h.kind),
            Some(HighlightKind::Start)
        );
        assert!(game.grid().get(pos(1, 1)).unwrap().highlight.is_none());

        game.move_to(pos(3, 2)).unwrap();
        assert_eq!(game.active_prey(), Some("a"));
        assert_eq!(game.select_prey("b"), Err(Rejection::AlreadyMoved));
        assert_eq!(game.active_prey(), Some("a"));
    }

    #[test]
    fn test_end_day_refused_until_all_prey_moved() {
        let mut game = game_with_prey(&[("a", pos(3, 3))]);
        assert!(!game.can_end_phase());
        assert_eq!(game.end_phase(), Err(Rejection::PhaseGateUnmet(Phase::Day)));
        assert_eq!(game.phase(), Phase::Day);
    }

    #[test]
    fn test_night_requires_predator_move() {
        let mut game = game_with_prey(&[("a", pos(3, 3))]);
        let outcome = game.move_to(pos(2, 3)).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Moved {
                next_phase: Some(Phase::Night),
                ..
            }
        ));
        assert_eq!(game.phase(), Phase::Night);
        assert_eq!(game.end_phase(), Err(Rejection::PhaseGateUnmet(Phase::Night)));

        // predator highlights are shown on nightfall
        let start = game.grid().get(pos(0, 0)).unwrap().highlight.unwrap();
        assert_eq!(start.entity, EntityType::Predator);
        assert!(game.grid().get(pos(3, 3)).unwrap().highlight.is_none());

        game.request_move(EntityType::Predator, Direction::Right).unwrap();
        game.confirm_move().unwrap();
        assert!(game.predator_moved());
        assert!(potential_cells(&game).is_empty());

        game.request_move(EntityType::Predator, Direction::Right).unwrap();
        assert_eq!(game.confirm_move(), Err(Rejection::AlreadyMoved));
        assert_eq!(game.grid().predator_position(), Some(pos(0, 1)));

        let outcome = game.end_phase().unwrap();
        assert!(matches!(
            outcome,
            Outcome::PhaseChanged {
                phase: Phase::Day,
                resolution: Some(_)
            }
        ));
        assert_eq!(game.day(), 1);
        assert_eq!(game.active_prey(), Some("a"));
        assert!(game.grid().prey().all(|(_, prey)| !prey.has_moved));
    }

    #[test]
    fn test_predator_never_enters_nest_via_click() {
        let mut grid = Grid::from_layout("c..\n.n.\n...").unwrap();
        grid.place_predator(pos(0, 0), Predator::default()).unwrap();
        let mut game = Game::from_grid(grid, 1).unwrap();

        // no prey: the day can end immediately
        game.end_phase().unwrap();
        assert_eq!(game.phase(), Phase::Night);

        // force a stray highlight onto the nest
        if let Some(cell) = game.grid.get_mut(pos(1, 1)) {
            cell.highlight = Some(crate::board::Highlight {
                kind: HighlightKind::Potential,
                entity: EntityType::Predator,
            });
        }
        assert_eq!(game.move_to(pos(1, 1)), Err(Rejection::IllegalDestination));
        assert_eq!(game.grid().predator_position(), Some(pos(0, 0)));
    }

    #[test]
    fn test_move_to_requires_potential_highlight() {
        let mut game = game_with_prey(&[("a", pos(3, 3))]);
        assert_eq!(game.move_to(pos(2, 2)), Err(Rejection::IllegalDestination));
        assert_eq!(game.move_to(pos(9, 9)), Err(Rejection::IllegalDestination));
        assert_eq!(game.grid().prey_position("a"), Some(pos(3, 3)));
    }

    #[test]
    fn test_move_to_slides_several_cells() {
        let mut game = game_with_prey(&[("a", pos(3, 3))]);
        game.move_to(pos(0, 3)).unwrap();
        assert_eq!(game.grid().prey_position("a"), Some(pos(0, 3)));
    }

    #[test]
    fn test_select_refused_at_night() {
        let mut game = game_with_prey(&[("a", pos(3, 3))]);
        game.move_to(pos(3, 2)).unwrap();
        assert!(matches!(
            game.select_prey("a"),
            Err(Rejection::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let game = game_with_prey(&[("a", pos(3, 3))]);
        let snapshot = game.snapshot();
        assert_eq!(snapshot.phase, Phase::Day);
        assert_eq!(snapshot.active_prey, Some("a"));
        assert_eq!(snapshot.unmoved_prey, 1);
        assert!(!snapshot.can_end_phase);
        assert_eq!(snapshot.ratio.to_string(), "1:1");

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"phase\":\"day\""));
    }
}
