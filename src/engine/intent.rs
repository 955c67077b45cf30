//! Player intents and their text form.
//!
//! The presentation layer turns raw input into an `Intent` and hands it to
//! `Game::dispatch`; it never touches the board itself.

use super::error::Rejection;
use super::game::Game;
use super::state::Outcome;
use crate::board::Position;
use crate::rules::Direction;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Stage a one-cell move for whoever moves this phase
    Move(Direction),
    /// Confirm the staged move, or end the phase when nothing is staged
    Enter,
    Confirm,
    EndPhase,
    /// Move straight to a highlighted cell
    MoveTo(Position),
    /// Select a prey by id or unique id prefix
    Select(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIntentError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("expected a row and a column")]
    MissingCoordinates,
    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),
    #[error("expected a prey id")]
    MissingPreyId,
}

fn parse_coordinate(token: &str) -> Result<usize, ParseIntentError> {
    token
        .parse()
        .map_err(|_| ParseIntentError::InvalidCoordinate(token.to_string()))
}

fn parse_position<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<Position, ParseIntentError> {
    let row = tokens.next().ok_or(ParseIntentError::MissingCoordinates)?;
    let col = tokens.next().ok_or(ParseIntentError::MissingCoordinates)?;
    Ok(Position::new(parse_coordinate(row)?, parse_coordinate(col)?))
}

impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let Some(head) = tokens.next() else {
            return Ok(Intent::Enter);
        };

        if let Ok(direction) = head.parse::<Direction>() {
            return Ok(Intent::Move(direction));
        }

        match head.to_ascii_lowercase().as_str() {
            "enter" => Ok(Intent::Enter),
            "confirm" | "c" => Ok(Intent::Confirm),
            "end" | "e" => Ok(Intent::EndPhase),
            "move" | "m" => parse_position(tokens).map(Intent::MoveTo),
            "select" => tokens
                .next()
                .map(|id| Intent::Select(id.to_string()))
                .ok_or(ParseIntentError::MissingPreyId),
            _ if head.chars().all(|c| c.is_ascii_digit()) => {
                parse_position(std::iter::once(head).chain(tokens)).map(Intent::MoveTo)
            }
            _ => Err(ParseIntentError::UnknownCommand(head.to_string())),
        }
    }
}

impl Game {
    /// Route an intent to the matching engine call
    pub fn dispatch(&mut self, intent: Intent) -> Result<Outcome, Rejection> {
        match intent {
            Intent::Move(direction) => self.request_move(self.phase().mover(), direction),
            Intent::Enter => {
                if self.pending_move().is_some() {
                    self.confirm_move()
                } else {
                    self.end_phase()
                }
            }
            Intent::Confirm => self.confirm_move(),
            Intent::EndPhase => self.end_phase(),
            Intent::MoveTo(target) => self.move_to(target),
            Intent::Select(prefix) => {
                let id = self.resolve_prey_prefix(&prefix)?;
                self.select_prey(&id)
            }
        }
    }

    /// Expand a unique prefix to a full prey id
    fn resolve_prey_prefix(&self, prefix: &str) -> Result<String, Rejection> {
        let mut matches = self
            .grid()
            .prey()
            .filter(|(_, prey)| prey.id.starts_with(prefix))
            .map(|(_, prey)| prey.id.clone());

        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            _ => Err(Rejection::UnknownPrey(prefix.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Grid, Predator, Prey};
    use crate::engine::Phase;

    #[test]
    fn test_parse_intents() {
        assert_eq!("up".parse::<Intent>(), Ok(Intent::Move(Direction::Up)));
        assert_eq!("a".parse::<Intent>(), Ok(Intent::Move(Direction::Left)));
        assert_eq!("".parse::<Intent>(), Ok(Intent::Enter));
        assert_eq!("   ".parse::<Intent>(), Ok(Intent::Enter));
        assert_eq!("confirm".parse::<Intent>(), Ok(Intent::Confirm));
        assert_eq!("END".parse::<Intent>(), Ok(Intent::EndPhase));
        assert_eq!("move 2 3".parse::<Intent>(), Ok(Intent::MoveTo(Position::new(2, 3))));
        assert_eq!("4 0".parse::<Intent>(), Ok(Intent::MoveTo(Position::new(4, 0))));
        assert_eq!("select ab".parse::<Intent>(), Ok(Intent::Select("ab".to_string())));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "fly".parse::<Intent>(),
            Err(ParseIntentError::UnknownCommand("fly".to_string()))
        );
        assert_eq!("move 1".parse::<Intent>(), Err(ParseIntentError::MissingCoordinates));
        assert_eq!(
            "move 1 x".parse::<Intent>(),
            Err(ParseIntentError::InvalidCoordinate("x".to_string()))
        );
        assert_eq!("select".parse::<Intent>(), Err(ParseIntentError::MissingPreyId));
    }

    fn small_game() -> Game {
        let mut grid = Grid::from_layout("c..\n...\n..n").unwrap();
        grid.place_predator(Position::new(0, 0), Predator::default()).unwrap();
        grid.place_prey(Position::new(2, 2), Prey::new("alpha-1")).unwrap();
        grid.place_prey(Position::new(1, 2), Prey::new("beta-2")).unwrap();
        Game::from_grid(grid, 3).unwrap()
    }

    #[test]
    fn test_enter_confirms_or_ends_phase() {
        let mut game = small_game();
        assert_eq!(game.active_prey(), Some("beta-2"));

        // nothing staged and prey left to move
        assert_eq!(game.dispatch(Intent::Enter), Err(Rejection::PhaseGateUnmet(Phase::Day)));

        game.dispatch(Intent::Move(Direction::Left)).unwrap();
        game.dispatch(Intent::Enter).unwrap();
        assert_eq!(game.grid().prey_position("beta-2"), Some(Position::new(1, 1)));

        game.dispatch(Intent::Move(Direction::Left)).unwrap();
        let outcome = game.dispatch(Intent::Enter).unwrap();
        assert!(matches!(outcome, Outcome::Moved { next_phase: Some(Phase::Night), .. }));
    }

    #[test]
    fn test_select_by_prefix() {
        let mut game = small_game();
        game.dispatch(Intent::Select("alpha".to_string())).unwrap();
        assert_eq!(game.active_prey(), Some("alpha-1"));

        assert_eq!(
            game.dispatch(Intent::Select("gamma".to_string())),
            Err(Rejection::UnknownPrey("gamma".to_string()))
        );
        // empty prefix matches both
        assert!(game.dispatch(Intent::Select(String::new())).is_err());
    }
}
