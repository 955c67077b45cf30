//! Grid representation and occupant queries

use super::cell::{Cell, Predator, Prey, Terrain};
use anyhow::Result;
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The game board. Dimensions are fixed for the lifetime of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a board of `default` terrain with no occupants
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    /// Build a terrain-only board from a text layout.
    /// Each non-empty line is a row; characters as in `Terrain::from_symbol`.
    pub fn from_layout(layout: &str) -> Result<Self> {
        let lines: Vec<&str> = layout
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            anyhow::bail!("Board layout is empty");
        }

        let rows = lines.len();
        let cols = lines[0].chars().count();
        let mut cells = Vec::with_capacity(rows * cols);

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                anyhow::bail!(
                    "Row {} has length {}, expected {}",
                    row,
                    line.chars().count(),
                    cols
                );
            }
            for (col, symbol) in line.chars().enumerate() {
                let terrain = Terrain::from_symbol(symbol).ok_or_else(|| {
                    anyhow::anyhow!("Invalid terrain '{}' at ({}, {})", symbol, row, col)
                })?;
                cells.push(Cell::with_terrain(terrain));
            }
        }

        Ok(Self { rows, cols, cells })
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Whether signed coordinates fall on the board
    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Step one cell from `pos` by the given delta, or `None` past the edge
    pub fn offset(&self, pos: Position, dr: isize, dc: isize) -> Option<Position> {
        let row = pos.row as isize + dr;
        let col = pos.col as isize + dc;
        self.in_bounds(row, col)
            .then(|| Position::new(row as usize, col as usize))
    }

    /// Cell at `pos`, or `None` off the board
    pub fn get(&self, pos: Position) -> Option<&Cell> {
        if pos.row < self.rows && pos.col < self.cols {
            self.cells.get(self.index(pos))
        } else {
            None
        }
    }

    /// Mutable cell at `pos`, or `None` off the board
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        if pos.row < self.rows && pos.col < self.cols {
            let idx = self.index(pos);
            self.cells.get_mut(idx)
        } else {
            None
        }
    }

    /// Terrain at `pos`
    pub fn terrain(&self, pos: Position) -> Option<Terrain> {
        self.get(pos).map(|cell| cell.terrain)
    }

    /// Replace the terrain at `pos`
    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) -> Result<()> {
        let (rows, cols) = (self.rows, self.cols);
        let cell = self.get_mut(pos).ok_or_else(|| {
            anyhow::anyhow!("Position {} out of bounds for {}x{} board", pos, rows, cols)
        })?;
        cell.terrain = terrain;
        Ok(())
    }

    /// Put a predator on `pos`, replacing any predator already there
    pub fn place_predator(&mut self, pos: Position, predator: Predator) -> Result<()> {
        let (rows, cols) = (self.rows, self.cols);
        let cell = self.get_mut(pos).ok_or_else(|| {
            anyhow::anyhow!("Position {} out of bounds for {}x{} board", pos, rows, cols)
        })?;
        cell.predator = Some(predator);
        Ok(())
    }

    /// Put a prey on `pos`. Fails if the cell already holds one.
    pub fn place_prey(&mut self, pos: Position, prey: Prey) -> Result<()> {
        let (rows, cols) = (self.rows, self.cols);
        let cell = self.get_mut(pos).ok_or_else(|| {
            anyhow::anyhow!("Position {} out of bounds for {}x{} board", pos, rows, cols)
        })?;
        if cell.prey.is_some() {
            anyhow::bail!("Cell {} already holds a prey", pos);
        }
        cell.prey = Some(prey);
        Ok(())
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.rows, 0..self.cols).map(|(row, col)| Position::new(row, col))
    }

    /// All cells with their positions, row-major
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.positions().zip(self.cells.iter())
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = (Position, &mut Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(idx, cell)| (Position::new(idx / cols, idx % cols), cell))
    }

    pub fn predator_position(&self) -> Option<Position> {
        self.cells()
            .find(|(_, cell)| cell.predator.is_some())
            .map(|(pos, _)| pos)
    }

    /// The predator, wherever it stands
    pub fn predator(&self) -> Option<&Predator> {
        self.cells.iter().find_map(|cell| cell.predator.as_ref())
    }

    pub fn predator_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.predator.is_some()).count()
    }

    /// Every prey with its position, row-major
    pub fn prey(&self) -> impl Iterator<Item = (Position, &Prey)> + '_ {
        self.cells()
            .filter_map(|(pos, cell)| cell.prey.as_ref().map(|prey| (pos, prey)))
    }

    pub fn prey_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.prey.is_some()).count()
    }

    /// Where the prey with `id` stands
    pub fn prey_position(&self, id: &str) -> Option<Position> {
        self.prey().find(|(_, prey)| prey.id == id).map(|(pos, _)| pos)
    }

    /// Prey that have not moved yet this day, row-major
    pub fn unmoved_prey(&self) -> impl Iterator<Item = (Position, &Prey)> + '_ {
        self.prey().filter(|(_, prey)| !prey.has_moved)
    }

    /// Drop every start and potential-move marker
    pub fn clear_highlights(&mut self) {
        for cell in &mut self.cells {
            cell.highlight = None;
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = &self.cells[self.index(Position::new(row, col))];
                let symbol = match (&cell.predator, &cell.prey) {
                    (Some(_), Some(_)) => 'X',
                    (Some(_), None) => 'P',
                    (None, Some(_)) => 'r',
                    (None, None) => cell.terrain.symbol(),
                };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(3, 4);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.cols, 4);
        assert_eq!(grid.cells().count(), 12);
        assert_eq!(grid.prey_count(), 0);
        assert!(grid.predator_position().is_none());
    }

    #[test]
    fn test_from_layout() {
        let grid = Grid::from_layout("c.w\n.gn\n").unwrap();
        assert_eq!(grid.rows, 2);
        assert_eq!(grid.cols, 3);
        assert_eq!(grid.terrain(Position::new(0, 0)), Some(Terrain::Cave));
        assert_eq!(grid.terrain(Position::new(0, 2)), Some(Terrain::Water));
        assert_eq!(grid.terrain(Position::new(1, 1)), Some(Terrain::Grass));
        assert_eq!(grid.terrain(Position::new(1, 2)), Some(Terrain::Nest));
    }

    #[test]
    fn test_invalid_layout() {
        assert!(Grid::from_layout("").is_err());
        assert!(Grid::from_layout("..\n.").is_err());
        assert!(Grid::from_layout("..\n.x").is_err());
    }

    #[test]
    fn test_offset_respects_bounds() {
        let grid = Grid::new(3, 3);
        let corner = Position::new(0, 0);
        assert_eq!(grid.offset(corner, -1, 0), None);
        assert_eq!(grid.offset(corner, 0, -1), None);
        assert_eq!(grid.offset(corner, 1, 1), Some(Position::new(1, 1)));
        assert_eq!(grid.offset(Position::new(2, 2), 1, 0), None);
    }

    #[test]
    fn test_occupant_queries() {
        let mut grid = Grid::new(3, 3);
        grid.place_predator(Position::new(0, 0), Predator::default()).unwrap();
        grid.place_prey(Position::new(2, 2), Prey::new("a")).unwrap();
        grid.place_prey(Position::new(1, 0), Prey::new("b")).unwrap();

        assert_eq!(grid.predator_position(), Some(Position::new(0, 0)));
        assert_eq!(grid.prey_count(), 2);
        assert_eq!(grid.prey_position("a"), Some(Position::new(2, 2)));
        assert_eq!(grid.prey_position("zzz"), None);

        let order: Vec<&str> = grid.unmoved_prey().map(|(_, p)| p.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_place_prey_refuses_occupied_cell() {
        let mut grid = Grid::new(2, 2);
        grid.place_prey(Position::new(1, 1), Prey::new("a")).unwrap();
        assert!(grid.place_prey(Position::new(1, 1), Prey::new("b")).is_err());
        assert!(grid.place_prey(Position::new(5, 5), Prey::new("c")).is_err());
    }

    #[test]
    fn test_display() {
        let mut grid = Grid::from_layout("c.\n.n").unwrap();
        grid.place_predator(Position::new(0, 0), Predator::default()).unwrap();
        grid.place_prey(Position::new(1, 1), Prey::new("a")).unwrap();
        assert_eq!(grid.to_string(), "P.\n.r\n");
    }
}
