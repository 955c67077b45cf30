//! Display and output formatting utilities

use crate::board::{Cell, Grid, Terrain};
use crate::engine::{Outcome, Snapshot};

/// Text rendering of boards and game status
pub struct BoardFormatter;

impl BoardFormatter {
    fn terrain_glyph(terrain: Terrain) -> char {
        match terrain {
            Terrain::Default => '·',
            Terrain::Grass => '"',
            Terrain::Water => '~',
            Terrain::Trees => '♣',
            Terrain::Cave => 'C',
            Terrain::Nest => 'N',
        }
    }

    /// Occupants win over highlights, highlights over terrain
    fn cell_glyph(cell: &Cell, active_prey: Option<&str>) -> char {
        match (&cell.predator, &cell.prey) {
            (Some(_), Some(_)) => 'X',
            (Some(_), None) => 'P',
            (None, Some(prey)) if Some(prey.id.as_str()) == active_prey => 'R',
            (None, Some(_)) => 'r',
            (None, None) if cell.is_potential() => '*',
            (None, None) => Self::terrain_glyph(cell.terrain),
        }
    }

    /// Format a grid with row and column numbers
    pub fn format_grid_with_coords(grid: &Grid, active_prey: Option<&str>) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for col in 0..grid.cols {
            output.push_str(&format!("{:2}", col % 10));
        }
        output.push('\n');

        for (pos, cell) in grid.cells() {
            if pos.col == 0 {
                output.push_str(&format!("{:2} ", pos.row));
            }
            output.push(' ');
            output.push(Self::cell_glyph(cell, active_prey));
            if pos.col + 1 == grid.cols {
                output.push('\n');
            }
        }

        output
    }

    pub fn legend() -> &'static str {
        "P predator  R active prey  r prey  X predator with prey  * reachable\n\
         C cave  N nest  \" grass  ~ water  ♣ trees  · open ground"
    }

    /// Status lines shown under the board
    pub fn format_status(snapshot: &Snapshot<'_>, target_ratio: u32) -> String {
        let mut output = String::new();
        output.push_str(&format!("Phase: {}\n", snapshot.phase));
        output.push_str(&format!("Days Passed: {}\n", snapshot.day));
        output.push_str(&format!("Target Ratio: {}:1\n", target_ratio));
        output.push_str(&format!(
            "Current Ratio: {}{}\n",
            snapshot.ratio,
            if snapshot.ratio.meets_target(target_ratio) {
                " (target met)"
            } else {
                ""
            }
        ));
        if let Some(id) = snapshot.active_prey {
            output.push_str(&format!("Active Prey: {}\n", id));
        }
        if let Some(pending) = snapshot.pending_move {
            output.push_str(&format!(
                "Pending Move: {} {} (Enter to confirm)\n",
                pending.entity, pending.direction
            ));
        }
        if snapshot.unmoved_prey > 0 {
            output.push_str(&format!("Prey left to move: {}\n", snapshot.unmoved_prey));
        }
        if snapshot.can_end_phase {
            output.push_str(&format!("Press Enter to end the {} phase\n", snapshot.phase));
        }
        output
    }

    /// One-line description of an accepted intent
    pub fn format_outcome(outcome: &Outcome) -> String {
        match outcome {
            Outcome::Selected { prey_id, position } => {
                format!("Selected prey {} at {}", prey_id, position)
            }
            Outcome::Staged(pending) => {
                format!("Staged {} move {}", pending.entity, pending.direction)
            }
            Outcome::Moved {
                entity,
                from,
                to,
                next_phase,
            } => {
                let mut line = format!("The {} moved {} → {}", entity, from, to);
                if let Some(phase) = next_phase {
                    line.push_str(&format!("; the {} begins", phase));
                }
                line
            }
            Outcome::PhaseChanged { phase, resolution } => match resolution {
                Some(report) => format!("The {} begins: {}", phase, report),
                None => format!("The {} begins", phase),
            },
        }
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err()
            && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, Predator, Prey};
    use crate::engine::Game;

    fn sample_game() -> Game {
        let mut grid = Grid::from_layout("cw.\n.g.\n..n").unwrap();
        grid.place_predator(Position::new(0, 0), Predator::default()).unwrap();
        grid.place_prey(Position::new(2, 2), Prey::new("only")).unwrap();
        Game::from_grid(grid, 1).unwrap()
    }

    #[test]
    fn test_grid_formatting() {
        let game = sample_game();

        let plain = BoardFormatter::format_grid_with_coords(game.grid(), None);
        assert_eq!(plain.lines().count(), 4);
        assert!(plain.contains(" 0  P ~"));
        assert!(plain.contains('r'));

        let with_coords = BoardFormatter::format_grid_with_coords(game.grid(), game.active_prey());
        assert!(with_coords.contains(" 0 1 2"));
        assert!(with_coords.contains('R'));
        assert!(with_coords.contains('*'));
    }

    #[test]
    fn test_status_formatting() {
        let game = sample_game();
        let status = BoardFormatter::format_status(&game.snapshot(), 5);
        assert!(status.contains("Phase: day"));
        assert!(status.contains("Days Passed: 0"));
        assert!(status.contains("Current Ratio: 1:1"));
        assert!(status.contains("Active Prey: only"));
        assert!(!status.contains("target met"));
    }

    #[test]
    fn test_outcome_formatting() {
        let line = BoardFormatter::format_outcome(&Outcome::Selected {
            prey_id: "abc".to_string(),
            position: Position::new(1, 2),
        });
        assert_eq!(line, "Selected prey abc at (1, 2)");
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));

        let success = ColorOutput::success("OK");
        assert!(success.contains("OK"));
    }
}
