//! Cell contents: terrain, the predator, prey and highlight annotations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terrain of a single board cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Default,
    Grass,
    Water,
    Trees,
    Cave,
    Nest,
}

impl Terrain {
    /// Layout character used by `Grid::from_layout`
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Terrain::Default),
            'g' => Some(Terrain::Grass),
            'w' => Some(Terrain::Water),
            't' => Some(Terrain::Trees),
            'c' => Some(Terrain::Cave),
            'n' => Some(Terrain::Nest),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Terrain::Default => '.',
            Terrain::Grass => 'g',
            Terrain::Water => 'w',
            Terrain::Trees => 't',
            Terrain::Cave => 'c',
            Terrain::Nest => 'n',
        }
    }

    /// Whether an entity of the given kind may enter or slide through this terrain
    pub fn is_passable_for(self, entity: EntityType) -> bool {
        match entity {
            EntityType::Prey => self != Terrain::Water,
            EntityType::Predator => !matches!(self, Terrain::Water | Terrain::Nest),
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Terrain::Default => "default",
            Terrain::Grass => "grass",
            Terrain::Water => "water",
            Terrain::Trees => "trees",
            Terrain::Cave => "cave",
            Terrain::Nest => "nest",
        };
        write!(f, "{}", name)
    }
}

/// Which kind of entity an operation concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Predator,
    Prey,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Predator => write!(f, "predator"),
            EntityType::Prey => write!(f, "prey"),
        }
    }
}

/// The single predator on the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predator {
    /// Turns since the last successful predation
    pub hungry_turns: u32,
}

/// One prey animal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prey {
    /// Stable identifier, never reused
    pub id: String,
    pub has_moved: bool,
    pub days_on_grass: u32,
}

impl Prey {
    /// A freshly created prey that has not moved yet
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            has_moved: false,
            days_on_grass: 0,
        }
    }
}

/// Kind of highlight shown on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    /// Current position of the selected entity
    Start,
    /// A legal destination for the selected entity
    Potential,
}

/// Transient annotation derived from the move calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Highlight {
    pub kind: HighlightKind,
    pub entity: EntityType,
}

/// A single board cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    pub predator: Option<Predator>,
    pub prey: Option<Prey>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub highlight: Option<Highlight>,
}

impl Cell {
    pub fn with_terrain(terrain: Terrain) -> Self {
        Self {
            terrain,
            ..Self::default()
        }
    }

    pub fn is_potential(&self) -> bool {
        matches!(
            self.highlight,
            Some(Highlight {
                kind: HighlightKind::Potential,
                ..
            })
        )
    }

    pub fn has_entity(&self, entity: EntityType) -> bool {
        match entity {
            EntityType::Predator => self.predator.is_some(),
            EntityType::Prey => self.prey.is_some(),
        }
    }
}
