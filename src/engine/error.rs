//! Reasons an intent was refused. A refused intent never changes the game.

use super::state::Phase;
use crate::board::EntityType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the {entity} cannot act during the {phase} phase")]
    InvalidPhase { phase: Phase, entity: EntityType },
    #[error("no entity is selected to move")]
    NoActiveEntity,
    #[error("no move is staged")]
    NothingStaged,
    #[error("destination is not a legal move")]
    IllegalDestination,
    #[error("this entity has already moved")]
    AlreadyMoved,
    #[error("unknown prey '{0}'")]
    UnknownPrey(String),
    #[error("cannot end the {0} phase yet")]
    PhaseGateUnmet(Phase),
}
