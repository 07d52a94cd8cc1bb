use thiserror::Error;

use crate::core::types::{PlayerId, UnitId};
use crate::phase::Phase;

/// Errors surfaced by the rules core.
///
/// Protocol errors reject the submitted action without mutating state; the
/// submitter is resynchronized with the current turn and phase. Rule-edge
/// conditions (zero damage, exhausted transfer chains, destroyed sentinels)
/// are normal control flow and never reported through this type.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Unknown unit: {0:?}")]
    UnknownUnit(UnitId),

    #[error("Action submitted during {actual:?}, requires {required:?}")]
    WrongPhase { required: Phase, actual: Phase },

    #[error("Turn does not belong to player {0:?}")]
    NotYourTurn(PlayerId),

    #[error("No pending turn to act on")]
    NoActiveTurn,

    #[error("Illegal position: {0}")]
    IllegalPosition(String),

    #[error("Unit {loaded:?} cannot be carried by {loader:?}")]
    IllegalLoad { loader: UnitId, loaded: UnitId },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RulesError>;
