//! Engine errors.
//!
//! Every fallible operation returns `Result<T, EngineError>`. Errors carry
//! enough structure for a caller to react programmatically: a broad
//! [`ErrorKind`] classification plus the identities involved.
//!
//! Conditions with nothing to do (readying an already-ready object, emptying
//! an empty pool) are successes, not errors — the engine distinguishes
//! "nothing to do" from "illegal request".

use thiserror::Error;

use super::object::ObjectId;
use super::player::PlayerId;
use super::turn::Phase;
use crate::board::LocationId;
use crate::cards::CardId;

/// Broad error classification.
///
/// `InvariantFailure` indicates a rules-interaction bug inside the engine;
/// callers must treat it as fatal rather than retrying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced player, object, or location does not exist.
    NotFound,
    /// The request is well-formed but the state forbids it.
    IllegalState,
    /// The request breaks the resolution protocol.
    ProtocolViolation,
    /// An internal invariant broke. Fatal.
    InvariantFailure,
}

/// Engine error type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("location not found: {0}")]
    LocationNotFound(LocationId),

    #[error("card not in catalog: {0}")]
    CardNotFound(CardId),

    #[error("wrong phase: expected {expected:?}, currently in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("cannot advance past {0:?}; the turn must be ended explicitly")]
    InvalidPhaseTransition(Phase),

    #[error("{0} is not the turn holder")]
    NotTurnHolder(PlayerId),

    #[error("{0} does not hold priority")]
    NotPriorityHolder(PlayerId),

    #[error("{location} is contested; control cannot change until the contest resolves")]
    ContestedLocation { location: LocationId },

    #[error("{location} was already scored this turn by {player}")]
    AlreadyScored {
        location: LocationId,
        player: PlayerId,
    },

    #[error("insufficient {resource}: need {need}, have {have}")]
    InsufficientResources {
        resource: &'static str,
        need: u32,
        have: u32,
    },

    #[error("object {0} is exhausted")]
    ObjectExhausted(ObjectId),

    #[error("cannot resolve an empty chain")]
    EmptyChainResolve,

    #[error("choice is not in the current legal set: {0}")]
    ChoiceNotLegal(String),

    #[error("illegal combat damage assignment: {0}")]
    IllegalAssignment(String),

    #[error("scripted rng exhausted after {consumed} values")]
    RngExhausted { consumed: usize },

    #[error("cleanup failed to converge after {passes} passes")]
    CleanupDivergence { passes: u32 },
}

impl EngineError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlayerNotFound(_)
            | Self::ObjectNotFound(_)
            | Self::LocationNotFound(_)
            | Self::CardNotFound(_) => ErrorKind::NotFound,
            Self::WrongPhase { .. }
            | Self::InvalidPhaseTransition(_)
            | Self::NotTurnHolder(_)
            | Self::ContestedLocation { .. }
            | Self::AlreadyScored { .. }
            | Self::InsufficientResources { .. }
            | Self::ObjectExhausted(_) => ErrorKind::IllegalState,
            Self::NotPriorityHolder(_)
            | Self::EmptyChainResolve
            | Self::ChoiceNotLegal(_)
            | Self::IllegalAssignment(_) => ErrorKind::ProtocolViolation,
            Self::RngExhausted { .. } | Self::CleanupDivergence { .. } => {
                ErrorKind::InvariantFailure
            }
        }
    }

    /// Is this error fatal (engine bug, not caller mistake)?
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::InvariantFailure
    }

    /// Suggested remedies for recoverable protocol errors, if any.
    ///
    /// Returned as short caller-facing hints; empty for most errors.
    #[must_use]
    pub fn remedies(&self) -> Vec<&'static str> {
        match self {
            Self::ChoiceNotLegal(_) => {
                vec!["call pending_choices to obtain the current legal set"]
            }
            Self::NotPriorityHolder(_) => {
                vec!["wait for priority or submit the choice as the priority holder"]
            }
            Self::ContestedLocation { .. } => {
                vec!["resolve the showdown or combat at the location first"]
            }
            _ => Vec::new(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
