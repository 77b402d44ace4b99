//! Trigger events.
//!
//! Each event is a tagged variant carrying exactly the payload its kind
//! needs — no optional grab-bag fields. `TriggerKind` is the fieldless
//! mirror used by ability definitions to declare what they listen for.

use serde::{Deserialize, Serialize};

use crate::board::{LocationId, ScoreMethod};
use crate::core::object::ObjectId;
use crate::core::player::PlayerId;

/// The kinds of events abilities can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    ObjectPlayed,
    ObjectDied,
    EnteredBoard,
    LeftBoard,
    LocationScored,
    TurnStarted,
    TurnEnded,
    AttackDeclared,
    DefendDeclared,
}

/// A trigger event with its payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    /// A card was played (any category).
    ObjectPlayed {
        object: ObjectId,
        controller: PlayerId,
    },

    /// An object was destroyed.
    ObjectDied {
        object: ObjectId,
        controller: PlayerId,
        location: Option<LocationId>,
    },

    /// An object entered a board location.
    EnteredBoard {
        object: ObjectId,
        controller: PlayerId,
        location: LocationId,
    },

    /// An object left a board location (other than by dying).
    LeftBoard {
        object: ObjectId,
        controller: PlayerId,
        location: LocationId,
    },

    /// A location was scored.
    LocationScored {
        location: LocationId,
        player: PlayerId,
        method: ScoreMethod,
    },

    /// A turn began.
    TurnStarted { player: PlayerId, turn: u32 },

    /// A turn ended.
    TurnEnded { player: PlayerId, turn: u32 },

    /// Combat began; the attacker was designated.
    AttackDeclared {
        location: LocationId,
        attacker: PlayerId,
        defender: PlayerId,
    },

    /// Combat began; the defender was designated.
    DefendDeclared {
        location: LocationId,
        attacker: PlayerId,
        defender: PlayerId,
    },
}

impl TriggerEvent {
    /// The kind of this event.
    #[must_use]
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::ObjectPlayed { .. } => TriggerKind::ObjectPlayed,
            Self::ObjectDied { .. } => TriggerKind::ObjectDied,
            Self::EnteredBoard { .. } => TriggerKind::EnteredBoard,
            Self::LeftBoard { .. } => TriggerKind::LeftBoard,
            Self::LocationScored { .. } => TriggerKind::LocationScored,
            Self::TurnStarted { .. } => TriggerKind::TurnStarted,
            Self::TurnEnded { .. } => TriggerKind::TurnEnded,
            Self::AttackDeclared { .. } => TriggerKind::AttackDeclared,
            Self::DefendDeclared { .. } => TriggerKind::DefendDeclared,
        }
    }

    /// The object this event is about, if any.
    #[must_use]
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            Self::ObjectPlayed { object, .. }
            | Self::ObjectDied { object, .. }
            | Self::EnteredBoard { object, .. }
            | Self::LeftBoard { object, .. } => Some(*object),
            _ => None,
        }
    }

    /// The player this event is about, if any.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Self::ObjectPlayed { controller, .. }
            | Self::ObjectDied { controller, .. }
            | Self::EnteredBoard { controller, .. }
            | Self::LeftBoard { controller, .. } => Some(*controller),
            Self::LocationScored { player, .. }
            | Self::TurnStarted { player, .. }
            | Self::TurnEnded { player, .. } => Some(*player),
            Self::AttackDeclared { attacker, .. } => Some(*attacker),
            Self::DefendDeclared { defender, .. } => Some(*defender),
        }
    }

    /// The location this event is about, if any.
    #[must_use]
    pub fn location(&self) -> Option<LocationId> {
        match self {
            Self::ObjectDied { location, .. } => *location,
            Self::EnteredBoard { location, .. }
            | Self::LeftBoard { location, .. }
            | Self::LocationScored { location, .. }
            | Self::AttackDeclared { location, .. }
            | Self::DefendDeclared { location, .. } => Some(*location),
            _ => None,
        }
    }
}
