//! The choice surface.
//!
//! Choices are the engine's only input: `pending_choices` derives the
//! legal set for the current state, and `apply_choice` consumes exactly
//! one. Each variant names the submitting player so validation can match
//! it against the current priority and turn holders.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::LocationId;
use crate::combat::DamageAssignment;
use crate::core::object::ObjectId;
use crate::core::player::PlayerId;
use crate::effects::Target;

/// A player-submitted choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    /// Play a card from hand onto the chain. Targets carry the deploy
    /// destination for units, the host for gear, effect targets for
    /// spells.
    PlayCard {
        player: PlayerId,
        card: ObjectId,
        targets: SmallVec<[Target; 2]>,
    },

    /// Activate an ability of a board object.
    ActivateAbility {
        player: PlayerId,
        source: ObjectId,
        ability: usize,
        targets: SmallVec<[Target; 2]>,
    },

    /// Pass priority during chain resolution.
    PassPriority { player: PlayerId },

    /// Pay energy to draw a card (Action phase).
    DrawCard { player: PlayerId },

    /// Move a ready unit to another location (Action phase).
    MoveUnit {
        player: PlayerId,
        unit: ObjectId,
        to: LocationId,
    },

    /// Advance to the next phase.
    AdvancePhase { player: PlayerId },

    /// End the turn from the Ending phase.
    EndTurn { player: PlayerId },

    /// Begin a staged showdown (turn holder's pick).
    BeginShowdown {
        player: PlayerId,
        location: LocationId,
    },

    /// Begin a staged combat (turn holder's pick).
    BeginCombat {
        player: PlayerId,
        location: LocationId,
    },

    /// Resolve the showdown in progress.
    ResolveShowdown {
        player: PlayerId,
        location: LocationId,
    },

    /// Assign combat damage as the attacker.
    AssignCombatDamage {
        player: PlayerId,
        assignments: Vec<DamageAssignment>,
    },
}

impl Choice {
    /// The player submitting this choice.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            Self::PlayCard { player, .. }
            | Self::ActivateAbility { player, .. }
            | Self::PassPriority { player }
            | Self::DrawCard { player }
            | Self::MoveUnit { player, .. }
            | Self::AdvancePhase { player }
            | Self::EndTurn { player }
            | Self::BeginShowdown { player, .. }
            | Self::BeginCombat { player, .. }
            | Self::ResolveShowdown { player, .. }
            | Self::AssignCombatDamage { player, .. } => *player,
        }
    }

    /// Short description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::PlayCard { player, card, .. } => format!("{player} plays {card}"),
            Self::ActivateAbility { player, source, ability, .. } => {
                format!("{player} activates ability {ability} of {source}")
            }
            Self::PassPriority { player } => format!("{player} passes priority"),
            Self::DrawCard { player } => format!("{player} draws"),
            Self::MoveUnit { player, unit, to } => format!("{player} moves {unit} to {to}"),
            Self::AdvancePhase { player } => format!("{player} advances the phase"),
            Self::EndTurn { player } => format!("{player} ends the turn"),
            Self::BeginShowdown { player, location } => {
                format!("{player} begins a showdown at {location}")
            }
            Self::BeginCombat { player, location } => {
                format!("{player} begins combat at {location}")
            }
            Self::ResolveShowdown { player, location } => {
                format!("{player} resolves the showdown at {location}")
            }
            Self::AssignCombatDamage { player, assignments } => {
                format!("{player} assigns damage ({} entries)", assignments.len())
            }
        }
    }
}
