//! Turn and phase state.
//!
//! The phase cycle is fixed:
//! Awaken → Beginning → Channel → Draw → Action → Combat → Ending.
//! Ending is terminal — advancing past it requires an explicit `end_turn`,
//! which hands the Awaken phase to the next player.
//!
//! `TurnState` also tracks the chain mode (Open/Closed), the current
//! priority holder, and the transient *focus* designation granted to
//! whichever player initiated a showdown or combat.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Turn phases, in cycle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Ready all board objects.
    Awaken,
    /// Hold scoring for controlled locations.
    Beginning,
    /// Resource income.
    Channel,
    /// Automatic card draw.
    Draw,
    /// Main phase: play cards, move units.
    Action,
    /// Combat initiation window.
    Combat,
    /// Pools empty; the turn must be ended explicitly.
    Ending,
}

impl Phase {
    /// The next phase in the cycle, or `None` from the terminal phase.
    #[must_use]
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Awaken => Some(Phase::Beginning),
            Phase::Beginning => Some(Phase::Channel),
            Phase::Channel => Some(Phase::Draw),
            Phase::Draw => Some(Phase::Action),
            Phase::Action => Some(Phase::Combat),
            Phase::Combat => Some(Phase::Ending),
            Phase::Ending => None,
        }
    }
}

/// Whether the game is in a neutral flow or resolving a showdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    #[default]
    Neutral,
    Showdown,
}

/// Chain mode. Closed iff the chain holds at least one item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainMode {
    #[default]
    Open,
    Closed,
}

/// Turn, phase, and priority state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Current phase.
    pub phase: Phase,

    /// Whose turn it is.
    pub turn_holder: PlayerId,

    /// Turn number (starts at 1).
    pub turn_number: u32,

    /// Neutral flow or showdown resolution.
    pub state_kind: StateKind,

    /// Open (no pending chain work) or Closed (chain non-empty).
    pub chain_mode: ChainMode,

    /// Player who currently holds priority.
    pub priority: PlayerId,

    /// Player currently acting (the turn holder outside of contests).
    pub active_player: PlayerId,

    /// Transient designation for whoever initiated a showdown or combat.
    pub focus: Option<PlayerId>,
}

impl TurnState {
    /// Initial turn state: player 0's Awaken, turn 1.
    #[must_use]
    pub fn new(first_player: PlayerId) -> Self {
        Self {
            phase: Phase::Awaken,
            turn_holder: first_player,
            turn_number: 1,
            state_kind: StateKind::default(),
            chain_mode: ChainMode::default(),
            priority: first_player,
            active_player: first_player,
            focus: None,
        }
    }

    /// Begin the next player's turn.
    pub fn advance_turn(&mut self, player_count: usize) {
        self.turn_holder = self.turn_holder.next(player_count);
        self.turn_number += 1;
        self.phase = Phase::Awaken;
        self.active_player = self.turn_holder;
        self.priority = self.turn_holder;
        self.focus = None;
    }
}
