//! Battlefield locations.
//!
//! A location tracks its controller, occupants, and contest status. The
//! staging flags are written by the cleanup pass and consumed by the
//! showdown/combat initiation steps.

use im::HashSet as ImHashSet;
use serde::{Deserialize, Serialize};

use crate::core::object::ObjectId;
use crate::core::player::PlayerId;

/// Battlefield location identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub u16);

impl LocationId {
    /// Create a new location ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the index into the location table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Location({})", self.0)
    }
}

/// State of one battlefield location.
///
/// Invariant: `controller` cannot change while `contested` is set; all
/// control mutation goes through `board::control`, which enforces this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationState {
    /// Identity.
    pub id: LocationId,

    /// Controlling player, if any.
    pub controller: Option<PlayerId>,

    /// Objects at this location.
    pub occupants: ImHashSet<ObjectId>,

    /// A contest blocks control changes until resolved.
    pub contested: bool,

    /// Who applied contested status.
    pub contested_by: Option<PlayerId>,

    /// Cleanup staged a showdown here (contested, uncontrolled).
    pub showdown_staged: bool,

    /// Cleanup staged combat here (contested, controlled by the defender).
    pub combat_staged: bool,
}

impl LocationState {
    /// Create an empty, uncontrolled location.
    #[must_use]
    pub fn new(id: LocationId) -> Self {
        Self {
            id,
            controller: None,
            occupants: ImHashSet::new(),
            contested: false,
            contested_by: None,
            showdown_staged: false,
            combat_staged: false,
        }
    }

    /// Clear contest status and both staging flags.
    pub fn clear_contest(&mut self) {
        self.contested = false;
        self.contested_by = None;
        self.showdown_staged = false;
        self.combat_staged = false;
    }
}
