//! Game objects: identity and runtime state.
//!
//! Every card in a game is represented by an `ObjectInstance` — the runtime
//! record tying a catalog definition to an owner, a placement, and mutable
//! state (marked damage, readiness, attachment).
//!
//! Object identity is stable for the lifetime of a game; moving between
//! zones never reallocates the ID.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use crate::board::LocationId;
use crate::cards::CardId;

/// Unique identifier for a game object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Create a new object ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// Where an object currently lives.
///
/// Explicit placement replaces nullable zone references: every object is
/// always in exactly one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// In its owner's deck.
    Deck,
    /// In its owner's hand.
    Hand,
    /// In its owner's discard pile.
    Discard,
    /// On the chain, waiting to resolve.
    Chain,
    /// On the board at a location.
    Location(LocationId),
}

/// A game object at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInstance {
    /// Unique identity.
    pub id: ObjectId,

    /// Catalog definition this object instantiates.
    pub card: CardId,

    /// Owner (who started with this card).
    pub owner: PlayerId,

    /// Current controller.
    pub controller: PlayerId,

    /// Current placement.
    pub placement: Placement,

    /// Damage marked on this object. Cleared when it leaves the board.
    pub damage: i64,

    /// Ready objects may move or be exhausted by costs.
    pub ready: bool,

    /// Host object, for attached gear.
    pub attached_to: Option<ObjectId>,
}

impl ObjectInstance {
    /// Create an object in its owner's deck.
    #[must_use]
    pub fn new(id: ObjectId, card: CardId, owner: PlayerId) -> Self {
        Self {
            id,
            card,
            owner,
            controller: owner,
            placement: Placement::Deck,
            damage: 0,
            ready: true,
            attached_to: None,
        }
    }

    /// Is this object on the board?
    #[must_use]
    pub fn on_board(&self) -> bool {
        matches!(self.placement, Placement::Location(_))
    }

    /// The location this object occupies, if on the board.
    #[must_use]
    pub fn location(&self) -> Option<LocationId> {
        match self.placement {
            Placement::Location(loc) => Some(loc),
            _ => None,
        }
    }

    /// Ready this object. Readying a ready object is a no-op.
    pub fn ready_up(&mut self) {
        self.ready = true;
    }

    /// Reset board-only state when the object leaves the board.
    pub fn leave_board(&mut self) {
        self.damage = 0;
        self.ready = true;
        self.attached_to = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_starts_in_deck() {
        let obj = ObjectInstance::new(ObjectId(10), CardId::new(1), PlayerId::new(0));

        assert_eq!(obj.placement, Placement::Deck);
        assert_eq!(obj.controller, PlayerId::new(0));
        assert!(obj.ready);
        assert!(!obj.on_board());
        assert_eq!(obj.location(), None);
    }

    #[test]
    fn test_location_accessor() {
        let mut obj = ObjectInstance::new(ObjectId(10), CardId::new(1), PlayerId::new(0));
        obj.placement = Placement::Location(LocationId::new(2));

        assert!(obj.on_board());
        assert_eq!(obj.location(), Some(LocationId::new(2)));
    }

    #[test]
    fn test_ready_up_is_idempotent() {
        let mut obj = ObjectInstance::new(ObjectId(10), CardId::new(1), PlayerId::new(0));
        obj.ready = false;

        obj.ready_up();
        assert!(obj.ready);

        obj.ready_up();
        assert!(obj.ready);
    }

    #[test]
    fn test_leave_board_clears_state() {
        let mut obj = ObjectInstance::new(ObjectId(10), CardId::new(1), PlayerId::new(0));
        obj.placement = Placement::Location(LocationId::new(0));
        obj.damage = 4;
        obj.ready = false;
        obj.attached_to = Some(ObjectId(11));

        obj.leave_board();

        assert_eq!(obj.damage, 0);
        assert!(obj.ready);
        assert_eq!(obj.attached_to, None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ObjectId(42)), "Object(42)");
    }

    #[test]
    fn test_serialization() {
        let obj = ObjectInstance::new(ObjectId(3), CardId::new(9), PlayerId::new(1));
        let json = serde_json::to_string(&obj).unwrap();
        let deserialized: ObjectInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(obj, deserialized);
    }
}
