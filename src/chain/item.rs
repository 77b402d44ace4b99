//! Chain items.
//!
//! Everything awaiting resolution is one of two tagged variants: a played
//! card (spell in the broad sense — units and gear resolve from the chain
//! too) or an ability. Items are born *pending* and must be finalized
//! before the Execute step of the protocol runs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardId;
use crate::core::object::ObjectId;
use crate::core::player::PlayerId;
use crate::effects::{Effect, Target};
use crate::triggers::TriggerEvent;

/// Unique identifier for a chain item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainItemId(pub u32);

impl ChainItemId {
    /// Create a new chain item ID.
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

impl std::fmt::Display for ChainItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChainItem({})", self.0)
    }
}

/// Item kind tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainItemKind {
    Spell,
    Ability,
}

/// A played card on the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellItem {
    /// Identity.
    pub id: ChainItemId,

    /// The object being played.
    pub object: ObjectId,

    /// Its catalog definition.
    pub card: CardId,

    /// Who played it.
    pub controller: PlayerId,

    /// Still completing its being-played sub-protocol.
    pub pending: bool,

    /// Chosen targets: a deploy destination for units, a host for gear,
    /// effect targets for spells.
    pub targets: SmallVec<[Target; 2]>,
}

/// An ability on the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityItem {
    /// Identity.
    pub id: ChainItemId,

    /// The object whose ability this is.
    pub source: ObjectId,

    /// Who controls the ability.
    pub controller: PlayerId,

    /// Still completing its being-played sub-protocol.
    pub pending: bool,

    /// Chosen or implicit targets.
    pub targets: SmallVec<[Target; 2]>,

    /// Effects applied on resolution.
    pub effects: Vec<Effect>,

    /// The event that triggered this, for triggered abilities.
    pub event: Option<TriggerEvent>,

    /// Discovery order at routing time; stable-sort key, not gameplay
    /// ordering.
    pub order: u32,
}

/// An entry on the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainItem {
    Spell(SpellItem),
    Ability(AbilityItem),
}

impl ChainItem {
    /// Identity.
    #[must_use]
    pub fn id(&self) -> ChainItemId {
        match self {
            Self::Spell(item) => item.id,
            Self::Ability(item) => item.id,
        }
    }

    /// Kind tag.
    #[must_use]
    pub fn kind(&self) -> ChainItemKind {
        match self {
            Self::Spell(_) => ChainItemKind::Spell,
            Self::Ability(_) => ChainItemKind::Ability,
        }
    }

    /// Controller.
    #[must_use]
    pub fn controller(&self) -> PlayerId {
        match self {
            Self::Spell(item) => item.controller,
            Self::Ability(item) => item.controller,
        }
    }

    /// Is the item still pending finalization?
    #[must_use]
    pub fn is_pending(&self) -> bool {
        match self {
            Self::Spell(item) => item.pending,
            Self::Ability(item) => item.pending,
        }
    }

    /// Mark the item finalized.
    pub fn finalize(&mut self) {
        match self {
            Self::Spell(item) => item.pending = false,
            Self::Ability(item) => item.pending = false,
        }
    }

    /// Chosen targets.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        match self {
            Self::Spell(item) => &item.targets,
            Self::Ability(item) => &item.targets,
        }
    }
}
