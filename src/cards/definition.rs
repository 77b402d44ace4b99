//! Card definitions.
//!
//! A `CardDefinition` is catalog data: category, cost, stats, keywords,
//! and abilities. The engine consumes definitions through the [`Catalog`]
//! trait and never hardcodes card contents.
//!
//! [`Catalog`]: super::Catalog

use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::triggers::{TriggerFilter, TriggerKind};

/// Card identifier within a catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
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

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Deploys to a location and fights.
    Unit,
    /// Attaches to a unit.
    Gear,
    /// Resolves its effects and is discarded.
    Spell,
}

/// Keywords the generic mechanisms understand.
///
/// The full keyword vocabulary is a catalog concern; these are the ones
/// with engine-level semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    /// Must absorb lethal combat damage before non-Tank allies.
    Tank,
    /// Deploys ready instead of exhausted.
    Swift,
    /// Recalled to hand when its owner loses presence at the location.
    Hidden,
}

/// Cost in the two resource currencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub energy: u32,
    pub command: u32,
}

impl ResourceCost {
    /// A cost in energy only.
    #[must_use]
    pub const fn energy(amount: u32) -> Self {
        Self {
            energy: amount,
            command: 0,
        }
    }

    /// A cost in command only.
    #[must_use]
    pub const fn command(amount: u32) -> Self {
        Self {
            energy: 0,
            command: amount,
        }
    }

    /// A free cost.
    #[must_use]
    pub const fn free() -> Self {
        Self {
            energy: 0,
            command: 0,
        }
    }
}

/// How an ability is put onto the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Fires when a matching event occurs.
    Triggered {
        on: TriggerKind,
        filter: TriggerFilter,
    },
    /// Activated by the controller at priority, for a cost.
    Activated { cost: ResourceCost },
}

/// An ability a card carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDef {
    /// Display name (debugging).
    pub name: String,

    /// Triggered or activated.
    pub kind: AbilityKind,

    /// Effects applied when the ability resolves.
    pub effects: Vec<Effect>,
}

impl AbilityDef {
    /// Create a triggered ability.
    pub fn triggered(
        name: impl Into<String>,
        on: TriggerKind,
        filter: TriggerFilter,
        effects: Vec<Effect>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: AbilityKind::Triggered { on, filter },
            effects,
        }
    }

    /// Create an activated ability.
    pub fn activated(name: impl Into<String>, cost: ResourceCost, effects: Vec<Effect>) -> Self {
        Self {
            name: name.into(),
            kind: AbilityKind::Activated { cost },
            effects,
        }
    }
}

/// A card definition: catalog data the engine reads but never owns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier.
    pub id: CardId,

    /// Display name.
    pub name: String,

    /// Category.
    pub category: Category,

    /// Play cost.
    pub cost: ResourceCost,

    /// Combat strength (units).
    pub might: i64,

    /// Damage threshold before destruction (units).
    pub toughness: i64,

    /// Engine-meaningful keywords.
    pub keywords: Vec<Keyword>,

    /// Triggered and activated abilities.
    pub abilities: Vec<AbilityDef>,

    /// Effects applied when a Spell resolves.
    pub effects: Vec<Effect>,
}

impl CardDefinition {
    /// Create a definition with zero cost and stats.
    pub fn new(id: CardId, name: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            cost: ResourceCost::free(),
            might: 0,
            toughness: 0,
            keywords: Vec::new(),
            abilities: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Set the play cost.
    #[must_use]
    pub fn with_cost(mut self, cost: ResourceCost) -> Self {
        self.cost = cost;
        self
    }

    /// Set might and toughness.
    #[must_use]
    pub fn with_stats(mut self, might: i64, toughness: i64) -> Self {
        self.might = might;
        self.toughness = toughness;
        self
    }

    /// Add a keyword.
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    /// Add an ability.
    #[must_use]
    pub fn with_ability(mut self, ability: AbilityDef) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Add a spell effect.
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Check for a keyword.
    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }
}
