//! Effect definitions.
//!
//! Effects are the atomic vocabulary abilities and spells are written in.
//! They are intentionally small and generic — richer per-card behavior is
//! a catalog concern composed out of these.

use serde::{Deserialize, Serialize};

use crate::board::LocationId;
use crate::core::object::ObjectId;
use crate::core::player::PlayerId;

/// A resolved choice of what an effect applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A game object.
    Object(ObjectId),
    /// A player.
    Player(PlayerId),
    /// A battlefield location.
    Location(LocationId),
}

/// An atomic game effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Mark damage on each object target.
    Damage { amount: i64 },

    /// The controller draws cards.
    Draw { count: usize },

    /// The controller gains energy.
    GainEnergy { amount: u32 },

    /// The controller gains command.
    GainCommand { amount: u32 },

    /// Destroy each object target outright.
    Destroy,

    /// Return each object target to its owner's hand.
    Recall,

    /// Ready each object target.
    Ready,
}

impl Effect {
    /// Create a damage effect.
    #[must_use]
    pub fn damage(amount: i64) -> Self {
        Self::Damage { amount }
    }

    /// Create a draw effect.
    #[must_use]
    pub fn draw(count: usize) -> Self {
        Self::Draw { count }
    }

    /// Create an energy gain effect.
    #[must_use]
    pub fn gain_energy(amount: u32) -> Self {
        Self::GainEnergy { amount }
    }

    /// Create a command gain effect.
    #[must_use]
    pub fn gain_command(amount: u32) -> Self {
        Self::GainCommand { amount }
    }

    /// Does this effect apply to chosen object targets?
    #[must_use]
    pub fn needs_object_target(&self) -> bool {
        matches!(
            self,
            Self::Damage { .. } | Self::Destroy | Self::Recall | Self::Ready
        )
    }
}

/// Does any effect in a list require an object target?
#[must_use]
pub fn any_needs_object_target(effects: &[Effect]) -> bool {
    effects.iter().any(Effect::needs_object_target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_requirements() {
        assert!(Effect::damage(3).needs_object_target());
        assert!(Effect::Destroy.needs_object_target());
        assert!(Effect::Recall.needs_object_target());
        assert!(!Effect::draw(1).needs_object_target());
        assert!(!Effect::gain_energy(2).needs_object_target());
    }

    #[test]
    fn test_any_needs_object_target() {
        assert!(any_needs_object_target(&[
            Effect::draw(1),
            Effect::damage(2)
        ]));
        assert!(!any_needs_object_target(&[Effect::draw(1)]));
        assert!(!any_needs_object_target(&[]));
    }

    #[test]
    fn test_serialization() {
        let effect = Effect::damage(4);
        let json = serde_json::to_string(&effect).unwrap();
        let deserialized: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(effect, deserialized);
    }
}
