//! The chain: LIFO resolution with priority passing.

pub mod item;
pub mod stack;

pub use item::{AbilityItem, ChainItem, ChainItemId, ChainItemKind, SpellItem};
pub use stack::{
    finalize_pending, pass_priority, push_ability, push_spell, resolve_top, ChainStack,
};
