//! Card definitions and the catalog boundary.

pub mod catalog;
pub mod definition;

pub use catalog::{lookup, CardRegistry, Catalog};
pub use definition::{
    AbilityDef, AbilityKind, CardDefinition, CardId, Category, Keyword, ResourceCost,
};
