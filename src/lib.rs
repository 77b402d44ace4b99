//! # warfront
//!
//! A rules engine for location-control trading card games.
//!
//! ## Design Principles
//!
//! 1. **Immutable state**: `GameState` is a value. Every public operation
//!    takes `&GameState` and returns a corrected copy; `im` persistent
//!    structures make the copy cheap. Rollback is dropping a value,
//!    replay is reapplying choices.
//!
//! 2. **Catalog at arm's length**: card contents flow in through the
//!    `Catalog` trait. The engine implements the generic mechanisms every
//!    keyword and effect plugs into, never the cards themselves.
//!
//! 3. **Explicit suspension**: the engine never blocks on input. When a
//!    decision is owed, `pending_choices` derives the legal set and
//!    `apply_choice` consumes one — request/response, not coroutines.
//!
//! 4. **Deterministic**: all randomness flows through the seedable
//!    `GameRng` carried in the state. Same seed, same choices, same game.
//!
//! ## Architecture
//!
//! - `core`: identities, players, objects, turn state, RNG, errors
//! - `cards`: card definitions and the catalog boundary
//! - `board`: locations, control tracking, scoring, showdowns
//! - `effects`: the atomic effect vocabulary and its resolver
//! - `triggers`: trigger events, filters, and the APNAP router
//! - `chain`: the LIFO chain and its four-step resolution protocol
//! - `combat`: designation, damage assignment, the Tank ordering rule
//! - `cleanup`: the ten-step, bounded-fixpoint correction pass
//! - `phases`: turn phase sequencing and per-phase hooks
//! - `rules`: the choice surface and the engine facade
//! - `setup`: scenario builder for initial states

pub mod board;
pub mod cards;
pub mod chain;
pub mod cleanup;
pub mod combat;
pub mod core;
pub mod effects;
pub mod phases;
pub mod rules;
pub mod setup;
pub mod triggers;

// Re-export commonly used types
pub use crate::core::{
    ChainMode, EngineError, ErrorKind, GameConfig, GameResult, GameRng, GameState, ObjectId,
    ObjectInstance, Phase, Placement, PlayerId, PlayerMap, PlayerState, Result, RngSnapshot,
    ScriptedRng, StateKind, TurnState,
};

pub use crate::board::{LocationId, LocationState, ScoreMethod};

pub use crate::cards::{
    AbilityDef, AbilityKind, CardDefinition, CardId, CardRegistry, Catalog, Category, Keyword,
    ResourceCost,
};

pub use crate::effects::{Effect, Target};

pub use crate::triggers::{TriggerEvent, TriggerFilter, TriggerKind, TriggeredAbility};

pub use crate::chain::{ChainItem, ChainItemId, ChainItemKind, ChainStack};

pub use crate::combat::{CombatState, DamageAssignment};

pub use crate::cleanup::CleanupReport;

pub use crate::rules::{Choice, Engine};

pub use crate::setup::GameBuilder;
