//! Core engine types: players, objects, state, RNG, errors, configuration.
//!
//! This module contains the fundamental building blocks the rest of the
//! engine composes. Game variants configure them via `GameConfig` rather
//! than modifying the core.

pub mod config;
pub mod error;
pub mod object;
pub mod player;
pub mod rng;
pub mod state;
pub mod turn;

pub use config::GameConfig;
pub use error::{EngineError, ErrorKind, Result};
pub use object::{ObjectId, ObjectInstance, Placement};
pub use player::{PlayerId, PlayerMap, PlayerState};
pub use rng::{GameRng, RngSnapshot, ScriptedRng};
pub use state::{GameResult, GameState};
pub use turn::{ChainMode, Phase, StateKind, TurnState};
