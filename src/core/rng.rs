//! Deterministic random number generation.
//!
//! All randomness flows through a [`GameRng`] value carried inside the game
//! state — never a global generator. Two sources exist:
//!
//! - **Seeded**: a `ChaCha8Rng` stream. Same seed, same sequence. The state
//!   is serializable via the cipher word position, so snapshots are O(1)
//!   regardless of how many values were drawn.
//! - **Scripted**: a fixed remaining-values sequence for tests. Drawing past
//!   the end is the typed error [`EngineError::RngExhausted`], not a panic.
//!
//! `GameRng` is an ordinary `Clone` value: cloning a state clones the
//! generator position with it, which is what makes replay and rollback work.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// Deterministic RNG handle threaded through every state-producing call.
#[derive(Clone, Debug)]
pub enum GameRng {
    /// Seeded ChaCha8 stream.
    Seeded(SeededRng),
    /// Fixed value sequence for tests.
    Scripted(ScriptedRng),
}

impl GameRng {
    /// Create a seeded RNG.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(SeededRng::new(seed))
    }

    /// Create a scripted RNG from a fixed value sequence.
    #[must_use]
    pub fn scripted(values: impl Into<Vec<u64>>) -> Self {
        Self::Scripted(ScriptedRng::new(values))
    }

    /// Draw the next raw value.
    pub fn next_u64(&mut self) -> Result<u64> {
        match self {
            Self::Seeded(rng) => Ok(rng.inner.gen()),
            Self::Scripted(rng) => rng.next(),
        }
    }

    /// Draw a value in `[0, bound)`. A bound of 0 yields 0.
    pub fn gen_range(&mut self, bound: usize) -> Result<usize> {
        if bound == 0 {
            return Ok(0);
        }
        match self {
            Self::Seeded(rng) => Ok(rng.inner.gen_range(0..bound)),
            Self::Scripted(rng) => Ok((rng.next()? as usize) % bound),
        }
    }

    /// Shuffle a slice in place (Fisher-Yates, driven by this stream).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) -> Result<()> {
        for i in (1..slice.len()).rev() {
            let j = self.gen_range(i + 1)?;
            slice.swap(i, j);
        }
        Ok(())
    }

    /// Pick a random element of a slice, or `None` if empty.
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Result<Option<&'a T>> {
        if slice.is_empty() {
            return Ok(None);
        }
        let idx = self.gen_range(slice.len())?;
        Ok(slice.get(idx))
    }

    /// Snapshot this generator for replay.
    #[must_use]
    pub fn snapshot(&self) -> RngSnapshot {
        match self {
            Self::Seeded(rng) => RngSnapshot::Seeded {
                seed: rng.seed,
                word_pos: rng.inner.get_word_pos(),
            },
            Self::Scripted(rng) => RngSnapshot::Scripted {
                remaining: rng.remaining.clone(),
                consumed: rng.consumed,
            },
        }
    }

    /// Restore a generator from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &RngSnapshot) -> Self {
        match snapshot {
            RngSnapshot::Seeded { seed, word_pos } => {
                let mut inner = ChaCha8Rng::seed_from_u64(*seed);
                inner.set_word_pos(*word_pos);
                Self::Seeded(SeededRng { inner, seed: *seed })
            }
            RngSnapshot::Scripted {
                remaining,
                consumed,
            } => Self::Scripted(ScriptedRng {
                remaining: remaining.clone(),
                consumed: *consumed,
            }),
        }
    }
}

/// Seeded ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl SeededRng {
    #[must_use]
    fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Fixed remaining-values sequence.
///
/// A value type: drawing consumes from the front; exhaustion is a typed
/// error rather than a panic, so tests can assert on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptedRng {
    remaining: Vec<u64>,
    consumed: usize,
}

impl ScriptedRng {
    /// Create from a value sequence.
    #[must_use]
    pub fn new(values: impl Into<Vec<u64>>) -> Self {
        Self {
            remaining: values.into(),
            consumed: 0,
        }
    }

    /// How many scripted values are left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    fn next(&mut self) -> Result<u64> {
        if self.remaining.is_empty() {
            return Err(EngineError::RngExhausted {
                consumed: self.consumed,
            });
        }
        self.consumed += 1;
        Ok(self.remaining.remove(0))
    }
}

/// Serializable RNG state for checkpointing and replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RngSnapshot {
    /// Seed plus ChaCha8 word position (128-bit counter).
    Seeded { seed: u64, word_pos: u128 },
    /// Remaining scripted values.
    Scripted { remaining: Vec<u64>, consumed: usize },
}
