//! Game state: the root aggregate.
//!
//! `GameState` owns everything: the object registry, per-player state,
//! locations, turn/phase state, active combat, the chain, and the RNG
//! handle. It is an ordinary value — `im` persistent structures make
//! cloning cheap — and the public rules API never mutates a caller's
//! state in place: every operation clones, corrects, and returns.
//!
//! Serialization of the whole aggregate is an external concern; the
//! individual components derive `Serialize` where their representation
//! allows it, and the RNG exposes an explicit snapshot.

use im::{HashMap as ImHashMap, Vector};
use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::error::{EngineError, Result};
use super::object::{ObjectId, ObjectInstance, Placement};
use super::player::{PlayerId, PlayerMap, PlayerState};
use super::rng::GameRng;
use super::turn::{ChainMode, TurnState};
use crate::board::{LocationId, LocationState};
use crate::chain::ChainStack;
use crate::combat::CombatState;

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }
}

/// Complete game state.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Game tunables.
    pub config: GameConfig,

    /// Per-player zones, pools, and trackers.
    pub players: PlayerMap<PlayerState>,

    /// Every object in the game, by identity.
    pub objects: ImHashMap<ObjectId, ObjectInstance>,

    /// Battlefield locations, indexed by `LocationId`.
    pub locations: Vector<LocationState>,

    /// Turn, phase, and priority state.
    pub turn: TurnState,

    /// Active combat, if any.
    pub combat: Option<CombatState>,

    /// The chain of pending spells and abilities.
    pub chain: ChainStack,

    /// Deterministic RNG handle.
    pub rng: GameRng,

    /// Set once the game has ended.
    pub result: Option<GameResult>,

    /// Next object ID to allocate.
    next_object_id: u32,
}

impl GameState {
    /// Create an empty game state.
    ///
    /// Scenario builders populate decks and draw opening hands; see
    /// `setup::GameBuilder`.
    #[must_use]
    pub fn new(config: GameConfig, rng: GameRng) -> Self {
        let player_count = config.player_count;
        let location_count = config.location_count;

        Self {
            config,
            players: PlayerMap::with_default(player_count),
            objects: ImHashMap::new(),
            locations: (0..location_count as u16)
                .map(|i| LocationState::new(LocationId::new(i)))
                .collect(),
            turn: TurnState::new(PlayerId::new(0)),
            combat: None,
            chain: ChainStack::new(),
            rng,
            result: None,
            next_object_id: 0,
        }
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.config.player_count
    }

    // === Lookup ===

    /// Get a player's state, or `PlayerNotFound`.
    pub fn player(&self, player: PlayerId) -> Result<&PlayerState> {
        if player.index() < self.player_count() {
            Ok(&self.players[player])
        } else {
            Err(EngineError::PlayerNotFound(player))
        }
    }

    /// Get an object, or `ObjectNotFound`.
    pub fn object(&self, id: ObjectId) -> Result<&ObjectInstance> {
        self.objects.get(&id).ok_or(EngineError::ObjectNotFound(id))
    }

    /// Get a mutable object, or `ObjectNotFound`.
    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut ObjectInstance> {
        self.objects
            .get_mut(&id)
            .ok_or(EngineError::ObjectNotFound(id))
    }

    /// Get a location, or `LocationNotFound`.
    pub fn location(&self, id: LocationId) -> Result<&LocationState> {
        self.locations
            .get(id.index())
            .ok_or(EngineError::LocationNotFound(id))
    }

    /// Get a mutable location, or `LocationNotFound`.
    pub fn location_mut(&mut self, id: LocationId) -> Result<&mut LocationState> {
        self.locations
            .get_mut(id.index())
            .ok_or(EngineError::LocationNotFound(id))
    }

    /// Iterate over all location IDs.
    pub fn location_ids(&self) -> impl Iterator<Item = LocationId> {
        (0..self.locations.len() as u16).map(LocationId::new)
    }

    /// Iterate over objects currently on the board.
    pub fn board_objects(&self) -> impl Iterator<Item = &ObjectInstance> {
        self.objects.values().filter(|o| o.on_board())
    }

    // === Object management ===

    /// Allocate a new object ID.
    pub fn alloc_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    /// Register an object in its owner's deck.
    pub fn add_to_deck(&mut self, object: ObjectInstance) {
        let owner = object.owner;
        let id = object.id;
        self.objects.insert(id, object);
        self.players[owner].deck.push_back(id);
    }

    // === Zone movement ===

    /// Draw the top card of a player's deck into their hand.
    ///
    /// Returns the drawn card, or `None` if the deck is empty (a no-op,
    /// not an error).
    pub fn draw_card(&mut self, player: PlayerId) -> Result<Option<ObjectId>> {
        self.player(player)?;
        let Some(card) = self.players[player].pop_deck() else {
            return Ok(None);
        };
        self.players[player].hand.push_back(card);
        self.object_mut(card)?.placement = Placement::Hand;
        Ok(Some(card))
    }

    /// Place an object onto the board at a location.
    ///
    /// Updates the object, the location occupant set, and the controller's
    /// board set. Does not run contest marking; callers do that.
    pub fn place_at_location(&mut self, id: ObjectId, location: LocationId) -> Result<()> {
        self.location(location)?;
        let controller = {
            let object = self.object_mut(id)?;
            object.placement = Placement::Location(location);
            object.controller
        };
        self.location_mut(location)?.occupants.insert(id);
        self.players[controller].board.insert(id);
        Ok(())
    }

    /// Remove an object from the board (to the given placement).
    ///
    /// Clears its board-only state (marked damage, readiness, its own
    /// attachment). Gear attached to it becomes orphaned and is swept by
    /// the cleanup recall step.
    pub fn remove_from_board(&mut self, id: ObjectId, to: Placement) -> Result<Option<LocationId>> {
        let (controller, owner, from) = {
            let object = self.object_mut(id)?;
            let from = object.location();
            object.placement = to;
            object.leave_board();
            (object.controller, object.owner, from)
        };

        if let Some(location) = from {
            self.location_mut(location)?.occupants.remove(&id);
        }
        self.players[controller].board.remove(&id);

        // Hand, discard, and deck are owner zones regardless of controller.
        match to {
            Placement::Hand => self.players[owner].hand.push_back(id),
            Placement::Discard => self.players[owner].discard.push_back(id),
            Placement::Deck => self.players[owner].deck.push_back(id),
            Placement::Chain | Placement::Location(_) => {}
        }

        Ok(from)
    }

    /// Move a spent or destroyed non-board object to its owner's discard.
    pub fn move_to_discard(&mut self, id: ObjectId) -> Result<()> {
        let owner = {
            let object = self.object_mut(id)?;
            object.placement = Placement::Discard;
            object.owner
        };
        self.players[owner].discard.push_back(id);
        Ok(())
    }

    // === Chain mode ===

    /// Re-derive the chain mode from chain emptiness.
    ///
    /// Invariant: `chain_mode == Closed` iff the chain is non-empty. Every
    /// chain mutation path calls this.
    pub fn sync_chain_mode(&mut self) {
        self.turn.chain_mode = if self.chain.is_empty() {
            ChainMode::Open
        } else {
            ChainMode::Closed
        };
    }
}
