//! Scenario setup.
//!
//! `GameBuilder` turns a configuration, a catalog, and per-player deck
//! lists into a playable initial state: objects registered, decks
//! shuffled through the state's RNG, and opening hands drawn. Deck
//! construction itself (what cards go in) stays an external concern.

use crate::cards::{lookup, CardId, Catalog};
use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::object::ObjectInstance;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;
use crate::core::state::GameState;

/// Builder for initial game states.
pub struct GameBuilder {
    config: GameConfig,
    decks: Vec<Vec<CardId>>,
}

impl GameBuilder {
    /// Start from a configuration.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let player_count = config.player_count;
        Self {
            config,
            decks: vec![Vec::new(); player_count],
        }
    }

    /// Set a player's deck list.
    #[must_use]
    pub fn deck(mut self, player: PlayerId, cards: Vec<CardId>) -> Self {
        self.decks[player.index()] = cards;
        self
    }

    /// Build the initial state: register objects, shuffle decks, draw
    /// opening hands.
    ///
    /// Every listed card must exist in the catalog.
    pub fn build(self, catalog: &dyn Catalog, rng: GameRng) -> Result<GameState> {
        let starting_hand = self.config.starting_hand_size;
        let mut state = GameState::new(self.config, rng);

        for (index, deck) in self.decks.iter().enumerate() {
            let player = PlayerId::new(index as u8);
            for &card in deck {
                lookup(catalog, card)?;
                let id = state.alloc_object_id();
                state.add_to_deck(ObjectInstance::new(id, card, player));
            }

            let mut order: Vec<_> = state.players[player].deck.iter().copied().collect();
            state.rng.shuffle(&mut order)?;
            state.players[player].deck = order.into_iter().collect();
        }

        for player in PlayerId::all(state.player_count()).collect::<Vec<_>>() {
            for _ in 0..starting_hand {
                state.draw_card(player)?;
            }
        }

        tracing::debug!(players = state.player_count(), "game built");
        Ok(state)
    }
}
