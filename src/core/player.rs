//! Player identification and per-player state.
//!
//! ## PlayerId
//!
//! Type-safe player identifier supporting 2-255 players.
//!
//! ## PlayerMap
//!
//! Per-player data storage backed by `Vec` for O(1) access, indexable by
//! `PlayerId`.
//!
//! ## PlayerState
//!
//! One player's zones, resource pools, score, and per-turn trackers.
//! Zone contents are `im` structures so cloning the whole state is cheap.

use im::{HashSet as ImHashSet, Vector};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::object::ObjectId;
use crate::board::LocationId;

/// Player identifier.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The next player in turn order, wrapping around.
    #[must_use]
    pub fn next(self, player_count: usize) -> Self {
        Self(((self.index() + 1) % player_count) as u8)
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// Iterate over all players starting from `self`, wrapping around.
    ///
    /// This is the canonical APNAP iteration order when `self` is the
    /// turn holder.
    pub fn turn_order(self, player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(move |offset| Self(((self.index() + offset) % player_count) as u8))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count >= 2, "Must have at least 2 players");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all player IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.data.len() as u8).map(PlayerId)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// One player's zones, pools, and trackers.
///
/// Hand, deck, and discard are ordered (deck top = end of the vector).
/// The board zone is an unordered set; positional information lives on
/// `LocationState` occupant sets instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Cards in hand, in draw order.
    pub hand: Vector<ObjectId>,

    /// Cards in the deck (top = end of vector).
    pub deck: Vector<ObjectId>,

    /// Discard pile, oldest first.
    pub discard: Vector<ObjectId>,

    /// Objects this player controls on the board.
    pub board: ImHashSet<ObjectId>,

    /// Energy pool (pays for cards). Emptied at turn end.
    pub energy: u32,

    /// Command pool (pays for activated abilities). Emptied at turn end.
    pub command: u32,

    /// Victory points.
    pub points: u32,

    /// Locations this player has scored this turn. Cleared at turn start.
    pub scored_this_turn: ImHashSet<LocationId>,
}

impl PlayerState {
    /// Remove a card from hand.
    ///
    /// Returns `true` if the card was present.
    pub fn remove_from_hand(&mut self, object: ObjectId) -> bool {
        if let Some(pos) = self.hand.iter().position(|&o| o == object) {
            self.hand.remove(pos);
            true
        } else {
            false
        }
    }

    /// Pop the top card of the deck, or `None` if empty.
    pub fn pop_deck(&mut self) -> Option<ObjectId> {
        self.deck.pop_back()
    }

    /// Empty both resource pools. Emptying empty pools is a no-op.
    pub fn empty_pools(&mut self) {
        self.energy = 0;
        self.command = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_next_wraps() {
        assert_eq!(PlayerId::new(0).next(2), PlayerId::new(1));
        assert_eq!(PlayerId::new(1).next(2), PlayerId::new(0));
        assert_eq!(PlayerId::new(3).next(4), PlayerId::new(0));
    }

    #[test]
    fn test_turn_order_from_middle() {
        let order: Vec<_> = PlayerId::new(2).turn_order(4).collect();
        assert_eq!(
            order,
            vec![
                PlayerId::new(2),
                PlayerId::new(3),
                PlayerId::new(0),
                PlayerId::new(1)
            ]
        );
    }

    #[test]
    fn test_player_map_basics() {
        let mut map: PlayerMap<i32> = PlayerMap::new(3, |p| p.index() as i32 * 10);

        assert_eq!(map.player_count(), 3);
        assert_eq!(map[PlayerId::new(1)], 10);

        map[PlayerId::new(1)] = 15;
        assert_eq!(map[PlayerId::new(1)], 15);
    }

    #[test]
    #[should_panic(expected = "Must have at least 2 players")]
    fn test_player_map_rejects_single_player() {
        let _: PlayerMap<i32> = PlayerMap::with_default(1);
    }

    #[test]
    fn test_remove_from_hand() {
        let mut player = PlayerState::default();
        player.hand.push_back(ObjectId(4));
        player.hand.push_back(ObjectId(5));

        assert!(player.remove_from_hand(ObjectId(4)));
        assert_eq!(player.hand, Vector::from(vec![ObjectId(5)]));
        assert!(!player.remove_from_hand(ObjectId(99)));
    }

    #[test]
    fn test_pop_deck_takes_top() {
        let mut player = PlayerState::default();
        player.deck.push_back(ObjectId(1));
        player.deck.push_back(ObjectId(2));

        assert_eq!(player.pop_deck(), Some(ObjectId(2)));
        assert_eq!(player.pop_deck(), Some(ObjectId(1)));
        assert_eq!(player.pop_deck(), None);
    }

    #[test]
    fn test_empty_pools_idempotent() {
        let mut player = PlayerState {
            energy: 3,
            command: 1,
            ..PlayerState::default()
        };

        player.empty_pools();
        assert_eq!(player.energy, 0);
        assert_eq!(player.command, 0);

        // Emptying again is a no-op, not an error.
        player.empty_pools();
        assert_eq!(player.energy, 0);
    }

    #[test]
    fn test_player_state_serialization() {
        let mut player = PlayerState::default();
        player.hand.push_back(ObjectId(3));
        player.points = 5;

        let json = serde_json::to_string(&player).unwrap();
        let deserialized: PlayerState = serde_json::from_str(&json).unwrap();
        assert_eq!(player, deserialized);
    }
}
