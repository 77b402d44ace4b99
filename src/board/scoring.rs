//! Location scoring.
//!
//! Two scoring methods exist: **Conquer** (gaining control) and **Hold**
//! (still controlling a location during the Beginning phase). Each location
//! can be scored at most once per turn per player.
//!
//! The final point is special: a Hold always reaches the winning score, but
//! a Conquer reaches it only for a player who has scored every location in
//! the game this turn. Otherwise the conquest draws a replacement card and
//! the location is still marked scored.

use serde::{Deserialize, Serialize};

use crate::cards::Catalog;
use crate::core::error::{EngineError, Result};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::triggers::{route, TriggerEvent};

use super::location::LocationId;

/// How a location was scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreMethod {
    /// Gained control of the location.
    Conquer,
    /// Maintained control through the Beginning phase.
    Hold,
}

/// Score a held location.
///
/// A Hold at the winning threshold always awards the point.
pub fn award_hold(
    state: &mut GameState,
    catalog: &dyn Catalog,
    player: PlayerId,
    location: LocationId,
) -> Result<()> {
    state.location(location)?;
    ensure_unscored(state, player, location)?;

    state.players[player].points += 1;
    mark_scored(state, player, location);
    tracing::debug!(%player, %location, points = state.players[player].points, "hold scored");

    route(
        state,
        catalog,
        &TriggerEvent::LocationScored {
            location,
            player,
            method: ScoreMethod::Hold,
        },
    )?;
    Ok(())
}

/// Score a conquered location.
///
/// A Conquer that would award the final point succeeds only if the player
/// has scored every location in the game this turn; otherwise the player
/// draws a card instead, and the location still counts as scored.
pub fn award_conquer(
    state: &mut GameState,
    catalog: &dyn Catalog,
    player: PlayerId,
    location: LocationId,
) -> Result<()> {
    state.location(location)?;
    ensure_unscored(state, player, location)?;

    let at_final_point = state.players[player].points + 1 >= state.config.win_threshold;
    let swept_all = at_final_point && {
        let scored = &state.players[player].scored_this_turn;
        state
            .location_ids()
            .all(|id| id == location || scored.contains(&id))
    };

    if at_final_point && !swept_all {
        state.draw_card(player)?;
        tracing::debug!(%player, %location, "final-point conquer deferred; card drawn");
    } else {
        state.players[player].points += 1;
        tracing::debug!(%player, %location, points = state.players[player].points, "conquer scored");
    }
    mark_scored(state, player, location);

    route(
        state,
        catalog,
        &TriggerEvent::LocationScored {
            location,
            player,
            method: ScoreMethod::Conquer,
        },
    )?;
    Ok(())
}

fn ensure_unscored(state: &GameState, player: PlayerId, location: LocationId) -> Result<()> {
    if state.players[player].scored_this_turn.contains(&location) {
        return Err(EngineError::AlreadyScored { location, player });
    }
    Ok(())
}

fn mark_scored(state: &mut GameState, player: PlayerId, location: LocationId) {
    state.players[player].scored_this_turn.insert(location);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardRegistry;
    use crate::core::config::GameConfig;
    use crate::core::rng::GameRng;

    fn state() -> GameState {
        GameState::new(GameConfig::new(2, 2), GameRng::seeded(1))
    }

    #[test]
    fn test_hold_awards_point_and_marks() {
        let mut state = state();
        let catalog = CardRegistry::new();
        let p0 = PlayerId::new(0);
        let loc = LocationId::new(0);

        award_hold(&mut state, &catalog, p0, loc).unwrap();

        assert_eq!(state.players[p0].points, 1);
        assert!(state.players[p0].scored_this_turn.contains(&loc));
    }

    #[test]
    fn test_double_scoring_rejected() {
        let mut state = state();
        let catalog = CardRegistry::new();
        let p0 = PlayerId::new(0);
        let loc = LocationId::new(0);

        award_hold(&mut state, &catalog, p0, loc).unwrap();
        let err = award_conquer(&mut state, &catalog, p0, loc).unwrap_err();

        assert_eq!(
            err,
            EngineError::AlreadyScored {
                location: loc,
                player: p0
            }
        );
    }

    #[test]
    fn test_hold_always_reaches_threshold() {
        let mut state = state();
        let catalog = CardRegistry::new();
        let p0 = PlayerId::new(0);
        state.players[p0].points = state.config.win_threshold - 1;

        award_hold(&mut state, &catalog, p0, LocationId::new(0)).unwrap();

        assert_eq!(state.players[p0].points, state.config.win_threshold);
    }

    #[test]
    fn test_final_conquer_without_sweep_draws_instead() {
        let mut state = state();
        let catalog = CardRegistry::new();
        let p0 = PlayerId::new(0);
        state.players[p0].points = state.config.win_threshold - 1;

        // Seed the deck so the replacement draw is observable.
        let id = state.alloc_object_id();
        state.add_to_deck(crate::core::object::ObjectInstance::new(
            id,
            crate::cards::CardId::new(1),
            p0,
        ));

        award_conquer(&mut state, &catalog, p0, LocationId::new(0)).unwrap();

        assert_eq!(state.players[p0].points, state.config.win_threshold - 1);
        assert_eq!(state.players[p0].hand.len(), 1);
        // No double-scoring: the location is still marked.
        assert!(state.players[p0].scored_this_turn.contains(&LocationId::new(0)));
    }

    #[test]
    fn test_final_conquer_with_full_sweep_scores() {
        let mut state = state();
        let catalog = CardRegistry::new();
        let p0 = PlayerId::new(0);
        state.players[p0].points = state.config.win_threshold - 1;
        state.players[p0].scored_this_turn.insert(LocationId::new(1));

        award_conquer(&mut state, &catalog, p0, LocationId::new(0)).unwrap();

        assert_eq!(state.players[p0].points, state.config.win_threshold);
    }

    #[test]
    fn test_non_final_conquer_scores_normally() {
        let mut state = state();
        let catalog = CardRegistry::new();
        let p0 = PlayerId::new(0);

        award_conquer(&mut state, &catalog, p0, LocationId::new(0)).unwrap();

        assert_eq!(state.players[p0].points, 1);
    }
}
