//! Turn phase sequencing.
//!
//! The cycle is fixed: Awaken → Beginning → Channel → Draw → Action →
//! Combat → Ending. Each phase's side-effecting hook runs exactly once per
//! visit. Ending is terminal: `advance_phase` refuses to leave it, and
//! `end_turn` runs the Ending hook before handing the next player their
//! Awaken.

use crate::board::scoring;
use crate::cards::Catalog;
use crate::core::error::{EngineError, Result};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::core::turn::{ChainMode, Phase, StateKind};
use crate::triggers::{route, TriggerEvent};

/// Advance to the next phase and run its hook.
///
/// Only the turn holder may advance, only from a quiet state (Neutral,
/// chain open, no combat), and never out of Ending.
pub fn advance_phase(state: &mut GameState, catalog: &dyn Catalog, player: PlayerId) -> Result<()> {
    ensure_quiet_turn(state, player)?;

    let next = state
        .turn
        .phase
        .next()
        .ok_or(EngineError::InvalidPhaseTransition(Phase::Ending))?;

    tracing::debug!(from = ?state.turn.phase, to = ?next, "phase advance");
    state.turn.phase = next;
    run_hook(state, catalog)
}

/// End the turn from the Ending phase.
///
/// Runs the Ending hook, fires the turn-end trigger, rotates the turn to
/// the next player, clears per-turn trackers, runs the new Awaken hook,
/// and fires the turn-start trigger.
pub fn end_turn(state: &mut GameState, catalog: &dyn Catalog, player: PlayerId) -> Result<()> {
    ensure_quiet_turn(state, player)?;

    if state.turn.phase != Phase::Ending {
        return Err(EngineError::WrongPhase {
            expected: Phase::Ending,
            actual: state.turn.phase,
        });
    }

    // The Ending hook runs here, not on phase entry.
    state.players[player].empty_pools();

    let ended_turn = state.turn.turn_number;
    route(
        state,
        catalog,
        &TriggerEvent::TurnEnded {
            player,
            turn: ended_turn,
        },
    )?;

    state.turn.advance_turn(state.player_count());
    for id in state.players.player_ids().collect::<Vec<_>>() {
        state.players[id].scored_this_turn.clear();
    }
    tracing::debug!(holder = %state.turn.turn_holder, turn = state.turn.turn_number, "turn begins");

    run_hook(state, catalog)?;

    let holder = state.turn.turn_holder;
    let turn = state.turn.turn_number;
    route(state, catalog, &TriggerEvent::TurnStarted { player: holder, turn })?;
    Ok(())
}

fn ensure_quiet_turn(state: &GameState, player: PlayerId) -> Result<()> {
    state.player(player)?;
    if player != state.turn.turn_holder {
        return Err(EngineError::NotTurnHolder(player));
    }
    if state.turn.state_kind != StateKind::Neutral
        || state.turn.chain_mode != ChainMode::Open
        || state.combat.is_some()
    {
        return Err(EngineError::ChoiceNotLegal(
            "phases cannot change while a contest or the chain is unresolved".to_string(),
        ));
    }
    Ok(())
}

/// Run the current phase's hook.
///
/// Ending has no entry hook; its effects belong to `end_turn`.
fn run_hook(state: &mut GameState, catalog: &dyn Catalog) -> Result<()> {
    let holder = state.turn.turn_holder;
    match state.turn.phase {
        Phase::Awaken => {
            let mut ids: Vec<_> = state
                .board_objects()
                .filter(|o| o.controller == holder)
                .map(|o| o.id)
                .collect();
            ids.sort();
            for id in ids {
                state.object_mut(id)?.ready_up();
            }
        }
        Phase::Beginning => {
            let held: Vec<_> = state
                .locations
                .iter()
                .filter(|loc| loc.controller == Some(holder))
                .map(|loc| loc.id)
                .filter(|id| !state.players[holder].scored_this_turn.contains(id))
                .collect();
            for location in held {
                scoring::award_hold(state, catalog, holder, location)?;
            }
        }
        Phase::Channel => {
            state.players[holder].energy += state.config.channel_energy;
            state.players[holder].command += state.config.channel_command;
        }
        Phase::Draw => {
            // Empty deck: the draw is a no-op, not an error.
            state.draw_card(holder)?;
        }
        Phase::Action | Phase::Combat | Phase::Ending => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::LocationId;
    use crate::cards::{CardDefinition, CardId, CardRegistry, Category};
    use crate::core::config::GameConfig;
    use crate::core::object::ObjectInstance;
    use crate::core::rng::GameRng;

    fn catalog() -> CardRegistry {
        let mut registry = CardRegistry::new();
        registry.register(
            CardDefinition::new(CardId::new(1), "Scout", Category::Unit).with_stats(2, 2),
        );
        registry
    }

    fn state() -> GameState {
        GameState::new(GameConfig::new(2, 3), GameRng::seeded(1))
    }

    fn advance_to(state: &mut GameState, catalog: &CardRegistry, phase: Phase) {
        while state.turn.phase != phase {
            advance_phase(state, catalog, state.turn.turn_holder).unwrap();
        }
    }

    #[test]
    fn test_only_turn_holder_advances() {
        let mut state = state();
        let catalog = catalog();

        let err = advance_phase(&mut state, &catalog, PlayerId::new(1)).unwrap_err();
        assert_eq!(err, EngineError::NotTurnHolder(PlayerId::new(1)));
    }

    #[test]
    fn test_cannot_advance_past_ending() {
        let mut state = state();
        let catalog = catalog();
        advance_to(&mut state, &catalog, Phase::Ending);

        let err = advance_phase(&mut state, &catalog, PlayerId::new(0)).unwrap_err();
        assert_eq!(err, EngineError::InvalidPhaseTransition(Phase::Ending));
    }

    #[test]
    fn test_channel_hook_adds_income() {
        let mut state = state();
        let catalog = catalog();

        advance_to(&mut state, &catalog, Phase::Channel);

        let p0 = &state.players[PlayerId::new(0)];
        assert_eq!(p0.energy, state.config.channel_energy);
        assert_eq!(p0.command, state.config.channel_command);
    }

    #[test]
    fn test_draw_hook_draws_one() {
        let mut state = state();
        let catalog = catalog();
        let id = state.alloc_object_id();
        state.add_to_deck(ObjectInstance::new(id, CardId::new(1), PlayerId::new(0)));

        advance_to(&mut state, &catalog, Phase::Draw);

        assert_eq!(state.players[PlayerId::new(0)].hand.len(), 1);
    }

    #[test]
    fn test_draw_hook_with_empty_deck_is_noop() {
        let mut state = state();
        let catalog = catalog();

        advance_to(&mut state, &catalog, Phase::Draw);

        assert_eq!(state.players[PlayerId::new(0)].hand.len(), 0);
    }

    #[test]
    fn test_beginning_hook_scores_holds() {
        let mut state = state();
        let catalog = catalog();
        state.location_mut(LocationId::new(0)).unwrap().controller = Some(PlayerId::new(0));
        state.location_mut(LocationId::new(2)).unwrap().controller = Some(PlayerId::new(1));

        advance_to(&mut state, &catalog, Phase::Beginning);

        // Only the turn holder's location scores.
        assert_eq!(state.players[PlayerId::new(0)].points, 1);
        assert_eq!(state.players[PlayerId::new(1)].points, 0);
    }

    #[test]
    fn test_awaken_hook_readies_holder_objects() {
        let mut state = state();
        let catalog = catalog();

        let id = state.alloc_object_id();
        state
            .objects
            .insert(id, ObjectInstance::new(id, CardId::new(1), PlayerId::new(1)));
        state.place_at_location(id, LocationId::new(0)).unwrap();
        state.object_mut(id).unwrap().ready = false;

        // Player 0's turn ends; player 1's Awaken hook readies their unit.
        advance_to(&mut state, &catalog, Phase::Ending);
        end_turn(&mut state, &catalog, PlayerId::new(0)).unwrap();

        assert!(state.object(id).unwrap().ready);
        assert_eq!(state.turn.turn_holder, PlayerId::new(1));
        assert_eq!(state.turn.turn_number, 2);
    }

    #[test]
    fn test_end_turn_requires_ending_phase() {
        let mut state = state();
        let catalog = catalog();

        let err = end_turn(&mut state, &catalog, PlayerId::new(0)).unwrap_err();
        assert_eq!(
            err,
            EngineError::WrongPhase {
                expected: Phase::Ending,
                actual: Phase::Awaken
            }
        );
    }

    #[test]
    fn test_end_turn_empties_pools_and_clears_trackers() {
        let mut state = state();
        let catalog = catalog();
        state.players[PlayerId::new(0)].scored_this_turn.insert(LocationId::new(1));

        advance_to(&mut state, &catalog, Phase::Ending);
        assert!(state.players[PlayerId::new(0)].energy > 0);

        end_turn(&mut state, &catalog, PlayerId::new(0)).unwrap();

        assert_eq!(state.players[PlayerId::new(0)].energy, 0);
        assert!(state.players[PlayerId::new(0)].scored_this_turn.is_empty());
    }
}
