//! The cleanup pass: ten ordered correction steps, run to fixpoint.
//!
//! Cleanup runs after every state-changing event. Each pass executes the
//! ten steps exactly once, in order; if any step changed anything, the
//! whole pass repeats. The loop is bounded by the configured pass cap —
//! exceeding it is the fatal `CleanupDivergence` invariant failure, since
//! a non-converging pass means a rules-interaction bug, not a caller
//! mistake.
//!
//! Steps:
//!  1. win check
//!  2. destroy units with marked damage at or past toughness
//!  3. refresh combat designations
//!  4. reconcile control (clear empties, grant sole occupation)
//!  5. recall orphaned attachments and exposed hidden cards
//!  6. stage showdowns (contested, uncontrolled)
//!  7. stage combats (contested, controlled against the contester)
//!  8. finalize pending chain items
//!  9. begin a sole staged showdown in a Neutral/Open state
//! 10. begin a sole staged combat in a Neutral/Open state
//!
//! Steps 9 and 10 only auto-begin when exactly one candidate is staged;
//! several candidates converge instead, and the turn holder picks one
//! through the choice surface.

use crate::board::{control, scoring, showdown, LocationId};
use crate::cards::{lookup, Catalog, Category, Keyword};
use crate::chain;
use crate::combat;
use crate::core::error::{EngineError, Result};
use crate::core::object::ObjectId;
use crate::core::state::{GameResult, GameState};
use crate::core::turn::{ChainMode, StateKind};
use crate::effects;
use crate::triggers::{route, TriggerEvent};

/// Outcome of a converged cleanup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanupReport {
    /// Passes executed, including the final no-change pass.
    pub passes: u32,

    /// Whether any pass changed the state.
    pub changed: bool,
}

/// Run the correction pass to fixpoint.
pub fn run(state: &mut GameState, catalog: &dyn Catalog) -> Result<CleanupReport> {
    let cap = state.config.max_cleanup_passes;
    let mut any_change = false;

    for pass in 1..=cap {
        let mut changed = false;
        changed |= check_win(state)?;
        changed |= destroy_lethal(state, catalog)?;
        changed |= combat::refresh_designations(state, catalog)?;
        changed |= reconcile_control(state, catalog)?;
        changed |= recall_strays(state, catalog)?;
        changed |= stage_showdowns(state)?;
        changed |= stage_combats(state)?;
        changed |= chain::finalize_pending(state, catalog)?;
        changed |= begin_staged_showdown(state)?;
        changed |= begin_staged_combat(state, catalog)?;

        tracing::trace!(pass, changed, "cleanup pass complete");

        if !changed {
            return Ok(CleanupReport {
                passes: pass,
                changed: any_change,
            });
        }
        any_change = true;
    }

    tracing::error!(passes = cap, "cleanup failed to converge");
    Err(EngineError::CleanupDivergence { passes: cap })
}

/// Step 1: first player at the winning threshold, in turn order from the
/// turn holder, wins.
fn check_win(state: &mut GameState) -> Result<bool> {
    if state.result.is_some() {
        return Ok(false);
    }
    for player in state.turn.turn_holder.turn_order(state.player_count()) {
        if state.players[player].points >= state.config.win_threshold {
            state.result = Some(GameResult::Winner(player));
            tracing::debug!(%player, "win condition met");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Step 2: units whose marked damage reaches toughness are destroyed.
///
/// Destruction runs before the same pass's combat reassignment, so a dead
/// unit never survives into a refreshed designation set.
fn destroy_lethal(state: &mut GameState, catalog: &dyn Catalog) -> Result<bool> {
    let mut doomed: Vec<ObjectId> = Vec::new();
    for object in state.board_objects() {
        let def = lookup(catalog, object.card)?;
        if def.category == Category::Unit && object.damage >= def.toughness {
            doomed.push(object.id);
        }
    }
    doomed.sort();

    for id in &doomed {
        effects::destroy_object(state, catalog, *id)?;
    }
    Ok(!doomed.is_empty())
}

/// Step 4: clear control of occupant-less uncontested locations, and grant
/// control where exactly one player occupies an uncontested location.
/// Control gains score a Conquer unless already scored this turn.
fn reconcile_control(state: &mut GameState, catalog: &dyn Catalog) -> Result<bool> {
    let mut changed = false;

    let ids: Vec<LocationId> = state.location_ids().collect();
    for id in ids {
        let loc = state.location(id)?;
        if loc.contested {
            continue;
        }

        if loc.occupants.is_empty() {
            if loc.controller.is_some() {
                control::set_controller(state, id, None)?;
                changed = true;
            }
            continue;
        }

        let sole = control::sole_occupier(state, id)?;
        if let Some(player) = sole {
            if state.location(id)?.controller != Some(player) {
                control::set_controller(state, id, Some(player))?;
                changed = true;
                if !state.players[player].scored_this_turn.contains(&id) {
                    scoring::award_conquer(state, catalog, player, id)?;
                }
            }
        }
    }
    Ok(changed)
}

/// Step 5: recall what no longer belongs.
///
/// Gear whose host left the board is spent to its owner's discard; Hidden
/// cards at a location another player controls return to hand.
fn recall_strays(state: &mut GameState, catalog: &dyn Catalog) -> Result<bool> {
    let mut orphaned: Vec<ObjectId> = Vec::new();
    let mut exposed: Vec<ObjectId> = Vec::new();

    for object in state.board_objects() {
        if let Some(host) = object.attached_to {
            let host_alive = state
                .objects
                .get(&host)
                .is_some_and(|h| h.location() == object.location());
            if !host_alive {
                orphaned.push(object.id);
                continue;
            }
        }

        let def = lookup(catalog, object.card)?;
        if def.has_keyword(Keyword::Hidden) {
            if let Some(location) = object.location() {
                let controller = state.location(location)?.controller;
                if matches!(controller, Some(p) if p != object.owner) {
                    exposed.push(object.id);
                }
            }
        }
    }
    orphaned.sort();
    exposed.sort();

    for id in &orphaned {
        if let Some(location) = state.object(*id)?.location() {
            let controller = state.object(*id)?.controller;
            state.remove_from_board(*id, crate::core::object::Placement::Discard)?;
            route(
                state,
                catalog,
                &TriggerEvent::LeftBoard {
                    object: *id,
                    controller,
                    location,
                },
            )?;
        }
    }
    for id in &exposed {
        effects::recall_object(state, catalog, *id)?;
    }

    Ok(!orphaned.is_empty() || !exposed.is_empty())
}

/// Step 6: stage a showdown at each contested, uncontrolled location.
///
/// Nothing stages while a showdown is already in progress; the flag for a
/// begun showdown was consumed by step 9 and must not be re-raised.
fn stage_showdowns(state: &mut GameState) -> Result<bool> {
    let mut changed = false;
    let in_showdown = state.turn.state_kind == StateKind::Showdown;
    let ids: Vec<LocationId> = state.location_ids().collect();
    for id in ids {
        let loc = state.location(id)?;
        let should = !in_showdown && loc.contested && loc.controller.is_none();
        if loc.showdown_staged != should {
            state.location_mut(id)?.showdown_staged = should;
            changed = true;
        }
    }
    Ok(changed)
}

/// Step 7: stage combat at each contested location controlled by a player
/// other than the contester, with occupants from both sides. Nothing
/// stages while a combat is already active.
fn stage_combats(state: &mut GameState) -> Result<bool> {
    let mut changed = false;
    let in_combat = state.combat.is_some();
    let ids: Vec<LocationId> = state.location_ids().collect();
    for id in ids {
        let loc = state.location(id)?;
        let should = !in_combat
            && loc.contested
            && matches!(
                (loc.controller, loc.contested_by),
                (Some(defender), Some(attacker)) if defender != attacker
            )
            && control::occupant_controllers(state, id)?.len() >= 2;
        if state.location(id)?.combat_staged != should {
            state.location_mut(id)?.combat_staged = should;
            changed = true;
        }
    }
    Ok(changed)
}

/// Is the state quiet enough for steps 9/10 to initiate a contest?
fn quiet_neutral(state: &GameState) -> bool {
    state.result.is_none()
        && state.turn.state_kind == StateKind::Neutral
        && state.turn.chain_mode == ChainMode::Open
        && state.combat.is_none()
}

/// Step 9: a sole staged showdown begins; several wait for the turn
/// holder's pick.
fn begin_staged_showdown(state: &mut GameState) -> Result<bool> {
    if !quiet_neutral(state) {
        return Ok(false);
    }
    let staged: Vec<LocationId> = state
        .locations
        .iter()
        .filter(|loc| loc.showdown_staged)
        .map(|loc| loc.id)
        .collect();

    if let [only] = staged.as_slice() {
        showdown::begin_showdown(state, *only)?;
        return Ok(true);
    }
    Ok(false)
}

/// Step 10: symmetric to step 9, for staged combats.
fn begin_staged_combat(state: &mut GameState, catalog: &dyn Catalog) -> Result<bool> {
    if !quiet_neutral(state) {
        return Ok(false);
    }
    let staged: Vec<LocationId> = state
        .locations
        .iter()
        .filter(|loc| loc.combat_staged)
        .map(|loc| loc.id)
        .collect();

    if let [only] = staged.as_slice() {
        combat::begin_combat(state, catalog, *only)?;
        return Ok(true);
    }
    Ok(false)
}
