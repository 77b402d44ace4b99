//! Showdown lifecycle.
//!
//! A showdown begins at a contested, uncontrolled location. The contesting
//! player gains *focus*, the state kind flips to Showdown, and the chain
//! opens a response window. Resolving the showdown compares total might of
//! each side's occupants: the stronger side takes control (a Conquer), a
//! tie stands down with no controller.

use crate::cards::Catalog;
use crate::core::error::{EngineError, Result};
use crate::core::state::GameState;
use crate::core::turn::StateKind;

use super::control;
use super::location::LocationId;
use super::scoring;

/// Begin a staged showdown.
///
/// The location must carry the showdown staging flag from cleanup.
pub fn begin_showdown(state: &mut GameState, location: LocationId) -> Result<()> {
    let loc = state.location(location)?;
    if !loc.showdown_staged {
        return Err(EngineError::ChoiceNotLegal(format!(
            "no showdown staged at {location}"
        )));
    }
    let contester = loc.contested_by.ok_or(EngineError::ContestedLocation { location })?;

    state.location_mut(location)?.showdown_staged = false;
    state.turn.state_kind = StateKind::Showdown;
    state.turn.focus = Some(contester);
    state.turn.priority = contester;
    tracing::debug!(%location, %contester, "showdown begins");
    Ok(())
}

/// Resolve the active showdown at `location` by comparing side might.
///
/// The winning side's player takes control (scoring a Conquer if the
/// location is unscored for them this turn); a tie leaves the location
/// uncontrolled. Either way the contest clears and play returns to the
/// neutral state.
pub fn resolve_showdown(
    state: &mut GameState,
    catalog: &dyn Catalog,
    location: LocationId,
) -> Result<()> {
    if state.turn.state_kind != StateKind::Showdown {
        return Err(EngineError::ChoiceNotLegal(
            "no showdown in progress".to_string(),
        ));
    }

    let contester = state
        .location(location)?
        .contested_by
        .ok_or(EngineError::ContestedLocation { location })?;

    let sides = control::occupant_controllers(state, location)?;
    let mut best: Option<(crate::core::player::PlayerId, i64)> = None;
    let mut tied = false;
    for player in sides {
        let might = control::side_might(state, catalog, location, player)?;
        match best {
            None => best = Some((player, might)),
            Some((_, top)) if might > top => {
                best = Some((player, might));
                tied = false;
            }
            Some((_, top)) if might == top => tied = true,
            Some(_) => {}
        }
    }

    state.location_mut(location)?.clear_contest();
    state.turn.state_kind = StateKind::Neutral;
    state.turn.focus = None;
    state.turn.priority = state.turn.turn_holder;

    match best {
        Some((winner, might)) if !tied => {
            tracing::debug!(%location, %winner, might, contester = %contester, "showdown resolved");
            control::set_controller(state, location, Some(winner))?;
            if !state.players[winner].scored_this_turn.contains(&location) {
                scoring::award_conquer(state, catalog, winner, location)?;
            }
        }
        _ => {
            tracing::debug!(%location, "showdown resolved in a stand-off");
        }
    }
    Ok(())
}
