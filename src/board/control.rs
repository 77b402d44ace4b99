//! Battlefield control tracking.
//!
//! All control and contest mutation flows through this module so the
//! contested invariant holds everywhere: a contested location's controller
//! cannot change until the contest resolves.

use crate::core::error::{EngineError, Result};
use crate::core::player::PlayerId;
use crate::core::state::GameState;

use super::location::LocationId;

/// Set a location's controller.
///
/// Fails with `ContestedLocation` while the location is contested.
/// Setting the controller it already has is a no-op.
pub fn set_controller(
    state: &mut GameState,
    location: LocationId,
    controller: Option<PlayerId>,
) -> Result<()> {
    let loc = state.location(location)?;
    if loc.contested {
        return Err(EngineError::ContestedLocation { location });
    }
    if loc.controller == controller {
        return Ok(());
    }
    state.location_mut(location)?.controller = controller;
    tracing::debug!(%location, ?controller, "control changed");
    Ok(())
}

/// Mark a location contested by `by`. Already-contested locations keep
/// their original contester.
pub fn mark_contested(state: &mut GameState, location: LocationId, by: PlayerId) -> Result<()> {
    let loc = state.location_mut(location)?;
    if !loc.contested {
        loc.contested = true;
        loc.contested_by = Some(by);
        tracing::debug!(%location, contester = %by, "location contested");
    }
    Ok(())
}

/// Mark contest if an object entering for `mover` challenges the location:
/// either another player controls it, or another player's objects occupy it.
pub fn mark_contest_on_entry(
    state: &mut GameState,
    location: LocationId,
    mover: PlayerId,
) -> Result<()> {
    let loc = state.location(location)?;
    if loc.contested {
        return Ok(());
    }

    let challenged = match loc.controller {
        Some(controller) if controller != mover => true,
        _ => occupant_controllers(state, location)?
            .iter()
            .any(|&p| p != mover),
    };

    if challenged {
        mark_contested(state, location, mover)?;
    }
    Ok(())
}

/// Distinct controllers with occupants at a location, ascending.
pub fn occupant_controllers(state: &GameState, location: LocationId) -> Result<Vec<PlayerId>> {
    let loc = state.location(location)?;
    let mut controllers: Vec<PlayerId> = Vec::new();
    for &id in &loc.occupants {
        let controller = state.object(id)?.controller;
        if !controllers.contains(&controller) {
            controllers.push(controller);
        }
    }
    controllers.sort_by_key(|p| p.index());
    Ok(controllers)
}

/// The single player whose objects occupy the location, if exactly one.
pub fn sole_occupier(state: &GameState, location: LocationId) -> Result<Option<PlayerId>> {
    let controllers = occupant_controllers(state, location)?;
    Ok(match controllers.as_slice() {
        [single] => Some(*single),
        _ => None,
    })
}

/// Total might of `player`'s occupants at a location.
pub fn side_might(
    state: &GameState,
    catalog: &dyn crate::cards::Catalog,
    location: LocationId,
    player: PlayerId,
) -> Result<i64> {
    let loc = state.location(location)?;
    let mut total = 0;
    for &id in &loc.occupants {
        let object = state.object(id)?;
        if object.controller == player {
            total += crate::cards::lookup(catalog, object.card)?.might;
        }
    }
    Ok(total)
}
