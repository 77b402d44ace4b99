//! Effect resolution.
//!
//! Applies an effect list against a state on behalf of a controller.
//! Object targets that have since left the board simply fizzle for that
//! effect; the chain item as a whole still resolves.

use crate::cards::Catalog;
use crate::core::error::Result;
use crate::core::object::{ObjectId, Placement};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::triggers::{route, TriggerEvent};

use super::effect::{Effect, Target};

/// Apply an effect list.
///
/// Object-targeted effects apply to every `Target::Object` in `targets`
/// that still resolves to a live object; player-centric effects apply to
/// the controller.
pub fn apply_effects(
    state: &mut GameState,
    catalog: &dyn Catalog,
    controller: PlayerId,
    targets: &[Target],
    effects: &[Effect],
) -> Result<()> {
    for effect in effects {
        apply_effect(state, catalog, controller, targets, effect)?;
    }
    Ok(())
}

fn apply_effect(
    state: &mut GameState,
    catalog: &dyn Catalog,
    controller: PlayerId,
    targets: &[Target],
    effect: &Effect,
) -> Result<()> {
    match effect {
        Effect::Damage { amount } => {
            for id in object_targets(targets) {
                if let Ok(object) = state.object_mut(id) {
                    if object.on_board() {
                        object.damage += amount;
                    }
                }
            }
        }
        Effect::Draw { count } => {
            for _ in 0..*count {
                state.draw_card(controller)?;
            }
        }
        Effect::GainEnergy { amount } => {
            state.player(controller)?;
            state.players[controller].energy += amount;
        }
        Effect::GainCommand { amount } => {
            state.player(controller)?;
            state.players[controller].command += amount;
        }
        Effect::Destroy => {
            for id in object_targets(targets) {
                destroy_object(state, catalog, id)?;
            }
        }
        Effect::Recall => {
            for id in object_targets(targets) {
                recall_object(state, catalog, id)?;
            }
        }
        Effect::Ready => {
            for id in object_targets(targets) {
                if let Ok(object) = state.object_mut(id) {
                    object.ready_up();
                }
            }
        }
    }
    Ok(())
}

fn object_targets(targets: &[Target]) -> impl Iterator<Item = ObjectId> + '_ {
    targets.iter().filter_map(|t| match t {
        Target::Object(id) => Some(*id),
        _ => None,
    })
}

/// Destroy a board object: move it to its owner's discard and fire the
/// death trigger. Off-board objects fizzle silently.
pub fn destroy_object(state: &mut GameState, catalog: &dyn Catalog, id: ObjectId) -> Result<()> {
    let Ok(object) = state.object(id) else {
        return Ok(());
    };
    if !object.on_board() {
        return Ok(());
    }
    let controller = object.controller;

    let location = state.remove_from_board(id, Placement::Discard)?;
    route(
        state,
        catalog,
        &TriggerEvent::ObjectDied {
            object: id,
            controller,
            location,
        },
    )?;
    Ok(())
}

/// Return a board object to its owner's hand, firing the departure trigger.
pub fn recall_object(state: &mut GameState, catalog: &dyn Catalog, id: ObjectId) -> Result<()> {
    let Ok(object) = state.object(id) else {
        return Ok(());
    };
    if !object.on_board() {
        return Ok(());
    }
    let controller = object.controller;

    if let Some(location) = state.remove_from_board(id, Placement::Hand)? {
        route(
            state,
            catalog,
            &TriggerEvent::LeftBoard {
                object: id,
                controller,
                location,
            },
        )?;
    }
    Ok(())
}
