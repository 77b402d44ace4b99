//! Trigger routing.
//!
//! When an event fires, every live board object's ability list is scanned
//! for triggered abilities matching the event kind whose filter accepts the
//! payload. Matches become chain items in APNAP order: the turn holder's
//! first (in discovery order), then each other player's in turn order.
//!
//! Routing an event that matches nothing is a successful no-op.

use smallvec::SmallVec;

use crate::cards::{lookup, AbilityKind, Catalog};
use crate::chain;
use crate::core::error::Result;
use crate::core::object::ObjectId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::effects::{Effect, Target};

use super::event::TriggerEvent;

/// An ephemeral record of a matched trigger, before chain placement.
#[derive(Clone, Debug)]
pub struct TriggeredAbility {
    /// The object whose ability matched.
    pub source: ObjectId,

    /// Who controls the ability.
    pub controller: PlayerId,

    /// Index into the source's ability list.
    pub ability: usize,

    /// Effects the ability will apply.
    pub effects: Vec<Effect>,

    /// Discovery order, for stable sorting within a controller's batch.
    pub order: u32,
}

/// Scan for matching triggered abilities and append them to the chain.
///
/// Returns the number of chain items added.
pub fn route(state: &mut GameState, catalog: &dyn Catalog, event: &TriggerEvent) -> Result<usize> {
    let matches = scan(state, catalog, event)?;
    if matches.is_empty() {
        return Ok(0);
    }

    let count = matches.len();
    tracing::debug!(kind = ?event.kind(), count, "triggers matched");

    // APNAP: the turn holder's batch first, then each other player in
    // turn order. Within a batch, discovery order stands.
    let players: Vec<PlayerId> = state
        .turn
        .turn_holder
        .turn_order(state.player_count())
        .collect();

    for player in players {
        let batch: Vec<TriggeredAbility> = matches
            .iter()
            .filter(|t| t.controller == player)
            .cloned()
            .collect();

        for triggered in batch {
            let targets = implicit_targets(event, &triggered.effects);
            chain::push_ability(
                state,
                triggered.source,
                triggered.controller,
                targets,
                triggered.effects,
                Some(event.clone()),
                triggered.order,
            );
        }
    }

    Ok(count)
}

/// Find all matching triggered abilities, in (ObjectId, ability index)
/// discovery order.
pub fn scan(
    state: &GameState,
    catalog: &dyn Catalog,
    event: &TriggerEvent,
) -> Result<Vec<TriggeredAbility>> {
    let mut ids: Vec<ObjectId> = state.board_objects().map(|o| o.id).collect();
    ids.sort();

    let mut matches = Vec::new();
    let mut order = 0u32;

    for id in ids {
        let object = state.object(id)?;
        let def = lookup(catalog, object.card)?;

        for (index, ability) in def.abilities.iter().enumerate() {
            let AbilityKind::Triggered { on, filter } = &ability.kind else {
                continue;
            };
            if *on != event.kind() {
                continue;
            }
            if !filter.matches(state, id, object.controller, event) {
                continue;
            }

            matches.push(TriggeredAbility {
                source: id,
                controller: object.controller,
                ability: index,
                effects: ability.effects.clone(),
                order,
            });
            order += 1;
        }
    }

    Ok(matches)
}

/// Object-targeted trigger effects implicitly target the event's object.
fn implicit_targets(event: &TriggerEvent, effects: &[Effect]) -> SmallVec<[Target; 2]> {
    let mut targets = SmallVec::new();
    if crate::effects::any_needs_object_target(effects) {
        if let Some(object) = event.object() {
            targets.push(Target::Object(object));
        }
    }
    targets
}
