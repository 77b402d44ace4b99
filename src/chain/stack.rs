//! The chain: a LIFO stack with a four-step resolution protocol.
//!
//! 1. **Finalize** — pending items complete their being-played sub-protocol
//!    (target legality re-check). Finalization never passes priority.
//! 2. **Execute** — the priority holder may add a legally-timed item or
//!    pass. This is the engine's sole external suspension point; the rules
//!    layer surfaces the legal option set.
//! 3. **Pass** — a full cycle of consecutive passes proceeds to Resolve;
//!    any addition resets the count and takes priority.
//! 4. **Resolve** — the newest item pops and applies in full. An emptied
//!    chain reopens and hands priority back to the turn holder.
//!
//! Invariant: the chain mode on `TurnState` is Closed iff the chain is
//! non-empty; every mutation path here re-syncs it.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{lookup, Catalog, Category, Keyword};
use crate::core::error::{EngineError, Result};
use crate::core::object::{ObjectId, Placement};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::effects::{apply_effects, Effect, Target};
use crate::triggers::{route, TriggerEvent};

use super::item::{AbilityItem, ChainItem, ChainItemId, SpellItem};

/// The LIFO structure holding pending spells and abilities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStack {
    /// Items, bottom first.
    entries: Vector<ChainItem>,

    /// Consecutive passes since the last addition or resolution.
    consecutive_passes: usize,

    /// Next item ID.
    next_id: u32,
}

impl ChainStack {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items on the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the chain empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Peek at the top (newest) item.
    #[must_use]
    pub fn peek_top(&self) -> Option<&ChainItem> {
        self.entries.last()
    }

    /// Iterate bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &ChainItem> {
        self.entries.iter()
    }

    /// Any item still pending finalization?
    #[must_use]
    pub fn any_pending(&self) -> bool {
        self.entries.iter().any(ChainItem::is_pending)
    }

    /// Consecutive passes since the last addition or resolution.
    #[must_use]
    pub fn passes(&self) -> usize {
        self.consecutive_passes
    }

    fn alloc_id(&mut self) -> ChainItemId {
        let id = ChainItemId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn push(&mut self, item: ChainItem) {
        self.entries.push_back(item);
        self.consecutive_passes = 0;
    }

    fn pop(&mut self) -> Option<ChainItem> {
        let item = self.entries.pop_back();
        self.consecutive_passes = 0;
        item
    }

    fn note_pass(&mut self) -> usize {
        self.consecutive_passes += 1;
        self.consecutive_passes
    }
}

/// Push a played card onto the chain.
///
/// The item enters pending, the chain closes, and its controller takes
/// priority.
pub fn push_spell(
    state: &mut GameState,
    object: ObjectId,
    card: crate::cards::CardId,
    controller: PlayerId,
    targets: SmallVec<[Target; 2]>,
) -> ChainItemId {
    let id = state.chain.alloc_id();
    state.chain.push(ChainItem::Spell(SpellItem {
        id,
        object,
        card,
        controller,
        pending: true,
        targets,
    }));
    state.turn.priority = controller;
    state.sync_chain_mode();
    tracing::debug!(%id, %controller, "spell chained");
    id
}

/// Push an ability onto the chain.
pub fn push_ability(
    state: &mut GameState,
    source: ObjectId,
    controller: PlayerId,
    targets: SmallVec<[Target; 2]>,
    effects: Vec<Effect>,
    event: Option<TriggerEvent>,
    order: u32,
) -> ChainItemId {
    let id = state.chain.alloc_id();
    state.chain.push(ChainItem::Ability(AbilityItem {
        id,
        source,
        controller,
        pending: true,
        targets,
        effects,
        event,
        order,
    }));
    state.turn.priority = controller;
    state.sync_chain_mode();
    tracing::debug!(%id, %controller, "ability chained");
    id
}

/// The priority holder passes.
///
/// When every player has passed in sequence the top item resolves and
/// `true` is returned; otherwise priority moves to the next player in
/// turn order.
pub fn pass_priority(state: &mut GameState, catalog: &dyn Catalog, player: PlayerId) -> Result<bool> {
    if state.chain.is_empty() {
        return Err(EngineError::EmptyChainResolve);
    }
    if player != state.turn.priority {
        return Err(EngineError::NotPriorityHolder(player));
    }

    let passes = state.chain.note_pass();
    if passes >= state.player_count() {
        resolve_top(state, catalog)?;
        Ok(true)
    } else {
        state.turn.priority = player.next(state.player_count());
        Ok(false)
    }
}

/// Finalize every pending item (protocol step 1).
///
/// Target legality is re-checked: an item whose object targets have left
/// the board fizzles — it is removed, and a fizzled played card goes to
/// its owner's discard. Finalization does not pass priority.
///
/// Returns whether anything changed.
pub fn finalize_pending(state: &mut GameState, catalog: &dyn Catalog) -> Result<bool> {
    if !state.chain.any_pending() {
        return Ok(false);
    }

    let mut index = 0;
    while index < state.chain.entries.len() {
        let item = &state.chain.entries[index];
        if !item.is_pending() {
            index += 1;
            continue;
        }

        if targets_legal(state, item.targets())? {
            state.chain.entries[index].finalize();
            index += 1;
        } else {
            let item = state.chain.entries.remove(index);
            tracing::debug!(id = %item.id(), "chain item fizzled at finalize");
            if let ChainItem::Spell(spell) = item {
                state.move_to_discard(spell.object)?;
            }
        }
    }

    state.sync_chain_mode();
    if state.chain.is_empty() {
        state.turn.priority = state.turn.turn_holder;
    }
    Ok(true)
}

fn targets_legal(state: &GameState, targets: &[Target]) -> Result<bool> {
    for target in targets {
        match target {
            Target::Object(id) => match state.objects.get(id) {
                Some(object) if object.on_board() => {}
                _ => return Ok(false),
            },
            Target::Location(id) => {
                if state.location(*id).is_err() {
                    return Ok(false);
                }
            }
            Target::Player(id) => {
                if state.player(*id).is_err() {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

/// Resolve the top item (protocol step 4).
///
/// Pops the newest item and applies it in full. If the chain empties, it
/// reopens with priority back to the turn holder; otherwise priority goes
/// to the new top item's controller once no pending items remain.
pub fn resolve_top(state: &mut GameState, catalog: &dyn Catalog) -> Result<ChainItemId> {
    let item = state.chain.pop().ok_or(EngineError::EmptyChainResolve)?;
    let id = item.id();
    tracing::debug!(%id, "resolving chain item");

    match item {
        ChainItem::Spell(spell) => resolve_spell(state, catalog, spell)?,
        ChainItem::Ability(ability) => {
            apply_effects(
                state,
                catalog,
                ability.controller,
                &ability.targets,
                &ability.effects,
            )?;
        }
    }

    if state.chain.is_empty() {
        state.turn.priority = state.turn.turn_holder;
    } else if !state.chain.any_pending() {
        let top_controller = state.chain.peek_top().map(ChainItem::controller);
        if let Some(controller) = top_controller {
            state.turn.priority = controller;
        }
    }
    state.sync_chain_mode();
    Ok(id)
}

fn resolve_spell(state: &mut GameState, catalog: &dyn Catalog, spell: SpellItem) -> Result<()> {
    let def = lookup(catalog, spell.card)?.clone();

    match def.category {
        Category::Unit => {
            let Some(destination) = spell.targets.iter().find_map(|t| match t {
                Target::Location(loc) => Some(*loc),
                _ => None,
            }) else {
                state.move_to_discard(spell.object)?;
                return Ok(());
            };

            {
                let object = state.object_mut(spell.object)?;
                object.ready = def.has_keyword(Keyword::Swift);
            }
            state.place_at_location(spell.object, destination)?;
            crate::board::control::mark_contest_on_entry(state, destination, spell.controller)?;

            route(
                state,
                catalog,
                &TriggerEvent::ObjectPlayed {
                    object: spell.object,
                    controller: spell.controller,
                },
            )?;
            route(
                state,
                catalog,
                &TriggerEvent::EnteredBoard {
                    object: spell.object,
                    controller: spell.controller,
                    location: destination,
                },
            )?;
        }
        Category::Gear => {
            let host = spell.targets.iter().find_map(|t| match t {
                Target::Object(id) => Some(*id),
                _ => None,
            });
            let host_location = host
                .and_then(|id| state.objects.get(&id))
                .and_then(|object| object.location());

            let (Some(host), Some(location)) = (host, host_location) else {
                state.move_to_discard(spell.object)?;
                return Ok(());
            };

            {
                let object = state.object_mut(spell.object)?;
                object.attached_to = Some(host);
            }
            state.place_at_location(spell.object, location)?;

            route(
                state,
                catalog,
                &TriggerEvent::ObjectPlayed {
                    object: spell.object,
                    controller: spell.controller,
                },
            )?;
            route(
                state,
                catalog,
                &TriggerEvent::EnteredBoard {
                    object: spell.object,
                    controller: spell.controller,
                    location,
                },
            )?;
        }
        Category::Spell => {
            apply_effects(state, catalog, spell.controller, &spell.targets, &def.effects)?;
            state.move_to_discard(spell.object)?;

            route(
                state,
                catalog,
                &TriggerEvent::ObjectPlayed {
                    object: spell.object,
                    controller: spell.controller,
                },
            )?;
        }
    }
    Ok(())
}
