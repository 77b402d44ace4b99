//! Combat: designation, damage assignment, and the Tank ordering rule.
//!
//! Combat begins at a contested location the defender controls. The
//! contesting player is designated attacker and gains focus; occupant
//! units form the attacker and defender sets.
//!
//! Damage assignment is validated per attacker: defenders carrying the
//! Tank keyword must collectively absorb their remaining lethal thresholds
//! before any of that attacker's damage reaches a non-Tank defender.
//! Excess beyond lethal stays on the assigned defender — it is never
//! discarded.

use im::{HashMap as ImHashMap, HashSet as ImHashSet};
use serde::{Deserialize, Serialize};

use crate::board::LocationId;
use crate::cards::{lookup, Catalog, Category, Keyword};
use crate::core::error::{EngineError, Result};
use crate::core::object::ObjectId;
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::triggers::{route, TriggerEvent};

/// One attacker-to-defender damage assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageAssignment {
    pub attacker: ObjectId,
    pub defender: ObjectId,
    pub amount: i64,
}

/// State of an active combat.
///
/// Created when cleanup initiates combat; cleared when damage fully
/// applies or a side empties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// Where the combat is happening.
    pub location: LocationId,

    /// The contesting player.
    pub attacker: PlayerId,

    /// The controlling player.
    pub defender: PlayerId,

    /// Attacking units.
    pub attackers: ImHashSet<ObjectId>,

    /// Defending units.
    pub defenders: ImHashSet<ObjectId>,

    /// Applied damage map: attacker → defender → amount.
    pub assignments: ImHashMap<ObjectId, ImHashMap<ObjectId, i64>>,
}

/// Begin a staged combat.
///
/// Designates the contesting player attacker (granting focus) and the
/// controller defender, gathers both unit sets, and fires the declaration
/// triggers.
pub fn begin_combat(state: &mut GameState, catalog: &dyn Catalog, location: LocationId) -> Result<()> {
    let loc = state.location(location)?;
    if !loc.combat_staged {
        return Err(EngineError::ChoiceNotLegal(format!(
            "no combat staged at {location}"
        )));
    }
    let attacker = loc.contested_by.ok_or(EngineError::ContestedLocation { location })?;
    let defender = loc.controller.ok_or(EngineError::ContestedLocation { location })?;

    let attackers = side_units(state, catalog, location, attacker)?;
    let defenders = side_units(state, catalog, location, defender)?;

    state.location_mut(location)?.combat_staged = false;
    state.combat = Some(CombatState {
        location,
        attacker,
        defender,
        attackers,
        defenders,
        assignments: ImHashMap::new(),
    });
    state.turn.focus = Some(attacker);
    state.turn.priority = attacker;
    tracing::debug!(%location, %attacker, %defender, "combat begins");

    route(
        state,
        catalog,
        &TriggerEvent::AttackDeclared {
            location,
            attacker,
            defender,
        },
    )?;
    route(
        state,
        catalog,
        &TriggerEvent::DefendDeclared {
            location,
            attacker,
            defender,
        },
    )?;
    Ok(())
}

/// Units a player controls at a location.
fn side_units(
    state: &GameState,
    catalog: &dyn Catalog,
    location: LocationId,
    player: PlayerId,
) -> Result<ImHashSet<ObjectId>> {
    let loc = state.location(location)?;
    let mut units = ImHashSet::new();
    for &id in &loc.occupants {
        let object = state.object(id)?;
        if object.controller == player && lookup(catalog, object.card)?.category == Category::Unit {
            units.insert(id);
        }
    }
    Ok(units)
}

/// Validate a damage assignment set against the active combat.
///
/// Checks membership, positive amounts, per-attacker might budgets, and
/// the Tank ordering rule.
pub fn validate_assignments(
    state: &GameState,
    catalog: &dyn Catalog,
    assignments: &[DamageAssignment],
) -> Result<()> {
    let combat = state
        .combat
        .as_ref()
        .ok_or_else(|| EngineError::ChoiceNotLegal("no combat in progress".to_string()))?;

    let mut per_attacker: Vec<(ObjectId, i64)> = Vec::new();
    let mut planned: ImHashMap<ObjectId, i64> = ImHashMap::new();

    for assignment in assignments {
        if !combat.attackers.contains(&assignment.attacker) {
            return Err(EngineError::IllegalAssignment(format!(
                "{} is not an attacker",
                assignment.attacker
            )));
        }
        if !combat.defenders.contains(&assignment.defender) {
            return Err(EngineError::IllegalAssignment(format!(
                "{} is not a defender",
                assignment.defender
            )));
        }
        if assignment.amount <= 0 {
            return Err(EngineError::IllegalAssignment(
                "amounts must be positive".to_string(),
            ));
        }

        match per_attacker.iter_mut().find(|(a, _)| *a == assignment.attacker) {
            Some((_, total)) => *total += assignment.amount,
            None => per_attacker.push((assignment.attacker, assignment.amount)),
        }
        *planned.entry(assignment.defender).or_insert(0) += assignment.amount;
    }

    for (attacker, total) in &per_attacker {
        let might = lookup(catalog, state.object(*attacker)?.card)?.might;
        if *total > might {
            return Err(EngineError::IllegalAssignment(format!(
                "{attacker} assigns {total} but has might {might}"
            )));
        }
    }

    // Tank rule: an attacker that sends any damage past the Tanks must see
    // every live Tank's remaining threshold covered by the overall plan.
    for (attacker, _) in &per_attacker {
        let hits_non_tank = assignments.iter().any(|a| {
            a.attacker == *attacker
                && a.amount > 0
                && !is_live_tank(state, catalog, a.defender).unwrap_or(false)
        });
        if !hits_non_tank {
            continue;
        }

        for &defender in &combat.defenders {
            if !is_live_tank(state, catalog, defender)? {
                continue;
            }
            let remaining = remaining_threshold(state, catalog, defender)?;
            let covered = planned.get(&defender).copied().unwrap_or(0);
            if covered < remaining {
                return Err(EngineError::IllegalAssignment(format!(
                    "tank {defender} must absorb {remaining} before others are damaged"
                )));
            }
        }
    }

    Ok(())
}

fn is_live_tank(state: &GameState, catalog: &dyn Catalog, id: ObjectId) -> Result<bool> {
    let object = state.object(id)?;
    let def = lookup(catalog, object.card)?;
    Ok(def.has_keyword(Keyword::Tank) && object.damage < def.toughness)
}

fn remaining_threshold(state: &GameState, catalog: &dyn Catalog, id: ObjectId) -> Result<i64> {
    let object = state.object(id)?;
    let def = lookup(catalog, object.card)?;
    Ok((def.toughness - object.damage).max(0))
}

/// The canonical assignment: every attacker commits full might, Tanks
/// saturated first, remainder onto the last defender touched.
pub fn default_assignments(
    state: &GameState,
    catalog: &dyn Catalog,
) -> Result<Vec<DamageAssignment>> {
    let combat = state
        .combat
        .as_ref()
        .ok_or_else(|| EngineError::ChoiceNotLegal("no combat in progress".to_string()))?;

    let mut attackers: Vec<ObjectId> = combat.attackers.iter().copied().collect();
    attackers.sort();
    let mut defenders: Vec<ObjectId> = combat.defenders.iter().copied().collect();
    defenders.sort();

    let mut planned: ImHashMap<ObjectId, i64> = ImHashMap::new();
    let mut assignments = Vec::new();

    for attacker in attackers {
        let mut budget = lookup(catalog, state.object(attacker)?.card)?.might;
        if budget <= 0 || defenders.is_empty() {
            continue;
        }

        let mut tanks: Vec<ObjectId> = Vec::new();
        let mut others: Vec<ObjectId> = Vec::new();
        for &defender in &defenders {
            if is_live_tank(state, catalog, defender)? {
                tanks.push(defender);
            } else {
                others.push(defender);
            }
        }

        let mut last_touched = None;
        for defender in tanks.iter().chain(others.iter()) {
            if budget <= 0 {
                break;
            }
            let already = planned.get(defender).copied().unwrap_or(0);
            let need = (remaining_threshold(state, catalog, *defender)? - already).max(0);
            let amount = need.min(budget);
            if amount > 0 {
                assignments.push(DamageAssignment {
                    attacker,
                    defender: *defender,
                    amount,
                });
                *planned.entry(*defender).or_insert(0) += amount;
                budget -= amount;
                last_touched = Some(*defender);
            }
        }

        // Excess past lethal is not discarded: it lands on the last
        // defender touched, or the first defender if none needed damage.
        if budget > 0 {
            let dump = last_touched.or_else(|| defenders.first().copied());
            if let Some(defender) = dump {
                assignments.push(DamageAssignment {
                    attacker,
                    defender,
                    amount: budget,
                });
                *planned.entry(defender).or_insert(0) += budget;
            }
        }
    }

    Ok(assignments)
}

/// Apply a validated assignment set: mark damage and end the combat.
///
/// Lethal removal, control re-evaluation, and conquest scoring all happen
/// in the cleanup pass that follows.
pub fn apply_assignments(
    state: &mut GameState,
    catalog: &dyn Catalog,
    assignments: &[DamageAssignment],
) -> Result<()> {
    validate_assignments(state, catalog, assignments)?;

    let location = state
        .combat
        .as_ref()
        .map(|combat| combat.location)
        .ok_or_else(|| EngineError::ChoiceNotLegal("no combat in progress".to_string()))?;

    for assignment in assignments {
        state.object_mut(assignment.defender)?.damage += assignment.amount;
        if let Some(combat) = state.combat.as_mut() {
            let mut per_attacker = combat
                .assignments
                .get(&assignment.attacker)
                .cloned()
                .unwrap_or_default();
            *per_attacker.entry(assignment.defender).or_insert(0) += assignment.amount;
            combat.assignments.insert(assignment.attacker, per_attacker);
        }
    }

    tracing::debug!(%location, count = assignments.len(), "combat damage applied");

    // Combat fully resolves: the contest clears with it.
    state.combat = None;
    state.location_mut(location)?.clear_contest();
    state.turn.focus = None;
    state.turn.priority = state.turn.turn_holder;
    Ok(())
}

/// Re-derive attacker/defender sets during active combat (cleanup step).
///
/// Units that died or left the location drop out; a combat whose side
/// empties ends, clearing the contest so control can be re-evaluated.
///
/// Returns whether anything changed.
pub fn refresh_designations(state: &mut GameState, catalog: &dyn Catalog) -> Result<bool> {
    let Some(combat) = state.combat.clone() else {
        return Ok(false);
    };

    let attackers = side_units(state, catalog, combat.location, combat.attacker)?;
    let defenders = side_units(state, catalog, combat.location, combat.defender)?;

    if attackers.is_empty() || defenders.is_empty() {
        tracing::debug!(location = %combat.location, "combat ends: a side is empty");
        state.combat = None;
        state.location_mut(combat.location)?.clear_contest();
        state.turn.focus = None;
        return Ok(true);
    }

    if attackers != combat.attackers || defenders != combat.defenders {
        if let Some(active) = state.combat.as_mut() {
            active.attackers = attackers;
            active.defenders = defenders;
        }
        return Ok(true);
    }

    Ok(false)
}
