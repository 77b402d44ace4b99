//! Chain protocol integration tests.
//!
//! These exercise the four-step protocol — Finalize, Execute, Pass,
//! Resolve — and the laws the chain must obey: strict LIFO resolution and
//! APNAP ordering of simultaneous triggers.

use proptest::prelude::*;
use smallvec::smallvec;
use std::sync::Arc;

use warfront::chain;
use warfront::{
    AbilityDef, CardDefinition, CardId, CardRegistry, Category, ChainMode, Effect, Engine,
    EngineError, GameConfig, GameRng, GameState, LocationId, ObjectId, ObjectInstance, Placement,
    PlayerId, ResourceCost, Target, TriggerEvent, TriggerFilter, TriggerKind,
};

fn catalog() -> CardRegistry {
    let mut registry = CardRegistry::new();
    registry.register(
        CardDefinition::new(CardId::new(1), "Scout", Category::Unit)
            .with_cost(ResourceCost::energy(1))
            .with_stats(2, 2),
    );
    registry.register(
        CardDefinition::new(CardId::new(2), "Bolt", Category::Spell)
            .with_cost(ResourceCost::energy(1))
            .with_effect(Effect::damage(3)),
    );
    registry.register(
        CardDefinition::new(CardId::new(3), "Surge", Category::Spell)
            .with_effect(Effect::gain_energy(1)),
    );
    registry.register(
        CardDefinition::new(CardId::new(4), "Watcher", Category::Unit)
            .with_stats(1, 3)
            .with_ability(AbilityDef::triggered(
                "On any death",
                TriggerKind::ObjectDied,
                TriggerFilter::Always,
                vec![Effect::draw(1)],
            )),
    );
    registry
}

fn state_with_players(players: usize) -> GameState {
    GameState::new(GameConfig::new(players, 2), GameRng::seeded(42))
}

/// Create a card object already lifted onto the chain.
fn chained_card(state: &mut GameState, card: CardId, owner: PlayerId) -> ObjectId {
    let id = state.alloc_object_id();
    let mut object = ObjectInstance::new(id, card, owner);
    object.placement = Placement::Chain;
    state.objects.insert(id, object);
    id
}

fn board_unit(state: &mut GameState, card: CardId, owner: PlayerId, loc: LocationId) -> ObjectId {
    let id = state.alloc_object_id();
    state.objects.insert(id, ObjectInstance::new(id, card, owner));
    state.place_at_location(id, loc).unwrap();
    id
}

// =============================================================================
// LIFO law
// =============================================================================

proptest! {
    /// For any sequence of N items added, resolving without additions pops
    /// them in exactly reverse order.
    #[test]
    fn chain_lifo_law(n in 1usize..12) {
        let catalog = catalog();
        let mut state = state_with_players(2);

        let mut pushed = Vec::new();
        for _ in 0..n {
            let object = chained_card(&mut state, CardId::new(3), PlayerId::new(0));
            let id = chain::push_spell(&mut state, object, CardId::new(3), PlayerId::new(0), smallvec![]);
            pushed.push(id);
        }
        chain::finalize_pending(&mut state, &catalog).unwrap();

        let mut resolved = Vec::new();
        while !state.chain.is_empty() {
            resolved.push(chain::resolve_top(&mut state, &catalog).unwrap());
        }

        pushed.reverse();
        prop_assert_eq!(resolved, pushed);
    }
}

// =============================================================================
// Protocol steps
// =============================================================================

#[test]
fn test_push_closes_and_resolution_reopens() {
    let catalog = catalog();
    let mut state = state_with_players(2);

    let object = chained_card(&mut state, CardId::new(3), PlayerId::new(1));
    chain::push_spell(&mut state, object, CardId::new(3), PlayerId::new(1), smallvec![]);

    assert_eq!(state.turn.chain_mode, ChainMode::Closed);
    assert_eq!(state.turn.priority, PlayerId::new(1));

    chain::finalize_pending(&mut state, &catalog).unwrap();
    chain::resolve_top(&mut state, &catalog).unwrap();

    assert_eq!(state.turn.chain_mode, ChainMode::Open);
    assert_eq!(state.turn.priority, state.turn.turn_holder);
    // Surge resolved for its controller.
    assert_eq!(state.players[PlayerId::new(1)].energy, 1);
    assert_eq!(state.object(object).unwrap().placement, Placement::Discard);
}

#[test]
fn test_priority_wraps_through_all_players() {
    let catalog = catalog();
    let mut state = state_with_players(3);

    let object = chained_card(&mut state, CardId::new(3), PlayerId::new(1));
    chain::push_spell(&mut state, object, CardId::new(3), PlayerId::new(1), smallvec![]);
    chain::finalize_pending(&mut state, &catalog).unwrap();

    // Priority walks 1 -> 2 -> 0; the third consecutive pass resolves.
    assert!(!chain::pass_priority(&mut state, &catalog, PlayerId::new(1)).unwrap());
    assert_eq!(state.turn.priority, PlayerId::new(2));
    assert!(!chain::pass_priority(&mut state, &catalog, PlayerId::new(2)).unwrap());
    assert_eq!(state.turn.priority, PlayerId::new(0));
    assert!(chain::pass_priority(&mut state, &catalog, PlayerId::new(0)).unwrap());

    assert!(state.chain.is_empty());
}

#[test]
fn test_addition_resets_pass_count() {
    let catalog = catalog();
    let mut state = state_with_players(2);

    let first = chained_card(&mut state, CardId::new(3), PlayerId::new(0));
    chain::push_spell(&mut state, first, CardId::new(3), PlayerId::new(0), smallvec![]);
    chain::finalize_pending(&mut state, &catalog).unwrap();

    assert!(!chain::pass_priority(&mut state, &catalog, PlayerId::new(0)).unwrap());

    // Player 1 responds instead of passing: passes reset, both must pass
    // again before anything resolves.
    let second = chained_card(&mut state, CardId::new(3), PlayerId::new(1));
    chain::push_spell(&mut state, second, CardId::new(3), PlayerId::new(1), smallvec![]);
    chain::finalize_pending(&mut state, &catalog).unwrap();

    assert_eq!(state.chain.len(), 2);
    assert_eq!(state.turn.priority, PlayerId::new(1));
    assert!(!chain::pass_priority(&mut state, &catalog, PlayerId::new(1)).unwrap());
    assert!(chain::pass_priority(&mut state, &catalog, PlayerId::new(0)).unwrap());

    // LIFO: the response resolved first.
    assert_eq!(state.chain.len(), 1);
}

#[test]
fn test_resolving_empty_chain_is_protocol_error() {
    let catalog = catalog();
    let mut state = state_with_players(2);

    assert_eq!(
        chain::resolve_top(&mut state, &catalog).unwrap_err(),
        EngineError::EmptyChainResolve
    );
    assert_eq!(
        chain::pass_priority(&mut state, &catalog, PlayerId::new(0)).unwrap_err(),
        EngineError::EmptyChainResolve
    );
}

#[test]
fn test_finalize_fizzles_spell_with_dead_target() {
    let catalog = catalog();
    let mut state = state_with_players(2);

    let victim = board_unit(&mut state, CardId::new(1), PlayerId::new(1), LocationId::new(0));
    let bolt = chained_card(&mut state, CardId::new(2), PlayerId::new(0));
    chain::push_spell(
        &mut state,
        bolt,
        CardId::new(2),
        PlayerId::new(0),
        smallvec![Target::Object(victim)],
    );

    state.remove_from_board(victim, Placement::Discard).unwrap();
    chain::finalize_pending(&mut state, &catalog).unwrap();

    assert!(state.chain.is_empty());
    assert_eq!(state.object(bolt).unwrap().placement, Placement::Discard);
}

// =============================================================================
// APNAP law
// =============================================================================

#[test]
fn test_apnap_turn_holder_items_precede() {
    let catalog = Arc::new(catalog());
    let engine = Engine::new(catalog);
    let mut state = state_with_players(2);

    // Player 1's watcher has the lower object id, so discovery alone
    // would put it first; APNAP must put the turn holder (player 0) first.
    board_unit(&mut state, CardId::new(4), PlayerId::new(1), LocationId::new(0));
    board_unit(&mut state, CardId::new(4), PlayerId::new(0), LocationId::new(1));

    let next = engine
        .trigger_event(
            &state,
            &TriggerEvent::ObjectDied {
                object: ObjectId(999),
                controller: PlayerId::new(1),
                location: None,
            },
        )
        .unwrap();

    let controllers: Vec<PlayerId> = next.chain.iter().map(|item| item.controller()).collect();
    assert_eq!(controllers, vec![PlayerId::new(0), PlayerId::new(1)]);

    // LIFO then resolves the non-active player's item first.
    let resolved = engine.resolve_chain_fully(&next).unwrap();
    assert!(resolved.chain.is_empty());
}

#[test]
fn test_trigger_event_with_no_listeners_is_noop() {
    let engine = Engine::new(Arc::new(catalog()));
    let state = state_with_players(2);

    let next = engine
        .trigger_event(
            &state,
            &TriggerEvent::TurnStarted {
                player: PlayerId::new(0),
                turn: 1,
            },
        )
        .unwrap();

    assert!(next.chain.is_empty());
    assert_eq!(next.turn.chain_mode, ChainMode::Open);
}
