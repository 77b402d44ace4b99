//! Engine-level integration tests: immutability, determinism, replay.

use std::sync::Arc;

use warfront::cleanup;
use warfront::{
    CardDefinition, CardId, CardRegistry, Category, Choice, Engine, EngineError, GameBuilder,
    GameConfig, GameRng, GameState, Phase, PlayerId, ResourceCost,
};

fn catalog() -> CardRegistry {
    let mut registry = CardRegistry::new();
    registry.register(
        CardDefinition::new(CardId::new(1), "Scout", Category::Unit)
            .with_cost(ResourceCost::energy(1))
            .with_stats(2, 2),
    );
    registry
}

fn engine() -> Engine {
    Engine::new(Arc::new(catalog()))
}

fn built_state(seed: u64) -> GameState {
    let catalog = catalog();
    GameBuilder::new(GameConfig::new(2, 2))
        .deck(PlayerId::new(0), vec![CardId::new(1); 12])
        .deck(PlayerId::new(1), vec![CardId::new(1); 12])
        .build(&catalog, GameRng::seeded(seed))
        .unwrap()
}

/// Every operation returns a new value; the input state is never touched.
#[test]
fn test_apply_choice_leaves_input_untouched() {
    let engine = engine();
    let state = built_state(5);
    let hand_before = state.players[PlayerId::new(0)].hand.clone();
    let phase_before = state.turn.phase;

    let _next = engine
        .apply_choice(
            &state,
            &Choice::AdvancePhase {
                player: PlayerId::new(0),
            },
        )
        .unwrap();

    assert_eq!(state.turn.phase, phase_before);
    assert_eq!(state.players[PlayerId::new(0)].hand, hand_before);
}

/// Same seed, same choices: identical trajectories.
#[test]
fn test_deterministic_replay() {
    let engine = engine();

    let run = || {
        let mut state = built_state(42);
        for _ in 0..4 {
            state = engine
                .apply_choice(
                    &state,
                    &Choice::AdvancePhase {
                        player: PlayerId::new(0),
                    },
                )
                .unwrap();
        }
        state
    };

    let a = run();
    let b = run();

    assert_eq!(a.players, b.players);
    assert_eq!(a.turn, b.turn);
    assert_eq!(a.locations, b.locations);
}

/// Different seeds diverge (different shuffles).
#[test]
fn test_seeds_shape_the_game() {
    let a = built_state(1);
    let b = built_state(2);

    // Object ids are allocated identically in both games, so any
    // difference in deck or hand sequences comes from the shuffle.
    assert_eq!(a.players[PlayerId::new(0)].hand.len(), 4);
    let decks_equal = a.players[PlayerId::new(0)].deck == b.players[PlayerId::new(0)].deck;
    let hands_equal = a.players[PlayerId::new(0)].hand == b.players[PlayerId::new(0)].hand;
    assert!(!(decks_equal && hands_equal));
}

/// A scripted RNG drives shuffles deterministically and fails typed when
/// exhausted.
#[test]
fn test_scripted_rng_exhaustion() {
    let catalog = catalog();

    let err = GameBuilder::new(GameConfig::new(2, 2))
        .deck(PlayerId::new(0), vec![CardId::new(1); 8])
        .deck(PlayerId::new(1), vec![CardId::new(1); 8])
        // Too few scripted values to shuffle two 8-card decks.
        .build(&catalog, GameRng::scripted(vec![1, 2, 3]))
        .unwrap_err();

    assert!(matches!(err, EngineError::RngExhausted { .. }));
    assert!(err.is_fatal());
}

/// Cleanup on an already-stable built state is a single quiet pass.
#[test]
fn test_cleanup_idempotent_on_built_state() {
    let catalog = catalog();
    let mut state = built_state(9);

    let report = cleanup::run(&mut state, &catalog).unwrap();
    assert!(!report.changed);
    assert_eq!(report.passes, 1);
}

/// Once the game is over no further choices exist, and applying one is a
/// protocol error.
#[test]
fn test_game_over_freezes_the_engine() {
    let engine = engine();
    let mut state = built_state(5);
    state.result = Some(warfront::GameResult::Draw);

    assert!(engine.pending_choices(&state).is_empty());

    let err = engine
        .apply_choice(
            &state,
            &Choice::AdvancePhase {
                player: PlayerId::new(0),
            },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::ChoiceNotLegal(_)));
}

/// Playing a unit through the full pipeline: pay, chain, finalize,
/// resolve, deploy, conquer.
#[test]
fn test_unit_play_end_to_end() {
    let engine = engine();
    let mut state = built_state(5);
    let p0 = PlayerId::new(0);
    state.turn.phase = Phase::Action;
    state.players[p0].energy = 2;

    let card = state.players[p0].hand[0];
    let choice = engine
        .pending_choices(&state)
        .into_iter()
        .find(|c| matches!(c, Choice::PlayCard { card: chosen, .. } if *chosen == card))
        .expect("unit play should be offered");

    let played = engine.apply_choice(&state, &choice).unwrap();
    assert_eq!(played.chain.len(), 1);
    assert!(!played.chain.peek_top().unwrap().is_pending());

    let resolved = engine.resolve_chain_fully(&played).unwrap();
    assert!(resolved.chain.is_empty());
    assert!(resolved.object(card).unwrap().on_board());
    assert_eq!(resolved.players[p0].points, 1);
}
