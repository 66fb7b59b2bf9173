//! Property-based tests for hand ranking, rock bookkeeping and dice physics.
//!
//! Run with: cargo test --release --test properties

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use rock_dice::Settings;
use rock_dice::consts::MAX_SLOPE;
use rock_dice::hand::{HandEvaluator, HandRank};
use rock_dice::sim::{
    DieMode, GameState, InputEvent, Rock, RockBufferManager, RockScoreType, TickInput, tick,
};

fn dice_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(1u8..=9, 1..=7)
}

fn event_strategy() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        Just(InputEvent::Roll),
        Just(InputEvent::Press),
        Just(InputEvent::Select),
        Just(InputEvent::Score),
        Just(InputEvent::HeldAll),
        Just(InputEvent::RerollAll),
        Just(InputEvent::None),
        Just(InputEvent::None),
    ]
}

fn cursor_strategy() -> impl Strategy<Value = Option<Vec2>> {
    prop::option::of((0.0f32..640.0, 0.0f32..480.0).prop_map(|(x, y)| Vec2::new(x, y)))
}

fn small_state(seed: u64) -> GameState {
    GameState::new(Settings {
        seed,
        rock_total_score: 150,
        scoring_delay: 2,
        ..Settings::default()
    })
    .unwrap()
}

fn score_type_census(state: &GameState) -> HashMap<RockScoreType, usize> {
    let mut census = HashMap::new();
    for (_, buffer) in state.rocks.buffers() {
        for rock in &buffer.rocks {
            *census.entry(rock.score_type()).or_insert(0) += 1;
        }
    }
    census
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Every dice set of one to seven dice gets a rank.
    #[test]
    fn prop_rank_always_defined(dice in dice_strategy()) {
        let eval = HandEvaluator::default();
        let rank = eval.determine_rank(&dice);
        prop_assert!(rank.is_ok(), "{dice:?} -> {rank:?}");
        prop_assert_ne!(rank.unwrap(), HandRank::NoHand);
    }

    /// The score is the sum of the contributing dice.
    #[test]
    fn prop_score_sums_contributing(dice in dice_strategy()) {
        let eval = HandEvaluator::default();
        let rank = eval.determine_rank(&dice).unwrap();
        let contributing = eval.find_contributing_dice(rank, &dice).unwrap();
        let sum: u32 = contributing.iter().map(|&i| u32::from(dice[i])).sum();
        prop_assert_eq!(eval.score(&dice).unwrap(), sum);
        prop_assert!(contributing.windows(2).all(|w| w[0] < w[1]));
    }

    /// Order of the dice never changes the rank.
    #[test]
    fn prop_rank_ignores_order(dice in dice_strategy()) {
        let eval = HandEvaluator::default();
        let mut sorted = dice.clone();
        sorted.sort_unstable();
        let mut reversed = sorted.clone();
        reversed.reverse();
        let rank = eval.determine_rank(&dice).unwrap();
        prop_assert_eq!(eval.determine_rank(&sorted).unwrap(), rank);
        prop_assert_eq!(eval.determine_rank(&reversed).unwrap(), rank);
    }

    /// Holding then releasing restores the base partition once the fade ends.
    #[test]
    fn prop_select_round_trip_restores_bases(
        bases in 1usize..8,
        per_base in 0usize..60,
        extra in 0usize..8,
        dice_count in 1usize..8,
        seed in any::<u64>(),
    ) {
        let colors: Vec<Vec3> = (0..bases).map(|i| Vec3::splat(0.1 * (i + 1) as f32)).collect();
        let total = bases * per_base + extra;
        let mut m = RockBufferManager::new(&colors, total);
        for i in 0..total {
            m.insert_base(i, Rock::new(Vec2::new(i as f32, 4.0), RockScoreType::Pebble, 1, 0));
        }
        let before: Vec<usize> = m.base_buffers().iter().map(|b| b.len()).collect();

        let mut rng = Pcg32::seed_from_u64(seed);
        m.select(0, Vec3::X, dice_count, 30, &mut rng);
        m.deselect(0, 30);
        for _ in 0..30 {
            prop_assert_eq!(m.total_rocks(), total);
            m.transition_tick();
        }

        let after: Vec<usize> = m.base_buffers().iter().map(|b| b.len()).collect();
        prop_assert_eq!(after, before);
        prop_assert!(m.transition_buffers().is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Rocks are neither created nor destroyed, their slopes stay in range
    /// and their score types never change, whatever the player does.
    #[test]
    fn prop_rock_bookkeeping_under_play(
        seed in any::<u64>(),
        inputs in prop::collection::vec((event_strategy(), cursor_strategy()), 1..300),
    ) {
        let mut state = small_state(seed);
        let total = state.rocks.total_rocks();
        let census = score_type_census(&state);

        for (event, cursor) in inputs {
            tick(&mut state, &TickInput::new(event, cursor)).unwrap();
            prop_assert_eq!(state.rocks.total_rocks(), total);
            for (_, buffer) in state.rocks.buffers() {
                for rock in &buffer.rocks {
                    let (sx, sy) = rock.slope();
                    prop_assert!(sx.abs() <= MAX_SLOPE && sy.abs() <= MAX_SLOPE);
                }
            }
            let violations = state.check_invariants();
            prop_assert!(violations.is_empty(), "{violations:?}");
        }

        prop_assert_eq!(score_type_census(&state), census);
    }

    /// Thrown dice come to rest within 200 quiet ticks.
    #[test]
    fn prop_dice_settle(seed in any::<u64>()) {
        let mut state = small_state(seed);
        tick(&mut state, &TickInput::new(InputEvent::Roll, None)).unwrap();
        prop_assert!(state.dice.iter().any(|d| d.is_moving()));
        for _ in 0..200 {
            tick(&mut state, &TickInput::default()).unwrap();
        }
        for die in state.dice.iter().filter(|d| d.mode == DieMode::Rolling) {
            prop_assert_eq!(die.vel, Vec2::ZERO);
        }
    }
}
