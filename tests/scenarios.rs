//! Literal input/output scenarios for the hand evaluator, the rock buffers
//! and the die-rock collision response.

#![allow(clippy::unwrap_used)]

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use rock_dice::Settings;
use rock_dice::consts::FORCEFUL_PUSH_FACTOR;
use rock_dice::dice::{DieModel, RainbowColor};
use rock_dice::hand::{HandEvaluator, HandRank};
use rock_dice::sim::{Die, KineticSimulator, Rock, RockBufferManager, RockScoreType, SimContext};

fn check(dice: &[u8], rank: HandRank, score: u32) {
    let eval = HandEvaluator::default();
    assert_eq!(eval.determine_rank(dice).unwrap(), rank, "{dice:?}");
    assert_eq!(eval.score(dice).unwrap(), score, "{dice:?}");
}

#[test]
fn test_full_house() {
    check(&[3, 3, 3, 5, 5], HandRank::FullHouse, 19);
}

#[test]
fn test_small_straight_skips_gap() {
    check(&[1, 2, 3, 4, 6], HandRank::StraightSmall, 10);
}

#[test]
fn test_seven_sevens() {
    check(&[7; 7], HandRank::SevenSevens, 49);
}

#[test]
fn test_straight_beats_snake_eyes() {
    check(&[1, 1, 2, 3, 4], HandRank::StraightSmall, 10);
}

#[test]
fn test_crowded_house() {
    check(&[5, 5, 5, 5, 2, 2, 1], HandRank::CrowdedHouse, 24);
}

#[test]
fn test_largest_straight() {
    check(&[1, 2, 3, 4, 5, 6, 7], HandRank::StraightLargest, 28);
}

#[test]
fn test_empty_hand_scores_zero() {
    assert_eq!(HandEvaluator::default().score::<u8>(&[]).unwrap(), 0);
}

#[test]
fn test_select_even_share_of_seven_hundred() {
    let colors: Vec<Vec3> = RainbowColor::ALL.iter().map(|c| c.rgb() * 0.5).collect();
    let mut m = RockBufferManager::new(&colors, 700);
    for i in 0..700 {
        let pos = Vec2::new((i % 40) as f32 * 10.0, (i / 40) as f32 * 10.0);
        m.insert_base(i, Rock::new(pos, RockScoreType::Pebble, 0, 0));
    }
    let mut rng = Pcg32::seed_from_u64(7);

    let red = RainbowColor::Red.rgb();
    let moved = m.select(0, red, 7, 30, &mut rng);

    assert_eq!(moved, 100);
    assert_eq!(m.held(0).map(|b| b.len()), Some(100));
    assert_eq!(m.held(0).map(|b| b.target_color), Some(red));
    assert_eq!(m.base_rock_count(), 600);
    assert_eq!(m.total_rocks(), 700);
}

#[test]
fn test_moving_die_kicks_rock() {
    let ctx = SimContext::from_settings(Settings::default()).unwrap();
    let tile = ctx.rock_tile_size();

    // One tile square, 2 units inside the die's right edge
    let rock = Rock::new(Vec2::new(130.0, 110.0), RockScoreType::Shard, 0, 0);
    let start = rock.pos;
    let mut m = RockBufferManager::new(&[Vec3::splat(0.5)], 1);
    m.insert_base(0, rock);

    let mut die = Die::new(0, RainbowColor::Red, DieModel::standard(6), Vec2::new(100.0, 100.0));
    die.vel = Vec2::new(10.0, 0.0);

    let mut sim = KineticSimulator::new();
    let stats = sim.step_rocks(&mut m, std::slice::from_ref(&die), &ctx, None);
    assert_eq!(stats.die_hits, 1);

    let rock = &m.base_buffers()[0].rocks[0];
    assert!(rock.slope().0 > 0);
    // Combined overlap: 2 along x plus the full tile along y
    let push = (2.0 + tile) * FORCEFUL_PUSH_FACTOR;
    assert!((rock.pos.x - (start.x + push)).abs() < 1e-4, "x = {}", rock.pos.x);
}
