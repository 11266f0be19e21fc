use std::env;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::MatchInput;
use crate::snapshot::{CurrentScore, HomeAway, Possession, StatSnapshot};

pub const DEMO_SEED_ENV: &str = "INPLAY_DEMO_SEED";
pub const DEMO_STEP_ENV: &str = "INPLAY_DEMO_STEP";

// Per-minute event rates, roughly a league-average match.
const CORNER_RATE: f64 = 0.11;
const FOUL_RATE: f64 = 0.26;
const SHOT_RATE: f64 = 0.27;
const ON_TARGET_SHARE: f64 = 0.35;
const GOAL_PER_ON_TARGET: f64 = 0.30;
const YELLOW_PER_FOUL: f64 = 0.13;
const RED_RATE: f64 = 0.002;

/// One cumulative observation of the synthetic match.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedFrame {
    pub minute: i32,
    pub stats: StatSnapshot,
    pub score: CurrentScore,
}

impl FeedFrame {
    pub fn to_input(&self, id: &str) -> MatchInput {
        MatchInput {
            id: Some(id.to_string()),
            stats: self.stats,
            minute: self.minute,
            score: self.score,
            priors: None,
        }
    }
}

/// Deterministic minute-by-minute match for a given seed. Frame `i` is minute `i + 1`.
pub fn simulate_match(seed: u64, minutes: i32) -> Vec<FeedFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Share of attacking play that belongs to the home side.
    let home_tilt: f64 = rng.gen_range(0.38..0.62);
    let mut possession_home = 100.0 * home_tilt;

    let mut stats = StatSnapshot::default();
    let mut score = CurrentScore::default();
    let mut frames = Vec::with_capacity(minutes.max(0) as usize);

    for minute in 1..=minutes {
        if rng.gen_bool(CORNER_RATE) {
            bump(&mut stats.corners, rng.gen_bool(home_tilt));
        }

        if rng.gen_bool(FOUL_RATE) {
            // The side with less of the ball fouls more.
            let home_fouls = rng.gen_bool(1.0 - home_tilt);
            bump(&mut stats.fouls, home_fouls);
            if rng.gen_bool(YELLOW_PER_FOUL) {
                stats.cards.yellow += 1;
            }
        }
        if rng.gen_bool(RED_RATE) {
            stats.cards.red += 1;
        }

        if rng.gen_bool(SHOT_RATE) {
            let home_shot = rng.gen_bool(home_tilt);
            bump(&mut stats.shots, home_shot);
            if rng.gen_bool(ON_TARGET_SHARE) {
                bump(&mut stats.shots_on_target, home_shot);
                if rng.gen_bool(GOAL_PER_ON_TARGET) {
                    if home_shot {
                        score.home += 1;
                    } else {
                        score.away += 1;
                    }
                }
            }
        }

        possession_home = (possession_home + rng.gen_range(-1.5..1.5)).clamp(25.0, 75.0);
        stats.possession = Possession {
            home: possession_home.round(),
            away: 100.0 - possession_home.round(),
        };

        frames.push(FeedFrame {
            minute,
            stats,
            score,
        });
    }

    frames
}

/// Every `step`-th frame of a seeded match, as engine inputs.
pub fn demo_inputs(seed: u64, step: usize) -> Vec<MatchInput> {
    let id = format!("demo-{seed}");
    simulate_match(seed, 90)
        .iter()
        .skip(step.saturating_sub(1))
        .step_by(step.max(1))
        .map(|frame| frame.to_input(&id))
        .collect()
}

pub fn demo_seed() -> u64 {
    env::var(DEMO_SEED_ENV)
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(7)
}

pub fn demo_step() -> usize {
    env::var(DEMO_STEP_ENV)
        .ok()
        .and_then(|val| val.trim().parse::<usize>().ok())
        .unwrap_or(5)
        .clamp(1, 15)
}

fn bump(counter: &mut HomeAway, home: bool) {
    if home {
        counter.home += 1;
    } else {
        counter.away += 1;
    }
}
