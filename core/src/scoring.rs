//! Final score arithmetic.
//!
//! `score = pairs * 100 - clicks * 10 + max(0, 1000 - 2 * whole_seconds)`

use core::time::Duration;
use serde::{Deserialize, Serialize};

pub const PAIR_POINTS: i64 = 100;
pub const CLICK_PENALTY: i64 = 10;
pub const TIME_BONUS_BASE: i64 = 1000;
pub const TIME_PENALTY_PER_SECOND: i64 = 2;

/// Score split into the parts a results screen shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub pair_points: i32,
    /// Subtracted from the total, stored positive
    pub click_penalty: i32,
    pub time_bonus: i32,
    pub total: i32,
}

/// Bonus for finishing quickly; elapsed time is floored to whole seconds.
pub fn time_bonus(elapsed: Duration) -> i32 {
    let seconds = i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX);
    let bonus = TIME_BONUS_BASE.saturating_sub(seconds.saturating_mul(TIME_PENALTY_PER_SECOND));
    saturate(bonus.max(0))
}

pub fn score_breakdown(pairs_found: u32, total_clicks: u32, elapsed: Duration) -> ScoreBreakdown {
    let pair_points = i64::from(pairs_found) * PAIR_POINTS;
    let click_penalty = i64::from(total_clicks) * CLICK_PENALTY;
    let time_bonus = i64::from(time_bonus(elapsed));
    let total = pair_points - click_penalty + time_bonus;

    ScoreBreakdown {
        pair_points: saturate(pair_points),
        click_penalty: saturate(click_penalty),
        time_bonus: saturate(time_bonus),
        total: saturate(total),
    }
}

pub fn calculate_score(pairs_found: u32, total_clicks: u32, elapsed: Duration) -> i32 {
    score_breakdown(pairs_found, total_clicks, elapsed).total
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN.into(), i32::MAX.into()) as i32
}
