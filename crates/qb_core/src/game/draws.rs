//! Once-per-match random limits: the winning score and the action budget.

use super::roll::Roll;
use crate::config::DurationRange;

/// Range used when a duration class has no usable entry.
pub const FALLBACK_RANGE: DurationRange = DurationRange { min: 60, max: 90 };

/// Map a unit draw onto the score cap: 30% each for 3, 4 and 5, 10% for 6.
pub fn max_score_from_draw(r: f64) -> u32 {
    if r < 0.30 {
        3
    } else if r < 0.60 {
        4
    } else if r < 0.90 {
        5
    } else {
        6
    }
}

pub fn draw_max_score<R: Roll + ?Sized>(roll: &mut R) -> u32 {
    max_score_from_draw(roll.roll_unit())
}

/// Draw the total-action budget from `range`, or from [`FALLBACK_RANGE`]
/// when the range is missing or malformed.
pub fn draw_max_actions<R: Roll + ?Sized>(roll: &mut R, range: Option<DurationRange>) -> u32 {
    let range = match range {
        Some(r) if r.is_valid() => r,
        Some(r) => {
            tracing::warn!(min = r.min, max = r.max, "Malformed duration range, using fallback");
            FALLBACK_RANGE
        }
        None => {
            tracing::warn!("Missing duration range, using fallback");
            FALLBACK_RANGE
        }
    };
    roll.roll_inclusive(range.min, range.max)
}
