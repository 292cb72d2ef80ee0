//! Pure SM-2 transition function
//!
//! Referentially transparent: no clock, no I/O, no errors. Inputs are
//! pre-validated value objects, so the function is total over its domain and
//! can be tested exhaustively with tables.

use crate::vocab::Quality;

/// Lowest ease factor the algorithm ever produces
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to a brand-new word
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Interval after the first successful review, in days
pub const FIRST_INTERVAL_DAYS: u32 = 1;

/// Interval after the second consecutive successful review, in days
pub const SECOND_INTERVAL_DAYS: u32 = 6;

/// Scheduling triple produced by one review
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Next {
    /// Consecutive successful reviews after this answer
    pub repetitions: u32,
    /// Ease factor after this answer
    pub ease_factor: f64,
    /// Days until the next review
    pub interval_days: u32,
}

/// Map the current scheduling state and a recall quality to the next state.
///
/// Failure (quality 0-2) resets the streak and schedules a retry tomorrow;
/// the ease factor is only ever adjusted on success.
pub fn compute_next(
    repetitions: u32,
    ease_factor: f64,
    interval_days: u32,
    quality: Quality,
) -> Sm2Next {
    if quality.is_poor() {
        return Sm2Next {
            repetitions: 0,
            ease_factor,
            interval_days: 1,
        };
    }

    let new_repetitions = repetitions + 1;
    let new_ease = next_ease(ease_factor, quality);
    let new_interval = match new_repetitions {
        1 => FIRST_INTERVAL_DAYS,
        2 => SECOND_INTERVAL_DAYS,
        _ => (interval_days as f64 * new_ease).round() as u32,
    };

    Sm2Next {
        repetitions: new_repetitions,
        ease_factor: new_ease,
        interval_days: new_interval,
    }
}

/// Ease update for a successful review.
///
/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at
/// [`MIN_EASE_FACTOR`]. Quality 5 adds 0.1, quality 4 is neutral, quality 3
/// subtracts 0.14.
pub fn next_ease(ease_factor: f64, quality: Quality) -> f64 {
    let q = quality.value() as f64;
    let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    (ease_factor + delta).max(MIN_EASE_FACTOR)
}
