//! Scheduler wrapper around the pure SM-2 transition
//!
//! Holds no mutable state; it exists so callers can work with a named
//! scheduling state, preview outcomes for every quality, and stay insulated
//! from the raw triple-passing of [`compute_next`].

use serde::{Deserialize, Serialize};

use super::algorithm::{compute_next, Sm2Next, INITIAL_EASE_FACTOR};
use crate::vocab::Quality;

/// Scheduling state of one (user, word) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sm2State {
    /// Consecutive successful reviews
    pub repetitions: u32,
    /// Interval growth multiplier
    pub ease_factor: f64,
    /// Days between the last review and the next one
    pub interval_days: u32,
}

/// What every quality answer would do to a state, indexed by quality 0-5
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResults {
    pub outcomes: [Sm2State; 6],
}

/// SM-2 scheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct Sm2Scheduler;

impl Sm2Scheduler {
    /// State for a word the user has never reviewed
    pub fn new_state(&self) -> Sm2State {
        Sm2State {
            repetitions: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 0,
        }
    }

    /// Apply one review to a state
    pub fn review(&self, state: &Sm2State, quality: Quality) -> Sm2State {
        let Sm2Next {
            repetitions,
            ease_factor,
            interval_days,
        } = compute_next(
            state.repetitions,
            state.ease_factor,
            state.interval_days,
            quality,
        );
        Sm2State {
            repetitions,
            ease_factor,
            interval_days,
        }
    }

    /// Compute the resulting state for every possible quality answer
    pub fn preview(&self, state: &Sm2State) -> PreviewResults {
        let outcomes = std::array::from_fn(|quality| {
            // quality index is 0..6, always in range
            let quality = Quality::new(quality as u8).expect("preview quality in range");
            self.review(state, quality)
        });
        PreviewResults { outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_unreviewed() {
        let state = Sm2Scheduler.new_state();
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.ease_factor, INITIAL_EASE_FACTOR);
    }

    #[test]
    fn review_matches_pure_function() {
        let scheduler = Sm2Scheduler;
        let state = Sm2State {
            repetitions: 2,
            ease_factor: 2.5,
            interval_days: 6,
        };
        let next = scheduler.review(&state, Quality::new(5).unwrap());
        assert_eq!(next.repetitions, 3);
        assert_eq!(next.interval_days, (6.0 * next.ease_factor).round() as u32);
    }

    #[test]
    fn preview_covers_all_qualities() {
        let scheduler = Sm2Scheduler;
        let preview = scheduler.preview(&scheduler.new_state());
        // Fail band all reset to a 1-day retry
        for outcome in &preview.outcomes[..3] {
            assert_eq!(outcome.repetitions, 0);
            assert_eq!(outcome.interval_days, 1);
        }
        // Pass band starts the streak
        for outcome in &preview.outcomes[3..] {
            assert_eq!(outcome.repetitions, 1);
            assert_eq!(outcome.interval_days, 1);
        }
    }
}
