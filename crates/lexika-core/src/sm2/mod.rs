//! SM-2 (SuperMemo-2) Spaced Repetition Module
//!
//! The classic two-phase interval algorithm (Wozniak, 1990): fixed 1-day and
//! 6-day steps for the first two successful reviews, then geometric growth by
//! a per-word ease factor.
//!
//! Reference: https://super-memory.com/english/ol/sm2.htm
//!
//! ## Core rules:
//! - Fail (quality 0-2): repetition streak and interval reset, ease untouched
//! - Pass (quality 3-5): interval 1 -> 6 -> round(interval * ease)
//! - Ease update: EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), floor 1.3

mod algorithm;
mod scheduler;

pub use algorithm::{
    compute_next, next_ease, Sm2Next, FIRST_INTERVAL_DAYS, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR,
    SECOND_INTERVAL_DAYS,
};

pub use scheduler::{PreviewResults, Sm2Scheduler, Sm2State};
