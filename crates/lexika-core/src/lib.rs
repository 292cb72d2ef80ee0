//! # Lexika Core
//!
//! Vocabulary learning engine built on SM-2 spaced repetition:
//!
//! - **SM-2 scheduler**: quality-graded reviews (0-5), geometric interval
//!   growth, per-word ease factor floored at 1.3
//! - **Progress tracking**: one scheduling record per (user, word) pair,
//!   mutated transactionally with optimistic locking
//! - **Event log**: every answer appended to an immutable audit trail;
//!   statistics are folds over the log, never running counters
//! - **Study blocks**: bounded sessions ordered by overdueness, then word
//!   frequency
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lexika_core::{DifficultyLevel, NewWord, Storage};
//!
//! // Create storage (uses default platform-specific location)
//! let storage = Storage::new(None)?;
//!
//! // Import a word
//! let word = storage.add_word(NewWord {
//!     text: "Haus".to_string(),
//!     translation: "house".to_string(),
//!     difficulty: DifficultyLevel::Easy,
//!     frequency_rank: 12,
//! })?;
//!
//! // Record an answer (quality 0-5, response time in seconds)
//! let summary = storage.submit_answer("alice", word.id.value(), 4, 2.3)?;
//!
//! // Assemble the next study session
//! let block = storage.generate_study_block("alice", 20)?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
// Only warn about missing docs for public items exported from the crate root
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod session;
pub mod sm2;
pub mod stats;
pub mod storage;
pub mod vocab;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Vocabulary types
pub use vocab::{
    DifficultyLevel, EaseFactor, FrequencyRank, NewWord, Quality, ResponseTime, StudyEvent,
    UserId, ValidationError, Word, WordId, WordProgress,
};

// SM-2 algorithm
pub use sm2::{
    compute_next,
    next_ease,
    PreviewResults,
    Sm2Next,
    Sm2Scheduler,
    Sm2State,
    FIRST_INTERVAL_DAYS,
    INITIAL_EASE_FACTOR,
    MIN_EASE_FACTOR,
    SECOND_INTERVAL_DAYS,
};

// Session assembly
pub use session::{select_study_block, StudyBlock, StudyCandidate};

// Statistics folds
pub use stats::{global_stats, user_stats, word_stats, GlobalStats, UserStats, WordStats};

// Storage layer
pub use storage::{ProgressSummary, Result, Storage, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        DifficultyLevel, NewWord, ProgressSummary, Quality, Result, Sm2Scheduler, Storage,
        StorageError, StudyBlock, StudyEvent, UserId, Word, WordId, WordProgress,
    };
}
