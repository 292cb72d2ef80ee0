//! Vocabulary Domain
//!
//! Value objects, the [`Word`] entity, and the per-user [`WordProgress`]
//! aggregate that owns SM-2 scheduling state. All validation happens at
//! construction time; once a value object exists it is known-good.

mod events;
mod progress;
mod word;

pub use events::StudyEvent;
pub use progress::WordProgress;
pub use word::{
    DifficultyLevel, EaseFactor, FrequencyRank, NewWord, Quality, ResponseTime, UserId,
    ValidationError, Word, WordId,
};
