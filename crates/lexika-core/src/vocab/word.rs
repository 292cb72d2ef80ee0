//! Words and the self-validating value objects around them
//!
//! Every primitive the scheduler consumes is a newtype whose constructor
//! rejects out-of-range input with a [`ValidationError`]. Nothing downstream
//! needs to re-check ranges.

use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Malformed input to a value object. Surfaced to the caller immediately,
/// never retried, never partially applied.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Recall quality outside the 0-5 scale
    #[error("Quality {0} is invalid. Must be between 0 and 5")]
    QualityOutOfRange(u8),
    /// Negative or non-finite response time
    #[error("Response time {0} is invalid. Must be a non-negative number of seconds")]
    InvalidResponseTime(f64),
    /// Word ids are positive row ids
    #[error("Word ID must be positive, got {0}")]
    InvalidWordId(i64),
    /// User id blank or too short
    #[error("User ID must be at least 3 non-blank characters")]
    InvalidUserId,
    /// Frequency ranks start at 1 (most common)
    #[error("Frequency rank must be positive")]
    InvalidFrequencyRank,
    /// Ease factor below the SM-2 floor
    #[error("Ease factor {0} is below the minimum of 1.3")]
    EaseBelowFloor(f64),
    /// Word text must be non-empty
    #[error("Word text cannot be empty")]
    EmptyWordText,
    /// Study-block limit must be positive
    #[error("Study block limit must be positive, got {0}")]
    InvalidLimit(i32),
}

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Identifier of a word (positive integer, the words-table row id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(i64);

impl WordId {
    /// Validate and wrap a raw id
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::InvalidWordId(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for WordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a learner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw user id (at least 3 non-blank characters)
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().len() < 3 {
            return Err(ValidationError::InvalidUserId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// QUALITY
// ============================================================================

/// Self-reported recall quality for one review, on the SM-2 0-5 scale.
///
/// 0-2 means the answer was wrong or forgotten (the "fail" band), 3-5 means
/// correct with increasing confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Validate and wrap a raw quality score
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > 5 {
            return Err(ValidationError::QualityOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Pass band: the answer counts as a successful recall
    pub fn is_correct(&self) -> bool {
        self.0 >= 3
    }

    /// Perfect recall (5)
    pub fn is_perfect(&self) -> bool {
        self.0 == 5
    }

    /// Fail band: resets the repetition streak
    pub fn is_poor(&self) -> bool {
        self.0 < 3
    }
}

impl TryFrom<u8> for Quality {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

// ============================================================================
// EASE FACTOR
// ============================================================================

/// SM-2 ease factor: the per-word interval growth multiplier.
///
/// Floored at [`EaseFactor::MIN`]; the floor is the algorithm's guard
/// against degenerate one-day-forever intervals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EaseFactor(f64);

impl EaseFactor {
    /// Lowest ease the algorithm ever produces
    pub const MIN: f64 = 1.3;
    /// Ease assigned to a brand-new word
    pub const INITIAL: EaseFactor = EaseFactor(2.5);

    /// Validate and wrap a raw ease factor
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value < Self::MIN {
            return Err(ValidationError::EaseBelowFloor(value));
        }
        Ok(Self(value))
    }

    /// Wrap an algorithm output, clamping at the floor. Total, for values the
    /// scheduler already bounded.
    pub fn clamped(value: f64) -> Self {
        Self(value.max(Self::MIN))
    }

    /// Apply a delta, clamping at the floor. Never fails.
    pub fn adjusted(self, delta: f64) -> Self {
        Self((self.0 + delta).max(Self::MIN))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for EaseFactor {
    fn default() -> Self {
        Self::INITIAL
    }
}

// ============================================================================
// WORD ATTRIBUTES
// ============================================================================

/// Editorial difficulty band of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyLevel {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
        }
    }

    /// Parse from string name, defaulting unknown values to medium
    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "easy" => DifficultyLevel::Easy,
            "hard" => DifficultyLevel::Hard,
            _ => DifficultyLevel::Medium,
        }
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Corpus frequency rank of a word. Rank 1 is the most common word;
/// lower rank means higher priority when breaking scheduling ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyRank(u32);

impl FrequencyRank {
    /// Validate and wrap a raw rank (ranks start at 1)
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::InvalidFrequencyRank);
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Top-100 word
    pub fn is_very_common(&self) -> bool {
        self.0 <= 100
    }

    /// Top-1000 word
    pub fn is_common(&self) -> bool {
        self.0 <= 1000
    }
}

// ============================================================================
// RESPONSE TIME
// ============================================================================

/// Time the learner took to answer, in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseTime(f64);

impl ResponseTime {
    /// Validate and wrap a raw duration in seconds
    pub fn new(secs: f64) -> Result<Self, ValidationError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ValidationError::InvalidResponseTime(secs));
        }
        Ok(Self(secs))
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Under two seconds
    pub fn is_fast(&self) -> bool {
        self.0 < 2.0
    }

    /// Over ten seconds
    pub fn is_slow(&self) -> bool {
        self.0 > 10.0
    }
}

// ============================================================================
// WORD ENTITY
// ============================================================================

/// A vocabulary word. Created by content import and never mutated by the
/// scheduling core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Row id in the words table
    pub id: WordId,
    /// The word in the target language
    pub text: String,
    /// Translation into the learner's language
    pub translation: String,
    /// Editorial difficulty band
    pub difficulty: DifficultyLevel,
    /// Corpus frequency rank (1 = most common)
    pub frequency_rank: FrequencyRank,
}

/// Input for importing a new word
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewWord {
    /// The word in the target language
    pub text: String,
    /// Translation into the learner's language
    pub translation: String,
    /// Editorial difficulty band
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    /// Corpus frequency rank (1 = most common)
    pub frequency_rank: u32,
}

impl NewWord {
    /// Check the raw fields before they reach storage
    pub fn validate(&self) -> Result<FrequencyRank, ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyWordText);
        }
        FrequencyRank::new(self.frequency_rank)
    }
}

// ============================================================================
// TESTS
// ============================================================================
