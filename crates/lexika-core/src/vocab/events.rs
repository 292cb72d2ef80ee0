//! Domain events emitted by progress updates
//!
//! Events are staged on the entity and flushed to the append-only event log
//! by the storage layer on successful commit. There is no event bus; the
//! staged list is the whole mechanism.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::word::{Quality, ResponseTime, UserId, WordId};

/// One state transition in a learner's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StudyEvent {
    /// A review answer was submitted and the schedule recomputed
    AnswerSubmitted {
        user_id: UserId,
        word_id: WordId,
        quality: Quality,
        response_time: ResponseTime,
        /// Interval before this review, in days
        previous_interval: u32,
        /// Interval the scheduler produced, in days
        new_interval: u32,
        /// Repetition count after this review
        repetitions: u32,
        /// Ease factor after this review
        ease_factor: f64,
        timestamp: DateTime<Utc>,
    },
    /// First successful recall of a word (repetitions went 0 to 1)
    WordLearned {
        user_id: UserId,
        word_id: WordId,
        timestamp: DateTime<Utc>,
    },
}

impl StudyEvent {
    /// When the event occurred
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StudyEvent::AnswerSubmitted { timestamp, .. }
            | StudyEvent::WordLearned { timestamp, .. } => *timestamp,
        }
    }

    /// The learner the event belongs to
    pub fn user_id(&self) -> &UserId {
        match self {
            StudyEvent::AnswerSubmitted { user_id, .. }
            | StudyEvent::WordLearned { user_id, .. } => user_id,
        }
    }

    /// The word the event belongs to
    pub fn word_id(&self) -> WordId {
        match self {
            StudyEvent::AnswerSubmitted { word_id, .. }
            | StudyEvent::WordLearned { word_id, .. } => *word_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_submitted_serializes_tagged() {
        let event = StudyEvent::AnswerSubmitted {
            user_id: UserId::new("alice").unwrap(),
            word_id: WordId::new(7).unwrap(),
            quality: Quality::new(4).unwrap(),
            response_time: ResponseTime::new(2.5).unwrap(),
            previous_interval: 1,
            new_interval: 6,
            repetitions: 2,
            ease_factor: 2.5,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "answerSubmitted");
        assert_eq!(json["newInterval"], 6);
    }
}
