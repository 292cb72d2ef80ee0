//! Statistics folds over the event log
//!
//! Aggregates are always computed by folding over the append-only event
//! sequence (or the progress records), never by keeping running counters on
//! the entities. Everything here is pure; the storage layer feeds it rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::vocab::{StudyEvent, UserId, Word, WordId, WordProgress};

/// Review statistics for one word across all users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStats {
    pub word_id: WordId,
    pub total_attempts: u64,
    pub correct_attempts: u64,
    pub accuracy_percentage: f64,
    pub average_response_time_secs: f64,
}

/// Learning statistics for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: UserId,
    /// Words the user has a progress record for
    pub total_words_studied: usize,
    /// Words due on or before the reference date
    pub words_due_for_review: usize,
    pub total_reviews: u64,
    pub average_quality: f64,
    pub success_rate_percentage: f64,
}

/// System-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_words: usize,
    pub total_study_sessions: u64,
    /// Count of words per difficulty band
    pub difficulty_distribution: BTreeMap<String, u32>,
    pub average_sessions_per_word: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold a word's answer events into [`WordStats`]
pub fn word_stats(word_id: WordId, events: &[StudyEvent]) -> WordStats {
    let mut total = 0u64;
    let mut correct = 0u64;
    let mut response_time_sum = 0.0;

    for event in events {
        if let StudyEvent::AnswerSubmitted {
            word_id: event_word,
            quality,
            response_time,
            ..
        } = event
        {
            if *event_word != word_id {
                continue;
            }
            total += 1;
            if quality.is_correct() {
                correct += 1;
            }
            response_time_sum += response_time.as_secs_f64();
        }
    }

    let accuracy = if total > 0 {
        correct as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let average_response_time = if total > 0 {
        response_time_sum / total as f64
    } else {
        0.0
    };

    WordStats {
        word_id,
        total_attempts: total,
        correct_attempts: correct,
        accuracy_percentage: round2(accuracy),
        average_response_time_secs: round2(average_response_time),
    }
}

/// Fold a user's progress records and answer events into [`UserStats`]
pub fn user_stats(
    user_id: UserId,
    progress: &[WordProgress],
    events: &[StudyEvent],
    today: NaiveDate,
) -> UserStats {
    let words_due = progress.iter().filter(|p| p.is_due(today)).count();

    let mut total_reviews = 0u64;
    let mut quality_sum = 0u64;
    let mut correct = 0u64;
    for event in events {
        if let StudyEvent::AnswerSubmitted {
            user_id: event_user,
            quality,
            ..
        } = event
        {
            if event_user != &user_id {
                continue;
            }
            total_reviews += 1;
            quality_sum += quality.value() as u64;
            if quality.is_correct() {
                correct += 1;
            }
        }
    }

    let average_quality = if total_reviews > 0 {
        quality_sum as f64 / total_reviews as f64
    } else {
        0.0
    };
    let success_rate = if total_reviews > 0 {
        correct as f64 / total_reviews as f64 * 100.0
    } else {
        0.0
    };

    UserStats {
        user_id,
        total_words_studied: progress.len(),
        words_due_for_review: words_due,
        total_reviews,
        average_quality: round2(average_quality),
        success_rate_percentage: round2(success_rate),
    }
}

/// Fold the word catalogue and the event-log size into [`GlobalStats`]
pub fn global_stats(words: &[Word], total_study_sessions: u64) -> GlobalStats {
    let mut difficulty_distribution: BTreeMap<String, u32> = BTreeMap::new();
    for word in words {
        *difficulty_distribution
            .entry(word.difficulty.as_str().to_string())
            .or_insert(0) += 1;
    }

    let average_sessions_per_word = if words.is_empty() {
        0.0
    } else {
        round2(total_study_sessions as f64 / words.len() as f64)
    };

    GlobalStats {
        total_words: words.len(),
        total_study_sessions,
        difficulty_distribution,
        average_sessions_per_word,
    }
}
