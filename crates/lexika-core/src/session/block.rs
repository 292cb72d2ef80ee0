//! Study block assembled for one review session

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vocab::{UserId, Word};

/// Bounded, ordered set of words for one sitting, plus session metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyBlock {
    /// Unique block id (UUID v4)
    pub id: String,
    pub user_id: UserId,
    /// Words in review order
    pub words: Vec<Word>,
    pub created_at: DateTime<Utc>,
    /// Count of words per difficulty band
    pub difficulty_distribution: BTreeMap<String, u32>,
    pub total_words: usize,
}

impl StudyBlock {
    /// Build a block from an already-ordered word list
    pub fn new(user_id: UserId, words: Vec<Word>, created_at: DateTime<Utc>) -> Self {
        let mut difficulty_distribution: BTreeMap<String, u32> = BTreeMap::new();
        for word in &words {
            *difficulty_distribution
                .entry(word.difficulty.as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            total_words: words.len(),
            words,
            created_at,
            difficulty_distribution,
        }
    }

    /// A block with nothing due is valid, not an error
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{DifficultyLevel, FrequencyRank, WordId};

    fn word(id: i64, difficulty: DifficultyLevel) -> Word {
        Word {
            id: WordId::new(id).unwrap(),
            text: format!("word-{id}"),
            translation: format!("translation-{id}"),
            difficulty,
            frequency_rank: FrequencyRank::new(id as u32).unwrap(),
        }
    }

    #[test]
    fn counts_difficulty_distribution() {
        let block = StudyBlock::new(
            UserId::new("alice").unwrap(),
            vec![
                word(1, DifficultyLevel::Easy),
                word(2, DifficultyLevel::Hard),
                word(3, DifficultyLevel::Easy),
            ],
            Utc::now(),
        );
        assert_eq!(block.total_words, 3);
        assert_eq!(block.difficulty_distribution["easy"], 2);
        assert_eq!(block.difficulty_distribution["hard"], 1);
        assert!(!block.is_empty());
    }

    #[test]
    fn empty_block_is_valid() {
        let block = StudyBlock::new(UserId::new("alice").unwrap(), vec![], Utc::now());
        assert!(block.is_empty());
        assert!(block.difficulty_distribution.is_empty());
    }
}
