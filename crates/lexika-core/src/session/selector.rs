//! Study-block selection
//!
//! Pure ranking over a user's candidate words. No clock, no I/O: the caller
//! supplies today's date and the candidate set, and gets back an ordered,
//! bounded list of word ids.

use chrono::NaiveDate;

use crate::vocab::{FrequencyRank, ValidationError, WordId};

/// One word considered for a study block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyCandidate {
    pub word_id: WordId,
    pub frequency_rank: FrequencyRank,
    /// None for a word the user has never been exposed to
    pub due_date: Option<NaiveDate>,
}

impl StudyCandidate {
    fn overdue_days(&self, today: NaiveDate) -> i64 {
        match self.due_date {
            Some(due) => (today - due).num_days(),
            // Never-seen words are eligible immediately but carry no
            // overdueness, so real backlog always outranks them.
            None => 0,
        }
    }
}

/// Select and order the words for one study session.
///
/// Filters to candidates due on or before `today` (never-seen words are
/// always eligible), orders by overdue days descending, then frequency rank
/// ascending, then word id, and truncates to `limit`. An empty result is
/// valid; a non-positive `limit` is not.
pub fn select_study_block(
    candidates: &[StudyCandidate],
    today: NaiveDate,
    limit: i32,
) -> Result<Vec<WordId>, ValidationError> {
    if limit <= 0 {
        return Err(ValidationError::InvalidLimit(limit));
    }

    let mut eligible: Vec<&StudyCandidate> = candidates
        .iter()
        .filter(|c| c.due_date.is_none_or(|due| due <= today))
        .collect();

    eligible.sort_by_key(|c| {
        (
            -c.overdue_days(today),
            c.frequency_rank.value(),
            c.word_id.value(),
        )
    });

    Ok(eligible
        .into_iter()
        .take(limit as usize)
        .map(|c| c.word_id)
        .collect())
}
