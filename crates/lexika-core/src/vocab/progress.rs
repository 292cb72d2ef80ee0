//! Per-user, per-word learning progress
//!
//! [`WordProgress`] is the one mutable aggregate in the system. It owns the
//! SM-2 scheduling state for a (user, word) pair, applies the scheduler on
//! each submitted answer, and stages domain events for the storage layer to
//! flush on commit. It never reads the wall clock; the review timestamp is
//! always injected.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::events::StudyEvent;
use super::word::{EaseFactor, Quality, ResponseTime, UserId, WordId};
use crate::sm2::compute_next;

/// Scheduling state of one (user, word) pair.
///
/// Invariants: a never-reviewed record has `repetitions == 0` and
/// `interval_days == 0`; after any review,
/// `due_date == last_reviewed_at + interval_days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    pub user_id: UserId,
    pub word_id: WordId,
    /// Consecutive successful reviews
    pub repetitions: u32,
    /// Interval growth multiplier
    pub ease_factor: EaseFactor,
    /// Days between the last review and the next one
    pub interval_days: u32,
    /// Date on which the word becomes eligible for review
    pub due_date: NaiveDate,
    /// None until the first review
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Optimistic-lock counter, managed by the persistence layer
    #[serde(default)]
    pub version: i64,
    /// Events staged by mutations, drained by [`take_events`](Self::take_events)
    #[serde(skip)]
    pending_events: Vec<StudyEvent>,
}

impl WordProgress {
    /// Fresh record for a word the user has never seen: interval 0,
    /// repetitions 0, initial ease, due immediately.
    pub fn new(user_id: UserId, word_id: WordId, today: NaiveDate) -> Self {
        Self {
            user_id,
            word_id,
            repetitions: 0,
            ease_factor: EaseFactor::INITIAL,
            interval_days: 0,
            due_date: today,
            last_reviewed_at: None,
            version: 0,
            pending_events: Vec::new(),
        }
    }

    /// Rehydrate a record from persisted state. No events are staged.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        user_id: UserId,
        word_id: WordId,
        repetitions: u32,
        ease_factor: EaseFactor,
        interval_days: u32,
        due_date: NaiveDate,
        last_reviewed_at: Option<DateTime<Utc>>,
        version: i64,
    ) -> Self {
        Self {
            user_id,
            word_id,
            repetitions,
            ease_factor,
            interval_days,
            due_date,
            last_reviewed_at,
            version,
            pending_events: Vec::new(),
        }
    }

    /// Whether this word is eligible for review on `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due_date <= today
    }

    /// Whether the user has never reviewed this word
    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }

    /// Apply one answer: run the scheduler, update the schedule, stage events.
    ///
    /// Each call recomputes from the entity's current state. Callers that can
    /// race on the same (user, word) pair must serialize through the
    /// persistence layer's version check; the entity itself has no defense
    /// against interleaved read-modify-write.
    pub fn submit_answer(
        &mut self,
        quality: Quality,
        response_time: ResponseTime,
        now: DateTime<Utc>,
    ) {
        let previous_interval = self.interval_days;

        let next = compute_next(
            self.repetitions,
            self.ease_factor.value(),
            self.interval_days,
            quality,
        );

        self.repetitions = next.repetitions;
        self.ease_factor = EaseFactor::clamped(next.ease_factor);
        self.interval_days = next.interval_days;
        self.last_reviewed_at = Some(now);
        self.due_date = now.date_naive() + Duration::days(next.interval_days as i64);

        self.pending_events.push(StudyEvent::AnswerSubmitted {
            user_id: self.user_id.clone(),
            word_id: self.word_id,
            quality,
            response_time,
            previous_interval,
            new_interval: next.interval_days,
            repetitions: next.repetitions,
            ease_factor: next.ease_factor,
            timestamp: now,
        });

        if self.repetitions == 1 && quality.is_correct() {
            self.pending_events.push(StudyEvent::WordLearned {
                user_id: self.user_id.clone(),
                word_id: self.word_id,
                timestamp: now,
            });
        }
    }

    /// Drain the staged events. The storage layer calls this once per
    /// successful commit; on a failed commit the events are dropped with the
    /// entity.
    pub fn take_events(&mut self) -> Vec<StudyEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Staged events awaiting a commit
    pub fn pending_events(&self) -> &[StudyEvent] {
        &self.pending_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn progress() -> WordProgress {
        WordProgress::new(
            UserId::new("alice").unwrap(),
            WordId::new(1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn fresh_record_invariant() {
        let p = progress();
        assert_eq!(p.repetitions, 0);
        assert_eq!(p.interval_days, 0);
        assert!(p.is_new());
        assert!(p.is_due(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
    }

    #[test]
    fn due_date_tracks_last_review_plus_interval() {
        // due_date == last_reviewed_at + interval_days after every answer
        let mut p = progress();
        let mut now = at(2026, 3, 1);
        for quality in [4, 5, 3, 2, 4, 4, 5, 5] {
            p.submit_answer(
                Quality::new(quality).unwrap(),
                ResponseTime::new(3.0).unwrap(),
                now,
            );
            let expected = now.date_naive() + Duration::days(p.interval_days as i64);
            assert_eq!(p.due_date, expected);
            assert_eq!(p.last_reviewed_at, Some(now));
            now += Duration::days(p.interval_days as i64);
        }
    }

    #[test]
    fn first_pass_schedules_tomorrow() {
        let mut p = progress();
        let now = at(2026, 3, 1);
        p.submit_answer(
            Quality::new(4).unwrap(),
            ResponseTime::new(1.2).unwrap(),
            now,
        );
        assert_eq!(p.repetitions, 1);
        assert_eq!(p.interval_days, 1);
        assert_eq!(p.due_date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert!(!p.is_new());
    }

    #[test]
    fn first_pass_stages_answer_and_learned_events() {
        let mut p = progress();
        p.submit_answer(
            Quality::new(5).unwrap(),
            ResponseTime::new(0.8).unwrap(),
            at(2026, 3, 1),
        );
        let events = p.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], StudyEvent::AnswerSubmitted { .. }));
        assert!(matches!(events[1], StudyEvent::WordLearned { .. }));
        // Drained: a second take is empty
        assert!(p.take_events().is_empty());
    }

    #[test]
    fn failed_answer_stages_only_answer_event() {
        let mut p = progress();
        p.submit_answer(
            Quality::new(1).unwrap(),
            ResponseTime::new(15.0).unwrap(),
            at(2026, 3, 1),
        );
        let events = p.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            StudyEvent::AnswerSubmitted {
                previous_interval,
                new_interval,
                repetitions,
                ..
            } => {
                assert_eq!(*previous_interval, 0);
                assert_eq!(*new_interval, 1);
                assert_eq!(*repetitions, 0);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn fail_keeps_ease_unchanged() {
        // reps=2, ease=2.5, interval=6, then a failing quality 2
        let mut p = progress();
        let now = at(2026, 3, 1);
        p.submit_answer(Quality::new(4).unwrap(), ResponseTime::new(2.0).unwrap(), now);
        p.submit_answer(Quality::new(4).unwrap(), ResponseTime::new(2.0).unwrap(), now);
        assert_eq!(p.repetitions, 2);
        assert_eq!(p.interval_days, 6);

        p.submit_answer(Quality::new(2).unwrap(), ResponseTime::new(9.0).unwrap(), now);
        assert_eq!(p.repetitions, 0);
        assert_eq!(p.interval_days, 1);
        assert_eq!(p.ease_factor.value(), 2.5);
    }

    #[test]
    fn relearned_word_emits_word_learned_again() {
        let mut p = progress();
        let now = at(2026, 3, 1);
        p.submit_answer(Quality::new(4).unwrap(), ResponseTime::new(2.0).unwrap(), now);
        p.submit_answer(Quality::new(0).unwrap(), ResponseTime::new(2.0).unwrap(), now);
        p.take_events();

        p.submit_answer(Quality::new(3).unwrap(), ResponseTime::new(2.0).unwrap(), now);
        let events = p.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, StudyEvent::WordLearned { .. })));
    }
}
