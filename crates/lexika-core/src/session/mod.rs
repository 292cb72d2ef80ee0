//! Study Sessions
//!
//! Assembles the bounded, ordered "study block" a learner works through in
//! one sitting: due and overdue reviews first (most overdue at the front),
//! never-seen words filling the remainder, common words breaking ties.

mod block;
mod selector;

pub use block::StudyBlock;
pub use selector::{select_study_block, StudyCandidate};
