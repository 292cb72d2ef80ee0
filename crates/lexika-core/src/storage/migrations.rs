//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: words, per-user progress, event log",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Optimistic locking on user_progress + due-date index",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    translation TEXT NOT NULL,
    difficulty TEXT NOT NULL DEFAULT 'medium',
    frequency_rank INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_words_frequency ON words(frequency_rank);

-- One scheduling record per (user, word); mutated only by submit_answer
CREATE TABLE IF NOT EXISTS user_progress (
    user_id TEXT NOT NULL,
    word_id INTEGER NOT NULL,
    repetitions INTEGER NOT NULL DEFAULT 0,
    ease_factor REAL NOT NULL DEFAULT 2.5,
    interval_days INTEGER NOT NULL DEFAULT 0,
    due_date TEXT NOT NULL,
    last_reviewed_at TEXT,
    PRIMARY KEY (user_id, word_id),
    FOREIGN KEY (word_id) REFERENCES words(id) ON DELETE CASCADE
);

-- Append-only audit log of answers; never updated or deleted
CREATE TABLE IF NOT EXISTS study_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_type TEXT NOT NULL,  -- 'answer_submitted', 'word_learned'
    user_id TEXT NOT NULL,
    word_id INTEGER NOT NULL,
    quality INTEGER,
    response_time_secs REAL,
    previous_interval INTEGER,
    new_interval INTEGER,
    repetitions INTEGER,
    ease_factor REAL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (word_id) REFERENCES words(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_events_user_word ON study_events(user_id, word_id);
CREATE INDEX IF NOT EXISTS idx_events_created ON study_events(created_at);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Optimistic-lock version counter so concurrent submit_answer calls for
/// the same (user, word) can never interleave a read-modify-write
const MIGRATION_V2_UP: &str = r#"
ALTER TABLE user_progress ADD COLUMN version INTEGER NOT NULL DEFAULT 0;

CREATE INDEX IF NOT EXISTS idx_progress_user_due ON user_progress(user_id, due_date);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            // execute_batch handles the multi-statement SQL
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
