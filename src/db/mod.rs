pub mod models;

use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed store for the users and notes collections. Opened once
/// at startup and shared across all handlers via `Arc<Database>`.
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(database_url)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// In-memory database for tests
    #[cfg(test)]
    pub fn new_in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id          TEXT PRIMARY KEY,
                first_name  TEXT NOT NULL,
                last_name   TEXT,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                dob         TEXT NOT NULL,
                image       TEXT NOT NULL DEFAULT '',
                image_ref   TEXT NOT NULL DEFAULT '',
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                text        TEXT NOT NULL,
                user_id     TEXT NOT NULL REFERENCES users(id),
                is_private  INTEGER NOT NULL DEFAULT 1,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS note_shares (
                note_id     TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
                user_id     TEXT NOT NULL,
                position    INTEGER NOT NULL,
                UNIQUE(note_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_notes_user ON notes(user_id);
            CREATE INDEX IF NOT EXISTS idx_notes_private ON notes(is_private);
            CREATE INDEX IF NOT EXISTS idx_shares_user ON note_shares(user_id);",
        )?;

        Ok(())
    }
}
