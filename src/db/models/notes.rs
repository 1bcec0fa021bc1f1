//! Note table operations, including the shared-with set and the
//! per-owner analytics aggregation.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult, params};
use uuid::Uuid;

use super::super::Database;
use super::users::parse_timestamp;
use crate::models::{MonthlyCounts, Note, NoteAnalytics, NoteRecord, UserSummary, month_label};

impl Database {
    /// Insert a note and its shared-with set in one transaction. The
    /// caller is responsible for normalizing `shared_with` beforehand
    /// (deduplicated, owner stripped).
    pub fn create_note(
        &self,
        owner_id: &str,
        title: &str,
        text: &str,
        is_private: bool,
        shared_with: &[String],
    ) -> SqliteResult<Note> {
        let mut guard = self.conn.lock().unwrap();
        let tx = guard.transaction()?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        tx.execute(
            "INSERT INTO notes (id, title, text, user_id, is_private, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![id, title, text, owner_id, is_private as i64, now_str],
        )?;

        for (position, user_id) in shared_with.iter().enumerate() {
            tx.execute(
                "INSERT INTO note_shares (note_id, user_id, position) VALUES (?1, ?2, ?3)",
                params![id, user_id, position as i64],
            )?;
        }

        tx.commit()?;

        Ok(Note {
            id,
            title: title.to_string(),
            text: text.to_string(),
            user: owner_id.to_string(),
            is_private,
            shared_with: shared_with.to_vec(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_note(&self, id: &str) -> SqliteResult<Option<Note>> {
        let conn = self.conn.lock().unwrap();
        get_note_inner(&conn, id)
    }

    /// Replace a note's shared-with set (full replace, not merge).
    /// The caller must have verified ownership and normalized the list.
    pub fn replace_shared_with(&self, note_id: &str, shared_with: &[String]) -> SqliteResult<()> {
        let mut guard = self.conn.lock().unwrap();
        let tx = guard.transaction()?;

        tx.execute("DELETE FROM note_shares WHERE note_id = ?1", [note_id])?;
        for (position, user_id) in shared_with.iter().enumerate() {
            tx.execute(
                "INSERT INTO note_shares (note_id, user_id, position) VALUES (?1, ?2, ?3)",
                params![note_id, user_id, position as i64],
            )?;
        }
        tx.execute(
            "UPDATE notes SET updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), note_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Update title and/or text. Ownership is checked by the caller.
    pub fn update_note_content(
        &self,
        note_id: &str,
        title: Option<&str>,
        text: Option<&str>,
    ) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        let now_str = Utc::now().to_rfc3339();

        conn.execute(
            "UPDATE notes SET title = COALESCE(?1, title), text = COALESCE(?2, text), updated_at = ?3
             WHERE id = ?4",
            params![title, text, now_str, note_id],
        )?;
        Ok(())
    }

    pub fn set_note_privacy(&self, note_id: &str, is_private: bool) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE notes SET is_private = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_private as i64, Utc::now().to_rfc3339(), note_id],
        )?;
        Ok(())
    }

    /// Delete scoped by note id AND owner id in the same statement. A
    /// non-owner finds no matching row, so the caller reports NotFound
    /// rather than revealing the note exists.
    pub fn delete_note_owned(&self, note_id: &str, owner_id: &str) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            params![note_id, owner_id],
        )?;
        Ok(rows > 0)
    }

    /// All notes owned by the caller, identities expanded
    pub fn list_notes_by_owner(&self, owner_id: &str) -> SqliteResult<Vec<NoteRecord>> {
        let conn = self.conn.lock().unwrap();
        list_records(
            &conn,
            "WHERE n.user_id = ?1 ORDER BY n.created_at DESC",
            params![owner_id],
            true,
        )
    }

    /// All notes with is_private = false, readable by any caller.
    /// Shared-with identities stay unexpanded; the recipient list is not
    /// for anonymous eyes.
    pub fn list_public_notes(&self) -> SqliteResult<Vec<NoteRecord>> {
        let conn = self.conn.lock().unwrap();
        list_records(
            &conn,
            "WHERE n.is_private = 0 ORDER BY n.created_at DESC",
            params![],
            false,
        )
    }

    /// Notes whose shared-with set contains the caller
    pub fn list_notes_shared_with(&self, user_id: &str) -> SqliteResult<Vec<NoteRecord>> {
        let conn = self.conn.lock().unwrap();
        list_records(
            &conn,
            "WHERE EXISTS (SELECT 1 FROM note_shares s WHERE s.note_id = n.id AND s.user_id = ?1)
             ORDER BY n.created_at DESC",
            params![user_id],
            true,
        )
    }

    /// Totals and per-month breakdown for one owner's notes. Read-only;
    /// months appear only when at least one note was created in them.
    pub fn note_analytics(&self, owner_id: &str) -> SqliteResult<NoteAnalytics> {
        let conn = self.conn.lock().unwrap();

        // The three non-created counters partition the owner's notes:
        // shared (>=1 share entry), private (is_private, unshared), public.
        let (total_created, shared_notes, private_notes, public_notes) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN EXISTS
                        (SELECT 1 FROM note_shares s WHERE s.note_id = n.id) THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN n.is_private = 1 AND NOT EXISTS
                        (SELECT 1 FROM note_shares s WHERE s.note_id = n.id) THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN n.is_private = 0 THEN 1 ELSE 0 END), 0)
             FROM notes n WHERE n.user_id = ?1",
            [owner_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;

        let mut stmt = conn.prepare(
            "SELECT CAST(strftime('%m', n.created_at) AS INTEGER) AS month,
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN EXISTS
                        (SELECT 1 FROM note_shares s WHERE s.note_id = n.id) THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN n.is_private = 1 AND NOT EXISTS
                        (SELECT 1 FROM note_shares s WHERE s.note_id = n.id) THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN n.is_private = 0 THEN 1 ELSE 0 END), 0)
             FROM notes n WHERE n.user_id = ?1
             GROUP BY month ORDER BY month ASC",
        )?;

        let monthly_data = stmt
            .query_map([owner_id], |row| {
                let month: u32 = row.get(0)?;
                Ok(MonthlyCounts {
                    month: month_label(month),
                    created: row.get(1)?,
                    shared: row.get(2)?,
                    private: row.get(3)?,
                    public: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(NoteAnalytics {
            total_created,
            shared_notes,
            private_notes,
            public_notes,
            monthly_data,
        })
    }
}

fn get_note_inner(conn: &Connection, id: &str) -> SqliteResult<Option<Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, text, user_id, is_private, created_at, updated_at
         FROM notes WHERE id = ?1",
    )?;

    let note = stmt
        .query_row([id], |row| {
            let created_at: String = row.get(5)?;
            let updated_at: String = row.get(6)?;
            Ok(Note {
                id: row.get(0)?,
                title: row.get(1)?,
                text: row.get(2)?,
                user: row.get(3)?,
                is_private: row.get::<_, i64>(4)? != 0,
                shared_with: Vec::new(),
                created_at: parse_timestamp(&created_at),
                updated_at: parse_timestamp(&updated_at),
            })
        })
        .optional()?;

    match note {
        Some(mut note) => {
            note.shared_with = load_share_ids(conn, &note.id)?;
            Ok(Some(note))
        }
        None => Ok(None),
    }
}

fn load_share_ids(conn: &Connection, note_id: &str) -> SqliteResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT user_id FROM note_shares WHERE note_id = ?1 ORDER BY position ASC")?;
    stmt.query_map([note_id], |row| row.get::<_, String>(0))?
        .collect()
}

/// Shared listing query: notes joined with their owner's summary fields,
/// shared-with identities expanded in a second lookup per note when
/// `expand_shares` is set. Shared ids that no longer resolve to a user
/// are dropped from the expansion.
fn list_records<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    filter_params: P,
    expand_shares: bool,
) -> SqliteResult<Vec<NoteRecord>> {
    let sql = format!(
        "SELECT n.id, n.title, n.text, n.is_private, n.created_at, n.updated_at,
                u.id, u.first_name, u.last_name, u.email
         FROM notes n JOIN users u ON u.id = n.user_id {}",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;

    let mut records = stmt
        .query_map(filter_params, |row| {
            let created_at: String = row.get(4)?;
            let updated_at: String = row.get(5)?;
            Ok(NoteRecord {
                id: row.get(0)?,
                title: row.get(1)?,
                text: row.get(2)?,
                is_private: row.get::<_, i64>(3)? != 0,
                created_at: parse_timestamp(&created_at),
                updated_at: parse_timestamp(&updated_at),
                user: UserSummary {
                    id: row.get(6)?,
                    first_name: row.get(7)?,
                    last_name: row.get(8)?,
                    email: row.get(9)?,
                },
                shared_with: Vec::new(),
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;

    if expand_shares {
        let mut share_stmt = conn.prepare(
            "SELECT u.id, u.first_name, u.last_name, u.email
             FROM note_shares s JOIN users u ON u.id = s.user_id
             WHERE s.note_id = ?1 ORDER BY s.position ASC",
        )?;

        for record in &mut records {
            record.shared_with = share_stmt
                .query_map([&record.id], |row| {
                    Ok(UserSummary {
                        id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        email: row.get(3)?,
                    })
                })?
                .collect::<SqliteResult<Vec<_>>>()?;
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::policy::normalize_shared_with;

    fn test_db() -> Database {
        Database::new_in_memory().expect("Failed to open in-memory database")
    }

    fn seed_user(db: &Database, name: &str, email: &str) -> User {
        db.create_user(name, None, email, "$hash", "1990-01-01", "", "")
            .expect("Failed to create user")
    }

    #[test]
    fn test_create_and_get_note() {
        let db = test_db();
        let owner = seed_user(&db, "A", "a@example.com");

        let note = db
            .create_note(&owner.id, "T", "X", true, &[])
            .expect("Failed to create note");
        assert!(note.is_private);
        assert!(note.shared_with.is_empty());

        let fetched = db.get_note(&note.id).unwrap().unwrap();
        assert_eq!(fetched.title, "T");
        assert_eq!(fetched.user, owner.id);
        assert!(db.get_note("missing").unwrap().is_none());
    }

    #[test]
    fn test_share_replace_is_full_replace() {
        let db = test_db();
        let owner = seed_user(&db, "A", "a@example.com");
        let b = seed_user(&db, "B", "b@example.com");
        let c = seed_user(&db, "C", "c@example.com");

        let note = db.create_note(&owner.id, "T", "X", true, &[b.id.clone()]).unwrap();

        db.replace_shared_with(&note.id, &[c.id.clone()]).unwrap();
        let fetched = db.get_note(&note.id).unwrap().unwrap();
        assert_eq!(fetched.shared_with, vec![c.id.clone()]);

        db.replace_shared_with(&note.id, &[]).unwrap();
        let fetched = db.get_note(&note.id).unwrap().unwrap();
        assert!(fetched.shared_with.is_empty());
    }

    #[test]
    fn test_normalized_share_has_no_owner_or_duplicates() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let b = seed_user(&db, "B", "b@example.com");

        let note = db.create_note(&a.id, "T", "X", true, &[]).unwrap();

        // The worked example: A shares with [B, A, B]
        let raw = vec![b.id.clone(), a.id.clone(), b.id.clone()];
        let normalized = normalize_shared_with(&a.id, &raw);
        db.replace_shared_with(&note.id, &normalized).unwrap();

        let fetched = db.get_note(&note.id).unwrap().unwrap();
        assert_eq!(fetched.shared_with, vec![b.id.clone()]);
    }

    #[test]
    fn test_delete_is_owner_scoped() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let b = seed_user(&db, "B", "b@example.com");

        let note = db.create_note(&a.id, "T", "X", true, &[]).unwrap();

        // Non-owner delete matches no row; the note survives
        assert!(!db.delete_note_owned(&note.id, &b.id).unwrap());
        assert!(db.get_note(&note.id).unwrap().is_some());

        assert!(db.delete_note_owned(&note.id, &a.id).unwrap());
        assert!(db.get_note(&note.id).unwrap().is_none());
    }

    #[test]
    fn test_public_listing_excludes_private_notes() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");

        db.create_note(&a.id, "Public", "X", false, &[]).unwrap();
        db.create_note(&a.id, "Private", "X", true, &[]).unwrap();

        let public = db.list_public_notes().unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].title, "Public");
        assert_eq!(public[0].user.email, "a@example.com");
    }

    #[test]
    fn test_public_listing_keeps_share_identities_closed() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let b = seed_user(&db, "B", "b@example.com");

        // Public note with a recipient: anyone can read the note, but the
        // anonymous listing must not expand who it was shared with
        db.create_note(&a.id, "Open", "X", false, &[b.id.clone()]).unwrap();

        let public = db.list_public_notes().unwrap();
        assert_eq!(public.len(), 1);
        assert!(public[0].shared_with.is_empty());
    }

    #[test]
    fn test_shared_listing_scoped_to_caller() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let b = seed_user(&db, "B", "b@example.com");
        let c = seed_user(&db, "C", "c@example.com");

        db.create_note(&a.id, "For B", "X", true, &[b.id.clone()]).unwrap();

        let b_view = db.list_notes_shared_with(&b.id).unwrap();
        assert_eq!(b_view.len(), 1);
        assert_eq!(b_view[0].title, "For B");
        assert_eq!(b_view[0].shared_with.len(), 1);
        assert_eq!(b_view[0].shared_with[0].id, b.id);

        assert!(db.list_notes_shared_with(&c.id).unwrap().is_empty());
    }

    #[test]
    fn test_owner_listing_expands_identities() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let b = seed_user(&db, "B", "b@example.com");

        db.create_note(&a.id, "Mine", "X", true, &[b.id.clone()]).unwrap();

        let notes = db.list_notes_by_owner(&a.id).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].user.id, a.id);
        assert_eq!(notes[0].shared_with[0].email, "b@example.com");
    }

    #[test]
    fn test_update_content_and_privacy() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let note = db.create_note(&a.id, "T", "X", true, &[]).unwrap();

        db.update_note_content(&note.id, Some("T2"), None).unwrap();
        let fetched = db.get_note(&note.id).unwrap().unwrap();
        assert_eq!(fetched.title, "T2");
        assert_eq!(fetched.text, "X");

        db.set_note_privacy(&note.id, false).unwrap();
        assert!(!db.get_note(&note.id).unwrap().unwrap().is_private);
    }

    fn backdate(db: &Database, note_id: &str, stamp: &str) {
        let conn = db.conn.lock().unwrap();
        conn.execute(
            "UPDATE notes SET created_at = ?1 WHERE id = ?2",
            params![stamp, note_id],
        )
        .unwrap();
    }

    #[test]
    fn test_analytics_example() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let b = seed_user(&db, "B", "b@example.com");

        // 3 notes in March: 1 shared, 2 private, none public
        let m1 = db.create_note(&a.id, "m1", "x", true, &[b.id.clone()]).unwrap();
        let m2 = db.create_note(&a.id, "m2", "x", true, &[]).unwrap();
        let m3 = db.create_note(&a.id, "m3", "x", true, &[]).unwrap();
        // 1 note in April: public
        let a1 = db.create_note(&a.id, "a1", "x", false, &[]).unwrap();

        backdate(&db, &m1.id, "2026-03-02T10:00:00+00:00");
        backdate(&db, &m2.id, "2026-03-15T10:00:00+00:00");
        backdate(&db, &m3.id, "2026-03-28T10:00:00+00:00");
        backdate(&db, &a1.id, "2026-04-05T10:00:00+00:00");

        let analytics = db.note_analytics(&a.id).unwrap();
        assert_eq!(analytics.total_created, 4);
        assert_eq!(analytics.shared_notes, 1);
        assert_eq!(analytics.private_notes, 2);
        assert_eq!(analytics.public_notes, 1);

        assert_eq!(analytics.monthly_data.len(), 2);
        let mar = &analytics.monthly_data[0];
        assert_eq!(mar.month, "Mar");
        assert_eq!(mar.created, 3);
        assert_eq!(mar.shared, 1);
        assert_eq!(mar.private, 2);
        assert_eq!(mar.public, 0);

        let apr = &analytics.monthly_data[1];
        assert_eq!(apr.month, "Apr");
        assert_eq!(apr.created, 1);
        assert_eq!(apr.shared, 0);
        assert_eq!(apr.private, 0);
        assert_eq!(apr.public, 1);
    }

    #[test]
    fn test_analytics_empty_owner() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let analytics = db.note_analytics(&a.id).unwrap();
        assert_eq!(analytics.total_created, 0);
        assert!(analytics.monthly_data.is_empty());
    }

    #[test]
    fn test_analytics_scoped_to_owner() {
        let db = test_db();
        let a = seed_user(&db, "A", "a@example.com");
        let b = seed_user(&db, "B", "b@example.com");

        db.create_note(&a.id, "mine", "x", true, &[]).unwrap();
        db.create_note(&b.id, "theirs", "x", false, &[]).unwrap();

        let analytics = db.note_analytics(&a.id).unwrap();
        assert_eq!(analytics.total_created, 1);
        assert_eq!(analytics.public_notes, 0);
    }
}
