//! User table operations

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Result as SqliteResult, params};
use uuid::Uuid;

use super::super::Database;
use crate::models::{User, UserListing};

/// Partial profile update. Fields left as None are not touched; password
/// must already be hashed by the caller.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub dob: Option<String>,
    pub image: Option<(String, String)>,
}

impl Database {
    /// Insert a new user. The email column is UNIQUE; a duplicate email
    /// surfaces as a constraint violation.
    #[allow(clippy::too_many_arguments)]
    pub fn create_user(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        email: &str,
        password_hash: &str,
        dob: &str,
        image: &str,
        image_ref: &str,
    ) -> SqliteResult<User> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        conn.execute(
            "INSERT INTO users (id, first_name, last_name, email, password, dob, image, image_ref, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![id, first_name, last_name, email, password_hash, dob, image, image_ref, now_str],
        )?;

        Ok(User {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.map(|s| s.to_string()),
            email: email.to_string(),
            password: password_hash.to_string(),
            dob: dob.to_string(),
            image: image.to_string(),
            image_ref: image_ref.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn find_user_by_email(&self, email: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, email, password, dob, image, image_ref, created_at, updated_at
             FROM users WHERE email = ?1",
        )?;
        stmt.query_row([email], Self::row_to_user).optional()
    }

    pub fn find_user_by_id(&self, id: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, email, password, dob, image, image_ref, created_at, updated_at
             FROM users WHERE id = ?1",
        )?;
        stmt.query_row([id], Self::row_to_user).optional()
    }

    /// Apply a partial profile update and return the fresh record.
    /// Returns Ok(None) if the user does not exist.
    pub fn update_user(&self, id: &str, update: &UserUpdate) -> SqliteResult<Option<User>> {
        {
            let conn = self.conn.lock().unwrap();
            let now_str = Utc::now().to_rfc3339();

            let mut sets: Vec<String> = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(ref v) = update.first_name {
                sets.push(format!("first_name = ?{}", values.len() + 1));
                values.push(Box::new(v.clone()));
            }
            if let Some(ref v) = update.last_name {
                sets.push(format!("last_name = ?{}", values.len() + 1));
                values.push(Box::new(v.clone()));
            }
            if let Some(ref v) = update.email {
                sets.push(format!("email = ?{}", values.len() + 1));
                values.push(Box::new(v.clone()));
            }
            if let Some(ref v) = update.password {
                sets.push(format!("password = ?{}", values.len() + 1));
                values.push(Box::new(v.clone()));
            }
            if let Some(ref v) = update.dob {
                sets.push(format!("dob = ?{}", values.len() + 1));
                values.push(Box::new(v.clone()));
            }
            if let Some((ref url, ref reference)) = update.image {
                sets.push(format!("image = ?{}", values.len() + 1));
                values.push(Box::new(url.clone()));
                sets.push(format!("image_ref = ?{}", values.len() + 1));
                values.push(Box::new(reference.clone()));
            }

            sets.push(format!("updated_at = ?{}", values.len() + 1));
            values.push(Box::new(now_str));

            let sql = format!(
                "UPDATE users SET {} WHERE id = ?{}",
                sets.join(", "),
                values.len() + 1
            );
            values.push(Box::new(id.to_string()));

            let params_ref: Vec<&dyn rusqlite::ToSql> =
                values.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_ref.as_slice())?;
        }

        self.find_user_by_id(id)
    }

    /// Listing rows for the all-users endpoint
    pub fn list_users(&self) -> SqliteResult<Vec<UserListing>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT first_name, last_name, email, dob, image FROM users ORDER BY created_at ASC",
        )?;

        let users = stmt
            .query_map([], |row| {
                Ok(UserListing {
                    first_name: row.get(0)?,
                    last_name: row.get(1)?,
                    email: row.get(2)?,
                    dob: row.get(3)?,
                    image: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(users)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(8)?;
        let updated_at_str: String = row.get(9)?;

        Ok(User {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            password: row.get(4)?,
            dob: row.get(5)?,
            image: row.get(6)?,
            image_ref: row.get(7)?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }
}

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
