use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{BridgeError, Result};
use crate::store::migrations::run_migrations;
use crate::store::{format_timestamp, NewUser, User, UserChanges, UserFilter, UserRepository};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, bio, birth_date, \
                            password, is_active, created_at, updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// WAL journal with NORMAL sync; temp tables in memory.
    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| BridgeError::LockPoisoned)
    }

    fn user_from_row(row: &Row) -> rusqlite::Result<User> {
        let birth_date: Option<String> = row.get(6)?;
        let birth_date = birth_date
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))
            })
            .transpose()?;

        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            bio: row.get(5)?,
            birth_date,
            password: row.get(7)?,
            is_active: row.get(8)?,
            created_at: parse_timestamp(row, 9)?,
            updated_at: parse_timestamp(row, 10)?,
        })
    }

    fn fetch_user(conn: &Connection, id: i64) -> Result<Option<User>> {
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                [id],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

impl UserRepository for SqliteStore {
    fn create_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn()?;
        let now = format_timestamp(&Utc::now());
        conn.execute(
            "INSERT INTO users (username, email, first_name, last_name, bio, birth_date,
                                password, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                user.username,
                user.email,
                user.first_name,
                user.last_name,
                user.bio,
                format_date(user.birth_date),
                user.password,
                user.is_active,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        Self::fetch_user(&conn, id)?.ok_or_else(|| BridgeError::not_found("User", id))
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        Self::fetch_user(&conn, id)
    }

    fn update_user(&self, id: i64, changes: &UserChanges) -> Result<Option<User>> {
        let conn = self.conn()?;
        let Some(mut user) = Self::fetch_user(&conn, id)? else {
            return Ok(None);
        };
        changes.apply(&mut user);
        user.updated_at = Utc::now();

        conn.execute(
            "UPDATE users SET username = ?1, email = ?2, first_name = ?3, last_name = ?4,
                              bio = ?5, birth_date = ?6, password = ?7, is_active = ?8,
                              updated_at = ?9
             WHERE id = ?10",
            params![
                user.username,
                user.email,
                user.first_name,
                user.last_name,
                user.bio,
                format_date(user.birth_date),
                user.password,
                user.is_active,
                format_timestamp(&user.updated_at),
                id,
            ],
        )?;
        Self::fetch_user(&conn, id)
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    fn set_active(&self, id: i64, is_active: bool) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_active, format_timestamp(&Utc::now()), id],
        )?;
        Ok(updated > 0)
    }

    fn list_users(&self, filter: &UserFilter, limit: i64, offset: i64) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users
             WHERE (?1 IS NULL OR is_active = ?1)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map(params![filter.is_active, limit, offset], Self::user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn count_users(&self, filter: &UserFilter) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE (?1 IS NULL OR is_active = ?1)",
            params![filter.is_active],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn username_taken(&self, username: &str, exclude: Option<i64>) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1 AND (?2 IS NULL OR id != ?2)",
            params![username, exclude],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn email_taken(&self, email: &str, exclude: Option<i64>) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1 AND (?2 IS NULL OR id != ?2)",
            params![email, exclude],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
