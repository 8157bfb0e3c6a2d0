//! Versioned schema migrations for SqliteStore.
//!
//! The applied version lives in the `meta` table under `schema_version`.
//! Each migration runs exactly once.

use rusqlite::Connection;

use crate::error::Result;

pub const CURRENT_SCHEMA_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> Result<()>;

/// All migrations in order. Index + 1 = version number.
const MIGRATIONS: &[MigrationFn] = &[migration_v1_users, migration_v2_user_indexes];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        let version = (idx + 1) as u32;
        if version > current_version {
            migration(conn)?;
            set_schema_version(conn, version)?;
        }
    }

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;

    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .ok();

    Ok(version.and_then(|v| v.parse().ok()).unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [version.to_string()],
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn index_exists(conn: &Connection, index: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?1",
        [index],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

// ============================================================================
// Migrations
// ============================================================================

/// V1: users table.
fn migration_v1_users(conn: &Connection) -> Result<()> {
    if table_exists(conn, "users")? {
        return Ok(());
    }
    conn.execute_batch(
        r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            bio TEXT NOT NULL DEFAULT '',
            birth_date TEXT,
            password TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// V2: indexes for list ordering and the active filter.
fn migration_v2_user_indexes(conn: &Connection) -> Result<()> {
    if index_exists(conn, "idx_users_created")? {
        return Ok(());
    }
    conn.execute_batch(
        r#"
        CREATE INDEX idx_users_created ON users(created_at DESC, id DESC);
        CREATE INDEX idx_users_active ON users(is_active);
        "#,
    )?;
    Ok(())
}
