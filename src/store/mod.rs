pub mod migrations;
pub mod models;
pub mod sqlite;

use crate::error::Result;
pub use models::*;
pub use sqlite::SqliteStore;

/// Persistence for user accounts.
pub trait UserRepository: Send + Sync {
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    /// Returns the updated user, or `None` when no user has that id.
    fn update_user(&self, id: i64, changes: &UserChanges) -> Result<Option<User>>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn set_active(&self, id: i64, is_active: bool) -> Result<bool>;

    /// Users ordered newest first (`created_at` desc, then `id` desc).
    fn list_users(&self, filter: &UserFilter, limit: i64, offset: i64) -> Result<Vec<User>>;
    fn count_users(&self, filter: &UserFilter) -> Result<i64>;

    /// Uniqueness checks; `exclude` skips the user being updated.
    fn username_taken(&self, username: &str, exclude: Option<i64>) -> Result<bool>;
    fn email_taken(&self, email: &str, exclude: Option<i64>) -> Result<bool>;
}
