use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// A persisted user account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub birth_date: Option<NaiveDate>,
    /// Salted hash, never the raw password
    pub password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Fields of a user about to be inserted.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub birth_date: Option<NaiveDate>,
    pub password: String,
    pub is_active: bool,
}

/// Partial update of a user. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn apply(&self, user: &mut User) {
        if let Some(v) = &self.username {
            user.username = v.clone();
        }
        if let Some(v) = &self.email {
            user.email = v.clone();
        }
        if let Some(v) = &self.first_name {
            user.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            user.last_name = v.clone();
        }
        if let Some(v) = &self.bio {
            user.bio = v.clone();
        }
        if let Some(v) = self.birth_date {
            user.birth_date = v;
        }
        if let Some(v) = &self.password {
            user.password = v.clone();
        }
        if let Some(v) = self.is_active {
            user.is_active = v;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub is_active: Option<bool>,
}

impl UserFilter {
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
        }
    }
}

/// Timestamp format used for storage and output (`2024-01-02T03:04:05.123456Z`).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> User {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        User {
            id: 1,
            username: "ada".into(),
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "".into(),
            bio: String::new(),
            birth_date: None,
            password: "x".into(),
            is_active: true,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_full_name_is_trimmed() {
        assert_eq!(user().full_name(), "Ada");
    }

    #[test]
    fn test_changes_apply() {
        let mut u = user();
        let changes = UserChanges {
            last_name: Some("Lovelace".into()),
            birth_date: Some(NaiveDate::from_ymd_opt(1815, 12, 10)),
            is_active: Some(false),
            ..Default::default()
        };
        changes.apply(&mut u);
        assert_eq!(u.full_name(), "Ada Lovelace");
        assert_eq!(u.birth_date, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert!(!u.is_active);
        assert_eq!(u.username, "ada");
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(format_timestamp(&user().created_at), "2024-05-01T12:00:00.000000Z");
    }
}
