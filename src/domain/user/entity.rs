//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric user identifier assigned by the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data required to persist a new user; the repository assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    first_name: String,
    last_name: String,
    email: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user from a draft once an id has been assigned
    pub fn from_new(id: UserId, new: NewUser) -> Self {
        let now = Utc::now();

        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a stored user
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: UserId,
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            password_hash,
            is_active,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    // Mutators

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        self.first_name = first_name.into();
        self.touch();
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        self.last_name = last_name.into();
        self.touch();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.touch();
    }

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User::from_new(
            UserId::new(1),
            NewUser {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "hashed_password".to_string(),
            },
        )
    }

    #[test]
    fn test_new_user_is_active() {
        let user = create_test_user();
        assert_eq!(user.id().value(), 1);
        assert!(user.is_active());
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn test_full_name() {
        let user = create_test_user();
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = create_test_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(json.contains("ada@example.com"));
    }

    #[test]
    fn test_deactivate_updates_timestamp() {
        let mut user = create_test_user();
        let before = user.updated_at();
        std::thread::sleep(std::time::Duration::from_millis(5));
        user.deactivate();
        assert!(!user.is_active());
        assert!(user.updated_at() > before);
    }
}
