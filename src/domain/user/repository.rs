//! User repository trait

use async_trait::async_trait;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for user storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their normalized email (for login)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user, assigning its id. Duplicate emails are a conflict.
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Count all users
    async fn count(&self) -> Result<usize, DomainError>;
}
