//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: BTreeMap<UserId, User>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email() == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email() == user.email) {
            return Err(DomainError::conflict("Email already registered"));
        }

        state.last_id += 1;
        let user = User::from_new(UserId::new(state.last_id), user);
        state.users.insert(user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user.id()) {
            return Err(DomainError::not_found(format!("User {} not found", user.id())));
        }

        let email_taken = state
            .users
            .values()
            .any(|u| u.email() == user.email() && u.id() != user.id());

        if email_taken {
            return Err(DomainError::conflict("Email already registered"));
        }

        state.users.insert(user.id(), user.clone());
        Ok(user.clone())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.state.read().await.users.len())
    }
}
