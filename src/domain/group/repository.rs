//! Group repository trait

use async_trait::async_trait;

use super::entity::{Group, GroupId, NewGroup};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn get(&self, id: GroupId) -> Result<Option<Group>, DomainError>;

    async fn get_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &str,
    ) -> Result<Option<Group>, DomainError>;

    /// Groups the user owns or belongs to, ordered by id
    async fn list_for_user(
        &self,
        user_id: UserId,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Group>, DomainError>;

    /// Persist a new group with its owner as the first member
    async fn create(&self, group: NewGroup) -> Result<Group, DomainError>;

    /// Update name and description
    async fn update(&self, group: &Group) -> Result<Group, DomainError>;

    async fn delete(&self, id: GroupId) -> Result<bool, DomainError>;

    /// Returns false if the user was already a member
    async fn add_member(&self, id: GroupId, user_id: UserId) -> Result<bool, DomainError>;

    /// Returns false if the user was not a member
    async fn remove_member(&self, id: GroupId, user_id: UserId) -> Result<bool, DomainError>;
}
