//! In-memory group repository

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::group::{Group, GroupId, GroupRepository, NewGroup};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    groups: BTreeMap<GroupId, Group>,
}

#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    state: RwLock<State>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_name() -> DomainError {
    DomainError::conflict("Group with this name already exists")
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn get(&self, id: GroupId) -> Result<Option<Group>, DomainError> {
        Ok(self.state.read().await.groups.get(&id).cloned())
    }

    async fn get_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &str,
    ) -> Result<Option<Group>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .groups
            .values()
            .find(|g| g.owner_id() == owner_id && g.name() == name)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Group>, DomainError> {
        let state = self.state.read().await;
        let visible = state
            .groups
            .values()
            .filter(|g| g.is_member(user_id))
            .skip(offset)
            .cloned();

        Ok(match limit {
            Some(limit) => visible.take(limit).collect(),
            None => visible.collect(),
        })
    }

    async fn create(&self, group: NewGroup) -> Result<Group, DomainError> {
        let mut state = self.state.write().await;

        if state
            .groups
            .values()
            .any(|g| g.owner_id() == group.owner_id && g.name() == group.name)
        {
            return Err(duplicate_name());
        }

        state.last_id += 1;
        let group = Group::from_new(GroupId::new(state.last_id), group);
        state.groups.insert(group.id(), group.clone());

        Ok(group)
    }

    async fn update(&self, group: &Group) -> Result<Group, DomainError> {
        let mut state = self.state.write().await;

        if state.groups.values().any(|g| {
            g.id() != group.id() && g.owner_id() == group.owner_id() && g.name() == group.name()
        }) {
            return Err(duplicate_name());
        }

        let stored = state
            .groups
            .get_mut(&group.id())
            .ok_or_else(|| DomainError::not_found("Group not found"))?;

        // Membership changes go through add_member/remove_member
        stored.set_name(group.name());
        stored.set_description(group.description().map(String::from));

        Ok(stored.clone())
    }

    async fn delete(&self, id: GroupId) -> Result<bool, DomainError> {
        Ok(self.state.write().await.groups.remove(&id).is_some())
    }

    async fn add_member(&self, id: GroupId, user_id: UserId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let group = state
            .groups
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Group not found"))?;

        Ok(group.add_member(user_id))
    }

    async fn remove_member(&self, id: GroupId, user_id: UserId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let group = state
            .groups
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Group not found"))?;

        Ok(group.remove_member(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_group(owner: i64, name: &str) -> NewGroup {
        NewGroup {
            name: name.to_string(),
            description: None,
            owner_id: UserId::new(owner),
        }
    }

    #[tokio::test]
    async fn test_create_includes_owner() {
        let repo = InMemoryGroupRepository::new();
        let group = repo.create(new_group(1, "Flat")).await.unwrap();

        assert_eq!(group.members(), &[UserId::new(1)]);
    }

    #[tokio::test]
    async fn test_duplicate_name_per_owner() {
        let repo = InMemoryGroupRepository::new();
        repo.create(new_group(1, "Flat")).await.unwrap();

        assert!(matches!(
            repo.create(new_group(1, "Flat")).await,
            Err(DomainError::Conflict { .. })
        ));
        assert!(repo.create(new_group(2, "Flat")).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_for_member() {
        let repo = InMemoryGroupRepository::new();
        let flat = repo.create(new_group(1, "Flat")).await.unwrap();
        repo.create(new_group(1, "Trip")).await.unwrap();
        repo.create(new_group(3, "Office")).await.unwrap();

        assert!(repo.add_member(flat.id(), UserId::new(2)).await.unwrap());
        assert!(!repo.add_member(flat.id(), UserId::new(2)).await.unwrap());

        let for_two = repo.list_for_user(UserId::new(2), 0, None).await.unwrap();
        assert_eq!(for_two.len(), 1);
        assert_eq!(for_two[0].name(), "Flat");

        let for_one = repo.list_for_user(UserId::new(1), 1, Some(10)).await.unwrap();
        assert_eq!(for_one.len(), 1);
        assert_eq!(for_one[0].name(), "Trip");
    }

    #[tokio::test]
    async fn test_update_keeps_members() {
        let repo = InMemoryGroupRepository::new();
        let mut group = repo.create(new_group(1, "Flat")).await.unwrap();
        repo.add_member(group.id(), UserId::new(2)).await.unwrap();

        group.set_name("Home");
        let updated = repo.update(&group).await.unwrap();

        assert_eq!(updated.name(), "Home");
        assert_eq!(updated.member_count(), 2);
    }

    #[tokio::test]
    async fn test_owner_cannot_be_removed() {
        let repo = InMemoryGroupRepository::new();
        let group = repo.create(new_group(1, "Flat")).await.unwrap();

        assert!(!repo.remove_member(group.id(), UserId::new(1)).await.unwrap());
    }
}
