//! Group entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for GroupId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
}

/// Shared ledger; the owner is always one of the members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    description: Option<String>,
    owner_id: UserId,
    members: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Group {
    pub fn from_new(id: GroupId, new: NewGroup) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: new.name,
            description: new.description,
            owner_id: new.owner_id,
            members: vec![new.owner_id],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn restore(
        id: GroupId,
        name: String,
        description: Option<String>,
        owner_id: UserId,
        members: Vec<UserId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut group = Self {
            id,
            name,
            description,
            owner_id,
            members,
            created_at,
            updated_at,
        };
        group.normalize_members();
        group
    }

    // Getters

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    // Mutators

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    /// Returns false if the user was already a member
    pub fn add_member(&mut self, user_id: UserId) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.members.push(user_id);
        self.members.sort();
        self.touch();
        true
    }

    /// The owner cannot be removed; returns false when nothing changed
    pub fn remove_member(&mut self, user_id: UserId) -> bool {
        if self.is_owner(user_id) || !self.is_member(user_id) {
            return false;
        }
        self.members.retain(|m| *m != user_id);
        self.touch();
        true
    }

    fn normalize_members(&mut self) {
        if !self.members.contains(&self.owner_id) {
            self.members.push(self.owner_id);
        }
        self.members.sort();
        self.members.dedup();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_group() -> Group {
        Group::from_new(
            GroupId::new(1),
            NewGroup {
                name: "Flatmates".to_string(),
                description: None,
                owner_id: UserId::new(10),
            },
        )
    }

    #[test]
    fn test_owner_is_member() {
        let group = create_test_group();
        assert!(group.is_owner(UserId::new(10)));
        assert!(group.is_member(UserId::new(10)));
        assert_eq!(group.member_count(), 1);
    }

    #[test]
    fn test_add_and_remove_member() {
        let mut group = create_test_group();
        assert!(group.add_member(UserId::new(3)));
        assert!(!group.add_member(UserId::new(3)));
        assert_eq!(group.members(), &[UserId::new(3), UserId::new(10)]);

        assert!(group.remove_member(UserId::new(3)));
        assert!(!group.is_member(UserId::new(3)));
    }

    #[test]
    fn test_owner_cannot_be_removed() {
        let mut group = create_test_group();
        assert!(!group.remove_member(UserId::new(10)));
        assert!(group.is_member(UserId::new(10)));
    }

    #[test]
    fn test_restore_adds_missing_owner() {
        let now = Utc::now();
        let group = Group::restore(
            GroupId::new(2),
            "Trip".to_string(),
            None,
            UserId::new(5),
            vec![UserId::new(7), UserId::new(7)],
            now,
            now,
        );
        assert_eq!(group.members(), &[UserId::new(5), UserId::new(7)]);
    }
}
