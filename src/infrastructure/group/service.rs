//! Group service: shared ledgers, membership and access rules

use std::sync::Arc;
use tracing::info;

use crate::domain::group::{
    validate_group_description, validate_group_name, Group, GroupId, GroupRepository, NewGroup,
};
use crate::domain::transaction::{
    Transaction, TransactionFilter, TransactionQuery, TransactionRepository,
};
use crate::domain::user::{normalize_email, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    transactions: Arc<dyn TransactionRepository>,
}

fn not_owner() -> DomainError {
    DomainError::not_found("Group not found or you are not the owner")
}

/// The group if `user_id` owns it or belongs to it
pub(crate) async fn require_member(
    groups: &dyn GroupRepository,
    id: GroupId,
    user_id: UserId,
) -> Result<Group, DomainError> {
    match groups.get(id).await? {
        Some(group) if group.is_member(user_id) => Ok(group),
        _ => Err(DomainError::not_found("Group not found or access denied")),
    }
}

impl GroupService {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        transactions: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self {
            groups,
            users,
            transactions,
        }
    }

    async fn require_owner(&self, id: GroupId, user_id: UserId) -> Result<Group, DomainError> {
        match self.groups.get(id).await? {
            Some(group) if group.is_owner(user_id) => Ok(group),
            _ => Err(not_owner()),
        }
    }

    pub async fn create(
        &self,
        owner_id: UserId,
        request: CreateGroupRequest,
    ) -> Result<Group, DomainError> {
        let name = request.name.trim().to_string();
        validate_group_name(&name)?;
        validate_group_description(request.description.as_deref())?;

        if self
            .groups
            .get_by_owner_and_name(owner_id, &name)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("Group with this name already exists"));
        }

        let group = self
            .groups
            .create(NewGroup {
                name,
                description: request.description,
                owner_id,
            })
            .await?;

        info!(group_id = %group.id(), owner_id = %owner_id, "Group created");
        Ok(group)
    }

    pub async fn list(
        &self,
        user_id: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Group>, DomainError> {
        self.groups.list_for_user(user_id, skip, Some(limit)).await
    }

    pub async fn get(&self, user_id: UserId, id: GroupId) -> Result<Group, DomainError> {
        require_member(self.groups.as_ref(), id, user_id).await
    }

    /// Resolve member ids to users; ids with no user record are skipped
    pub async fn members(&self, group: &Group) -> Result<Vec<User>, DomainError> {
        let mut users = Vec::with_capacity(group.member_count());
        for id in group.members() {
            if let Some(user) = self.users.get(*id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Number of groups the user belongs to, and how many of them they own
    pub async fn counts_for(&self, user_id: UserId) -> Result<(usize, usize), DomainError> {
        let groups = self.groups.list_for_user(user_id, 0, None).await?;
        let owned = groups.iter().filter(|g| g.is_owner(user_id)).count();
        Ok((groups.len(), owned))
    }

    pub async fn update(
        &self,
        user_id: UserId,
        id: GroupId,
        request: UpdateGroupRequest,
    ) -> Result<Group, DomainError> {
        let mut group = self.require_owner(id, user_id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            validate_group_name(&name)?;

            if name != group.name() {
                if let Some(existing) = self.groups.get_by_owner_and_name(user_id, &name).await? {
                    if existing.id() != id {
                        return Err(DomainError::conflict(
                            "Group with this name already exists",
                        ));
                    }
                }
                group.set_name(name);
            }
        }

        if let Some(description) = request.description {
            validate_group_description(description.as_deref())?;
            group.set_description(description);
        }

        self.groups.update(&group).await
    }

    /// Removes the group together with the transactions recorded in it
    pub async fn delete(&self, user_id: UserId, id: GroupId) -> Result<(), DomainError> {
        self.require_owner(id, user_id).await?;

        let removed = self.transactions.delete_by_group(id).await?;
        if !self.groups.delete(id).await? {
            return Err(not_owner());
        }

        info!(group_id = %id, transactions = removed, "Group deleted");
        Ok(())
    }

    pub async fn add_member(
        &self,
        user_id: UserId,
        id: GroupId,
        email: &str,
    ) -> Result<Group, DomainError> {
        self.require_owner(id, user_id).await?;

        let member = self
            .users
            .get_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        if !self.groups.add_member(id, member.id()).await? {
            return Err(DomainError::validation(
                "User is already a member of this group",
            ));
        }

        info!(group_id = %id, member_id = %member.id(), "Member added to group");
        self.get(user_id, id).await
    }

    pub async fn remove_member(
        &self,
        user_id: UserId,
        id: GroupId,
        member_id: UserId,
    ) -> Result<Group, DomainError> {
        let group = self.require_owner(id, user_id).await?;

        if group.is_owner(member_id) {
            return Err(DomainError::validation("Group owner cannot be removed"));
        }
        if !self.groups.remove_member(id, member_id).await? {
            return Err(DomainError::not_found("User is not a member of this group"));
        }

        info!(group_id = %id, member_id = %member_id, "Member removed from group");
        self.get(user_id, id).await
    }

    /// Transactions recorded in the group, newest first, with the total count
    pub async fn transactions(
        &self,
        user_id: UserId,
        id: GroupId,
        skip: usize,
        limit: usize,
    ) -> Result<(Vec<Transaction>, usize), DomainError> {
        self.get(user_id, id).await?;

        let filter = TransactionFilter::for_group(id);
        let total = self.transactions.count(&filter).await?;
        let items = self
            .transactions
            .find(&TransactionQuery::new(filter).paginate(skip, limit))
            .await?;

        Ok((items, total))
    }
}
