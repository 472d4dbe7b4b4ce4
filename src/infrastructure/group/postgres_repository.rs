//! PostgreSQL group repository
//!
//! Groups live in `user_groups`; membership rows in `group_members`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

use crate::domain::group::{Group, GroupId, GroupRepository, NewGroup};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::{is_unique_violation, storage_error, to_bind};

const GROUP_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn members_of(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<UserId>>, DomainError> {
        let rows = sqlx::query(
            "SELECT group_id, user_id FROM group_members WHERE group_id = ANY($1) ORDER BY user_id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to load group members", e))?;

        let mut members: HashMap<i64, Vec<UserId>> = HashMap::new();
        for row in rows {
            let group_id: i64 = row
                .try_get("group_id")
                .map_err(|e| storage_error("Failed to decode member row", e))?;
            let user_id: i64 = row
                .try_get("user_id")
                .map_err(|e| storage_error("Failed to decode member row", e))?;
            members.entry(group_id).or_default().push(UserId::new(user_id));
        }

        Ok(members)
    }

    async fn hydrate(&self, rows: Vec<PgRow>) -> Result<Vec<Group>, DomainError> {
        let ids = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_error("Failed to decode group row", e))?;
        let mut members = self.members_of(&ids).await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row
                    .try_get("id")
                    .map_err(|e| storage_error("Failed to decode group row", e))?;
                row_to_group(row, members.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

fn duplicate_name() -> DomainError {
    DomainError::conflict("Group with this name already exists")
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn get(&self, id: GroupId) -> Result<Option<Group>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {GROUP_COLUMNS} FROM user_groups WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get group", e))?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn get_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &str,
    ) -> Result<Option<Group>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {GROUP_COLUMNS} FROM user_groups WHERE owner_id = $1 AND name = $2"
        ))
        .bind(owner_id.value())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get group by name", e))?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Group>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {GROUP_COLUMNS} FROM user_groups
            WHERE owner_id = $1
               OR id IN (SELECT group_id FROM group_members WHERE user_id = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id.value())
        .bind(limit.map(to_bind))
        .bind(to_bind(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list groups", e))?;

        self.hydrate(rows).await
    }

    async fn create(&self, group: NewGroup) -> Result<Group, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_groups (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.owner_id.value())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name()
            } else {
                storage_error("Failed to create group", e)
            }
        })?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| storage_error("Failed to decode group row", e))?;

        sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
            .bind(id)
            .bind(group.owner_id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to add group owner", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit group", e))?;

        row_to_group(&row, vec![group.owner_id])
    }

    async fn update(&self, group: &Group) -> Result<Group, DomainError> {
        let result = sqlx::query(
            "UPDATE user_groups SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(group.id().value())
        .bind(group.name())
        .bind(group.description())
        .bind(group.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name()
            } else {
                storage_error("Failed to update group", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Group not found"));
        }

        self.get(group.id())
            .await?
            .ok_or_else(|| DomainError::not_found("Group not found"))
    }

    async fn delete(&self, id: GroupId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM user_groups WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete group", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_member(&self, id: GroupId, user_id: UserId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id.value())
        .bind(user_id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to add group member", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(&self, id: GroupId, user_id: UserId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM group_members
            WHERE group_id = $1 AND user_id = $2
              AND user_id <> (SELECT owner_id FROM user_groups WHERE id = $1)
            "#,
        )
        .bind(id.value())
        .bind(user_id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to remove group member", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_group(row: &PgRow, members: Vec<UserId>) -> Result<Group, DomainError> {
    let read = |e: sqlx::Error| storage_error("Failed to decode group row", e);

    Ok(Group::restore(
        GroupId::new(row.try_get("id").map_err(read)?),
        row.try_get("name").map_err(read)?,
        row.try_get("description").map_err(read)?,
        UserId::new(row.try_get("owner_id").map_err(read)?),
        members,
        row.try_get("created_at").map_err(read)?,
        row.try_get("updated_at").map_err(read)?,
    ))
}
