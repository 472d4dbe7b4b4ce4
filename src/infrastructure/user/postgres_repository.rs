//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::{is_unique_violation, storage_error};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get user", e))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get user by email", e))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("Email already registered")
            } else {
                storage_error("Failed to create user", e)
            }
        })?;

        row_to_user(&row)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, password_hash = $5,
                is_active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id().value())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(user.is_active())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("Email already registered")
            } else {
                storage_error("Failed to update user", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User {} not found", user.id())));
        }

        Ok(user.clone())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to count users", e))?;

        Ok(count as usize)
    }
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let read = |e: sqlx::Error| storage_error("Failed to decode user row", e);

    Ok(User::restore(
        UserId::new(row.try_get("id").map_err(read)?),
        row.try_get("first_name").map_err(read)?,
        row.try_get("last_name").map_err(read)?,
        row.try_get("email").map_err(read)?,
        row.try_get("password_hash").map_err(read)?,
        row.try_get("is_active").map_err(read)?,
        row.try_get("created_at").map_err(read)?,
        row.try_get("updated_at").map_err(read)?,
    ))
}
