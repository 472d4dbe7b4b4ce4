//! Database migrations infrastructure

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Applies versioned migrations, tracked in the `_migrations` table
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Applies a migration inside a transaction; returns false if it was already applied
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
                .bind(migration.version)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to check migration status: {}", e))
                })?;

        if applied {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin migration: {}", e)))?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))?;

        Ok(true)
    }

    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
}

impl Migration {
    pub const fn new(version: i64, description: &'static str, up: &'static str) -> Self {
        Self {
            version,
            description,
            up,
        }
    }
}

pub fn storage_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                first_name VARCHAR(50) NOT NULL,
                last_name VARCHAR(50) NOT NULL,
                email VARCHAR(100) NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        ),
        Migration::new(
            2,
            "Create categories table",
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL UNIQUE,
                description TEXT,
                type VARCHAR(16) NOT NULL CHECK (type IN ('income', 'expense')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        ),
        Migration::new(
            3,
            "Create groups and membership tables",
            r#"
            CREATE TABLE IF NOT EXISTS user_groups (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                description TEXT,
                owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (owner_id, name)
            );
            CREATE TABLE IF NOT EXISTS group_members (
                group_id BIGINT NOT NULL REFERENCES user_groups(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                PRIMARY KEY (group_id, user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members(user_id);
            "#,
        ),
        Migration::new(
            4,
            "Create transactions table",
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                type VARCHAR(16) NOT NULL CHECK (type IN ('income', 'expense')),
                category_id BIGINT NOT NULL REFERENCES categories(id),
                amount DOUBLE PRECISION NOT NULL CHECK (amount > 0),
                date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                group_id BIGINT REFERENCES user_groups(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date DESC);
            CREATE INDEX IF NOT EXISTS idx_transactions_group ON transactions(group_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
            "#,
        ),
    ]
}

/// Runs all pending storage migrations
pub async fn run_storage_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let mut applied = 0;

    for migration in storage_migrations() {
        if migrator.run_migration(&migration).await? {
            info!(
                version = migration.version,
                description = migration.description,
                "Applied migration"
            );
            applied += 1;
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_migrations_order() {
        let migrations = storage_migrations();

        for pair in migrations.windows(2) {
            assert!(
                pair[1].version > pair[0].version,
                "Migrations should be in ascending order"
            );
        }
    }

    #[test]
    fn test_storage_migrations_content() {
        for migration in storage_migrations() {
            assert!(!migration.description.is_empty());
            assert!(migration.up.contains("CREATE TABLE"));
        }
    }

    #[test]
    fn test_transactions_depend_on_earlier_tables() {
        let migrations = storage_migrations();
        let position = |table: &str| {
            migrations
                .iter()
                .position(|m| m.up.contains(&format!("CREATE TABLE IF NOT EXISTS {} ", table)))
                .unwrap()
        };

        assert!(position("users") < position("user_groups"));
        assert!(position("categories") < position("transactions"));
        assert!(position("user_groups") < position("transactions"));
    }
}
