//! Spending Tracker API
//!
//! Personal and shared income/expense tracking:
//! - Users with JWT access and refresh tokens
//! - Categories and transactions with filtering, search and bulk import
//! - Groups whose members share transactions
//! - Analytics reports and CSV/XLSX export

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use rand::Rng;
use sqlx::PgPool;
use tracing::{info, warn};

use api::state::AppState;
use config::StorageBackend;
use domain::{CategoryRepository, GroupRepository, TransactionRepository, UserRepository};
use infrastructure::{
    analytics::AnalyticsService,
    auth::{JwtConfig, JwtGenerator, JwtService},
    category::{CategoryService, InMemoryCategoryRepository, PostgresCategoryRepository},
    group::{GroupService, InMemoryGroupRepository, PostgresGroupRepository},
    storage::{connect_pool, run_storage_migrations, PostgresConfig},
    transaction::{InMemoryTransactionRepository, PostgresTransactionRepository, TransactionService},
    user::{Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService},
};

/// Repository set shared by the services
struct Repositories {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    transactions: Arc<dyn TransactionRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            transactions: Arc::new(InMemoryTransactionRepository::new()),
            groups: Arc::new(InMemoryGroupRepository::new()),
        }
    }

    fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            transactions: Arc::new(PostgresTransactionRepository::new(pool.clone())),
            groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
        }
    }
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let backend = config.storage.backend;
    info!(backend = backend.as_str(), "Initializing storage");

    let (repositories, pool) = match backend {
        StorageBackend::Memory => (Repositories::in_memory(), None),
        StorageBackend::Postgres => {
            let pool = connect_database(config).await?;
            if config.storage.run_migrations {
                let applied = run_storage_migrations(&pool).await?;
                info!(applied, "Database tables created successfully");
            }
            (Repositories::postgres(&pool), Some(pool))
        }
    };

    let Repositories {
        users,
        categories,
        transactions,
        groups,
    } = repositories;

    let user_service = Arc::new(UserService::new(
        users.clone(),
        Arc::new(Argon2Hasher::new()),
    ));
    let category_service = Arc::new(CategoryService::new(
        categories.clone(),
        transactions.clone(),
    ));
    let transaction_service = Arc::new(TransactionService::new(
        transactions.clone(),
        categories.clone(),
        groups.clone(),
    ));
    let group_service = Arc::new(GroupService::new(
        groups.clone(),
        users.clone(),
        transactions.clone(),
    ));
    let analytics_service = Arc::new(AnalyticsService::new(
        transactions,
        categories,
        groups,
        users,
    ));

    Ok(AppState::new(
        user_service,
        category_service,
        transaction_service,
        group_service,
        analytics_service,
        create_jwt_service(config),
        backend,
        pool,
    ))
}

/// Connect to PostgreSQL using the storage settings
pub async fn connect_database(config: &AppConfig) -> anyhow::Result<PgPool> {
    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(
        &PostgresConfig::new(&config.storage.database_url)
            .with_max_connections(config.storage.max_connections),
    )
    .await?;
    Ok(pool)
}

/// Generate a random token signing secret
fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

fn create_jwt_service(config: &AppConfig) -> Arc<dyn JwtGenerator> {
    let secret = config
        .auth
        .secret_key
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| {
            warn!(
                "No SECRET_KEY configured. Generating random secret. \
                Tokens will NOT survive restarts."
            );
            generate_random_secret()
        });

    Arc::new(JwtService::new(JwtConfig::new(
        secret,
        config.auth.access_token_expire_minutes,
        config.auth.refresh_token_expire_days,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_secret_shape() {
        let a = generate_random_secret();
        let b = generate_random_secret();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_memory_state_has_no_pool() {
        let state = create_app_state_with_config(&AppConfig::for_tests())
            .await
            .unwrap();

        assert_eq!(state.storage_backend, StorageBackend::Memory);
        assert!(state.pool.is_none());
        assert!(state.database_status().await.is_ok());
    }
}
