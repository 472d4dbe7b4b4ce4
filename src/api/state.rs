//! Application state for shared services

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorageBackend;
use crate::infrastructure::analytics::AnalyticsService;
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::category::CategoryService;
use crate::infrastructure::group::GroupService;
use crate::infrastructure::transaction::TransactionService;
use crate::infrastructure::user::UserService;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub category_service: Arc<CategoryService>,
    pub transaction_service: Arc<TransactionService>,
    pub group_service: Arc<GroupService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub jwt_service: Arc<dyn JwtGenerator>,
    pub storage_backend: StorageBackend,
    /// Present only for the postgres backend; used by readiness checks
    pub pool: Option<PgPool>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_service: Arc<UserService>,
        category_service: Arc<CategoryService>,
        transaction_service: Arc<TransactionService>,
        group_service: Arc<GroupService>,
        analytics_service: Arc<AnalyticsService>,
        jwt_service: Arc<dyn JwtGenerator>,
        storage_backend: StorageBackend,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            user_service,
            category_service,
            transaction_service,
            group_service,
            analytics_service,
            jwt_service,
            storage_backend,
            pool,
        }
    }

    /// Round-trips the database when one is configured
    pub async fn database_status(&self) -> Result<(), String> {
        match &self.pool {
            Some(pool) => sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }
}
