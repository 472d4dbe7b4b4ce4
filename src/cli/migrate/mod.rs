//! Migrate command - applies pending schema migrations

use tracing::info;

use crate::config::StorageBackend;
use crate::infrastructure::storage::run_storage_migrations;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    if config.storage.backend == StorageBackend::Memory {
        info!("Storage backend is in-memory; nothing to migrate");
        return Ok(());
    }

    let pool = crate::connect_database(&config).await?;
    let applied = run_storage_migrations(&pool).await?;
    info!(applied, "Migrations complete");

    pool.close().await;
    Ok(())
}
