use std::time::Duration;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    // Every pooled connection to an in-memory SQLite URL would be its own empty database.
    if cfg.is_in_memory() {
        opt.max_connections(1).min_connections(1);
    }
    let db = Database::connect(opt).await?;
    Ok(db)
}

/// Connect, retrying once per `retry_interval_secs` while the database is
/// unavailable, up to `connect_retries` extra attempts.
pub async fn connect_with_retry(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut attempt = 0u32;
    loop {
        match connect_with_config(cfg).await {
            Ok(db) => {
                info!(attempt, "database available");
                return Ok(db);
            }
            Err(e) if attempt < cfg.connect_retries => {
                attempt += 1;
                warn!(attempt, max = cfg.connect_retries, err = %e, "database unavailable, retrying");
                tokio::time::sleep(Duration::from_secs(cfg.retry_interval_secs)).await;
            }
            Err(e) => {
                return Err(e.context(format!("database unavailable after {} attempts", attempt + 1)));
            }
        }
    }
}

/// Apply all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    migration::Migrator::up(db, None).await?;
    Ok(())
}
