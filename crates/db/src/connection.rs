use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use brainbot_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Open the pool described by the `[database]` config section. The busy
/// timeout tracks the configured acquire timeout so a writer contending on
/// the file lock gives up no later than the pool does.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let busy_timeout_ms = config.timeout_secs.max(1).saturating_mul(1_000);
    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

/// Single-connection in-memory pool for this crate's tests. A pooled
/// `sqlite::memory:` database is private to each connection, so more than
/// one connection would see an unmigrated schema.
#[cfg(test)]
pub(crate) async fn memory_pool() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        timeout_secs: 5,
    };
    connect(&config).await.expect("connect")
}
