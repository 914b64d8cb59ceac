use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connection::memory_pool;

    const MANAGED_SCHEMA_OBJECTS: &[&str] =
        &["access_record", "subscription", "secret_phrase", "idx_access_record_role"];

    #[tokio::test]
    async fn migrations_create_the_managed_schema() {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("migrate");

        for object in MANAGED_SCHEMA_OBJECTS {
            let row = sqlx::query("SELECT count(*) AS n FROM sqlite_master WHERE name = ?")
                .bind(object)
                .fetch_one(&pool)
                .await
                .expect("query sqlite_master");
            let count: i64 = row.get("n");
            assert_eq!(count, 1, "expected schema object `{object}`");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = memory_pool().await;
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");
    }
}
