use async_trait::async_trait;
use sqlx::Row;

use brainbot_core::domain::UserId;
use brainbot_core::errors::StoreError;
use brainbot_core::subscription::{Subscription, SubscriptionStore, SubscriptionTime};

use super::{backend, corrupt};
use crate::DbPool;

pub struct SqlSubscriptionStore {
    pool: DbPool,
}

impl SqlSubscriptionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_time(row: &sqlx::sqlite::SqliteRow) -> Result<SubscriptionTime, StoreError> {
    let hour: i64 = row.try_get("hour").map_err(backend)?;
    let minute: i64 = row.try_get("minute").map_err(backend)?;
    let hour = u8::try_from(hour).map_err(corrupt)?;
    let minute = u8::try_from(minute).map_err(corrupt)?;
    SubscriptionTime::new(hour, minute).map_err(corrupt)
}

#[async_trait]
impl SubscriptionStore for SqlSubscriptionStore {
    async fn find(&self, chat_id: UserId) -> Result<Option<SubscriptionTime>, StoreError> {
        let row = sqlx::query("SELECT hour, minute FROM subscription WHERE chat_id = ?")
            .bind(chat_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(ref row) => Ok(Some(row_to_time(row)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, chat_id: UserId, time: SubscriptionTime) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO subscription (chat_id, hour, minute) VALUES (?, ?, ?)
             ON CONFLICT(chat_id) DO UPDATE SET
                 hour = excluded.hour,
                 minute = excluded.minute",
        )
        .bind(chat_id.0)
        .bind(i64::from(time.hour()))
        .bind(i64::from(time.minute()))
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, chat_id: UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM subscription WHERE chat_id = ?")
            .bind(chat_id.0)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Subscription>, StoreError> {
        let rows = sqlx::query("SELECT chat_id, hour, minute FROM subscription ORDER BY chat_id")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.iter()
            .map(|row| {
                let chat_id: i64 = row.try_get("chat_id").map_err(backend)?;
                Ok(Subscription { chat_id: UserId(chat_id), time: row_to_time(row)? })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use brainbot_core::domain::UserId;
    use brainbot_core::subscription::{SubscriptionStore, SubscriptionTime};

    use super::SqlSubscriptionStore;
    use crate::connection::memory_pool;
    use crate::migrations;

    async fn store() -> SqlSubscriptionStore {
        let pool = memory_pool().await;
        migrations::run_pending(&pool).await.expect("migrate");
        SqlSubscriptionStore::new(pool)
    }

    #[tokio::test]
    async fn upsert_replaces_the_time_for_a_chat() {
        let store = store().await;
        let chat = UserId(7);

        store.upsert(chat, SubscriptionTime::new(9, 0).expect("time")).await.expect("upsert");
        store.upsert(chat, SubscriptionTime::new(18, 30).expect("time")).await.expect("upsert");

        let found = store.find(chat).await.expect("find").expect("subscribed");
        assert_eq!(found.to_string(), "18:30");
        assert_eq!(store.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn remove_unsubscribes_the_chat() {
        let store = store().await;
        let chat = UserId(7);
        store.upsert(chat, SubscriptionTime::new(9, 0).expect("time")).await.expect("upsert");

        store.remove(chat).await.expect("remove");
        assert_eq!(store.find(chat).await.expect("find"), None);
        assert!(store.list().await.expect("list").is_empty());
    }
}
