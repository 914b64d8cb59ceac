use async_trait::async_trait;
use sqlx::Row;

use brainbot_core::access::{AccessRole, AccessStore};
use brainbot_core::domain::{Actor, UserId};
use brainbot_core::errors::StoreError;

use super::backend;
use crate::DbPool;

pub struct SqlAccessStore {
    pool: DbPool,
}

impl SqlAccessStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_actor(row: &sqlx::sqlite::SqliteRow) -> Result<Actor, StoreError> {
    let id: i64 = row.try_get("user_id").map_err(backend)?;
    let display_name: String = row.try_get("display_name").map_err(backend)?;
    let handle: Option<String> = row.try_get("handle").map_err(backend)?;
    Ok(Actor { id: UserId(id), display_name, handle })
}

#[async_trait]
impl AccessStore for SqlAccessStore {
    async fn find(&self, role: AccessRole, id: UserId) -> Result<Option<Actor>, StoreError> {
        let row = sqlx::query(
            "SELECT user_id, display_name, handle FROM access_record
             WHERE role = ? AND user_id = ?",
        )
        .bind(role.as_str())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(ref row) => Ok(Some(row_to_actor(row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, role: AccessRole, actor: Actor) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO access_record (user_id, role, display_name, handle)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id, role) DO UPDATE SET
                 display_name = excluded.display_name,
                 handle = excluded.handle",
        )
        .bind(actor.id.0)
        .bind(role.as_str())
        .bind(&actor.display_name)
        .bind(&actor.handle)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, role: AccessRole, id: UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM access_record WHERE role = ? AND user_id = ?")
            .bind(role.as_str())
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list(&self, role: AccessRole) -> Result<Vec<Actor>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, display_name, handle FROM access_record
             WHERE role = ? ORDER BY user_id",
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(row_to_actor).collect()
    }
}
