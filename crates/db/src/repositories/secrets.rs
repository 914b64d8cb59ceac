use async_trait::async_trait;
use sqlx::Row;

use brainbot_core::errors::StoreError;
use brainbot_core::secrets::SecretPhrases;

use super::backend;
use crate::DbPool;

pub struct SqlSecretPhrases {
    pool: DbPool,
}

impl SqlSecretPhrases {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecretPhrases for SqlSecretPhrases {
    async fn response_for(&self, phrase: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT response FROM secret_phrase WHERE phrase = ?")
            .bind(phrase)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(|row| row.try_get::<String, _>("response").map_err(backend)).transpose()
    }
}
