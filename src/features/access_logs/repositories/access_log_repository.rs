use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::access_logs::models::{AccessLogEntry, NewAccessLogEntry};

#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    async fn insert(&self, entry: NewAccessLogEntry) -> Result<()>;

    async fn list_for_file(&self, file_id: i64, limit: i64, offset: i64)
        -> Result<Vec<AccessLogEntry>>;

    async fn count_for_file(&self, file_id: i64) -> Result<i64>;
}

pub struct PgAccessLogRepository {
    pool: PgPool,
}

impl PgAccessLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogRepository for PgAccessLogRepository {
    async fn insert(&self, entry: NewAccessLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO access_logs (file_id, ip_address, user_agent, success)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.file_id)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(entry.success)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    async fn list_for_file(
        &self,
        file_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AccessLogEntry>> {
        sqlx::query_as::<_, AccessLogEntry>(
            r#"
            SELECT id, file_id, ip_address, user_agent, success, accessed_at
            FROM access_logs
            WHERE file_id = $1
            ORDER BY accessed_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(file_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list access logs: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count_for_file(&self, file_id: i64) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM access_logs WHERE file_id = $1")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count access logs: {:?}", e);
                AppError::Database(e)
            })
    }
}
