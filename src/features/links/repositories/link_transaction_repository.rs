use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::links::models::{LinkTransaction, NewLinkTransaction};

#[async_trait]
pub trait LinkTransactionRepository: Send + Sync {
    async fn insert(&self, transaction: NewLinkTransaction) -> Result<LinkTransaction>;

    async fn list_for_file(
        &self,
        file_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LinkTransaction>>;

    async fn count_for_file(&self, file_id: i64) -> Result<i64>;
}

pub struct PgLinkTransactionRepository {
    pool: PgPool,
}

impl PgLinkTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TRANSACTION_COLUMNS: &str = "id, file_id, message_id, device_id, access_code, \
     stream_link, download_link, callback_url, callback_method, callback_status, \
     callback_response, delivered, created_at";

#[async_trait]
impl LinkTransactionRepository for PgLinkTransactionRepository {
    async fn insert(&self, t: NewLinkTransaction) -> Result<LinkTransaction> {
        sqlx::query_as::<_, LinkTransaction>(&format!(
            r#"
            INSERT INTO link_transactions (
                file_id, message_id, device_id, access_code, stream_link, download_link,
                callback_url, callback_method, callback_status, callback_response, delivered
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(t.file_id)
        .bind(t.message_id)
        .bind(&t.device_id)
        .bind(&t.access_code)
        .bind(&t.stream_link)
        .bind(&t.download_link)
        .bind(&t.callback_url)
        .bind(&t.callback_method)
        .bind(t.callback_status)
        .bind(&t.callback_response)
        .bind(t.delivered)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert link transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_for_file(
        &self,
        file_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LinkTransaction>> {
        sqlx::query_as::<_, LinkTransaction>(&format!(
            r#"
            SELECT {}
            FROM link_transactions
            WHERE file_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(file_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list link transactions: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count_for_file(&self, file_id: i64) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM link_transactions WHERE file_id = $1")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count link transactions: {:?}", e);
                AppError::Database(e)
            })
    }
}
