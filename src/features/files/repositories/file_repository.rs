use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{FileRecord, NewFileRecord};

const FILE_COLUMNS: &str = "id, message_id, filename, file_size, mime_type, access_code, \
     video_duration, requested_by_device_id, stream_token, download_token, link_expiry, \
     is_active, created_at, updated_at";

/// Persistence for access records
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>>;

    async fn find_by_message_id(&self, message_id: i64) -> Result<Option<FileRecord>>;

    async fn find_by_access_code(&self, access_code: &str) -> Result<Option<FileRecord>>;

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<FileRecord>>;

    async fn count(&self) -> Result<i64>;

    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord>;

    /// Bind `device_id` unless the record is already bound to another device.
    ///
    /// Returns `None` when the record is bound to a different device.
    async fn bind_device(&self, id: i64, device_id: &str) -> Result<Option<FileRecord>>;

    /// Overwrite both tokens and the expiry in one write
    async fn set_tokens(
        &self,
        id: i64,
        stream_token: &str,
        download_token: &str,
        link_expiry: DateTime<Utc>,
    ) -> Result<FileRecord>;

    async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<FileRecord>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: i64) -> Result<bool>;
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> AppError {
    tracing::error!("{}: {:?}", context, e);
    AppError::Database(e)
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {} FROM files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch file by id", e))
    }

    async fn find_by_message_id(&self, message_id: i64) -> Result<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {} FROM files WHERE message_id = $1",
            FILE_COLUMNS
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch file by message id", e))
    }

    async fn find_by_access_code(&self, access_code: &str) -> Result<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {} FROM files WHERE access_code = $1",
            FILE_COLUMNS
        ))
        .bind(access_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch file by access code", e))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {} FROM files ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            FILE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list files", e))
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count files", e))
    }

    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord> {
        sqlx::query_as::<_, FileRecord>(&format!(
            r#"
            INSERT INTO files (message_id, filename, file_size, mime_type, access_code, video_duration)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(record.message_id)
        .bind(&record.filename)
        .bind(record.file_size)
        .bind(&record.mime_type)
        .bind(&record.access_code)
        .bind(record.video_duration)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Message {} is already registered",
                        record.message_id
                    ));
                }
            }
            db_error("Failed to insert file", e)
        })
    }

    async fn bind_device(&self, id: i64, device_id: &str) -> Result<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(&format!(
            r#"
            UPDATE files
            SET requested_by_device_id = $2, updated_at = NOW()
            WHERE id = $1
              AND (requested_by_device_id IS NULL OR requested_by_device_id = $2)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(id)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to bind device", e))
    }

    async fn set_tokens(
        &self,
        id: i64,
        stream_token: &str,
        download_token: &str,
        link_expiry: DateTime<Utc>,
    ) -> Result<FileRecord> {
        sqlx::query_as::<_, FileRecord>(&format!(
            r#"
            UPDATE files
            SET stream_token = $2, download_token = $3, link_expiry = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(id)
        .bind(stream_token)
        .bind(download_token)
        .bind(link_expiry)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store link tokens", e))?
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "UPDATE files SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            FILE_COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update file status", e))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete file", e))?;

        Ok(result.rows_affected() > 0)
    }
}
