use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::core::config::StreamingConfig;
use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{FileResponseDto, RegisterFileDto};
use crate::features::files::models::NewFileRecord;
use crate::features::files::repositories::FileRepository;
use crate::modules::storage::ChunkBackend;
use crate::shared::tokens::random_hex;
use crate::shared::types::{Meta, PaginationQuery};

const ACCESS_CODE_ATTEMPTS: usize = 3;

/// Service for registering and managing access records
pub struct FileService {
    repository: Arc<dyn FileRepository>,
    backend: Arc<dyn ChunkBackend>,
    streaming: StreamingConfig,
}

impl FileService {
    pub fn new(
        repository: Arc<dyn FileRepository>,
        backend: Arc<dyn ChunkBackend>,
        streaming: StreamingConfig,
    ) -> Self {
        Self {
            repository,
            backend,
            streaming,
        }
    }

    /// Register a channel message as a served file
    ///
    /// Resolves the message on the remote backend, snapshots its properties
    /// and issues a fresh access code. The record starts without tokens.
    pub async fn register(&self, dto: RegisterFileDto) -> Result<FileResponseDto> {
        if self
            .repository
            .find_by_message_id(dto.message_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Message {} is already registered",
                dto.message_id
            )));
        }

        let descriptor = self
            .backend
            .resolve_file_descriptor(dto.message_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Message {} not found in channel", dto.message_id))
            })?;
        let properties = self.backend.get_file_properties(&descriptor).await?;

        let file_size = i64::try_from(properties.size)
            .map_err(|_| AppError::Internal(format!("File size {} out of range", properties.size)))?;

        let access_code = self.unused_access_code().await?;
        let record = self
            .repository
            .insert(NewFileRecord {
                message_id: dto.message_id,
                filename: properties.filename,
                file_size,
                mime_type: properties.mime_type,
                access_code,
                video_duration: dto.video_duration.or(properties.duration),
            })
            .await?;

        info!(
            "File registered: id={}, message_id={}, size={}",
            record.id, record.message_id, record.file_size
        );

        Ok(FileResponseDto::from_record(record, Utc::now()))
    }

    async fn unused_access_code(&self) -> Result<String> {
        for _ in 0..ACCESS_CODE_ATTEMPTS {
            let code = random_hex(self.streaming.access_code_bytes);
            if self.repository.find_by_access_code(&code).await?.is_none() {
                return Ok(code);
            }
            debug!("Access code collision, regenerating");
        }

        Err(AppError::Internal(
            "Failed to generate a unique access code".to_string(),
        ))
    }

    /// List access records, newest first
    pub async fn list(&self, query: &PaginationQuery) -> Result<(Vec<FileResponseDto>, Meta)> {
        let total = self.repository.count().await?;
        let records = self.repository.list(query.limit(), query.offset()).await?;

        let now = Utc::now();
        let files = records
            .into_iter()
            .map(|r| FileResponseDto::from_record(r, now))
            .collect();

        Ok((files, query.meta(total)))
    }

    pub async fn get(&self, id: i64) -> Result<FileResponseDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(|r| FileResponseDto::from_record(r, Utc::now()))
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))
    }

    /// Permanently disable every link of a file, issued or future
    pub async fn revoke(&self, id: i64) -> Result<FileResponseDto> {
        let record = self
            .repository
            .set_active(id, false)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

        info!("File revoked: id={}, message_id={}", record.id, record.message_id);
        Ok(FileResponseDto::from_record(record, Utc::now()))
    }

    /// Remove the access record; the remote object is left untouched
    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound(format!("File {} not found", id)));
        }

        info!("File record deleted: id={}", id);
        Ok(())
    }
}
