//! In-memory repositories and service wiring for tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{middleware::from_fn, Router};
use chrono::{DateTime, Utc};

use crate::core::config::{CallbackConfig, StreamingConfig};
use crate::core::error::{AppError, Result};
use crate::core::middleware::basic_auth_middleware;
use crate::features::access_logs::models::{AccessLogEntry, NewAccessLogEntry};
use crate::features::access_logs::repositories::AccessLogRepository;
use crate::features::access_logs::{self, AccessLogger};
use crate::features::delivery::{self, AccessGuard, DeliveryService};
use crate::features::files::models::{FileRecord, NewFileRecord};
use crate::features::files::repositories::FileRepository;
use crate::features::files::{self, FileService};
use crate::features::links::models::{LinkTransaction, NewLinkTransaction};
use crate::features::links::repositories::LinkTransactionRepository;
use crate::features::links::{self, CallbackClient, LinkBuilder, LinkService};
use crate::modules::storage::MemoryChunkBackend;
use crate::shared::constants::TOKEN_BYTES;
use crate::shared::tokens::random_hex;

pub const TEST_BASE_URL: &str = "http://localhost:5000";
pub const TEST_ADMIN_CREDENTIALS: &str = "admin:secret";
pub const TEST_CHUNK_SIZE: u64 = 1024;

/// Let spawned background writes finish
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    records: Mutex<Vec<FileRecord>>,
    next_id: AtomicI64,
}

impl InMemoryFileRepository {
    pub fn get(&self, id: i64) -> Option<FileRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Mutate a stored record in place
    pub fn update(&self, id: i64, f: impl FnOnce(&mut FileRecord)) {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .expect("record exists");
        f(record);
    }

    fn modify(&self, id: i64, f: impl FnOnce(&mut FileRecord)) -> Option<FileRecord> {
        let mut records = self.records.lock().unwrap();
        let record = records.iter_mut().find(|r| r.id == id)?;
        f(record);
        record.updated_at = Utc::now();
        Some(record.clone())
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        Ok(self.get(id))
    }

    async fn find_by_message_id(&self, message_id: i64) -> Result<Option<FileRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.message_id == message_id)
            .cloned())
    }

    async fn find_by_access_code(&self, access_code: &str) -> Result<Option<FileRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.access_code == access_code)
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<FileRecord>> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.records.lock().unwrap().len() as i64)
    }

    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord> {
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.message_id == record.message_id || r.access_code == record.access_code)
        {
            return Err(AppError::Conflict(format!(
                "Message {} is already registered",
                record.message_id
            )));
        }

        let now = Utc::now();
        let stored = FileRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            message_id: record.message_id,
            filename: record.filename,
            file_size: record.file_size,
            mime_type: record.mime_type,
            access_code: record.access_code,
            video_duration: record.video_duration,
            requested_by_device_id: None,
            stream_token: None,
            download_token: None,
            link_expiry: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn bind_device(&self, id: i64, device_id: &str) -> Result<Option<FileRecord>> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        match record.requested_by_device_id.as_deref() {
            Some(bound) if bound != device_id => Ok(None),
            _ => {
                record.requested_by_device_id = Some(device_id.to_string());
                record.updated_at = Utc::now();
                Ok(Some(record.clone()))
            }
        }
    }

    async fn set_tokens(
        &self,
        id: i64,
        stream_token: &str,
        download_token: &str,
        link_expiry: DateTime<Utc>,
    ) -> Result<FileRecord> {
        self.modify(id, |r| {
            r.stream_token = Some(stream_token.to_string());
            r.download_token = Some(download_token.to_string());
            r.link_expiry = Some(link_expiry);
        })
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<FileRecord>> {
        Ok(self.modify(id, |r| r.is_active = is_active))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryAccessLogRepository {
    entries: Mutex<Vec<AccessLogEntry>>,
    fail: bool,
}

impl InMemoryAccessLogRepository {
    /// Repository whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<AccessLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccessLogRepository for InMemoryAccessLogRepository {
    async fn insert(&self, entry: NewAccessLogEntry) -> Result<()> {
        if self.fail {
            return Err(AppError::Internal("access log store unavailable".to_string()));
        }
        let mut entries = self.entries.lock().unwrap();
        let id = entries.len() as i64 + 1;
        entries.push(AccessLogEntry {
            id,
            file_id: entry.file_id,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            success: entry.success,
            accessed_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_for_file(
        &self,
        file_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AccessLogEntry>> {
        Ok(self
            .entries()
            .into_iter()
            .rev()
            .filter(|e| e.file_id == file_id)
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_for_file(&self, file_id: i64) -> Result<i64> {
        Ok(self
            .entries()
            .iter()
            .filter(|e| e.file_id == file_id)
            .count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryLinkTransactionRepository {
    transactions: Mutex<Vec<LinkTransaction>>,
}

impl InMemoryLinkTransactionRepository {
    pub fn all(&self) -> Vec<LinkTransaction> {
        self.transactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkTransactionRepository for InMemoryLinkTransactionRepository {
    async fn insert(&self, t: NewLinkTransaction) -> Result<LinkTransaction> {
        let mut transactions = self.transactions.lock().unwrap();
        let stored = LinkTransaction {
            id: transactions.len() as i64 + 1,
            file_id: t.file_id,
            message_id: t.message_id,
            device_id: t.device_id,
            access_code: t.access_code,
            stream_link: t.stream_link,
            download_link: t.download_link,
            callback_url: t.callback_url,
            callback_method: t.callback_method,
            callback_status: t.callback_status,
            callback_response: t.callback_response,
            delivered: t.delivered,
            created_at: Utc::now(),
        };
        transactions.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_file(
        &self,
        file_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LinkTransaction>> {
        Ok(self
            .all()
            .into_iter()
            .rev()
            .filter(|t| t.file_id == file_id)
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_for_file(&self, file_id: i64) -> Result<i64> {
        Ok(self.all().iter().filter(|t| t.file_id == file_id).count() as i64)
    }
}

/// Services wired to in-memory stores and the in-memory chunk backend
pub struct TestContext {
    pub backend: Arc<MemoryChunkBackend>,
    pub files: Arc<InMemoryFileRepository>,
    pub access_logs: Arc<InMemoryAccessLogRepository>,
    pub transactions: Arc<InMemoryLinkTransactionRepository>,
    pub streaming: StreamingConfig,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(MemoryChunkBackend::new()),
            files: Arc::new(InMemoryFileRepository::default()),
            access_logs: Arc::new(InMemoryAccessLogRepository::default()),
            transactions: Arc::new(InMemoryLinkTransactionRepository::default()),
            streaming: StreamingConfig {
                chunk_size: TEST_CHUNK_SIZE,
                ..StreamingConfig::default()
            },
        }
    }

    /// Put `content` on the backend and register it
    pub async fn seed_file(&self, message_id: i64, content: Vec<u8>) -> FileRecord {
        let file_size = content.len() as i64;
        self.backend
            .insert(message_id, "clip.mp4", "video/mp4", content);
        self.files
            .insert(NewFileRecord {
                message_id,
                filename: "clip.mp4".to_string(),
                file_size,
                mime_type: "video/mp4".to_string(),
                access_code: random_hex(self.streaming.access_code_bytes),
                video_duration: None,
            })
            .await
            .expect("seed file")
    }

    /// Seed a file that is bound to `device-a` and has live tokens
    pub async fn seed_linked_file(&self, message_id: i64, content: Vec<u8>) -> FileRecord {
        let file = self.seed_file(message_id, content).await;
        self.files.update(file.id, |f| {
            f.requested_by_device_id = Some("device-a".to_string());
            f.stream_token = Some(random_hex(TOKEN_BYTES));
            f.download_token = Some(random_hex(TOKEN_BYTES));
            f.link_expiry = Some(Utc::now() + chrono::Duration::hours(1));
        });
        self.files.get(file.id).expect("seeded file")
    }

    pub fn file_service(&self) -> FileService {
        FileService::new(
            self.files.clone(),
            self.backend.clone(),
            self.streaming.clone(),
        )
    }

    pub fn access_logger(&self) -> AccessLogger {
        AccessLogger::new(self.access_logs.clone())
    }

    pub fn access_guard(&self) -> AccessGuard {
        AccessGuard::new(self.files.clone(), self.access_logger())
    }

    pub fn link_service(&self) -> LinkService {
        let callback = CallbackClient::new(&CallbackConfig {
            default_method: "POST".to_string(),
            timeout: Duration::from_secs(5),
        })
        .expect("callback client");

        LinkService::new(
            self.files.clone(),
            self.transactions.clone(),
            callback,
            LinkBuilder::new(TEST_BASE_URL),
            self.streaming.clone(),
        )
    }

    pub fn delivery_service(&self) -> DeliveryService {
        DeliveryService::new(
            self.access_guard(),
            self.access_logger(),
            self.backend.clone(),
            LinkBuilder::new(TEST_BASE_URL),
            self.streaming.chunk_size,
        )
    }

    /// Public and admin routes, admin behind `TEST_ADMIN_CREDENTIALS`
    pub fn router(&self) -> Router {
        let link_service = Arc::new(self.link_service());

        let admin = Router::new()
            .merge(files::routes(Arc::new(self.file_service())))
            .merge(access_logs::routes(Arc::new(self.access_logger())))
            .merge(links::admin_routes(Arc::clone(&link_service)))
            .layer(from_fn(basic_auth_middleware(
                Arc::new(TEST_ADMIN_CREDENTIALS.to_string()),
                "admin",
            )));

        Router::new()
            .merge(delivery::routes(Arc::new(self.delivery_service())))
            .merge(links::routes(link_service))
            .nest("/api/admin", admin)
    }
}
