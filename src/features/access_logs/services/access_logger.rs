use std::sync::Arc;

use tracing::warn;

use crate::core::error::Result;
use crate::core::extractor::ClientInfo;
use crate::features::access_logs::dtos::AccessLogResponseDto;
use crate::features::access_logs::models::NewAccessLogEntry;
use crate::features::access_logs::repositories::AccessLogRepository;
use crate::shared::types::{Meta, PaginationQuery};

/// Records transfer attempts without holding up the response
#[derive(Clone)]
pub struct AccessLogger {
    repository: Arc<dyn AccessLogRepository>,
}

impl AccessLogger {
    pub fn new(repository: Arc<dyn AccessLogRepository>) -> Self {
        Self { repository }
    }

    /// Append one entry in the background. Write failures are only reported
    /// to the operational log.
    pub fn record(&self, file_id: i64, client: &ClientInfo, success: bool) {
        let entry = NewAccessLogEntry {
            file_id,
            ip_address: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            success,
        };
        let repository = Arc::clone(&self.repository);

        tokio::spawn(async move {
            if let Err(e) = repository.insert(entry).await {
                warn!("Failed to write access log for file {}: {}", file_id, e);
            }
        });
    }

    pub async fn list_for_file(
        &self,
        file_id: i64,
        query: &PaginationQuery,
    ) -> Result<(Vec<AccessLogResponseDto>, Meta)> {
        let total = self.repository.count_for_file(file_id).await?;
        let entries = self
            .repository
            .list_for_file(file_id, query.limit(), query.offset())
            .await?;

        Ok((
            entries.into_iter().map(Into::into).collect(),
            query.meta(total),
        ))
    }
}
