use serde::Serialize;
use tracing::{debug, warn};

use crate::core::config::CallbackConfig;
use crate::core::error::{AppError, Result};
use crate::features::links::models::CallbackMethod;

/// Stored response bodies are cut to this many characters
const MAX_STORED_RESPONSE_CHARS: usize = 1000;

/// Links relayed to a third-party callback
#[derive(Debug, Clone, Serialize)]
pub struct CallbackPayload {
    pub android_id: String,
    pub stream_link: String,
    pub download_link: String,
}

/// Result of one callback attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub delivered: bool,
    pub status: Option<u16>,
    pub response: Option<String>,
    pub error: Option<String>,
}

/// Relays issued links to publisher callbacks
pub struct CallbackClient {
    client: reqwest::Client,
    default_method: CallbackMethod,
}

impl CallbackClient {
    pub fn new(config: &CallbackConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build callback client: {}", e)))?;

        let default_method =
            CallbackMethod::parse(&config.default_method).unwrap_or(CallbackMethod::Post);

        Ok(Self {
            client,
            default_method,
        })
    }

    pub fn default_method(&self) -> CallbackMethod {
        self.default_method
    }

    /// Send the payload. Never fails: transport errors and non-2xx statuses
    /// are reported in the outcome.
    pub async fn deliver(
        &self,
        url: &str,
        method: CallbackMethod,
        payload: &CallbackPayload,
    ) -> CallbackOutcome {
        debug!("Relaying links to callback via {}", method.as_str());

        let request = match method {
            CallbackMethod::Get => self.client.get(url).query(payload),
            CallbackMethod::Post => self.client.post(url).json(payload),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Callback request failed: {}", e);
                return CallbackOutcome {
                    delivered: false,
                    status: None,
                    response: None,
                    error: Some(format!("Callback request failed: {}", e)),
                };
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_STORED_RESPONSE_CHARS).collect();

        if status.is_success() {
            CallbackOutcome {
                delivered: true,
                status: Some(status.as_u16()),
                response: Some(body),
                error: None,
            }
        } else {
            warn!("Callback responded with status {}", status);
            CallbackOutcome {
                delivered: false,
                status: Some(status.as_u16()),
                response: Some(body),
                error: Some(format!("Callback responded with status {}", status.as_u16())),
            }
        }
    }
}
