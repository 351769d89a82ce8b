use std::env;
use std::time::Duration;

use crate::shared::constants::{
    DEFAULT_ACCESS_CODE_BYTES, DEFAULT_CHUNK_SIZE, DEFAULT_LINK_DURATION_GRACE_SECS,
    DEFAULT_LINK_TTL_SECS,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub admin: AdminConfig,
    pub streaming: StreamingConfig,
    pub callback: CallbackConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Public URL of this deployment, used to build stream/download links
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Operator credentials for the admin file-management routes
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Settings consumed by the delivery engine and link issuance
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Size of the chunks pulled from the remote backend
    pub chunk_size: u64,
    /// Random bytes behind each access code (hex-encoded, so the code is twice as long)
    pub access_code_bytes: usize,
    /// Link lifetime when the video duration is unknown
    pub default_link_ttl_secs: i64,
    /// Added to the video duration when it is known
    pub duration_grace_secs: i64,
}

#[derive(Debug, Clone)]
pub struct CallbackConfig {
    pub default_method: String,
    pub timeout: Duration,
}

/// S3-compatible bucket holding the mirrored channel files
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Key prefix under which channel messages are stored
    pub message_prefix: String,
    /// Channel whose messages hold the files
    pub channel_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            admin: AdminConfig::from_env()?,
            streaming: StreamingConfig::from_env()?,
            callback: CallbackConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            base_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Mediagate API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Time-limited media links and ranged delivery".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, String> {
        let username = env::var("ADMIN_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        Ok(Self { username, password })
    }

    /// Returns credentials in "username:password" format; admin routes stay unmounted without them
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StreamingConfig {
    pub fn from_env() -> Result<Self, String> {
        let chunk_size = env::var("STREAM_CHUNK_SIZE")
            .unwrap_or_else(|_| DEFAULT_CHUNK_SIZE.to_string())
            .parse::<u64>()
            .map_err(|_| "STREAM_CHUNK_SIZE must be a valid number".to_string())?;
        if chunk_size < 1024 {
            return Err("STREAM_CHUNK_SIZE must be at least 1024 bytes".to_string());
        }

        let access_code_bytes = env::var("ACCESS_CODE_BYTES")
            .unwrap_or_else(|_| DEFAULT_ACCESS_CODE_BYTES.to_string())
            .parse::<usize>()
            .map_err(|_| "ACCESS_CODE_BYTES must be a valid number".to_string())?;
        if !(4..=16).contains(&access_code_bytes) {
            return Err("ACCESS_CODE_BYTES must be between 4 and 16".to_string());
        }

        let default_link_ttl_secs = env::var("LINK_DEFAULT_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_LINK_TTL_SECS.to_string())
            .parse::<i64>()
            .map_err(|_| "LINK_DEFAULT_TTL_SECS must be a valid number".to_string())?;

        let duration_grace_secs = env::var("LINK_DURATION_GRACE_SECS")
            .unwrap_or_else(|_| DEFAULT_LINK_DURATION_GRACE_SECS.to_string())
            .parse::<i64>()
            .map_err(|_| "LINK_DURATION_GRACE_SECS must be a valid number".to_string())?;

        Ok(Self {
            chunk_size,
            access_code_bytes,
            default_link_ttl_secs,
            duration_grace_secs,
        })
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            access_code_bytes: DEFAULT_ACCESS_CODE_BYTES,
            default_link_ttl_secs: DEFAULT_LINK_TTL_SECS,
            duration_grace_secs: DEFAULT_LINK_DURATION_GRACE_SECS,
        }
    }
}

impl CallbackConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let default_method = env::var("CALLBACK_DEFAULT_METHOD")
            .unwrap_or_else(|_| "POST".to_string())
            .to_uppercase();
        if default_method != "GET" && default_method != "POST" {
            return Err("CALLBACK_DEFAULT_METHOD must be GET or POST".to_string());
        }

        let timeout_secs = env::var("CALLBACK_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "CALLBACK_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            default_method,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key =
            env::var("STORAGE_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key =
            env::var("STORAGE_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("STORAGE_BUCKET").unwrap_or_else(|_| "channel-files".to_string());

        let region = env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let message_prefix =
            env::var("STORAGE_MESSAGE_PREFIX").unwrap_or_else(|_| "messages".to_string());

        let channel_id = env::var("STORAGE_CHANNEL_ID")
            .map_err(|_| "STORAGE_CHANNEL_ID environment variable is required".to_string())?;

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            message_prefix,
            channel_id,
        })
    }
}
