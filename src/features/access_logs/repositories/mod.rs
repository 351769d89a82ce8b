mod access_log_repository;

pub use access_log_repository::{AccessLogRepository, PgAccessLogRepository};
