mod access_log_dto;

pub use access_log_dto::AccessLogResponseDto;
