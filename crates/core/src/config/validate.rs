use super::{types::Config, ConfigError};

/// Resumable upload chunks must be multiples of this size (except the last).
pub const UPLOAD_CHUNK_GRANULARITY: u64 = 256 * 1024;

/// Validate configuration
/// Currently validates:
/// - Folder ID and title pool are not empty
/// - Page size is within Drive's 1-1000 range
/// - Upload chunk size is a positive multiple of 256 KiB
/// - Timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.source.folder_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "source.folder_id cannot be empty".to_string(),
        ));
    }

    if !(1..=1000).contains(&config.source.page_size) {
        return Err(ConfigError::ValidationError(format!(
            "source.page_size must be between 1 and 1000, got {}",
            config.source.page_size
        )));
    }

    if config.source.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "source.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.publish.titles.iter().all(|t| t.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "publish.titles must contain at least one non-empty title".to_string(),
        ));
    }

    let chunk = config.publish.chunk_size_bytes;
    if chunk == 0 || chunk % UPLOAD_CHUNK_GRANULARITY != 0 {
        return Err(ConfigError::ValidationError(format!(
            "publish.chunk_size_bytes must be a positive multiple of {}, got {}",
            UPLOAD_CHUNK_GRANULARITY, chunk
        )));
    }

    if config.publish.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "publish.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.download.file_prefix.contains(std::path::is_separator) {
        return Err(ConfigError::ValidationError(
            "download.file_prefix cannot contain a path separator".to_string(),
        ));
    }

    Ok(())
}
