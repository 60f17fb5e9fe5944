use std::path::{Path, PathBuf};

use crate::config::UploadConfig;
use crate::services::error::ServiceError;
use crate::slug;

const PREFIX_LEN: usize = 16;

/// Writes uploaded images to disk and hands back their public path.
#[derive(Debug, Clone)]
pub struct UploadService {
    directory: PathBuf,
    public_prefix: String,
}

impl UploadService {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Stores `bytes` as `<random>-<file name>` and returns the public path.
    pub async fn store(&self, file_name: Option<&str>, bytes: &[u8]) -> Result<String, ServiceError> {
        let base = file_name
            .and_then(base_name)
            .ok_or_else(|| ServiceError::invalid("Please provide a file!"))?;

        let stored_name = format!("{}-{}", slug::random_suffix(PREFIX_LEN), base);

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| ServiceError::Internal(format!("failed to create upload directory: {}", e)))?;
        tokio::fs::write(self.directory.join(&stored_name), bytes)
            .await
            .map_err(|e| ServiceError::Internal(format!("failed to write {}: {}", stored_name, e)))?;

        tracing::info!("Stored upload {} ({} bytes)", stored_name, bytes.len());
        Ok(format!("{}/{}", self.public_prefix, stored_name))
    }
}

/// Last path component of a client-supplied name, if any is left.
fn base_name(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}
