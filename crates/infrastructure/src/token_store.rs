//! On-disk cache for OAuth token responses and saved search results

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::InfrastructureError;

/// File the raw token response is cached in
pub const TOKEN_FILE_NAME: &str = "oauth_token.json";

/// Files under one data directory
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
    token_path: PathBuf,
}

impl TokenStore {
    /// Store rooted at `dir`, caching the token in `dir/oauth_token.json`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            token_path: dir.join(TOKEN_FILE_NAME),
            dir,
        }
    }

    /// Cache the token in the given file instead
    #[must_use]
    pub fn with_token_file(mut self, token_path: impl Into<PathBuf>) -> Self {
        self.token_path = token_path.into();
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Raw token response, or `None` if nothing is cached
    pub async fn load_token(&self) -> Result<Option<String>, InfrastructureError> {
        let path = &self.token_path;
        match tokio::fs::read_to_string(path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => {
                debug!(path = %path.display(), "Loaded cached token");
                Ok(Some(raw))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InfrastructureError::io(path, e)),
        }
    }

    /// Cache a raw token response, creating the directory if needed
    pub async fn store_token(&self, raw: &str) -> Result<PathBuf, InfrastructureError> {
        let path = &self.token_path;
        ensure_parent(path).await?;
        tokio::fs::write(path, raw)
            .await
            .map_err(|e| InfrastructureError::io(path, e))?;
        info!(path = %path.display(), "Stored token");
        Ok(path.clone())
    }

    /// When the cached token was written
    pub async fn token_date(&self) -> Result<Option<DateTime<Utc>>, InfrastructureError> {
        let path = &self.token_path;
        match tokio::fs::metadata(path).await {
            Ok(metadata) => {
                let modified = metadata
                    .modified()
                    .map_err(|e| InfrastructureError::io(path, e))?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InfrastructureError::io(path, e)),
        }
    }

    /// A previously saved result, relative to the data directory
    pub async fn load_stored_result(
        &self,
        name: impl AsRef<Path>,
    ) -> Result<Option<Value>, InfrastructureError> {
        let path = self.dir.join(name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(InfrastructureError::io(path, e)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| InfrastructureError::Json { path, source })
    }

    /// Save a result as pretty JSON; empty content is not written
    ///
    /// Returns the written path.
    pub async fn store_result(
        &self,
        name: impl AsRef<Path>,
        content: &Value,
    ) -> Result<Option<PathBuf>, InfrastructureError> {
        if is_empty(content) {
            debug!("Nothing to store");
            return Ok(None);
        }

        let path = self.dir.join(name);
        ensure_parent(&path).await?;
        let rendered = serde_json::to_string_pretty(content).map_err(|source| {
            InfrastructureError::Json {
                path: path.clone(),
                source,
            }
        })?;
        tokio::fs::write(&path, rendered)
            .await
            .map_err(|e| InfrastructureError::io(&path, e))?;
        info!(path = %path.display(), "Stored result");
        Ok(Some(path))
    }
}

async fn ensure_parent(path: &Path) -> Result<(), InfrastructureError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| InfrastructureError::io(parent, e)),
        _ => Ok(()),
    }
}

fn is_empty(content: &Value) -> bool {
    match content {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
