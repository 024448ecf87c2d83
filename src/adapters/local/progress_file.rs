//! JSON file progress backend.

use crate::domain::task::{ProgressDocument, SCHEMA_VERSION};
use crate::error::StoreError;
use crate::ports::progress::ProgressBackend;
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Keeps the whole progress document in one pretty-printed JSON file.
/// Saves go through a sibling `.tmp` file renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ProgressBackend for JsonFileBackend {
    async fn load(&self) -> Result<Option<ProgressDocument>, StoreError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Read(e)),
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let document: ProgressDocument = serde_json::from_slice(&data)?;
        if document.schema_version > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: document.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(Some(document))
    }

    async fn save(&self, document: &ProgressDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::Write)?;
        }

        let json = serde_json::to_vec_pretty(document)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &json)
            .await
            .map_err(StoreError::Write)?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(StoreError::Write)?;
        Ok(())
    }
}
