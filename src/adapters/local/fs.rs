//! Local filesystem adapters: source resolution and directory listings.

use crate::ports::resolver::FileResolver;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Resolves bare file names against an ordered list of directories
/// (the upload directory first, then the working directory).
#[derive(Debug, Clone)]
pub struct LocalFileResolver {
    search_dirs: Vec<PathBuf>,
}

impl LocalFileResolver {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }
}

#[async_trait]
impl FileResolver for LocalFileResolver {
    async fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_plain_file_name(name) {
            tracing::warn!(name, "Rejected source name that is not a plain file name");
            return None;
        }

        for dir in &self.search_dirs {
            let candidate = dir.join(name);
            let is_file = tokio::fs::metadata(&candidate)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if is_file && tokio::fs::File::open(&candidate).await.is_ok() {
                return Some(candidate);
            }
        }
        None
    }
}

/// True for a single normal path component: no separators, no `..`, no root.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.contains('\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Sorted names of the regular files in `dir`, optionally filtered by
/// (case-insensitive) extension. A missing directory lists as empty.
pub async fn list_files(dir: &Path, extensions: Option<&[&str]>) -> Vec<String> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            continue;
        };
        if let Some(extensions) = extensions {
            if !has_extension(&name, extensions) {
                continue;
            }
        }
        files.push(name);
    }
    files.sort();
    files
}

pub fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
