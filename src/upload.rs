//! File upload validation and storage.
//!
//! A file is checked against an [`UploadPolicy`] (size limit and accepted
//! types) before anything is copied into the attachments directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

/// 10 MiB
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_size: u64,
    /// Comma-separated list of `.ext` entries or name fragments; `*` or
    /// empty accepts everything. A `*` inside an entry is ignored.
    pub accept: String,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_UPLOAD_SIZE,
            accept: "*".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredUpload {
    /// `<unix millis>_<original name>`
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Human-readable size: "0 Bytes", "512 Bytes", "1.5 KB", "10 MB"
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

/// Check a file's name and size against the policy
pub fn validate(name: &str, size: u64, policy: &UploadPolicy) -> Result<()> {
    if size > policy.max_size {
        return Err(Error::FileTooLarge {
            name: name.to_string(),
            size,
            max: format_file_size(policy.max_size),
        });
    }

    let accept = policy.accept.trim();
    if accept.is_empty() || accept == "*" {
        return Ok(());
    }

    let file_name = name.to_lowercase();
    let extension = format!(".{}", file_name.rsplit('.').next().unwrap_or_default());
    let accepted = accept
        .split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .any(|entry| entry == extension || file_name.contains(&entry.replace('*', "")));

    if accepted {
        Ok(())
    } else {
        Err(Error::UnsupportedFileType {
            name: name.to_string(),
            accept: policy.accept.clone(),
        })
    }
}

/// Validate `source` and copy it into `attachments_dir`
///
/// Nothing is written when validation fails.
pub fn store_upload(source: &Path, attachments_dir: &Path, policy: &UploadPolicy) -> Result<StoredUpload> {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidArgument(format!("not a file: {}", source.display())))?;

    let metadata = fs::metadata(source)?;
    if !metadata.is_file() {
        return Err(Error::InvalidArgument(format!(
            "not a file: {}",
            source.display()
        )));
    }
    validate(&name, metadata.len(), policy)?;

    fs::create_dir_all(attachments_dir)?;
    let stored_name = format!("{}_{}", Utc::now().timestamp_millis(), name);
    let path = attachments_dir.join(&stored_name);
    fs::copy(source, &path)?;

    info!(file = %stored_name, size = metadata.len(), "stored upload");
    Ok(StoredUpload {
        name: stored_name,
        path,
        size: metadata.len(),
    })
}
