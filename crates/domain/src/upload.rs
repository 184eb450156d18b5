// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Synchronous pre-checks run when a file is selected.
//!
//! A file that fails these checks never reaches the draft.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Extensions accepted for the geo-compliance file.
pub const GEO_FILE_EXTENSIONS: &[&str] = &["geojson", "json"];

/// Extensions accepted for evidence documents.
pub const EVIDENCE_FILE_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "doc", "docx", "txt", "geojson", "json",
];

/// Default upload size cap: 10 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Size limits applied at file selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest accepted file in bytes.
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// A selected file as seen by the wizard: its name, size and an opaque
/// reference to the bytes held by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// The original file name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Host-side storage reference, if the bytes were already stored.
    #[serde(default)]
    pub storage_key: Option<String>,
}

fn check_file(file: &FileRef, allowed: &[&str], limits: UploadLimits) -> Result<(), DomainError> {
    let extension: &str = std::path::Path::new(&file.name)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| DomainError::MissingFileExtension {
            file_name: file.name.clone(),
        })?;

    if !allowed
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(extension))
    {
        return Err(DomainError::UnsupportedFileExtension {
            file_name: file.name.clone(),
            allowed: allowed
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<String>>()
                .join(", "),
        });
    }

    if file.size_bytes > limits.max_bytes {
        return Err(DomainError::FileTooLarge {
            file_name: file.name.clone(),
            size_bytes: file.size_bytes,
            max_bytes: limits.max_bytes,
        });
    }

    Ok(())
}

/// Pre-checks a geo-compliance file.
///
/// # Errors
///
/// Returns an error if the extension is not `.geojson`/`.json` or the file
/// exceeds the size cap.
pub fn check_geo_file(file: &FileRef, limits: UploadLimits) -> Result<(), DomainError> {
    check_file(file, GEO_FILE_EXTENSIONS, limits)
}

/// Pre-checks an evidence document file.
///
/// # Errors
///
/// Returns an error if the extension is not on the evidence allow-list or the
/// file exceeds the size cap.
pub fn check_evidence_file(file: &FileRef, limits: UploadLimits) -> Result<(), DomainError> {
    check_file(file, EVIDENCE_FILE_EXTENSIONS, limits)
}
