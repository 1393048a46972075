//! Conversion of user-selected files into pending records.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::IntakeError;
use crate::store::{FileContent, FileRecord};

/// A file handed over by the user, before it becomes a record.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content: FileContent,
    pub last_modified: Option<DateTime<Utc>>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<FileContent>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Reads a file from disk, keeping its file name and modification time.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IntakeError> {
        let path = path.as_ref();

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IntakeError::NoFileName(path.to_path_buf()))?
            .to_string();

        let bytes = std::fs::read(path).map_err(|e| IntakeError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let last_modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        log::debug!(
            "Read {} ({} bytes)",
            crate::sanitize::redact_path(path),
            bytes.len()
        );

        Ok(Self {
            name,
            content: FileContent::from(bytes),
            last_modified,
        })
    }

    /// True when the name carries a `.pdf` extension, ignoring case.
    pub fn has_pdf_extension(&self) -> bool {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    }
}

/// Turns uploads into `Pending` records, one per file, in the given order.
///
/// No type or size validation happens here; unreadable content surfaces later
/// as an extraction error.
pub fn to_records(files: Vec<UploadedFile>) -> Vec<FileRecord> {
    files
        .into_iter()
        .map(|file| FileRecord::pending(file.name, file.content, file.last_modified))
        .collect()
}
