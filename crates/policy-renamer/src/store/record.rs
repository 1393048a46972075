use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier of a record, stable for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared, immutable handle to the raw bytes of an uploaded file.
#[derive(Clone, PartialEq, Eq)]
pub struct FileContent(Arc<[u8]>);

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Arc::from(bytes))
    }
}

impl From<&[u8]> for FileContent {
    fn from(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileContent({} bytes)", self.0.len())
    }
}

/// Processing status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Pending,
    Processing,
    Success,
    Error,
}

impl FileStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Success | FileStatus::Error)
    }

    /// `Pending -> Processing -> {Success, Error}` and nothing else.
    pub fn can_transition_to(self, next: FileStatus) -> bool {
        matches!(
            (self, next),
            (FileStatus::Pending, FileStatus::Processing)
                | (FileStatus::Processing, FileStatus::Success)
                | (FileStatus::Processing, FileStatus::Error)
        )
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Pending => write!(f, "Pending"),
            FileStatus::Processing => write!(f, "Processing"),
            FileStatus::Success => write!(f, "Success"),
            FileStatus::Error => write!(f, "Error"),
        }
    }
}

/// Result of processing one record, applied by [`super::RecordStore::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A concept was found; `derived_name` is the sanitized export name.
    Renamed {
        concept: String,
        derived_name: String,
    },
    /// Text was extracted but held no concept. The original name is kept.
    Unmatched,
    /// Extraction failed with the given message.
    Failed(String),
}

impl Outcome {
    pub fn status(&self) -> FileStatus {
        match self {
            Outcome::Renamed { .. } | Outcome::Unmatched => FileStatus::Success,
            Outcome::Failed(_) => FileStatus::Error,
        }
    }
}

/// One uploaded file and its processing outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: RecordId,
    /// `name-lastModified` key the upload would have had in a browser.
    pub source_key: String,
    #[serde(skip)]
    pub content: FileContent,
    pub original_name: String,
    pub derived_name: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub added_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Creates a `Pending` record whose derived name is the original name.
    pub fn pending(
        original_name: String,
        content: FileContent,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        let source_key = match last_modified {
            Some(ts) => format!("{}-{}", original_name, ts.timestamp_millis()),
            None => original_name.clone(),
        };
        let mime_type = mime_guess::from_path(&original_name)
            .first()
            .map(|m| m.to_string());

        Self {
            id: RecordId::new(),
            source_key,
            size: content.len(),
            content,
            derived_name: original_name.clone(),
            original_name,
            status: FileStatus::Pending,
            error_detail: None,
            concept: None,
            mime_type,
            last_modified,
            added_at: Utc::now(),
            completed_at: None,
        }
    }

    pub(crate) fn apply(&mut self, outcome: Outcome) {
        self.status = outcome.status();
        self.completed_at = Some(Utc::now());
        match outcome {
            Outcome::Renamed {
                concept,
                derived_name,
            } => {
                self.concept = Some(concept);
                self.derived_name = derived_name;
            }
            Outcome::Unmatched => {}
            Outcome::Failed(message) => {
                self.error_detail = Some(message);
            }
        }
    }
}
