//! Events emitted by the record store while a session runs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::{FileStatus, RecordId};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordEvent {
    Appended {
        ids: Vec<RecordId>,
    },
    StatusChanged {
        id: RecordId,
        status: FileStatus,
        derived_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
    Cleared {
        removed: usize,
    },
    SweepStarted,
    SweepFinished {
        processed: usize,
    },
    ExportStarted {
        files: usize,
    },
    ExportFinished {
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}
