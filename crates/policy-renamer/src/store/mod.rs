//! In-memory record collection shared by intake, the worker and the collector.

pub mod events;
pub mod record;

pub use events::RecordEvent;
pub use record::{FileContent, FileRecord, FileStatus, Outcome, RecordId};

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::error::StoreError;

/// Counts of records per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub success: usize,
    pub error: usize,
}

impl Summary {
    /// True when no record is pending or processing.
    pub fn is_settled(&self) -> bool {
        self.pending == 0 && self.processing == 0
    }
}

/// Ordered record collection.
///
/// Records are appended in intake order and only ever removed all at once.
/// Every mutation bumps a version counter so callers can wait for the
/// collection to settle, and is announced on a broadcast channel.
pub struct RecordStore {
    records: RwLock<Vec<FileRecord>>,
    events: broadcast::Sender<RecordEvent>,
    version: watch::Sender<u64>,
}

impl RecordStore {
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        let (version, _) = watch::channel(0);
        Self {
            records: RwLock::new(Vec::new()),
            events,
            version,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<FileRecord>> {
        match self.records.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Record store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<FileRecord>> {
        match self.records.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Record store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    /// Sends an event to subscribers. Having no subscribers is fine.
    pub(crate) fn emit(&self, event: RecordEvent) {
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.events.subscribe()
    }

    /// Appends records and returns their ids in order. Empty input is a no-op.
    pub fn append(&self, new_records: Vec<FileRecord>) -> Vec<RecordId> {
        if new_records.is_empty() {
            return Vec::new();
        }

        let ids: Vec<RecordId> = new_records.iter().map(|r| r.id.clone()).collect();
        self.write().extend(new_records);
        self.bump();
        self.emit(RecordEvent::Appended { ids: ids.clone() });
        ids
    }

    pub fn get(&self, id: &RecordId) -> Option<FileRecord> {
        self.read().iter().find(|r| &r.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<FileRecord> {
        self.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Records that finished with `Success`, in intake order.
    pub fn successful(&self) -> Vec<FileRecord> {
        self.read()
            .iter()
            .filter(|r| r.status == FileStatus::Success)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> Summary {
        let records = self.read();
        let mut summary = Summary {
            total: records.len(),
            ..Summary::default()
        };
        for record in records.iter() {
            match record.status {
                FileStatus::Pending => summary.pending += 1,
                FileStatus::Processing => summary.processing += 1,
                FileStatus::Success => summary.success += 1,
                FileStatus::Error => summary.error += 1,
            }
        }
        summary
    }

    pub fn is_settled(&self) -> bool {
        self.summary().is_settled()
    }

    /// Moves a `Pending` record to `Processing`.
    ///
    /// Fails if another record is already processing.
    pub fn begin_processing(&self, id: &RecordId) -> Result<FileRecord, StoreError> {
        let record = {
            let mut records = self.write();

            if let Some(busy) = records
                .iter()
                .find(|r| r.status == FileStatus::Processing && &r.id != id)
            {
                return Err(StoreError::AlreadyProcessing {
                    busy: busy.id.clone(),
                });
            }

            let record = records
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;

            if !record.status.can_transition_to(FileStatus::Processing) {
                return Err(StoreError::InvalidTransition {
                    id: id.clone(),
                    from: record.status,
                    to: FileStatus::Processing,
                });
            }

            record.status = FileStatus::Processing;
            record.clone()
        };

        self.bump();
        self.emit(status_event(&record));
        Ok(record)
    }

    /// Moves a `Processing` record to its terminal status.
    pub fn complete(&self, id: &RecordId, outcome: Outcome) -> Result<FileRecord, StoreError> {
        let record = {
            let mut records = self.write();
            let record = records
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;

            let next = outcome.status();
            if !record.status.can_transition_to(next) {
                return Err(StoreError::InvalidTransition {
                    id: id.clone(),
                    from: record.status,
                    to: next,
                });
            }

            record.apply(outcome);
            record.clone()
        };

        self.bump();
        self.emit(status_event(&record));
        Ok(record)
    }

    /// Removes every record unconditionally and returns how many were removed.
    ///
    /// Guarding against clearing during work is the session's job.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut records = self.write();
            let removed = records.len();
            records.clear();
            removed
        };

        self.bump();
        self.emit(RecordEvent::Cleared { removed });
        removed
    }

    /// Removes the given records. Used to roll back an intake that could not
    /// be queued.
    pub(crate) fn discard(&self, ids: &[RecordId]) -> usize {
        let removed = {
            let mut records = self.write();
            let before = records.len();
            records.retain(|r| !ids.contains(&r.id));
            before - records.len()
        };

        if removed > 0 {
            self.bump();
        }
        removed
    }

    /// Resolves once no record is pending or processing.
    pub async fn wait_settled(&self) {
        let mut rx = self.version.subscribe();
        loop {
            if self.is_settled() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(256)
    }
}

fn status_event(record: &FileRecord) -> RecordEvent {
    RecordEvent::StatusChanged {
        id: record.id.clone(),
        status: record.status,
        derived_name: record.derived_name.clone(),
        error: record.error_detail.clone(),
        timestamp: Utc::now(),
    }
}
