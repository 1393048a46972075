//! The controller that owns the record collection for one rename session.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{error, info};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::collector::{
    ArchiveBuilder, Collector, DirectorySaveTarget, SaveTarget, ZipArchiveBuilder,
};
use crate::config::SessionConfig;
use crate::error::{ArchiveError, WorkerError};
use crate::intake::{self, UploadedFile};
use crate::processor::{PdfTextExtractor, TextExtractor};
use crate::store::{FileRecord, RecordEvent, RecordId, RecordStore, Summary};
use crate::worker::{work_queue, SequentialProcessor, WorkQueue};

/// Builder for [`RenameSession`]. Collaborators left unset fall back to the
/// lopdf extractor, zip builder and directory save target.
pub struct SessionBuilder {
    config: SessionConfig,
    extractor: Option<Arc<dyn TextExtractor>>,
    archive_builder: Option<Arc<dyn ArchiveBuilder>>,
    save_target: Option<Arc<dyn SaveTarget>>,
    archive_enabled: bool,
}

impl SessionBuilder {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            extractor: None,
            archive_builder: None,
            save_target: None,
            archive_enabled: true,
        }
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn archive_builder(mut self, builder: Arc<dyn ArchiveBuilder>) -> Self {
        self.archive_builder = Some(builder);
        self
    }

    pub fn save_target(mut self, target: Arc<dyn SaveTarget>) -> Self {
        self.save_target = Some(target);
        self
    }

    /// Builds a session that can process files but has no archive support.
    pub fn without_archive(mut self) -> Self {
        self.archive_enabled = false;
        self
    }

    /// Starts the worker. Must be called from within a tokio runtime.
    pub fn start(self) -> RenameSession {
        let store = Arc::new(RecordStore::new(self.config.event_capacity));
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(PdfTextExtractor::new()));

        let collector = if self.archive_enabled {
            let builder = self
                .archive_builder
                .unwrap_or_else(|| Arc::new(ZipArchiveBuilder::new(self.config.compression)));
            let target = self.save_target.unwrap_or_else(|| {
                Arc::new(DirectorySaveTarget::new(&self.config.output_directory))
            });
            Some(Collector::new(builder, target))
        } else {
            None
        };

        let (queue, receiver) = work_queue();
        let worker = SequentialProcessor::new(Arc::clone(&store), extractor, self.config.throttle)
            .spawn(receiver);

        info!(
            "Rename session started (throttle {:?}, archive {})",
            self.config.throttle,
            if collector.is_some() { "enabled" } else { "disabled" }
        );

        RenameSession {
            config: self.config,
            store,
            queue,
            worker,
            collector,
            exporting: Arc::new(AtomicBool::new(false)),
            ops: Mutex::new(()),
        }
    }
}

/// Owns the record collection, the work queue and the worker for one session.
///
/// Intake appends and enqueues; the worker is the only writer of record
/// status; clearing and exporting are guarded so they never overlap with
/// processing.
pub struct RenameSession {
    config: SessionConfig,
    store: Arc<RecordStore>,
    queue: WorkQueue,
    worker: JoinHandle<()>,
    collector: Option<Collector>,
    exporting: Arc<AtomicBool>,
    /// Serializes clear-all against the start of an export.
    ops: Mutex<()>,
}

/// Resets the in-progress flag however the export ends.
struct ExportGuard(Arc<AtomicBool>);

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RenameSession {
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    /// Starts a session with the default collaborators.
    pub fn start(config: SessionConfig) -> Self {
        SessionBuilder::new(config).start()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    fn lock_ops(&self) -> MutexGuard<'_, ()> {
        match self.ops.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Session lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Appends one `Pending` record per file and queues them for processing.
    ///
    /// Fails without touching the collection once the worker has stopped.
    pub fn add_files(&self, files: Vec<UploadedFile>) -> Result<Vec<RecordId>, WorkerError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let _ops = self.lock_ops();
        if self.queue.is_closed() {
            return Err(WorkerError::ChannelClosed);
        }

        let ids = self.store.append(intake::to_records(files));
        if let Err(e) = self.queue.enqueue(ids.clone()) {
            let removed = self.store.discard(&ids);
            error!("Worker is gone, dropped {} unqueued record(s)", removed);
            return Err(e);
        }

        info!("Queued {} file(s) for processing", ids.len());
        Ok(ids)
    }

    pub fn snapshot(&self) -> Vec<FileRecord> {
        self.store.snapshot()
    }

    pub fn summary(&self) -> Summary {
        self.store.summary()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.store.subscribe()
    }

    /// Resolves once every record has reached a terminal status.
    pub async fn wait_settled(&self) {
        self.store.wait_settled().await
    }

    /// True while any record is pending or processing.
    pub fn is_processing(&self) -> bool {
        !self.store.is_settled()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    pub fn has_archive_support(&self) -> bool {
        self.collector.is_some()
    }

    /// Download is offered once all work is done and something succeeded.
    pub fn can_download(&self) -> bool {
        let summary = self.summary();
        summary.total > 0 && summary.is_settled() && summary.success > 0
    }

    pub fn can_clear(&self) -> bool {
        let summary = self.summary();
        summary.total > 0 && summary.is_settled() && !self.is_exporting()
    }

    /// Empties the collection. Does nothing and returns false while records
    /// are in flight or an export is running.
    pub fn clear_all(&self) -> bool {
        let _ops = self.lock_ops();
        if !self.can_clear() {
            return false;
        }

        let removed = self.store.clear();
        info!("Cleared {} record(s)", removed);
        true
    }

    /// Builds the archive of all `Success` records and saves it.
    ///
    /// Failures are returned to the caller and never poison the session: the
    /// in-progress flag is cleared on every path.
    pub async fn download(&self) -> Result<PathBuf, ArchiveError> {
        let collector = self.collector.clone().ok_or(ArchiveError::Unavailable)?;

        let (_guard, records) = {
            let _ops = self.lock_ops();
            if self
                .exporting
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(ArchiveError::Busy);
            }
            let guard = ExportGuard(Arc::clone(&self.exporting));

            let summary = self.summary();
            if !summary.is_settled() {
                return Err(ArchiveError::StillProcessing);
            }
            if summary.success == 0 {
                return Err(ArchiveError::NothingToExport);
            }

            (guard, self.store.successful())
        };

        self.store.emit(RecordEvent::ExportStarted {
            files: records.len(),
        });

        let archive_name = self.config.archive_name.clone();
        let result = tokio::task::spawn_blocking(move || collector.export(&records, &archive_name))
            .await
            .unwrap_or_else(|e| Err(ArchiveError::Build(format!("archive task aborted: {}", e))));

        match &result {
            Ok(path) => self.store.emit(RecordEvent::ExportFinished {
                path: Some(path.display().to_string()),
                error: None,
            }),
            Err(e) => {
                error!("Failed to create archive: {}", e);
                self.store.emit(RecordEvent::ExportFinished {
                    path: None,
                    error: Some(e.to_string()),
                });
            }
        }

        result
    }

    /// Stops accepting work and waits for the worker to drain the queue.
    pub async fn shutdown(self) {
        let RenameSession { queue, worker, .. } = self;
        drop(queue);
        if let Err(e) = worker.await {
            error!("Sequential processor panicked: {}", e);
        }
    }
}
