use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::{ProcessError, StoreError};
use crate::naming;
use crate::processor::TextExtractor;
use crate::store::{Outcome, RecordEvent, RecordId, RecordStore};
use crate::worker::queue::WorkReceiver;

/// Drains the work queue one record at a time.
///
/// Each busy period is a sweep: it starts when an id arrives on an idle queue
/// and ends once the queue is empty again.
pub struct SequentialProcessor {
    store: Arc<RecordStore>,
    extractor: Arc<dyn TextExtractor>,
    throttle: Duration,
}

impl SequentialProcessor {
    pub fn new(
        store: Arc<RecordStore>,
        extractor: Arc<dyn TextExtractor>,
        throttle: Duration,
    ) -> Self {
        Self {
            store,
            extractor,
            throttle,
        }
    }

    /// Runs the worker loop on the current tokio runtime.
    pub fn spawn(self, receiver: WorkReceiver) -> JoinHandle<()> {
        tokio::spawn(self.run(receiver))
    }

    /// Processes ids until every queue sender is dropped.
    pub async fn run(self, mut receiver: WorkReceiver) {
        debug!("Sequential processor started");

        while let Some(first) = receiver.next().await {
            let processed = self
                .sweep(first, &mut receiver)
                .instrument(info_span!("sweep"))
                .await;
            debug!(processed, "Sweep finished");
        }

        debug!("Sequential processor stopped");
    }

    async fn sweep(&self, first: RecordId, receiver: &mut WorkReceiver) -> usize {
        self.store.emit(RecordEvent::SweepStarted);

        let mut processed = 0;
        let mut next = Some(first);
        while let Some(id) = next {
            if self.process_one(&id).await {
                processed += 1;
                if !self.throttle.is_zero() {
                    tokio::time::sleep(self.throttle).await;
                }
            }
            next = receiver.try_next();
        }

        self.store.emit(RecordEvent::SweepFinished { processed });
        processed
    }

    /// Processes one record. Returns false when the record was skipped
    /// because it is gone or no longer pending.
    pub async fn process_one(&self, id: &RecordId) -> bool {
        let record = match self.store.begin_processing(id) {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping record {}: {}", id, e);
                return false;
            }
        };

        let span = info_span!("record", id = %id, filename = %record.original_name);
        async {
            let extractor = Arc::clone(&self.extractor);
            let content = record.content.clone();
            let extracted =
                tokio::task::spawn_blocking(move || extractor.first_page_text(content.as_bytes()))
                    .await;

            let outcome = match extracted {
                Ok(Ok(text)) => naming::outcome_for_text(&text),
                Ok(Err(e)) => Outcome::Failed(e.to_string()),
                Err(e) => Outcome::Failed(ProcessError::TaskAborted(e.to_string()).to_string()),
            };

            match &outcome {
                Outcome::Renamed { derived_name, .. } => {
                    info!("Renamed {} -> {}", record.original_name, derived_name)
                }
                Outcome::Unmatched => info!("No policy name found, keeping original name"),
                Outcome::Failed(message) => warn!("Extraction failed: {}", message),
            }

            match self.store.complete(id, outcome) {
                Ok(_) => {}
                Err(StoreError::NotFound(_)) => {
                    info!("Record was cleared during extraction, discarding result")
                }
                Err(e) => warn!("Failed to record outcome: {}", e),
            }
        }
        .instrument(span)
        .await;

        true
    }
}
