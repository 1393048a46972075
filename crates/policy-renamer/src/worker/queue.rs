//! FIFO of pending record ids, filled by intake and drained by one worker.

use tokio::sync::mpsc;

use crate::error::WorkerError;
use crate::store::RecordId;

/// Sending half of the work queue.
#[derive(Clone)]
pub struct WorkQueue {
    sender: mpsc::UnboundedSender<RecordId>,
}

/// Receiving half of the work queue, owned by the worker.
pub struct WorkReceiver {
    receiver: mpsc::UnboundedReceiver<RecordId>,
}

pub fn work_queue() -> (WorkQueue, WorkReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (WorkQueue { sender }, WorkReceiver { receiver })
}

impl WorkQueue {
    /// Enqueues ids in the given order.
    pub fn enqueue<I>(&self, ids: I) -> Result<(), WorkerError>
    where
        I: IntoIterator<Item = RecordId>,
    {
        for id in ids {
            self.sender
                .send(id)
                .map_err(|_| WorkerError::ChannelClosed)?;
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl WorkReceiver {
    /// Waits for the next id. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<RecordId> {
        self.receiver.recv().await
    }

    /// Returns an id that is already queued, without waiting.
    pub fn try_next(&mut self) -> Option<RecordId> {
        self.receiver.try_recv().ok()
    }
}
