pub mod queue;
pub mod sequential;

pub use queue::{work_queue, WorkQueue, WorkReceiver};
pub use sequential::SequentialProcessor;
