pub mod collector;
pub mod config;
pub mod error;
pub mod intake;
pub mod naming;
pub mod processor;
pub mod sanitize;
pub mod session;
pub mod store;
pub mod worker;

pub use collector::{ArchiveBuilder, Collector, DirectorySaveTarget, SaveTarget, ZipArchiveBuilder};
pub use config::{load_config, validate_config, Config, SessionConfig};
pub use error::{
    ArchiveError, ConfigError, IntakeError, ProcessError, RenamerError, Result, StoreError,
    WorkerError,
};
pub use intake::UploadedFile;
pub use naming::{export_name, find_concept, sanitize_concept};
pub use processor::{PdfTextExtractor, TextExtractor};
pub use session::{RenameSession, SessionBuilder};
pub use store::{FileContent, FileRecord, FileStatus, RecordEvent, RecordId, RecordStore, Summary};
