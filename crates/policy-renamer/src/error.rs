use std::path::PathBuf;
use thiserror::Error;

use crate::store::{FileStatus, RecordId};

#[derive(Error, Debug)]
pub enum RenamerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read uploaded file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path has no file name: {0}")]
    NoFileName(PathBuf),
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to load PDF: {0}")]
    PdfProcessing(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("Text extraction failed: {0}")]
    TextExtraction(String),

    #[error("Extraction task aborted: {0}")]
    TaskAborted(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: RecordId,
        from: FileStatus,
        to: FileStatus,
    },

    #[error("Record {busy} is already processing")]
    AlreadyProcessing { busy: RecordId },
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive support is not available in this session")]
    Unavailable,

    #[error("Nothing to export: no successfully processed files")]
    NothingToExport,

    #[error("An export is already in progress")]
    Busy,

    #[error("Files are still being processed")]
    StillProcessing,

    #[error("Failed to build archive: {0}")]
    Build(String),

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive '{path}': {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists: {0}")]
    FileExists(PathBuf),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(e: zip::result::ZipError) -> Self {
        ArchiveError::Build(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RenamerError>;
