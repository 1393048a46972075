//! Test harness for isolated session runs.
//!
//! The `TestHarness` owns a temporary directory for input files and exported
//! archives and starts sessions that save into it.

#![allow(dead_code)]

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use policy_renamer::{
    DirectorySaveTarget, RenameSession, SessionBuilder, SessionConfig, TextExtractor,
    UploadedFile,
};

pub struct TestHarness {
    temp_dir: TempDir,
    /// Directory for input files written by the test.
    pub input_dir: PathBuf,
    /// Directory archives are saved to.
    pub output_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_dir = temp_dir.path().join("input");
        let output_dir = temp_dir.path().join("output");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");

        Self {
            temp_dir,
            input_dir,
            output_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Unthrottled session config saving into the output directory.
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            output_directory: self.output_dir.clone(),
            ..SessionConfig::unthrottled()
        }
    }

    /// Builder preconfigured to save into the output directory.
    pub fn builder(&self) -> SessionBuilder {
        RenameSession::builder(self.config())
            .save_target(Arc::new(DirectorySaveTarget::new(&self.output_dir)))
    }

    /// Session using the real PDF extractor.
    pub fn pdf_session(&self) -> RenameSession {
        self.builder().start()
    }

    /// Session using the given extractor.
    pub fn session_with(&self, extractor: Arc<dyn TextExtractor>) -> RenameSession {
        self.builder().extractor(extractor).start()
    }

    pub fn write_input(&self, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.input_dir.join(filename);
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    pub fn upload(&self, filename: &str, content: &[u8]) -> UploadedFile {
        let path = self.write_input(filename, content);
        UploadedFile::from_path(path).expect("Failed to read input file")
    }

    /// Waits for the session to settle, failing the test after five seconds.
    pub async fn settle(&self, session: &RenameSession) {
        tokio::time::timeout(Duration::from_secs(5), session.wait_settled())
            .await
            .expect("Session did not settle in time");
    }
}

/// Entry names of a zip archive, in archive order.
pub fn archive_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    let mut archive = zip::ZipArchive::new(file).expect("Failed to read archive");
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Content of one archive entry.
pub fn archive_entry(path: &Path, name: &str) -> Vec<u8> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    let mut archive = zip::ZipArchive::new(file).expect("Failed to read archive");
    let mut entry = archive.by_name(name).expect("Entry not found");
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}
