use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::collector::{ArchiveBuilder, ArchiveEntry};
use crate::config::Compression;
use crate::error::ArchiveError;

/// Builds zip archives in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveBuilder {
    compression: Compression,
}

impl ZipArchiveBuilder {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }
}

impl ArchiveBuilder for ZipArchiveBuilder {
    fn build(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        let _span = tracing::info_span!("collector.zip", entries = entries.len()).entered();

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(self.compression.method());

        for entry in entries {
            writer.start_file(entry.name.as_str(), options)?;
            writer
                .write_all(entry.content.as_bytes())
                .map_err(|e| ArchiveError::Build(format!("{}: {}", entry.name, e)))?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}
