//! Bundling of successfully renamed files into one archive.

pub mod archive;
pub mod save;

pub use archive::ZipArchiveBuilder;
pub use save::{DirectorySaveTarget, SaveTarget};

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ArchiveError;
use crate::store::{FileContent, FileRecord, FileStatus};

/// One file to place in the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: FileContent,
}

/// Turns `(name, content)` pairs into a single archive blob.
pub trait ArchiveBuilder: Send + Sync {
    fn build(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError>;
}

/// Archive builder paired with the place finished archives are saved to.
#[derive(Clone)]
pub struct Collector {
    builder: Arc<dyn ArchiveBuilder>,
    target: Arc<dyn SaveTarget>,
}

impl Collector {
    pub fn new(builder: Arc<dyn ArchiveBuilder>, target: Arc<dyn SaveTarget>) -> Self {
        Self { builder, target }
    }

    /// Builds an archive of every `Success` record. No eligible records
    /// yields a valid, empty archive.
    pub fn build(&self, records: &[FileRecord]) -> Result<Vec<u8>, ArchiveError> {
        self.builder.build(&collect_entries(records))
    }

    /// Builds the archive and saves it under `archive_name`.
    pub fn export(
        &self,
        records: &[FileRecord],
        archive_name: &str,
    ) -> Result<PathBuf, ArchiveError> {
        let blob = self.build(records)?;
        let path = self.target.save(&blob, archive_name)?;
        log::info!("Saved archive ({} bytes) to {}", blob.len(), path.display());
        Ok(path)
    }
}

/// Picks the `Success` records and names them for export.
///
/// Entries keep intake order. When two records share a derived name, the
/// later ones get `_2`, `_3`, ... before the extension so no file is lost.
pub fn collect_entries(records: &[FileRecord]) -> Vec<ArchiveEntry> {
    let mut taken = HashSet::new();

    records
        .iter()
        .filter(|r| r.status == FileStatus::Success)
        .map(|r| ArchiveEntry {
            name: unique_name(&r.derived_name, &mut taken),
            content: r.content.clone(),
        })
        .collect()
}

fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let (base, ext) = split_extension(name);
    let mut counter = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}_{}{}", base, counter, ext),
            None => format!("{}_{}", base, counter),
        };
        if taken.insert(candidate.to_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Splits `name.ext` into `("name", Some(".ext"))`. A leading dot is not an
/// extension.
pub(crate) fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], Some(&name[pos..])),
        _ => (name, None),
    }
}
