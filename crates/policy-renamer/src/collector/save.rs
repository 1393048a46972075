use std::io::Write;
use std::path::{Path, PathBuf};

use crate::collector::split_extension;
use crate::error::ArchiveError;

/// Hands a finished archive to the host for saving.
pub trait SaveTarget: Send + Sync {
    /// Saves `blob` under `suggested_name` and returns where it ended up.
    fn save(&self, blob: &[u8], suggested_name: &str) -> Result<PathBuf, ArchiveError>;
}

/// Saves archives into a directory without overwriting existing files.
pub struct DirectorySaveTarget {
    directory: PathBuf,
}

impl DirectorySaveTarget {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }
}

impl SaveTarget for DirectorySaveTarget {
    fn save(&self, blob: &[u8], suggested_name: &str) -> Result<PathBuf, ArchiveError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| ArchiveError::CreateDirectory {
            path: self.directory.clone(),
            source: e,
        })?;

        let (base, ext) = split_extension(suggested_name);

        // Original name first, then numbered variants.
        for counter in 1..=1000 {
            let try_filename = if counter == 1 {
                suggested_name.to_string()
            } else {
                match ext {
                    Some(ext) => format!("{}_{}{}", base, counter, ext),
                    None => format!("{}_{}", base, counter),
                }
            };

            let try_path = self.directory.join(&try_filename);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&try_path)
            {
                Ok(mut file) => {
                    file.write_all(blob).map_err(|e| ArchiveError::Save {
                        path: try_path.clone(),
                        source: e,
                    })?;
                    return Ok(try_path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ArchiveError::Save {
                        path: try_path,
                        source: e,
                    });
                }
            }
        }

        Err(ArchiveError::FileExists(self.directory.join(suggested_name)))
    }
}
