//! Sound asset resolution.
//!
//! The two athan recordings live side by side in one directory and are only
//! ever addressed by `SoundClass`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::SoundError;
use crate::types::SoundClass;

/// Location of the class-keyed athan recordings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundAssets {
    dir: PathBuf,
}

impl SoundAssets {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the recording for `class`.
    #[must_use]
    pub fn path(&self, class: SoundClass) -> PathBuf {
        self.dir.join(class.asset_file_name())
    }

    /// Classes whose recording is not a regular file.
    #[must_use]
    pub fn missing(&self) -> Vec<SoundClass> {
        SoundClass::ALL
            .into_iter()
            .filter(|class| !self.path(*class).is_file())
            .collect()
    }

    /// Logs the state of both recordings. Returns true if both are present.
    pub fn check(&self) -> bool {
        let missing = self.missing();
        for class in SoundClass::ALL {
            if missing.contains(&class) {
                warn!(
                    "Athan asset check failed for {}: {} not found",
                    class,
                    self.path(class).display()
                );
            } else {
                debug!("{} athan asset ready", class);
            }
        }
        missing.is_empty()
    }

    /// Reads the recording for `class` into memory.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` if the file does not exist and `LoadFailed`
    /// for any other I/O failure.
    pub fn read(&self, class: SoundClass) -> Result<Vec<u8>, SoundError> {
        let path = self.path(class);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SoundError::AssetNotFound(path.display().to_string()),
            _ => SoundError::LoadFailed(format!("{}: {}", path.display(), e)),
        })
    }
}
