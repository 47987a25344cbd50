//! On-disk cache of extracted engine releases, one directory per tag

use crate::config::{CacheValidation, SdkConfig};
use crate::error::{Result, SdkError};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Written into a cache entry once extraction has finished
pub const COMPLETE_MARKER: &str = ".novelrt-complete";

#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: PathBuf,
    validation: CacheValidation,
}

impl ArtifactCache {
    pub fn new(root: impl Into<PathBuf>, validation: CacheValidation) -> Self {
        Self {
            root: root.into(),
            validation,
        }
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(config.engine_cache_dir.clone(), config.cache_validation)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a tag is (or would be) extracted into
    pub fn path(&self, tag: &str) -> PathBuf {
        self.root.join(tag)
    }

    /// Whether `tag` is available locally.
    ///
    /// With [`CacheValidation::TrustExistence`] a partially extracted entry is
    /// indistinguishable from a complete one.
    pub fn has(&self, tag: &str) -> bool {
        let path = self.path(tag);
        debug!("Checking if NovelRT {} exists locally...", tag);

        let present = match self.validation {
            CacheValidation::TrustExistence => path.is_dir(),
            CacheValidation::RequireMarker => path.join(COMPLETE_MARKER).is_file(),
        };

        if present {
            debug!("NovelRT {} exists at {}", tag, path.display());
        } else {
            debug!("NovelRT {} does not exist at {}", tag, path.display());
        }
        present
    }

    /// Extract `archive` into the entry for `tag` and return its path.
    ///
    /// Nothing is cleaned up on failure.
    pub fn store(&self, tag: &str, archive: &Path) -> Result<PathBuf> {
        let destination = self.path(tag);
        let extraction_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            SdkError::Extraction {
                archive: archive.to_path_buf(),
                destination: destination.clone(),
                source,
            }
        };

        debug!("Extracting {}...", archive.display());
        fs::create_dir_all(&destination).map_err(|e| extraction_error(e.into()))?;

        let file = fs::File::open(archive).map_err(|e| extraction_error(e.into()))?;
        let mut zip = ZipArchive::new(file).map_err(|e| extraction_error(e.into()))?;
        zip.extract(&destination)
            .map_err(|e| extraction_error(e.into()))?;

        fs::write(destination.join(COMPLETE_MARKER), tag)
            .map_err(|e| extraction_error(e.into()))?;

        debug!("Unzipping successful!");
        Ok(destination)
    }

    /// Tags currently present under the cache root, sorted by name
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| {
            SdkError::acquisition_with(
                format!("Failed to read engine cache {}", self.root.display()),
                e,
            )
        })?;

        let mut tags: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        tags.sort();
        Ok(tags)
    }
}
