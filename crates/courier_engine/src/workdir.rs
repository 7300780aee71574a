use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::FetchVariant;

#[derive(Debug, Error)]
pub enum WorkdirError {
    #[error("working directory missing or not writable: {0}")]
    Root(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// The single working root holding transient chapter folders and short-lived
/// document files. Wiped entirely on process start.
#[derive(Debug, Clone)]
pub struct Workdir {
    root: PathBuf,
}

impl Workdir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the root exists and is writable; create if missing.
    pub fn ensure(&self) -> Result<(), WorkdirError> {
        if self.root.exists() {
            let meta = fs::metadata(&self.root).map_err(|e| WorkdirError::Root(e.to_string()))?;
            if !meta.is_dir() {
                return Err(WorkdirError::Root("path is not a directory".into()));
            }
        } else {
            fs::create_dir_all(&self.root).map_err(|e| WorkdirError::Root(e.to_string()))?;
        }
        // Basic writability probe: try creating a temp file.
        NamedTempFile::new_in(&self.root).map_err(|e| WorkdirError::Root(e.to_string()))?;
        Ok(())
    }

    /// Startup housekeeping: removes every entry under the root.
    ///
    /// Per-entry failures are logged and skipped so one stuck file cannot
    /// abort process start. Returns the number of entries removed.
    pub fn wipe(&self) -> Result<usize, WorkdirError> {
        if !self.root.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry during wipe: {err}");
                    continue;
                }
            };
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(err) => warn!("could not remove {}: {err}", path.display()),
            }
        }
        Ok(removed)
    }

    /// Folder a chapter's images are saved into; naming depends on the variant.
    pub fn chapter_dir(&self, chapter: u32, variant: FetchVariant) -> PathBuf {
        self.root.join(variant.folder_name(chapter))
    }

    /// Removes one chapter folder. A missing folder is not an error.
    pub fn remove_chapter_dir(&self, chapter: u32, variant: FetchVariant) -> Result<(), WorkdirError> {
        let dir = self.chapter_dir(chapter, variant);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            debug!("removed {}", dir.display());
        }
        Ok(())
    }

    /// Removes every chapter folder in `[start, end]`; idempotent.
    pub fn remove_chapter_range(
        &self,
        start: u32,
        end: u32,
        variant: FetchVariant,
    ) -> Result<(), WorkdirError> {
        for chapter in start..=end {
            self.remove_chapter_dir(chapter, variant)?;
        }
        Ok(())
    }

    /// Document path for a single chapter.
    pub fn pdf_path(&self, title: &str, chapter: u32) -> PathBuf {
        self.root.join(format!("{title} chapter {chapter}.pdf"))
    }

    /// Document path for a merged range.
    pub fn merged_pdf_path(&self, title: &str, start: u32, end: u32) -> PathBuf {
        self.root.join(format!("{title} chapters {start}-{end}.pdf"))
    }
}
