//! First-run marker: a sentinel file on durable storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Gates one-time setup logic across process restarts.
///
/// While the file is absent the deployment counts as a first run and the
/// full create/delete pass is allowed. Writing the marker after a completed
/// run demotes every later start to updates only, until an operator removes
/// the file to force a re-seed.
#[derive(Debug, Clone)]
pub struct FirstRunMarker {
    path: PathBuf,
}

impl FirstRunMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True while the marker file does not exist.
    pub fn is_first_run(&self) -> bool {
        !self.path.exists()
    }

    /// Writes the marker. Creating an already-present marker is a no-op.
    pub fn complete(&self) -> io::Result<()> {
        if self.path.exists() {
            debug!(path = %self.path.display(), "First-run marker already present");
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, [])?;
        info!(path = %self.path.display(), "Wrote first-run marker");
        Ok(())
    }
}
