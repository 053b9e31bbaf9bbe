// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Snapshot persistence.
//!
//! [`JsonFileSink`] writes the snapshot to a temporary file next to the
//! destination and renames it into place, so readers see either the previous
//! document or the complete new one, never a partial write.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::features::FeatureSnapshot;

/// Destination of a feature snapshot.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Persist the snapshot, replacing any previous output.
    async fn write(&self, snapshot: &FeatureSnapshot) -> Result<()>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Writes the snapshot as a JSON document to a file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileSink {
    /// Create a sink writing pretty-printed JSON to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    /// Toggle pretty-printing.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSink for JsonFileSink {
    async fn write(&self, snapshot: &FeatureSnapshot) -> Result<()> {
        let document = snapshot.to_json(self.pretty).map_err(|e| {
            Error::WriteFailure(format!("failed to serialize snapshot: {}", e))
        })?;

        let path = self.path.clone();
        let bytes = document.len();
        tokio::task::spawn_blocking(move || atomic_write(&path, document.as_bytes()))
            .await
            .map_err(|e| Error::WriteFailure(format!("write task aborted: {}", e)))??;

        info!(
            path = %self.path.display(),
            records = snapshot.len(),
            bytes,
            "Snapshot written"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Write-then-rename within the destination directory.
fn atomic_write(dest: &Path, content: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let fail = |stage: &str, e: std::io::Error| {
        Error::WriteFailure(format!("{} {}: {}", stage, dest.display(), e))
    };

    std::fs::create_dir_all(&dir).map_err(|e| fail("cannot create directory for", e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)
        .map_err(|e| fail("cannot create temporary file for", e))?;
    tmp.write_all(content)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| fail("cannot write", e))?;

    debug!(tmp = %tmp.path().display(), dest = %dest.display(), "Renaming snapshot into place");
    tmp.persist(dest).map_err(|e| fail("cannot replace", e.error))?;
    Ok(())
}
