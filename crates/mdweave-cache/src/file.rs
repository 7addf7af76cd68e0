//! File-based artifact store.
//!
//! Directory layout:
//! ```text
//! {root}/
//! +-- mermaid-images/          # bucket "mermaid-images"
//! |   +-- {sha1}.svg           # artifact
//! |   +-- .staging-XXXX/       # in-flight render, removed when done
//! +-- plantuml-images/
//!     +-- ...
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{ArtifactBucket, ArtifactCache, ContentKey};

/// File-based [`ArtifactCache`] that reuses existing artifacts.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at `root`. Nothing is created until a bucket is
    /// prepared.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactCache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn ArtifactBucket> {
        Box::new(DirBucket::new(self.root.join(name), true))
    }
}

/// A bucket backed by a directory on disk.
///
/// `reuse` decides whether existing artifacts count as hits.
pub(crate) struct DirBucket {
    dir: PathBuf,
    reuse: bool,
}

impl DirBucket {
    pub(crate) fn new(dir: PathBuf, reuse: bool) -> Self {
        Self { dir, reuse }
    }
}

impl ArtifactBucket for DirBucket {
    fn dir(&self) -> &Path {
        &self.dir
    }

    fn lookup(&self, key: &ContentKey, ext: &str) -> Option<PathBuf> {
        if !self.reuse {
            return None;
        }
        let path = self.artifact_path(key, ext);
        if path.is_file() {
            tracing::debug!("artifact cache hit: {}", path.display());
            Some(path)
        } else {
            tracing::debug!("artifact cache miss: {}", path.display());
            None
        }
    }

    fn prepare(&self) -> io::Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }
        let created = fs::create_dir_all(&self.dir);
        if created.is_ok() {
            tracing::info!("created artifact directory {}", self.dir.display());
        }
        settle_create(created, &self.dir)
    }

    fn staging_dir(&self) -> io::Result<TempDir> {
        tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.dir)
    }

    fn store(&self, key: &ContentKey, ext: &str, produced: &Path) -> io::Result<PathBuf> {
        let dest = self.artifact_path(key, ext);
        fs::rename(produced, &dest)?;
        tracing::debug!("stored artifact {}", dest.display());
        Ok(dest)
    }
}

/// Treat `AlreadyExists` as success when `dir` is now a directory, which
/// happens when a concurrent build created it first.
fn settle_create(result: io::Result<()>, dir: &Path) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        other => other,
    }
}
