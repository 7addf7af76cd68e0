//! Content-addressed artifact store for mdweave.
//!
//! Rendered artifacts are stored as files named by the hash of their source,
//! grouped into named buckets (one directory per renderer kind). Two traits
//! form the API:
//!
//! - [`ArtifactCache`]: factory for named buckets
//! - [`ArtifactBucket`]: lookup, staging and atomic store of artifact files
//!
//! # Implementations
//!
//! - [`FileCache`]: existing artifacts are reused
//! - [`NullCache`]: caching disabled; lookups always miss but artifacts are
//!   still written so the document can reference them
//!
//! # Example
//!
//! ```
//! use mdweave_cache::{ArtifactCache, ContentKey, FileCache};
//!
//! let tmp = tempfile::tempdir().unwrap();
//! let cache = FileCache::new(tmp.path());
//! let bucket = cache.bucket("mermaid-images");
//! let key = ContentKey::of("graph TD; A-->B");
//! assert_eq!(bucket.lookup(&key, "svg"), None);
//! ```

mod file;
mod key;

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub use file::FileCache;
use file::DirBucket;
pub use key::ContentKey;

/// A named partition of an [`ArtifactCache`], backed by one directory.
///
/// Artifacts live at `{dir}/{key}.{ext}`.
pub trait ArtifactBucket {
    /// Directory holding this bucket's artifacts.
    fn dir(&self) -> &Path;

    /// Where the artifact for `key` with extension `ext` lives (or would live).
    fn artifact_path(&self, key: &ContentKey, ext: &str) -> PathBuf {
        self.dir().join(format!("{key}.{ext}"))
    }

    /// Path of a previously stored artifact, if it can be reused.
    fn lookup(&self, key: &ContentKey, ext: &str) -> Option<PathBuf>;

    /// Create the bucket directory. An existing directory is not an error.
    fn prepare(&self) -> io::Result<()>;

    /// Fresh scratch directory inside the bucket, removed on drop.
    ///
    /// Staging next to the final location keeps [`store`](Self::store) a
    /// same-filesystem rename.
    fn staging_dir(&self) -> io::Result<TempDir>;

    /// Move a finished artifact into place and return its final path.
    ///
    /// Readers observe either no file or the complete file.
    fn store(&self, key: &ContentKey, ext: &str, produced: &Path) -> io::Result<PathBuf>;
}

/// Factory for named [`ArtifactBucket`]s rooted at one directory.
pub trait ArtifactCache {
    /// Open a named bucket. Nothing is created on disk until
    /// [`ArtifactBucket::prepare`] is called.
    fn bucket(&self, name: &str) -> Box<dyn ArtifactBucket>;
}

/// [`ArtifactCache`] used when caching is disabled.
///
/// Every lookup misses, so each diagram is rendered anew; the rendered file
/// is still stored so the document can reference it.
pub struct NullCache {
    root: PathBuf,
}

impl NullCache {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactCache for NullCache {
    fn bucket(&self, name: &str) -> Box<dyn ArtifactBucket> {
        Box::new(DirBucket::new(self.root.join(name), false))
    }
}
