// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use certcache_tier::{CertCache, Error};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Distinguishes temporary files written concurrently by the same process.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A certificate cache layer storing one file per key inside a directory.
///
/// The directory is created on the first write. Keys must be plain file names;
/// keys containing path separators or `..` are rejected with a backend error.
#[derive(Debug, Clone)]
pub struct DirCertCache {
    root: PathBuf,
}

impl DirCertCache {
    /// Creates a cache rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the directory holding the cached files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        crate::key::validate(key).map(|name| self.root.join(name))
    }

    async fn create_root(&self) -> Result<(), Error> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o700);

        builder
            .create(&self.root)
            .await
            .map_err(|e| Error::backend(format!("failed to create cache directory {}: {e}", self.root.display())))
    }

    async fn write_temp(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }

    /// Removes a temporary file left behind by a failed write.
    ///
    /// The write error is what gets reported; a failed cleanup is only logged.
    async fn discard_temp(temp: &Path) {
        match fs::remove_file(temp).await {
            Ok(()) => {}
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %temp.display(), error = %e, "failed to remove temporary cache file"),
        }
    }

    /// Flushes the directory entry created by a rename.
    #[cfg(unix)]
    async fn sync_root(&self) -> std::io::Result<()> {
        fs::File::open(&self.root).await?.sync_all().await
    }
}

impl CertCache for DirCertCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::backend(format!("failed to read {}: {e}", path.display()))),
        }
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<(), Error> {
        let path = self.path_for(key)?;
        self.create_root().await?;

        // Fixed-length name so that any key valid as a file name can be written.
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let temp = self
            .root
            .join(format!(".certcache.{}.{sequence}.tmp", std::process::id()));

        if let Err(e) = Self::write_temp(&temp, &data).await {
            Self::discard_temp(&temp).await;
            return Err(Error::backend(format!("failed to write {}: {e}", temp.display())));
        }

        if let Err(e) = fs::rename(&temp, &path).await {
            Self::discard_temp(&temp).await;
            return Err(Error::backend(format!("failed to move {} into place: {e}", path.display())));
        }

        #[cfg(unix)]
        self.sync_root()
            .await
            .map_err(|e| Error::backend(format!("failed to sync cache directory {}: {e}", self.root.display())))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::backend(format!("failed to remove {}: {e}", path.display()))),
        }
    }
}
