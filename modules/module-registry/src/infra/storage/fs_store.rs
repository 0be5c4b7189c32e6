//! Filesystem-backed [`ModuleStore`].
//!
//! Layout: `<root>/modules/<namespace>/<name>/<system>/<version>.zip`. The
//! path is the primary key; there is no separate index or metadata file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument};

use crate::domain::model::{ModuleCoordinate, ModuleVersion};
use crate::domain::store::{ArchiveStream, ModuleStore, StoreError};

const MODULES_DIR: &str = "modules";
const ARCHIVE_SUFFIX: &str = ".zip";
/// Uploads are staged under this prefix next to their final location.
const STAGING_PREFIX: &str = ".upload-";
const STAGING_SUFFIX: &str = ".partial";

#[derive(Debug, Clone)]
pub struct FsModuleStore {
    root: PathBuf,
}

impl FsModuleStore {
    /// Store rooted at `root`. The directory does not need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn module_directory(&self, module: &ModuleCoordinate) -> PathBuf {
        let mut dir = self.root.join(MODULES_DIR);
        dir.extend(module.segments());
        dir
    }

    #[must_use]
    pub fn module_archive_path(&self, module: &ModuleCoordinate, version: &ModuleVersion) -> PathBuf {
        self.module_directory(module)
            .join(format!("{version}{ARCHIVE_SUFFIX}"))
    }
}

#[async_trait]
impl ModuleStore for FsModuleStore {
    #[instrument(skip(self), fields(module = %module))]
    async fn list_versions(
        &self,
        module: &ModuleCoordinate,
    ) -> Result<Vec<ModuleVersion>, StoreError> {
        let dir = self.module_directory(module);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with(STAGING_PREFIX) {
                continue;
            }
            if let Some(version) = file_name.strip_suffix(ARCHIVE_SUFFIX)
                && !version.is_empty()
            {
                versions.push(ModuleVersion::from_stored(version));
            }
        }

        if versions.is_empty() {
            debug!("Module directory holds no archives");
            return Err(StoreError::NotFound);
        }
        versions.sort_unstable();
        Ok(versions)
    }

    async fn archive_exists(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
    ) -> Result<bool, StoreError> {
        match tokio::fs::metadata(self.module_archive_path(module, version)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn open_archive(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
    ) -> Result<ArchiveStream, StoreError> {
        let path = self.module_archive_path(module, version);
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(StoreError::NotFound);
        }

        Ok(ArchiveStream {
            len: meta.len(),
            body: ReaderStream::new(file).boxed(),
        })
    }

    #[instrument(skip(self, data), fields(module = %module, version = %version, size = data.len()))]
    async fn write_archive(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
        data: Bytes,
    ) -> Result<(), StoreError> {
        if data.is_empty() {
            return Err(StoreError::EmptyPayload);
        }

        let dir = self.module_directory(module);
        let target = self.module_archive_path(module, version);
        tokio::task::spawn_blocking(move || write_once(&dir, &target, &data))
            .await
            .map_err(|e| StoreError::Io(io::Error::other(e)))??;

        debug!("Archive persisted");
        Ok(())
    }
}

/// Stage `data` in `dir`, then link it to `target` only if `target` does not
/// exist yet. Readers see either no archive or the complete one.
fn write_once(dir: &Path, target: &Path, data: &[u8]) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir)?;

    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;

    match staged.persist_noclobber(target) {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Err(StoreError::AlreadyExists),
        Err(e) => Err(StoreError::Io(e.error)),
    }
}
