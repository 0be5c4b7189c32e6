use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::model::{ModuleCoordinate, ModuleVersion};

/// Errors surfaced by a [`ModuleStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("archive already exists")]
    AlreadyExists,
    #[error("empty payload")]
    EmptyPayload,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Unmodified archive contents as a byte stream.
pub struct ArchiveStream {
    pub len: u64,
    pub body: BoxStream<'static, std::io::Result<Bytes>>,
}

impl std::fmt::Debug for ArchiveStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveStream")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Archive storage keyed by coordinate and version.
///
/// Archives are write-once: `write_archive` never replaces an existing one,
/// even when racing another writer for the same version.
#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// Versions stored under `module`, or `NotFound` if it holds no archive.
    async fn list_versions(&self, module: &ModuleCoordinate)
    -> Result<Vec<ModuleVersion>, StoreError>;

    async fn archive_exists(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
    ) -> Result<bool, StoreError>;

    async fn open_archive(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
    ) -> Result<ArchiveStream, StoreError>;

    async fn write_archive(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
        data: Bytes,
    ) -> Result<(), StoreError>;
}
