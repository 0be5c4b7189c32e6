use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::model::{ModuleCoordinate, ModuleVersion};
use crate::domain::store::{ArchiveStream, ModuleStore, StoreError};

/// Registry operations on top of a [`ModuleStore`].
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn ModuleStore>,
}

impl RegistryService {
    #[must_use]
    pub fn new(store: Arc<dyn ModuleStore>) -> Self {
        Self { store }
    }

    /// List the versions published for `module`.
    ///
    /// # Errors
    /// [`DomainError::ModuleNotFound`] if nothing was ever published under the
    /// coordinate, [`DomainError::Internal`] on storage failure.
    #[instrument(skip(self), fields(module = %module))]
    pub async fn list_versions(
        &self,
        module: &ModuleCoordinate,
    ) -> Result<Vec<ModuleVersion>, DomainError> {
        match self.store.list_versions(module).await {
            Ok(versions) => {
                debug!(count = versions.len(), "Listed module versions");
                Ok(versions)
            }
            Err(StoreError::NotFound) => Err(DomainError::ModuleNotFound(module.clone())),
            Err(e) => Err(internal(&e)),
        }
    }

    /// Succeeds if the archive for `module`/`version` is present.
    ///
    /// # Errors
    /// [`DomainError::VersionNotFound`] if it is absent.
    #[instrument(skip(self), fields(module = %module, version = %version))]
    pub async fn ensure_version(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
    ) -> Result<(), DomainError> {
        if self
            .store
            .archive_exists(module, version)
            .await
            .map_err(|e| internal(&e))?
        {
            Ok(())
        } else {
            debug!("Archive not found");
            Err(version_not_found(module, version))
        }
    }

    /// Open the stored archive for streaming.
    ///
    /// # Errors
    /// [`DomainError::VersionNotFound`] if it is absent.
    #[instrument(skip(self), fields(module = %module, version = %version))]
    pub async fn open_archive(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
    ) -> Result<ArchiveStream, DomainError> {
        match self.store.open_archive(module, version).await {
            Ok(archive) => Ok(archive),
            Err(StoreError::NotFound) => Err(version_not_found(module, version)),
            Err(e) => Err(internal(&e)),
        }
    }

    /// Publish a new archive.
    ///
    /// An existing version is reported before an empty payload, so clients
    /// re-sending a published version always learn to bump it.
    ///
    /// # Errors
    /// [`DomainError::VersionExists`] if the version is already published
    /// (including when another upload wins a race), [`DomainError::EmptyPayload`]
    /// for an empty body.
    #[instrument(skip(self, data), fields(module = %module, version = %version, size = data.len()))]
    pub async fn publish(
        &self,
        module: &ModuleCoordinate,
        version: &ModuleVersion,
        data: Bytes,
    ) -> Result<(), DomainError> {
        if self
            .store
            .archive_exists(module, version)
            .await
            .map_err(|e| internal(&e))?
        {
            return Err(DomainError::VersionExists {
                version: version.clone(),
            });
        }

        if data.is_empty() {
            return Err(DomainError::EmptyPayload);
        }

        match self.store.write_archive(module, version, data).await {
            Ok(()) => {
                info!("Published module archive");
                Ok(())
            }
            Err(StoreError::AlreadyExists) => Err(DomainError::VersionExists {
                version: version.clone(),
            }),
            Err(StoreError::EmptyPayload) => Err(DomainError::EmptyPayload),
            Err(e) => Err(internal(&e)),
        }
    }
}

fn version_not_found(module: &ModuleCoordinate, version: &ModuleVersion) -> DomainError {
    DomainError::VersionNotFound {
        module: module.clone(),
        version: version.clone(),
    }
}

fn internal(e: &StoreError) -> DomainError {
    tracing::error!(error = %e, "Registry storage failure");
    DomainError::Internal(e.to_string())
}
