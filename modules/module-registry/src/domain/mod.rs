pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::DomainError;
pub use model::{ModuleCoordinate, ModuleVersion};
pub use service::RegistryService;
pub use store::{ArchiveStream, ModuleStore, StoreError};
