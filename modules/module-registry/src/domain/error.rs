use crate::domain::model::{ModuleCoordinate, ModuleVersion};

/// Domain-level errors for the module registry
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Module {0} not found")]
    ModuleNotFound(ModuleCoordinate),

    #[error("Version {version} of module {module} not found")]
    VersionNotFound {
        module: ModuleCoordinate,
        version: ModuleVersion,
    },

    #[error("Version {version} already exists! Please update the version number.")]
    VersionExists { version: ModuleVersion },

    #[error("No data received. Please include your module archive as the request body.")]
    EmptyPayload,

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidSegment {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
