use std::fmt;

use crate::domain::error::DomainError;

/// `(namespace, name, system)` triple identifying a module family.
///
/// Segments are case-sensitive and used verbatim as directory names, so every
/// constructor validates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleCoordinate {
    namespace: String,
    name: String,
    system: String,
}

impl ModuleCoordinate {
    /// # Errors
    /// Returns [`DomainError::InvalidSegment`] if any segment is not path-safe.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        system: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let namespace = namespace.into();
        let name = name.into();
        let system = system.into();
        validate_segment("namespace", &namespace)?;
        validate_segment("name", &name)?;
        validate_segment("system", &system)?;
        Ok(Self {
            namespace,
            name,
            system,
        })
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Segments in storage order.
    #[must_use]
    pub fn segments(&self) -> [&str; 3] {
        [&self.namespace, &self.name, &self.system]
    }
}

impl fmt::Display for ModuleCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.name, self.system)
    }
}

/// Opaque version string of one archive within a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleVersion(String);

impl ModuleVersion {
    /// # Errors
    /// Returns [`DomainError::InvalidSegment`] if the version is not path-safe.
    pub fn new(version: impl Into<String>) -> Result<Self, DomainError> {
        let version = version.into();
        validate_segment("version", &version)?;
        Ok(Self(version))
    }

    /// Version recovered from an archive file name already on disk.
    pub(crate) fn from_stored(version: &str) -> Self {
        Self(version.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_segment(field: &'static str, value: &str) -> Result<(), DomainError> {
    let reason = if value.is_empty() {
        Some("must not be empty")
    } else if value.starts_with('.') {
        // covers "." and ".." as well as hidden staging files
        Some("must not start with '.'")
    } else if value.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if value.contains('\0') {
        Some("must not contain NUL")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DomainError::InvalidSegment {
            field,
            value: value.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}
