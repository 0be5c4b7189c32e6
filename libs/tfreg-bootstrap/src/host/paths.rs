use std::{
    env,
    path::{Path, PathBuf},
};

/// Errors for resolving user-relative paths
#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("HOME environment variable is not set")]
    HomeMissing,
}

/// Expand a `~` prefix to the user home directory.
///
/// Returns the path unchanged if no tilde prefix is present.
///
/// # Errors
/// Returns [`HomeDirError::HomeMissing`] if the path starts with `~` and the
/// home directory variable is not set.
pub fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    let Some(rest) = raw.strip_prefix('~') else {
        return Ok(PathBuf::from(raw));
    };

    #[cfg(target_os = "windows")]
    let home = env::var("USERPROFILE")
        .or_else(|_| env::var("HOME"))
        .map_err(|_| HomeDirError::HomeMissing)?;
    #[cfg(not(target_os = "windows"))]
    let home = env::var("HOME").map_err(|_| HomeDirError::HomeMissing)?;

    // "~username" is not supported; treat it as home + rest
    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(PathBuf::from(home))
    } else {
        Ok(Path::new(&home).join(rest))
    }
}
