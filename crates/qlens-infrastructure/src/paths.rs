//! Unified path management for QLENS files.
//!
//! All configuration, secrets, and captured artifacts live under the
//! platform config/data directories, so every storage component resolves
//! its location through one place.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for QLENS.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/qlens/             # Config directory
/// ├── config.toml              # Application configuration
/// └── secret.json              # API tokens and keys
///
/// ~/.local/share/qlens/        # Data directory
/// └── artifacts/               # Captured artifacts, one JSON file each
/// ```
pub struct QlensPaths;

impl QlensPaths {
    /// Returns the QLENS configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("qlens"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to `secret.json`.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Returns the directory captured artifacts are stored in.
    pub fn artifact_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("qlens").join("artifacts"))
            .ok_or(PathError::HomeDirNotFound)
    }
}
