//! Secret configuration file storage.
//!
//! Provides secure loading of secret configuration from
//! `~/.config/qlens/secret.json`.

use std::fs;
use std::path::PathBuf;

use qlens_core::config::SecretConfig;

use crate::paths::QlensPaths;

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Configuration file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine home directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

impl From<SecretStorageError> for qlens_core::QlensError {
    fn from(e: SecretStorageError) -> Self {
        qlens_core::QlensError::config(e.to_string())
    }
}

/// Storage for the secret configuration file (secret.json).
///
/// Responsibilities:
/// - Load secret.json from the QLENS config directory
/// - Parse JSON into the `SecretConfig` domain model
///
/// Does NOT:
/// - Write or modify secret files (read-only)
/// - Validate tokens or keys
/// - Handle encryption (plaintext JSON storage)
///
/// # Security Note
///
/// This storage reads plaintext JSON files. The secret.json file should
/// have appropriate file permissions (e.g., 600) to prevent unauthorized
/// access. Error messages never include file contents.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a SecretStorage at the default path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigDirNotFound` when the home directory cannot be
    /// resolved.
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = QlensPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a SecretStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration from the JSON file.
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Returns the path to the secret file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SecretStorage::with_path(dir.path().join("secret.json"));
        assert!(matches!(
            storage.load(),
            Err(SecretStorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_loads_link_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        fs::write(
            &path,
            r#"{ "link": { "api_token": "tok-123" }, "analysis": { "api_key": "key-456" } }"#,
        )
        .unwrap();

        let config = SecretStorage::with_path(path).load().unwrap();
        assert_eq!(config.link.unwrap().api_token, "tok-123");
        assert_eq!(config.analysis.unwrap().api_key, "key-456");
    }

    #[test]
    fn test_error_text_never_contains_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        fs::write(&path, r#"{ "link": { "api_token": "tok-789" "#).unwrap();

        let err = SecretStorage::with_path(path).load().unwrap_err();
        assert!(!err.to_string().contains("tok-789"));
    }
}
