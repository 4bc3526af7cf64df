//! Infrastructure layer for QLENS.
//!
//! Platform paths, configuration and secret file storage, and the
//! filesystem artifact repository.

pub mod fs_artifact_repository;
pub mod paths;
pub mod storage;

pub use fs_artifact_repository::FsArtifactRepository;
pub use storage::{ConfigStorage, SecretStorage};
