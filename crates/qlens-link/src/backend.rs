//! Capability interfaces for the compute backend.
//!
//! The job executor selects between the remote and local implementations at
//! a single call site keyed off the current link status, so the remote/local
//! branching never leaks into the state machine itself.

use async_trait::async_trait;

use qlens_core::Result;
use qlens_core::link::ApiToken;
use qlens_core::register::BitRegister;

/// One asynchronous unit of work yielding a fresh bit register.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Short label used in logs ("remote", "local").
    fn name(&self) -> &'static str;

    /// Executes one job.
    ///
    /// `session_id` carries the established backend session for remote
    /// execution; local backends ignore it.
    async fn execute(&self, session_id: Option<&str>) -> Result<BitRegister>;
}

/// Credential validation against the compute backend.
#[async_trait]
pub trait LinkAuthenticator: Send + Sync {
    /// Validates the credential and returns the backend session identifier.
    async fn authenticate(&self, token: &ApiToken) -> Result<String>;
}
