//! Backend layer: the capability interfaces for job execution and
//! authentication, their remote (HTTP) and local (in-process) bearers, and
//! the out-of-core frame-analysis client.

pub mod analysis;
pub mod backend;
pub mod local;
pub mod remote;

pub use analysis::FrameAnalyzer;
pub use backend::{JobBackend, LinkAuthenticator};
pub use local::LocalBackend;
pub use remote::RemoteBackend;
