//! Application layer for QLENS.
//!
//! This crate provides use case implementations that coordinate between the
//! domain and backend layers: authentication, job execution, artifact
//! capture, and camera stream ownership.

pub mod camera;
pub mod capture_service;
pub mod job_service;
pub mod link_service;

pub use camera::{CameraController, CameraLease, CameraStream};
pub use capture_service::CaptureService;
pub use job_service::JobService;
pub use link_service::LinkService;
