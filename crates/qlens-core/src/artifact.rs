//! Captured artifacts and overlay modes.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::register::{BitRegister, derive_weight};

/// Cosmetic visual filter mode the overlay is rendered in.
///
/// The filter strings themselves are view logic; the core only carries the
/// mode so captures and analysis prompts can name it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OverlayMode {
    #[default]
    Standard,
    Entangle,
    Spectral,
    Noir,
}

/// A captured snapshot bundling an image with the register and weight that
/// were published at the moment of capture.
///
/// There is no binding between an artifact and the job that produced its
/// bits beyond "most recent at capture time."
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    /// Opaque encoded image payload; encoding is the capture collaborator's
    /// responsibility.
    pub image_data: String,
    pub mode: OverlayMode,
    pub bits: String,
    pub weight: f64,
    pub timestamp: String,
}

impl Artifact {
    /// Creates an artifact from the currently published register.
    ///
    /// The weight is recomputed here rather than carried alongside the
    /// register; it is never stored independently of the bits that produced
    /// it.
    pub fn new(image_data: impl Into<String>, mode: OverlayMode, register: &BitRegister) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image_data: image_data.into(),
            mode,
            bits: register.to_string(),
            weight: derive_weight(register),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
