//! PIN-based access gate.
//!
//! A plain equality check against a fixed 4-digit PIN. There is no lockout
//! after repeated failures; see DESIGN.md.

use crate::error::{QlensError, Result};

/// PIN used when no override is configured.
pub const DEFAULT_ACCESS_PIN: &str = "3141";

/// Gate in front of the capture surface.
#[derive(Debug, Clone)]
pub struct AccessGate {
    pin: String,
}

impl AccessGate {
    /// Creates a gate with the given PIN.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless the PIN is exactly 4 ASCII
    /// digits.
    pub fn new(pin: impl Into<String>) -> Result<Self> {
        let pin = pin.into();
        if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(QlensError::config("access PIN must be exactly 4 digits"));
        }
        Ok(Self { pin })
    }

    /// Creates a gate with the built-in default PIN.
    pub fn with_default() -> Self {
        Self {
            pin: DEFAULT_ACCESS_PIN.to_string(),
        }
    }

    /// Checks a candidate PIN.
    pub fn verify(&self, candidate: &str) -> bool {
        candidate == self.pin
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::with_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pin_verifies() {
        let gate = AccessGate::with_default();
        assert!(gate.verify(DEFAULT_ACCESS_PIN));
        assert!(!gate.verify("0000"));
    }

    #[test]
    fn test_custom_pin() {
        let gate = AccessGate::new("7216").unwrap();
        assert!(gate.verify("7216"));
        assert!(!gate.verify("7217"));
    }

    #[test]
    fn test_malformed_pins_are_rejected() {
        assert!(AccessGate::new("123").is_err());
        assert!(AccessGate::new("12345").is_err());
        assert!(AccessGate::new("12a4").is_err());
    }
}
