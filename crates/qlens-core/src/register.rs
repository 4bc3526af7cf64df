//! Bit registers and weight derivation.
//!
//! A job's raw output is a fixed-length register of binary digits. The
//! decorative "quantum weight" attached to captures is a pure function of
//! that register: the fraction of 1-bits, dampened by a fixed constant.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QlensError;

/// Number of binary digits in a register.
pub const REGISTER_LEN: usize = 10;

/// Dampening constant `d = 1 - 1/π²`, fixed to 8 decimal digits at process
/// start. It never changes afterwards.
static DAMPENING: Lazy<f64> = Lazy::new(|| round_to(1.0 - 1.0 / (PI * PI), 8));

/// A fixed-length ordered sequence of binary digits.
///
/// Produced fresh by every job execution and immutable once produced; a new
/// register simply replaces the previously published one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BitRegister([u8; REGISTER_LEN]);

impl BitRegister {
    /// The all-zero register, the published value before any job has run.
    pub fn zeros() -> Self {
        Self([0; REGISTER_LEN])
    }

    /// Draws each digit independently and uniformly from {0, 1}.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bits = [0u8; REGISTER_LEN];
        for bit in &mut bits {
            *bit = rng.gen_range(0..2);
        }
        Self(bits)
    }

    /// Builds a register from raw digits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRegister` if any digit is not 0 or 1.
    pub fn from_bits(bits: [u8; REGISTER_LEN]) -> Result<Self, QlensError> {
        if bits.iter().any(|&b| b > 1) {
            return Err(QlensError::InvalidRegister(format!("{bits:?}")));
        }
        Ok(Self(bits))
    }

    /// The digits of this register, most significant first.
    pub fn bits(&self) -> &[u8; REGISTER_LEN] {
        &self.0
    }

    /// Number of 1-bits in the register.
    pub fn ones(&self) -> usize {
        self.0.iter().filter(|&&b| b == 1).count()
    }
}

impl fmt::Display for BitRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.0 {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

impl FromStr for BitRegister {
    type Err = QlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != REGISTER_LEN {
            return Err(QlensError::InvalidRegister(s.to_string()));
        }
        let mut bits = [0u8; REGISTER_LEN];
        for (slot, ch) in bits.iter_mut().zip(s.chars()) {
            *slot = match ch {
                '0' => 0,
                '1' => 1,
                _ => return Err(QlensError::InvalidRegister(s.to_string())),
            };
        }
        Ok(Self(bits))
    }
}

impl TryFrom<String> for BitRegister {
    type Error = QlensError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BitRegister> for String {
    fn from(register: BitRegister) -> Self {
        register.to_string()
    }
}

/// Returns the dampening constant applied during weight derivation.
pub fn dampening() -> f64 {
    *DAMPENING
}

/// Derives the normalized scalar weight of a register.
///
/// `weight = round(ones/len * d, 4)` where `d = 1 - 1/π²`. Total over all
/// valid registers: all zeros yields 0.0, all ones yields `round(d, 4)`.
pub fn derive_weight(register: &BitRegister) -> f64 {
    let raw = register.ones() as f64 / REGISTER_LEN as f64;
    round_to(raw * *DAMPENING, 4)
}

fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dampening_constant() {
        assert_eq!(dampening(), 0.89867882);
    }

    #[test]
    fn test_weight_boundaries() {
        assert_eq!(derive_weight(&BitRegister::zeros()), 0.0);

        let all_ones = BitRegister::from_bits([1; REGISTER_LEN]).unwrap();
        assert_eq!(derive_weight(&all_ones), 0.8987);
    }

    #[test]
    fn test_weight_is_deterministic() {
        let register: BitRegister = "1010010011".parse().unwrap();
        let first = derive_weight(&register);
        assert_eq!(first, derive_weight(&register));
        // 5 ones out of 10, dampened and rounded to 4 digits
        assert_eq!(first, 0.4493);
    }

    #[test]
    fn test_sample_produces_valid_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let register = BitRegister::sample(&mut rng);
            assert!(register.bits().iter().all(|&b| b <= 1));
            assert!(register.ones() <= REGISTER_LEN);
        }
    }

    #[test]
    fn test_display_round_trip() {
        let register: BitRegister = "0110110001".parse().unwrap();
        assert_eq!(register.to_string(), "0110110001");
        assert_eq!(register.ones(), 5);
    }

    #[test]
    fn test_parse_rejects_malformed_strings() {
        assert!("011011000".parse::<BitRegister>().is_err()); // too short
        assert!("01101100011".parse::<BitRegister>().is_err()); // too long
        assert!("01101100a1".parse::<BitRegister>().is_err()); // non-binary
    }

    #[test]
    fn test_from_bits_rejects_non_binary_digits() {
        let err = BitRegister::from_bits([2, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, QlensError::InvalidRegister(_)));
    }
}
