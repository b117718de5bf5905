use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Standard retracement ratios: 23.6%, 38.2%, 50%, 61.8%, 78.6%.
pub const RETRACEMENT_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

/// Standard extension ratios.
pub const EXTENSION_RATIOS: [f64; 5] = [1.0, 1.272, 1.618, 2.0, 2.618];

/// Wave 3 targets, as multiples of wave 1 projected from the wave 3 start.
pub const WAVE3_TARGET_RATIOS: [f64; 3] = [1.618, 2.618, 4.236];

/// Wave 5 targets, as multiples of wave 1 projected from the wave 5 start.
pub const WAVE5_TARGET_RATIOS: [f64; 3] = [0.618, 1.0, 1.618];

/// Wave C targets, as multiples of wave A projected from the wave B end.
pub const WAVE_C_TARGET_RATIOS: [f64; 3] = [0.618, 1.0, 1.618];

/// A validated set of Fibonacci ratios.
///
/// Non-empty, every ratio finite and non-negative. Dereferences to `[f64]`
/// so it can be passed wherever a ratio slice is expected. Serializes as a
/// bare array.
///
/// # Example
///
/// ```
/// use quantedge_waves::{Ratios, RETRACEMENT_RATIOS};
///
/// let custom = Ratios::new(vec![0.333, 0.667]).unwrap();
/// assert_eq!(custom.len(), 2);
///
/// assert_eq!(&*Ratios::retracements(), &RETRACEMENT_RATIOS);
/// assert!(Ratios::new(vec![]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Ratios(Vec<f64>);

impl Ratios {
    /// Validates and wraps a ratio list.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyRatios`] for an empty list,
    /// [`ConfigError::InvalidRatio`] for the first negative or non-finite
    /// entry.
    pub fn new(ratios: Vec<f64>) -> Result<Self, ConfigError> {
        if ratios.is_empty() {
            return Err(ConfigError::EmptyRatios);
        }

        if let Some(&bad) = ratios.iter().find(|r| !r.is_finite() || **r < 0.0) {
            return Err(ConfigError::InvalidRatio(bad));
        }

        Ok(Self(ratios))
    }

    /// [`RETRACEMENT_RATIOS`].
    #[must_use]
    pub fn retracements() -> Self {
        Self(RETRACEMENT_RATIOS.to_vec())
    }

    /// [`EXTENSION_RATIOS`].
    #[must_use]
    pub fn extensions() -> Self {
        Self(EXTENSION_RATIOS.to_vec())
    }

    /// [`WAVE3_TARGET_RATIOS`].
    #[must_use]
    pub fn wave3_targets() -> Self {
        Self(WAVE3_TARGET_RATIOS.to_vec())
    }

    /// [`WAVE5_TARGET_RATIOS`].
    #[must_use]
    pub fn wave5_targets() -> Self {
        Self(WAVE5_TARGET_RATIOS.to_vec())
    }

    /// [`WAVE_C_TARGET_RATIOS`].
    #[must_use]
    pub fn wave_c_targets() -> Self {
        Self(WAVE_C_TARGET_RATIOS.to_vec())
    }
}

impl Deref for Ratios {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Ratios {
    type Error = ConfigError;

    fn try_from(ratios: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(ratios)
    }
}

impl From<Ratios> for Vec<f64> {
    fn from(ratios: Ratios) -> Self {
        ratios.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_ratio() {
        assert!(Ratios::new(vec![0.0, 0.5]).is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Ratios::new(Vec::new()), Err(ConfigError::EmptyRatios));
    }

    #[test]
    fn rejects_first_bad_ratio() {
        assert_eq!(
            Ratios::new(vec![0.5, -0.1, f64::NAN]),
            Err(ConfigError::InvalidRatio(-0.1))
        );
        assert!(Ratios::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn presets_match_constants() {
        assert_eq!(&*Ratios::extensions(), &EXTENSION_RATIOS);
        assert_eq!(&*Ratios::wave3_targets(), &WAVE3_TARGET_RATIOS);
        assert_eq!(&*Ratios::wave5_targets(), &WAVE5_TARGET_RATIOS);
        assert_eq!(&*Ratios::wave_c_targets(), &WAVE_C_TARGET_RATIOS);
    }

    #[test]
    fn deserializes_with_validation() {
        let ratios: Ratios = serde_json::from_str("[0.5, 0.618]").unwrap();
        assert_eq!(&*ratios, &[0.5, 0.618]);
        assert!(serde_json::from_str::<Ratios>("[]").is_err());
        assert!(serde_json::from_str::<Ratios>("[-1.0]").is_err());
    }
}
