use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A percentage threshold such as the zigzag reversal size.
///
/// Wraps a positive, finite `f64` expressed in percent (`4.0` means 4%).
/// [`Percent::new`] panics on invalid values, [`Percent::try_new`] reports
/// them as [`ConfigError::InvalidPercent`].
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
///
/// # Example
///
/// ```
/// use quantedge_waves::Percent;
///
/// let threshold = Percent::new(4.0);
/// assert_eq!(threshold.value(), 4.0);
/// assert!(Percent::try_new(-1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percent(f64);

impl Percent {
    /// Creates a new percentage.
    ///
    /// # Panics
    ///
    /// Panics if `value` is zero, negative, NaN or infinite.
    #[must_use]
    pub fn new(value: f64) -> Self {
        assert!(!value.is_nan(), "percent must not be NaN");
        assert!(value.is_finite(), "percent must be finite");
        assert!(value > 0.0, "percent must be positive");
        Self(value)
    }

    /// Creates a new percentage, rejecting zero, negative, NaN and infinite
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPercent`] carrying the rejected value.
    pub fn try_new(value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidPercent(value))
        }
    }

    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Percent {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Percent {}

impl Hash for Percent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for Percent {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Percent> for f64 {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keeps_value() {
        assert_eq!(Percent::new(2.5).value(), 2.5);
    }

    #[test]
    #[should_panic(expected = "percent must be positive")]
    fn panics_on_zero() {
        let _ = Percent::new(0.0);
    }

    #[test]
    #[should_panic(expected = "percent must be positive")]
    fn panics_on_negative() {
        let _ = Percent::new(-1.0);
    }

    #[test]
    #[should_panic(expected = "percent must not be NaN")]
    fn panics_on_nan() {
        let _ = Percent::new(f64::NAN);
    }

    #[test]
    #[should_panic(expected = "percent must be finite")]
    fn panics_on_infinity() {
        let _ = Percent::new(f64::INFINITY);
    }

    #[test]
    fn try_new_reports_rejected_value() {
        assert_eq!(
            Percent::try_new(-3.0),
            Err(ConfigError::InvalidPercent(-3.0))
        );
        assert!(Percent::try_new(f64::NAN).is_err());
        assert_eq!(Percent::try_new(1.0), Ok(Percent::new(1.0)));
    }

    #[test]
    fn eq_and_hash() {
        let mut set = HashSet::new();
        set.insert(Percent::new(4.0));

        assert!(set.contains(&Percent::new(4.0)));
        assert!(!set.contains(&Percent::new(2.0)));
    }

    #[test]
    fn display() {
        assert_eq!(Percent::new(4.0).to_string(), "4%");
        assert_eq!(Percent::new(2.5).to_string(), "2.5%");
    }

    mod serialization {
        use super::*;

        #[test]
        fn round_trips_as_bare_number() {
            assert_eq!(serde_json::to_string(&Percent::new(4.0)).unwrap(), "4.0");
            let parsed: Percent = serde_json::from_str("2.0").unwrap();
            assert_eq!(parsed, Percent::new(2.0));
        }

        #[test]
        fn rejects_invalid_on_deserialize() {
            assert!(serde_json::from_str::<Percent>("0.0").is_err());
            assert!(serde_json::from_str::<Percent>("-4.0").is_err());
        }
    }
}
