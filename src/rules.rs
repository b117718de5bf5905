use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Pivot, Price};

/// Ideal wave 2 / wave 1 size ratios.
pub const WAVE2_GUIDELINES: [f64; 3] = [0.382, 0.5, 0.618];

/// Ideal wave 3 / wave 1 size ratios.
pub const WAVE3_GUIDELINES: [f64; 3] = [1.618, 2.618, 1.0];

/// Ideal wave 5 / wave 1 size ratios.
pub const WAVE5_GUIDELINES: [f64; 3] = [0.618, 1.0, 1.618];

/// Ideal wave 4 / wave 3 size ratios.
pub const WAVE4_GUIDELINES: [f64; 3] = [0.236, 0.382, 0.5];

/// Band wave B should retrace of wave A.
const WAVE_B_RETRACEMENT: (f64, f64) = (0.3, 0.9);

/// Wave C / wave A ratios a correction is expected to land near.
const WAVE_C_PROPORTIONS: [f64; 2] = [1.0, 1.618];

const WAVE_C_TOLERANCE: f64 = 0.3;

/// Corrective counts stay valid while their penalty is below this.
const CORRECTIVE_PENALTY_LIMIT: f64 = 50.0;

/// A broken impulse rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum ImpulseViolation {
    #[error("Not enough pivots for impulse")]
    InsufficientPivots,
    #[error("Wave 2 retraces more than 100% of wave 1")]
    Wave2Retracement,
    #[error("Wave 3 is the shortest wave")]
    Wave3Shortest,
    #[error("Wave 4 overlaps wave 1 territory")]
    Wave4Overlap,
}

impl ImpulseViolation {
    /// Points deducted from the rule score.
    #[must_use]
    pub fn penalty(self) -> f64 {
        match self {
            Self::InsufficientPivots => 100.0,
            Self::Wave2Retracement => 50.0,
            Self::Wave3Shortest => 30.0,
            Self::Wave4Overlap => 40.0,
        }
    }
}

/// A broken corrective guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum CorrectiveViolation {
    #[error("Not enough pivots for corrective")]
    InsufficientPivots,
    #[error("Wave B retraces outside 30-90% of wave A")]
    WaveBRetracement,
    #[error("Wave C is not proportional to wave A")]
    WaveCProportion,
}

impl CorrectiveViolation {
    /// Points deducted from the rule score.
    #[must_use]
    pub fn penalty(self) -> f64 {
        match self {
            Self::InsufficientPivots => 100.0,
            Self::WaveBRetracement => 20.0,
            Self::WaveCProportion => 15.0,
        }
    }
}

/// Outcome of checking a pivot window against a set of wave rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck<V> {
    valid: bool,
    score: f64,
    violations: Vec<V>,
}

impl<V> RuleCheck<V> {
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// `100` minus the total penalty, floored at zero.
    #[inline]
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    #[must_use]
    pub fn violations(&self) -> &[V] {
        &self.violations
    }
}

fn penalty_score(penalty: f64) -> f64 {
    (100.0 - penalty).max(0.0)
}

/// The price points of a five-wave impulse.
///
/// Built from the last six pivots (wave 1 start through wave 5 end). With
/// exactly five pivots wave 5 has not finished and [`wave5`](Self::wave5)
/// is `None`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpulseWaves {
    /// Wave 1 start, then the ends of waves 1 to 4.
    points: [Price; 5],
    wave5_end: Option<Price>,
}

impl ImpulseWaves {
    /// `None` with fewer than five pivots.
    #[must_use]
    pub fn from_pivots(pivots: &[Pivot]) -> Option<Self> {
        let (window, wave5_end) = match pivots.len() {
            0..5 => return None,
            5 => (pivots, None),
            n => (&pivots[n - 6..n - 1], Some(pivots[n - 1].price())),
        };

        Some(Self {
            points: std::array::from_fn(|i| window[i].price()),
            wave5_end,
        })
    }

    fn size(&self, wave: usize) -> f64 {
        (self.points[wave] - self.points[wave - 1]).abs()
    }

    #[must_use]
    pub fn wave1(&self) -> f64 {
        self.size(1)
    }

    #[must_use]
    pub fn wave2(&self) -> f64 {
        self.size(2)
    }

    #[must_use]
    pub fn wave3(&self) -> f64 {
        self.size(3)
    }

    #[must_use]
    pub fn wave4(&self) -> f64 {
        self.size(4)
    }

    /// Wave 5 size, `None` while it is still forming.
    #[must_use]
    pub fn wave5(&self) -> Option<f64> {
        self.wave5_end.map(|end| (end - self.points[4]).abs())
    }

    /// `true` when wave 1 rose.
    #[must_use]
    pub fn is_rising(&self) -> bool {
        self.points[1] > self.points[0]
    }
}

/// The price points of an ABC correction.
///
/// Built from the last four pivots (wave A start through wave C end). With
/// exactly three pivots wave C has not finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrectiveWaves {
    /// Wave A start, then the ends of waves A and B.
    points: [Price; 3],
    c_end: Option<Price>,
}

impl CorrectiveWaves {
    /// `None` with fewer than three pivots.
    #[must_use]
    pub fn from_pivots(pivots: &[Pivot]) -> Option<Self> {
        let (window, c_end) = match pivots.len() {
            0..3 => return None,
            3 => (pivots, None),
            n => (&pivots[n - 4..n - 1], Some(pivots[n - 1].price())),
        };

        Some(Self {
            points: std::array::from_fn(|i| window[i].price()),
            c_end,
        })
    }

    #[must_use]
    pub fn a(&self) -> f64 {
        (self.points[1] - self.points[0]).abs()
    }

    #[must_use]
    pub fn b(&self) -> f64 {
        (self.points[2] - self.points[1]).abs()
    }

    /// Wave C size, `None` while it is still forming.
    #[must_use]
    pub fn c(&self) -> Option<f64> {
        self.c_end.map(|end| (end - self.points[2]).abs())
    }
}

/// Checks the three impulse rules against the most recent pivots.
///
/// | Rule | Violation | Penalty |
/// |------|-----------|---------|
/// | Wave 2 never retraces beyond the start of wave 1 | [`ImpulseViolation::Wave2Retracement`] | 50 |
/// | Wave 3 is never the shortest of waves 1, 3 and 5 | [`ImpulseViolation::Wave3Shortest`] | 30 |
/// | Wave 4 never enters wave 1 territory | [`ImpulseViolation::Wave4Overlap`] | 40 |
///
/// A count is valid only with no violations. While wave 5 is incomplete,
/// wave 3 is only compared with wave 1. Fewer than five pivots fail with
/// [`ImpulseViolation::InsufficientPivots`] and score zero.
///
/// # Example
///
/// ```
/// use quantedge_waves::{check_impulse_rules, ImpulseViolation, Pivot};
///
/// let pivots = [
///     Pivot::low(0, 100.0),
///     Pivot::high(1, 120.0),
///     Pivot::low(2, 95.0), // below the start of wave 1
///     Pivot::high(3, 140.0),
///     Pivot::low(4, 125.0),
/// ];
///
/// let check = check_impulse_rules(&pivots);
/// assert!(!check.is_valid());
/// assert_eq!(check.violations(), &[ImpulseViolation::Wave2Retracement]);
/// assert_eq!(check.score(), 50.0);
/// ```
#[must_use]
pub fn check_impulse_rules(pivots: &[Pivot]) -> RuleCheck<ImpulseViolation> {
    let Some(waves) = ImpulseWaves::from_pivots(pivots) else {
        return RuleCheck {
            valid: false,
            score: 0.0,
            violations: vec![ImpulseViolation::InsufficientPivots],
        };
    };

    let mut violations = Vec::new();

    let (wave1, wave3) = (waves.wave1(), waves.wave3());
    if wave1 > 0.0 && waves.wave2() / wave1 > 1.0 {
        violations.push(ImpulseViolation::Wave2Retracement);
    }

    if wave3 <= wave1 || waves.wave5().is_some_and(|wave5| wave3 <= wave5) {
        violations.push(ImpulseViolation::Wave3Shortest);
    }

    let (wave1_end, wave4_end) = (waves.points[1], waves.points[4]);
    let overlaps = if waves.is_rising() {
        wave4_end <= wave1_end
    } else {
        wave4_end >= wave1_end
    };
    if overlaps {
        violations.push(ImpulseViolation::Wave4Overlap);
    }

    let penalty: f64 = violations.iter().map(|v| v.penalty()).sum();

    RuleCheck {
        valid: violations.is_empty(),
        score: penalty_score(penalty),
        violations,
    }
}

/// Relative distance of `observed` from `expected`, capped at `1.0`.
fn ratio_error(observed: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        return 1.0;
    }
    ((observed - expected).abs() / expected).min(1.0)
}

fn closest_error(observed: f64, guidelines: &[f64]) -> f64 {
    guidelines
        .iter()
        .map(|&expected| ratio_error(observed, expected))
        .fold(1.0, f64::min)
}

/// Scores how closely impulse wave proportions follow Fibonacci guidelines.
///
/// Compares wave 2/1, wave 3/1, wave 5/1 and wave 4/3 against
/// [`WAVE2_GUIDELINES`], [`WAVE3_GUIDELINES`], [`WAVE5_GUIDELINES`] and
/// [`WAVE4_GUIDELINES`]. Each ratio contributes its smallest relative
/// error, capped at 1; the score is `(1 - mean error) * 100`.
///
/// Ratios over a zero-length base are skipped, as is wave 5 while it is
/// incomplete. Returns `0.0` when nothing can be compared.
#[must_use]
pub fn fibonacci_score(pivots: &[Pivot]) -> f64 {
    let Some(waves) = ImpulseWaves::from_pivots(pivots) else {
        return 0.0;
    };

    let mut errors = Vec::with_capacity(4);

    let wave1 = waves.wave1();
    if wave1 > 0.0 {
        errors.push(closest_error(waves.wave2() / wave1, &WAVE2_GUIDELINES));
        errors.push(closest_error(waves.wave3() / wave1, &WAVE3_GUIDELINES));
        if let Some(wave5) = waves.wave5() {
            errors.push(closest_error(wave5 / wave1, &WAVE5_GUIDELINES));
        }
    }

    let wave3 = waves.wave3();
    if wave3 > 0.0 {
        errors.push(closest_error(waves.wave4() / wave3, &WAVE4_GUIDELINES));
    }

    if errors.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = errors.iter().sum::<f64>() / errors.len() as f64;

    ((1.0 - mean) * 100.0).max(0.0)
}

/// Checks ABC proportion guidelines against the most recent pivots.
///
/// Wave B outside 30-90% of wave A costs 20 points; wave C further than
/// 0.3 from 1.0 or 1.618 times wave A costs 15. The count stays valid
/// while the total penalty is below 50. A zero-length wave A fails both
/// proportion checks. The wave C check is skipped while wave C is
/// incomplete.
///
/// # Example
///
/// ```
/// use quantedge_waves::{check_corrective_rules, Pivot};
///
/// let pivots = [
///     Pivot::high(0, 150.0),
///     Pivot::low(1, 120.0),
///     Pivot::high(2, 135.0),
///     Pivot::low(3, 110.0),
/// ];
///
/// let check = check_corrective_rules(&pivots);
/// assert!(check.is_valid());
/// assert_eq!(check.score(), 100.0);
/// ```
#[must_use]
pub fn check_corrective_rules(pivots: &[Pivot]) -> RuleCheck<CorrectiveViolation> {
    let Some(waves) = CorrectiveWaves::from_pivots(pivots) else {
        return RuleCheck {
            valid: false,
            score: 0.0,
            violations: vec![CorrectiveViolation::InsufficientPivots],
        };
    };

    let mut violations = Vec::new();
    let a = waves.a();

    let (low, high) = WAVE_B_RETRACEMENT;
    let b_in_band = a > 0.0 && (low..=high).contains(&(waves.b() / a));
    if !b_in_band {
        violations.push(CorrectiveViolation::WaveBRetracement);
    }

    if let Some(c) = waves.c() {
        let proportional = a > 0.0
            && WAVE_C_PROPORTIONS
                .iter()
                .map(|target| (c / a - target).abs())
                .fold(f64::INFINITY, f64::min)
                <= WAVE_C_TOLERANCE;
        if !proportional {
            violations.push(CorrectiveViolation::WaveCProportion);
        }
    }

    let penalty: f64 = violations.iter().map(|v| v.penalty()).sum();

    RuleCheck {
        valid: penalty < CORRECTIVE_PENALTY_LIMIT,
        score: penalty_score(penalty),
        violations,
    }
}
