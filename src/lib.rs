//! Elliott wave detection for OHLC price series.
//!
//! The analysis runs in three stages:
//!
//! 1. [`extract_pivots`] reduces a series to alternating swing highs and
//!    lows with a percentage-threshold zigzag.
//! 2. [`analyze_waves`] reads the most recent pivots as a five-wave impulse
//!    and as an ABC correction, scores both against the wave rules and
//!    Fibonacci guidelines, and picks a primary count.
//! 3. [`fibonacci_levels`] derives retracements, wave extensions and wave C
//!    targets from the same pivots.
//!
//! [`WaveAnalyzer`] chains the stages and returns an [`AnalysisResult`].
//! Every stage is also exposed on its own. Functions accept any bar type
//! implementing [`Ohlcv`].
//!
//! Analysis never fails: too little data yields empty levels and
//! zero-score [`PatternType::Unknown`] counts. Only configuration can be
//! rejected, with a [`ConfigError`].
//!
//! ```
//! use quantedge_waves::{PatternType, PricePoint, WaveAnalyzer};
//!
//! let closes = [110.0, 100.0, 120.0, 110.0, 145.0, 130.0, 150.0];
//! let series: Vec<PricePoint> = closes
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &c)| PricePoint::new(i, i as u64, c, c + 0.5, c - 0.5, c, 0))
//!     .collect();
//!
//! let result = WaveAnalyzer::default().analyze(&series);
//!
//! assert_eq!(result.primary.pattern_type(), PatternType::Impulse);
//! println!("{}", result.primary.summary());
//! ```

mod analysis;
mod error;
mod fib;
mod ohlcv;
mod percent;
mod pivot;
mod ratios;
mod rules;
mod scorer;
mod wave;
mod zigzag;

pub use crate::error::ConfigError;
pub use crate::ohlcv::{Ohlcv, Price, PricePoint, Timestamp};
pub use crate::percent::Percent;
pub use crate::pivot::{Pivot, PivotDirection};
pub use crate::ratios::{
    EXTENSION_RATIOS, RETRACEMENT_RATIOS, Ratios, WAVE_C_TARGET_RATIOS, WAVE3_TARGET_RATIOS,
    WAVE5_TARGET_RATIOS,
};

pub use crate::zigzag::{
    DEFAULT_MAX_PIVOTS, ZigzagConfig, ZigzagConfigBuilder, detect_zigzag, extract_pivots,
    pivot_strength, recent_pivots, validate_zigzag,
};

pub use crate::rules::{
    CorrectiveViolation, CorrectiveWaves, ImpulseViolation, ImpulseWaves, RuleCheck,
    WAVE2_GUIDELINES, WAVE3_GUIDELINES, WAVE4_GUIDELINES, WAVE5_GUIDELINES,
    check_corrective_rules, check_impulse_rules, fibonacci_score,
};
pub use crate::scorer::{
    WaveAnalysis, analyze_waves, analyze_waves_with, combined_impulse_score, corrective_count,
    impulse_count, invalidation_level, overall_trend, wave_labels,
};
pub use crate::wave::{Invalidation, PatternType, Trend, Wave, WaveCount, WaveLabel};

pub use crate::fib::{
    Confluence, FibLevel, FibRatios, FibonacciLevels, LevelKind, RankedLevel, SupportResistance,
    abc_targets, extension_levels, fibonacci_levels, filter_relevant_levels, find_confluences,
    retracement_levels, support_resistance_levels, swing_retracements, wave_extensions,
};

pub use crate::analysis::{AnalysisConfig, AnalysisConfigBuilder, AnalysisResult, WaveAnalyzer};

#[cfg(test)]
mod test_util;
