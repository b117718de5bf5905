#![allow(dead_code)]

use quantedge_waves::{Ohlcv, PatternType, PivotDirection, Price, PricePoint, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};

/// Daily OHLCV bar parsed from the synthetic series CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv for RefBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn open_time(&self) -> Timestamp {
        self.open_time
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

impl RefBar {
    /// Same bar as a [`PricePoint`] at position `index`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_price_point(&self, index: usize) -> PricePoint {
        PricePoint::new(
            index,
            self.open_time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume.round() as u64,
        )
    }
}

/// Reference pivot with the open time of its bar.
#[derive(Debug, Deserialize)]
pub struct RefPivot {
    pub open_time: u64,
    pub index: usize,
    pub price: f64,
    pub direction: PivotDirection,
}

/// Reference wave scores for the first `pivot_count` pivots.
#[derive(Debug, Deserialize)]
pub struct RefWaves {
    pub pivot_count: usize,
    pub primary: PatternType,
    pub primary_score: f64,
    pub alternate: PatternType,
    pub alternate_score: f64,
}

const OHLCV_PATH: &str = "tests/fixtures/data/synthetic-1d.csv";

/// Load the synthetic daily OHLCV series.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Load reference pivots (zigzag + cleanup).
pub fn load_ref_pivots(path: &str) -> Vec<RefPivot> {
    load_records(path, "invalid pivot record")
}

/// Load reference wave scores.
pub fn load_ref_waves(path: &str) -> Vec<RefWaves> {
    load_records(path, "invalid wave record")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Generate reference tests for pivot extraction and wave scoring at one
/// zigzag threshold.
///
/// Usage: `reference_test!(daily_4pct, 4.0, "tests/fixtures/data/zigzag-4pct.csv", "tests/fixtures/data/waves-4pct.csv", 1e-9);`
#[allow(unused_macros)]
macro_rules! reference_test {
    ($name:ident, $threshold:expr, $pivots_path:expr, $waves_path:expr, $tolerance:expr) => {
        mod $name {
            use super::fixtures::*;
            use quantedge_waves::*;

            fn config() -> ZigzagConfig {
                ZigzagConfig::builder()
                    .threshold(Percent::new($threshold))
                    .min_move(Percent::new(1.0))
                    .build()
            }

            #[test]
            fn pivots_match_reference() {
                let bars = load_reference_ohlcvs();
                let reference = load_ref_pivots($pivots_path);

                let pivots = extract_pivots(&bars, &config());

                assert_eq!(
                    pivots.len(),
                    reference.len(),
                    "{}: pivot count",
                    stringify!($name)
                );
                for (i, (pivot, expected)) in pivots.iter().zip(&reference).enumerate() {
                    let context = format!("{} pivot {i} (t={})", stringify!($name), expected.open_time);
                    assert_eq!(pivot.index(), expected.index, "{context}: index");
                    assert_eq!(pivot.direction(), expected.direction, "{context}: direction");
                    assert_eq!(bars[pivot.index()].open_time, expected.open_time, "{context}: bar");
                    assert_near(pivot.price(), expected.price, 0.0, &context);
                }
            }

            #[test]
            fn waves_match_reference() {
                let bars = load_reference_ohlcvs();
                let reference = load_ref_waves($waves_path);
                let pivots = extract_pivots(&bars, &config());

                assert_eq!(reference.len(), pivots.len());
                for expected in &reference {
                    let analysis = analyze_waves(&pivots[..expected.pivot_count]);
                    let context = format!("{} at {} pivots", stringify!($name), expected.pivot_count);

                    assert_eq!(analysis.primary.pattern_type(), expected.primary, "{context}");
                    assert_eq!(analysis.alternate.pattern_type(), expected.alternate, "{context}");
                    assert_near(analysis.primary.score(), expected.primary_score, $tolerance, &context);
                    assert_near(
                        analysis.alternate.score(),
                        expected.alternate_score,
                        $tolerance,
                        &context,
                    );
                }
            }

            #[test]
            fn pivots_alternate_and_advance() {
                let pivots = extract_pivots(&load_reference_ohlcvs(), &config());

                for pair in pivots.windows(2) {
                    assert_ne!(pair[0].direction(), pair[1].direction(), "{} / {}", pair[0], pair[1]);
                    assert!(pair[0].index() < pair[1].index(), "{} / {}", pair[0], pair[1]);
                }
            }

            #[test]
            fn price_points_match_custom_bars() {
                let bars = load_reference_ohlcvs();
                let points: Vec<PricePoint> = bars
                    .iter()
                    .enumerate()
                    .map(|(i, bar)| bar.to_price_point(i))
                    .collect();

                assert_eq!(extract_pivots(&bars, &config()), extract_pivots(&points, &config()));
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use reference_test;

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
