// src/test_util.rs

use crate::{Ohlcv, Pivot, Price, Timestamp};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() <= e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

/// Asserts that two `f64` values are within an absolute tolerance.
macro_rules! assert_near {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (a, e, t) = ($actual, $expected, $tolerance);
        assert!(
            (a - e).abs() <= t,
            "assert_near failed: actual={a}, expected={e}, diff={} > {t}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;
pub(crate) use assert_near;

pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub open_time: u64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            open_time: 0,
        }
    }

    pub fn at(mut self, open_time: u64) -> Self {
        self.open_time = open_time;
        self
    }
}

impl Ohlcv for Bar {
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
}

/// Series of bars built from parallel high/low columns. Open and close sit
/// at the bar midpoint, open times count from zero.
pub fn series(highs: &[f64], lows: &[f64]) -> Vec<Bar> {
    assert_eq!(highs.len(), lows.len(), "highs and lows must align");

    highs
        .iter()
        .zip(lows)
        .enumerate()
        .map(|(i, (&high, &low))| {
            let mid = f64::midpoint(high, low);
            Bar::new(mid, high, low, mid).at(i as u64)
        })
        .collect()
}

/// Alternating pivot sequence from raw prices, spaced ten bars apart. The
/// first pivot takes `first` as its direction.
pub fn zigzag(first: crate::PivotDirection, prices: &[f64]) -> Vec<Pivot> {
    let mut direction = first;

    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let pivot = Pivot::new(i * 10, price, direction);
            direction = direction.opposite();
            pivot
        })
        .collect()
}

/// Rising five-wave impulse: 100 → 120 → 110 → 145 → 130 → 150.
pub fn impulse() -> Vec<Pivot> {
    zigzag(
        crate::PivotDirection::Low,
        &[100.0, 120.0, 110.0, 145.0, 130.0, 150.0],
    )
}

/// Falling ABC correction: 150 → 120 → 135 → 110.
pub fn corrective() -> Vec<Pivot> {
    zigzag(crate::PivotDirection::High, &[150.0, 120.0, 135.0, 110.0])
}
