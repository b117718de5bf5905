use serde::{Deserialize, Serialize};

/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar open timestamp or sequence number.
pub type Timestamp = u64;

/// OHLCV bar data used as input to pivot extraction and analysis.
///
/// Implement this on your own kline/candle type to avoid per-bar
/// conversion. Every series-consuming function accepts `&[B]` where
/// `B: Ohlcv`, and pivot indices refer to positions in that slice.
///
/// Series are expected to be ordered by [`open_time`](Ohlcv::open_time)
/// with `high >= low` on every bar. The analysis does not re-validate this.
///
/// # Example
///
/// ```
/// use quantedge_waves::{Ohlcv, Price, Timestamp};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64,
///     ts: u64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn open_time(&self) -> Timestamp { self.ts }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar. Swing highs are taken from here.
    fn high(&self) -> Price;

    /// Lowest price during the bar. Swing lows are taken from here.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bar.
    fn close(&self) -> Price;

    /// Bar open timestamp or sequence number. Strictly increasing across a
    /// series.
    fn open_time(&self) -> Timestamp;

    /// Trade volume during the bar. Defaults to `0.0`.
    fn volume(&self) -> f64 {
        0.0
    }
}

/// A single observation of a price series.
///
/// Ready-made [`Ohlcv`] implementation for callers without a bar type of
/// their own. `index` is the bar's position in its series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub index: usize,
    pub timestamp: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: u64,
}

impl PricePoint {
    /// Creates a point at `index` from raw OHLCV values.
    #[must_use]
    pub fn new(
        index: usize,
        timestamp: Timestamp,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: u64,
    ) -> Self {
        debug_assert!(high >= low, "high must not be below low: {high} < {low}");

        Self {
            index,
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Ohlcv for PricePoint {
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
        self.timestamp
    }

    #[allow(clippy::cast_precision_loss)]
    fn volume(&self) -> f64 {
        self.volume as f64
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn point() -> PricePoint {
        PricePoint::new(3, 1_700_000_000, 10.0, 30.0, 5.0, 20.0, 1_500)
    }

    #[test]
    fn exposes_prices_through_ohlcv() {
        let p = point();
        assert_eq!(p.open(), 10.0);
        assert_eq!(p.high(), 30.0);
        assert_eq!(p.low(), 5.0);
        assert_eq!(p.close(), 20.0);
    }

    #[test]
    fn open_time_is_timestamp() {
        assert_eq!(point().open_time(), 1_700_000_000);
    }

    #[test]
    fn volume_widens_to_float() {
        assert_eq!(Ohlcv::volume(&point()), 1_500.0);
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{"index":0,"timestamp":1,"open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":7}"#;
        let p: PricePoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.high, 2.0);
        assert_eq!(p.volume, 7);
    }

    #[test]
    #[should_panic(expected = "high must not be below low")]
    fn rejects_inverted_bar_in_debug() {
        let _ = PricePoint::new(0, 0, 1.0, 1.0, 2.0, 1.0, 0);
    }
}
