use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Ohlcv, Percent, Pivot, PivotDirection, Price};

/// Default number of most recent pivots kept for wave analysis.
pub const DEFAULT_MAX_PIVOTS: usize = 120;

/// Number of leading bars scanned to establish the initial swing.
const TREND_SCAN_BARS: usize = 20;

/// Configuration for zigzag pivot extraction.
///
/// `threshold` is the reversal size, in percent, that confirms a swing
/// extreme. `min_move` is the smallest swing kept by
/// [`validate_zigzag`].
///
/// # Example
///
/// ```
/// use quantedge_waves::{Percent, ZigzagConfig};
///
/// let config = ZigzagConfig::builder()
///     .threshold(Percent::new(3.0))
///     .build();
///
/// assert_eq!(config.threshold(), Percent::new(3.0));
/// assert_eq!(config.min_move(), Percent::new(1.0));
/// assert_eq!(ZigzagConfig::daily().threshold(), Percent::new(4.0));
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ZigzagConfig {
    threshold: Percent,
    min_move: Percent,
}

impl ZigzagConfig {
    /// Returns a new builder with daily defaults.
    #[must_use]
    pub fn builder() -> ZigzagConfigBuilder {
        ZigzagConfigBuilder::new()
    }

    /// 4% reversals, 1% minimum swing. Suited to daily bars.
    #[must_use]
    pub fn daily() -> Self {
        Self::builder().build()
    }

    /// 2% reversals, 1% minimum swing. Suited to hourly and 4h bars.
    #[must_use]
    pub fn intraday() -> Self {
        Self::builder().threshold(Percent::new(2.0)).build()
    }

    /// Reversal size that confirms a swing extreme.
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> Percent {
        self.threshold
    }

    /// Smallest swing kept after cleanup.
    #[inline]
    #[must_use]
    pub fn min_move(&self) -> Percent {
        self.min_move
    }
}

impl Default for ZigzagConfig {
    fn default() -> Self {
        Self::daily()
    }
}

impl Display for ZigzagConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ZigzagConfig({}, {})", self.threshold, self.min_move)
    }
}

/// Builder for [`ZigzagConfig`].
///
/// Defaults: threshold = `4.0`, `min_move` = `1.0`.
pub struct ZigzagConfigBuilder {
    threshold: Percent,
    min_move: Percent,
}

impl ZigzagConfigBuilder {
    fn new() -> Self {
        Self {
            threshold: Percent::new(4.0),
            min_move: Percent::new(1.0),
        }
    }

    /// Sets the reversal threshold.
    #[inline]
    #[must_use]
    pub fn threshold(mut self, threshold: Percent) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the minimum swing kept after cleanup.
    #[inline]
    #[must_use]
    pub fn min_move(mut self, min_move: Percent) -> Self {
        self.min_move = min_move;
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> ZigzagConfig {
        ZigzagConfig {
            threshold: self.threshold,
            min_move: self.min_move,
        }
    }
}

/// Which extreme the zigzag is currently tracking.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Swing {
    /// Rising: tracking the swing high.
    Up,
    /// Falling: tracking the swing low.
    Down,
}

impl Swing {
    fn pivot_direction(self) -> PivotDirection {
        match self {
            Swing::Up => PivotDirection::High,
            Swing::Down => PivotDirection::Low,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Extreme {
    index: usize,
    price: Price,
}

/// Rise from `from` to `to`, in percent of `from`.
#[inline]
fn rally_pct(from: Price, to: Price) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

/// Drop from `from` to `to`, in percent of `from`.
#[inline]
fn decline_pct(from: Price, to: Price) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (from - to) / from * 100.0
}

/// Direction of the first move of at least `threshold` percent within the
/// leading [`TREND_SCAN_BARS`] bars, measured from the first bar.
fn initial_swing<B: Ohlcv>(series: &[B], threshold: f64) -> Option<Swing> {
    let first = &series[0];

    series
        .iter()
        .take(TREND_SCAN_BARS)
        .skip(1)
        .find_map(|bar| {
            if rally_pct(first.high(), bar.high()) >= threshold {
                Some(Swing::Up)
            } else if decline_pct(first.low(), bar.low()) >= threshold {
                Some(Swing::Down)
            } else {
                None
            }
        })
}

/// Extracts raw zigzag pivots from a price series.
///
/// A swing extreme is confirmed once price reverses from it by at least
/// `threshold` percent. Swing highs come from [`Ohlcv::high`], swing lows
/// from [`Ohlcv::low`]. The extreme tracked when the series ends is
/// emitted as a final, unconfirmed pivot.
///
/// When no move of `threshold` occurs within the first 20 bars, the first
/// bar's low is emitted as a seed pivot and the zigzag starts rising.
///
/// Series shorter than three bars yield no pivots.
///
/// # Example
///
/// ```
/// use quantedge_waves::{detect_zigzag, Percent, PricePoint, PivotDirection};
///
/// let bars: Vec<PricePoint> = [(100.0, 98.0), (110.0, 107.0), (104.0, 101.0), (99.0, 96.0)]
///     .iter()
///     .enumerate()
///     .map(|(i, &(h, l))| PricePoint::new(i, i as u64, l, h, l, h, 0))
///     .collect();
///
/// let pivots = detect_zigzag(&bars, Percent::new(3.0));
///
/// assert_eq!(pivots.len(), 2);
/// assert_eq!(pivots[0].direction(), PivotDirection::High);
/// assert_eq!(pivots[0].price(), 110.0);
/// assert_eq!(pivots[1].price(), 96.0);
/// ```
#[must_use]
pub fn detect_zigzag<B: Ohlcv>(series: &[B], threshold: Percent) -> Vec<Pivot> {
    if series.len() < 3 {
        return Vec::new();
    }

    let threshold = threshold.value();
    let mut pivots = Vec::new();

    let (mut swing, mut extreme) = match initial_swing(series, threshold) {
        Some(Swing::Up) => (
            Swing::Up,
            Extreme {
                index: 0,
                price: series[0].low(),
            },
        ),
        Some(Swing::Down) => (
            Swing::Down,
            Extreme {
                index: 0,
                price: series[0].high(),
            },
        ),
        None => {
            pivots.push(Pivot::low(0, series[0].low()));
            (
                Swing::Up,
                Extreme {
                    index: 0,
                    price: series[0].low(),
                },
            )
        }
    };

    for (index, bar) in series.iter().enumerate().skip(1) {
        match swing {
            Swing::Up => {
                if bar.high() > extreme.price {
                    extreme = Extreme {
                        index,
                        price: bar.high(),
                    };
                } else if decline_pct(extreme.price, bar.low()) >= threshold {
                    pivots.push(Pivot::high(extreme.index, extreme.price));
                    swing = Swing::Down;
                    extreme = Extreme {
                        index,
                        price: bar.low(),
                    };
                }
            }
            Swing::Down => {
                if bar.low() < extreme.price {
                    extreme = Extreme {
                        index,
                        price: bar.low(),
                    };
                } else if rally_pct(extreme.price, bar.high()) >= threshold {
                    pivots.push(Pivot::low(extreme.index, extreme.price));
                    swing = Swing::Up;
                    extreme = Extreme {
                        index,
                        price: bar.high(),
                    };
                }
            }
        }
    }

    if pivots.last().is_none_or(|last| last.index() != extreme.index) {
        pivots.push(Pivot::new(
            extreme.index,
            extreme.price,
            swing.pivot_direction(),
        ));
    }

    log::trace!(
        "zigzag({threshold}%) found {} pivots in {} bars",
        pivots.len(),
        series.len()
    );

    pivots
}

/// Removes insignificant swings from a pivot sequence.
///
/// The first pivot is always kept. Each following pivot is compared with
/// the last kept one:
///
/// - same direction: replaces it when more extreme (higher high, lower
///   low), otherwise dropped;
/// - opposite direction: kept when it moves at least `min_move` percent
///   from it, otherwise dropped.
///
/// The output therefore always alternates between highs and lows.
///
/// # Example
///
/// ```
/// use quantedge_waves::{validate_zigzag, Percent, Pivot};
///
/// let raw = [
///     Pivot::low(0, 100.0),
///     Pivot::high(5, 105.0),
///     Pivot::low(10, 104.5), // 0.5% dip, dropped
///     Pivot::high(15, 110.0), // higher high, replaces 105.0
/// ];
///
/// let cleaned = validate_zigzag(&raw, Percent::new(2.0));
/// assert_eq!(cleaned, vec![Pivot::low(0, 100.0), Pivot::high(15, 110.0)]);
/// ```
#[must_use]
pub fn validate_zigzag(pivots: &[Pivot], min_move: Percent) -> Vec<Pivot> {
    let Some((first, rest)) = pivots.split_first() else {
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(pivots.len());
    kept.push(*first);
    let mut last = *first;

    for pivot in rest {
        if pivot.direction() == last.direction() {
            if pivot.is_more_extreme_than(&last) {
                kept.pop();
                kept.push(*pivot);
                last = *pivot;
            }
        } else if last.move_pct(pivot) >= min_move.value() {
            kept.push(*pivot);
            last = *pivot;
        }
    }

    log::trace!(
        "zigzag cleanup kept {} of {} pivots (min move {min_move})",
        kept.len(),
        pivots.len()
    );

    kept
}

/// Detects and cleans zigzag pivots in one pass over `series`.
///
/// Equivalent to [`detect_zigzag`] followed by [`validate_zigzag`].
#[must_use]
pub fn extract_pivots<B: Ohlcv>(series: &[B], config: &ZigzagConfig) -> Vec<Pivot> {
    let raw = detect_zigzag(series, config.threshold());
    let pivots = validate_zigzag(&raw, config.min_move());

    log::debug!(
        "{config}: {} raw pivots, {} after cleanup, {} bars",
        raw.len(),
        pivots.len(),
        series.len()
    );

    pivots
}

/// The most recent `max_count` pivots, in order.
///
/// # Example
///
/// ```
/// use quantedge_waves::{recent_pivots, Pivot};
///
/// let pivots = [Pivot::low(0, 1.0), Pivot::high(1, 2.0), Pivot::low(2, 1.5)];
/// assert_eq!(recent_pivots(&pivots, 2), &pivots[1..]);
/// assert_eq!(recent_pivots(&pivots, 10).len(), 3);
/// ```
#[inline]
#[must_use]
pub fn recent_pivots(pivots: &[Pivot], max_count: usize) -> &[Pivot] {
    &pivots[pivots.len().saturating_sub(max_count)..]
}

/// How far a pivot stands out from the surrounding bars, from `0` to `100`.
///
/// Compares the pivot with the most extreme other bar within `lookback`
/// bars either side: every 0.1% of clearance scores one point. Pivots with
/// no neighbouring bars score `50`, pivots whose index lies outside the
/// series score `0`.
#[must_use]
pub fn pivot_strength<B: Ohlcv>(series: &[B], pivot: &Pivot, lookback: usize) -> f64 {
    let index = pivot.index();
    if index >= series.len() {
        return 0.0;
    }

    let start = index.saturating_sub(lookback);
    let end = series.len().min(index.saturating_add(lookback).saturating_add(1));

    let neighbours = series[start..end]
        .iter()
        .enumerate()
        .filter(|&(offset, _)| start + offset != index)
        .map(|(_, bar)| bar);

    let strength = match pivot.direction() {
        PivotDirection::High => {
            let Some(max_other) = neighbours.map(Ohlcv::high).reduce(f64::max) else {
                return 50.0;
            };
            rally_pct(max_other, pivot.price()) * 10.0
        }
        PivotDirection::Low => {
            let Some(min_other) = neighbours.map(Ohlcv::low).reduce(f64::min) else {
                return 50.0;
            };
            decline_pct(min_other, pivot.price()) * 10.0
        }
    };

    strength.clamp(0.0, 100.0)
}
