use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_MAX_PIVOTS, Invalidation, PatternType, Pivot, RuleCheck, Trend, Wave, WaveCount,
    WaveLabel, check_corrective_rules, check_impulse_rules, fibonacci_score, recent_pivots,
};

/// Average price change, in percent, beyond which [`overall_trend`]
/// reports a direction.
const TREND_BAND_PCT: f64 = 2.0;

/// Pivots averaged at each end of the history by [`overall_trend`].
const TREND_SAMPLE: usize = 3;

/// Primary and alternate interpretation of a pivot sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveAnalysis {
    pub primary: WaveCount,
    pub alternate: WaveCount,
}

/// Blends the rule score with Fibonacci conformance.
///
/// Valid counts average the two. Invalid counts keep half their rule score
/// and ignore `fib_score`.
#[must_use]
pub fn combined_impulse_score<V>(rules: &RuleCheck<V>, fib_score: f64) -> f64 {
    if rules.is_valid() {
        (rules.score() + fib_score) / 2.0
    } else {
        rules.score() * 0.5
    }
}

/// Labels the last pivots of `pattern`.
///
/// Impulse counts tag the last five pivots "1" through "5", corrective
/// counts the last three "A" through "C". Shorter sequences and `Unknown`
/// patterns are not labelled.
#[must_use]
pub fn wave_labels(pivots: &[Pivot], pattern: PatternType) -> Vec<WaveLabel> {
    let waves: &[Wave] = match pattern {
        PatternType::Impulse => &Wave::IMPULSE,
        PatternType::Corrective => &Wave::CORRECTIVE,
        PatternType::Unknown => return Vec::new(),
    };

    let Some(start) = pivots.len().checked_sub(waves.len()) else {
        return Vec::new();
    };

    pivots[start..]
        .iter()
        .zip(waves)
        .map(|(pivot, &wave)| WaveLabel::at(pivot, wave))
        .collect()
}

/// Scores the pivots as a five-wave impulse.
#[must_use]
pub fn impulse_count(pivots: &[Pivot]) -> WaveCount {
    let rules = check_impulse_rules(pivots);
    let fib = if rules.is_valid() {
        fibonacci_score(pivots)
    } else {
        0.0
    };

    let score = combined_impulse_score(&rules, fib);
    WaveCount::new(
        PatternType::Impulse,
        wave_labels(pivots, PatternType::Impulse),
        score,
    )
}

/// Scores the pivots as an ABC correction.
#[must_use]
pub fn corrective_count(pivots: &[Pivot]) -> WaveCount {
    let rules = check_corrective_rules(pivots);
    WaveCount::new(
        PatternType::Corrective,
        wave_labels(pivots, PatternType::Corrective),
        rules.score(),
    )
}

/// Interprets a pivot sequence as both an impulse and a correction.
///
/// The higher-scoring reading becomes primary, ties going to the impulse.
/// Only the most recent [`DEFAULT_MAX_PIVOTS`] pivots are considered.
/// Fewer than three pivots yield two zero-score `Unknown` counts.
///
/// # Example
///
/// ```
/// use quantedge_waves::{analyze_waves, PatternType, Pivot};
///
/// let pivots = [
///     Pivot::low(0, 100.0),
///     Pivot::high(5, 120.0),
///     Pivot::low(9, 110.0),
///     Pivot::high(15, 145.0),
///     Pivot::low(19, 130.0),
///     Pivot::high(24, 150.0),
/// ];
///
/// let analysis = analyze_waves(&pivots);
/// assert_eq!(analysis.primary.pattern_type(), PatternType::Impulse);
/// assert_eq!(analysis.alternate.pattern_type(), PatternType::Corrective);
/// assert!(analysis.primary.score() > 90.0);
/// ```
#[must_use]
pub fn analyze_waves(pivots: &[Pivot]) -> WaveAnalysis {
    analyze_waves_with(pivots, DEFAULT_MAX_PIVOTS)
}

/// [`analyze_waves`] over the most recent `max_pivots` pivots.
#[must_use]
pub fn analyze_waves_with(pivots: &[Pivot], max_pivots: usize) -> WaveAnalysis {
    let window = recent_pivots(pivots, max_pivots);
    if window.len() < 3 {
        return WaveAnalysis {
            primary: WaveCount::insufficient_data(),
            alternate: WaveCount::insufficient_data(),
        };
    }

    let impulse = impulse_count(window);
    let corrective = corrective_count(window);

    let (primary, alternate) = if impulse.score() >= corrective.score() {
        (impulse, corrective)
    } else {
        (corrective, impulse)
    };

    log::debug!(
        "primary {} count scores {:.1}, alternate {} scores {:.1}",
        primary.pattern_type(),
        primary.score(),
        alternate.pattern_type(),
        alternate.score()
    );

    WaveAnalysis { primary, alternate }
}

/// The pivot immediately before bar `index` in `history`.
fn preceding_pivot(history: &[Pivot], index: usize) -> Option<&Pivot> {
    history.iter().rev().find(|pivot| pivot.index() < index)
}

/// Price beyond which `count` is structurally broken.
///
/// For an impulse this is the end of wave 1; for a correction, the start of
/// wave A. Wave starts are looked up in `history`, which should be the full
/// pivot history rather than the analysed window. When neither applies the
/// last pivot's price is used.
///
/// # Example
///
/// ```
/// use quantedge_waves::{analyze_waves, invalidation_level, Pivot};
///
/// let pivots = [
///     Pivot::low(0, 100.0),
///     Pivot::high(5, 120.0),
///     Pivot::low(9, 110.0),
///     Pivot::high(15, 145.0),
///     Pivot::low(19, 130.0),
///     Pivot::high(24, 150.0),
/// ];
///
/// let analysis = analyze_waves(&pivots);
/// let invalidation = invalidation_level(&analysis.primary, &pivots);
///
/// assert_eq!(invalidation.price(), 120.0);
/// assert_eq!(invalidation.reason(), "Invalidation below 120.00 (Wave 1 high)");
/// ```
#[must_use]
pub fn invalidation_level(count: &WaveCount, history: &[Pivot]) -> Invalidation {
    if count.labels().is_empty() || history.len() < 2 {
        return Invalidation::insufficient_data();
    }

    match count.pattern_type() {
        PatternType::Impulse => {
            if let (Some(wave1), Some(_)) = (count.label(Wave::One), count.label(Wave::Two))
                && let Some(start) = preceding_pivot(history, wave1.index())
            {
                let price = wave1.price();
                return if wave1.price() > start.price() {
                    Invalidation::new(price, format!("Invalidation below {price:.2} (Wave 1 high)"))
                } else {
                    Invalidation::new(price, format!("Invalidation above {price:.2} (Wave 1 low)"))
                };
            }
        }
        PatternType::Corrective => {
            if let Some(wave_a) = count.label(Wave::A)
                && let Some(start) = preceding_pivot(history, wave_a.index())
            {
                let price = start.price();
                let direction = if wave_a.price() > price {
                    "below"
                } else {
                    "above"
                };
                return Invalidation::new(
                    price,
                    format!("Invalidation {direction} {price:.2} (Wave A start)"),
                );
            }
        }
        PatternType::Unknown => {}
    }

    match history.last() {
        Some(last) => Invalidation::new(last.price(), "Pattern invalidation at current extreme"),
        None => Invalidation::insufficient_data(),
    }
}

/// Broad direction of a pivot history.
///
/// Compares the average of the first three pivot prices with the average of
/// the last three. A change beyond 2% either way is a trend, anything
/// smaller is sideways. `None` with fewer than three pivots.
#[must_use]
pub fn overall_trend(pivots: &[Pivot]) -> Option<Trend> {
    if pivots.len() < TREND_SAMPLE {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let average =
        |sample: &[Pivot]| sample.iter().map(Pivot::price).sum::<f64>() / sample.len() as f64;

    let early = average(&pivots[..TREND_SAMPLE]);
    let late = average(&pivots[pivots.len() - TREND_SAMPLE..]);

    let trend = if late > early * (1.0 + TREND_BAND_PCT / 100.0) {
        Trend::Up
    } else if late < early * (1.0 - TREND_BAND_PCT / 100.0) {
        Trend::Down
    } else {
        Trend::Sideways
    };

    Some(trend)
}
