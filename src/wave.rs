use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Pivot, Price};

/// An Elliott wave position.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Wave {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    A,
    B,
    C,
}

impl Wave {
    /// Impulse waves in order.
    pub const IMPULSE: [Wave; 5] = [Wave::One, Wave::Two, Wave::Three, Wave::Four, Wave::Five];

    /// Corrective waves in order.
    pub const CORRECTIVE: [Wave; 3] = [Wave::A, Wave::B, Wave::C];
}

impl Display for Wave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Wave::One => "1",
            Wave::Two => "2",
            Wave::Three => "3",
            Wave::Four => "4",
            Wave::Five => "5",
            Wave::A => "A",
            Wave::B => "B",
            Wave::C => "C",
        };
        f.write_str(name)
    }
}

/// Tags the pivot that ends a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveLabel {
    index: usize,
    wave: Wave,
    price: Price,
}

impl WaveLabel {
    #[must_use]
    pub fn new(index: usize, wave: Wave, price: Price) -> Self {
        Self { index, wave, price }
    }

    /// Labels `pivot` as the end of `wave`.
    #[must_use]
    pub fn at(pivot: &Pivot, wave: Wave) -> Self {
        Self::new(pivot.index(), wave, pivot.price())
    }

    /// Bar index of the labelled pivot.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn wave(&self) -> Wave {
        self.wave
    }

    /// Price of the labelled pivot.
    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }
}

/// Kind of wave structure a count describes.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Impulse,
    Corrective,
    Unknown,
}

impl Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Impulse => write!(f, "impulse"),
            Self::Corrective => write!(f, "corrective"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Direction of the broader price movement.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Sideways => write!(f, "sideways"),
        }
    }
}

/// A scored, labelled wave interpretation.
///
/// `score` lies in `[0, 100]`. `summary` is a human-readable description
/// derived from the pattern, labels and score at construction.
///
/// # Example
///
/// ```
/// use quantedge_waves::{PatternType, WaveCount};
///
/// let count = WaveCount::insufficient_data();
/// assert_eq!(count.pattern_type(), PatternType::Unknown);
/// assert_eq!(count.score(), 0.0);
/// assert!(count.labels().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveCount {
    labels: Vec<WaveLabel>,
    score: f64,
    pattern_type: PatternType,
    summary: String,
}

impl WaveCount {
    /// Builds a count and its summary.
    #[must_use]
    pub fn new(pattern_type: PatternType, labels: Vec<WaveLabel>, score: f64) -> Self {
        let summary = summarize(pattern_type, &labels, score);

        Self {
            labels,
            score,
            pattern_type,
            summary,
        }
    }

    /// Zero-score `Unknown` count returned when there are too few pivots to
    /// analyse.
    #[must_use]
    pub fn insufficient_data() -> Self {
        Self {
            labels: Vec::new(),
            score: 0.0,
            pattern_type: PatternType::Unknown,
            summary: "Insufficient data for wave analysis.".to_string(),
        }
    }

    #[inline]
    #[must_use]
    pub fn labels(&self) -> &[WaveLabel] {
        &self.labels
    }

    /// The label for `wave`, if this count has one.
    #[must_use]
    pub fn label(&self, wave: Wave) -> Option<&WaveLabel> {
        self.labels.iter().find(|label| label.wave == wave)
    }

    #[inline]
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    #[must_use]
    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    #[inline]
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// Price beyond which a wave count no longer holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invalidation {
    price: Price,
    reason: String,
}

impl Invalidation {
    #[must_use]
    pub fn new(price: Price, reason: impl Into<String>) -> Self {
        Self {
            price,
            reason: reason.into(),
        }
    }

    /// Zero-price invalidation for counts that cannot be located.
    #[must_use]
    pub fn insufficient_data() -> Self {
        Self::new(0.0, "Insufficient data")
    }

    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

fn direction_word(labels: &[WaveLabel]) -> &'static str {
    match (labels.first(), labels.last()) {
        (Some(first), Some(last)) if last.price > first.price => "upward",
        _ => "downward",
    }
}

fn summarize(pattern_type: PatternType, labels: &[WaveLabel], score: f64) -> String {
    match pattern_type {
        PatternType::Impulse => {
            let Some(last) = labels.last().filter(|_| labels.len() >= Wave::IMPULSE.len())
            else {
                return "Incomplete impulse pattern detected.".to_string();
            };

            let conformance = if score >= 80.0 {
                "Strong Fibonacci conformance supports this count."
            } else if score >= 60.0 {
                "Moderate Fibonacci conformance."
            } else {
                "Weak Fibonacci relationships."
            };

            format!(
                "5-wave {} impulse structure detected with Wave 5 at {:.2}. {conformance} Score: {score:.1}/100.",
                direction_word(labels),
                last.price
            )
        }
        PatternType::Corrective => {
            let Some(last) = labels.last().filter(|_| labels.len() >= Wave::CORRECTIVE.len())
            else {
                return "Incomplete corrective pattern detected.".to_string();
            };

            let proportions = if score >= 70.0 {
                "Good proportional relationships."
            } else {
                "Irregular corrective proportions."
            };

            format!(
                "3-wave {} corrective ABC structure with Wave C at {:.2}. {proportions} Score: {score:.1}/100.",
                direction_word(labels),
                last.price
            )
        }
        PatternType::Unknown => format!("Pattern analysis incomplete. Score: {score:.1}/100."),
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn labels(waves: &[Wave], prices: &[f64]) -> Vec<WaveLabel> {
        waves
            .iter()
            .zip(prices)
            .enumerate()
            .map(|(i, (&wave, &price))| WaveLabel::new(i * 10, wave, price))
            .collect()
    }

    mod summary {
        use super::*;

        #[test]
        fn strong_upward_impulse() {
            let count = WaveCount::new(
                PatternType::Impulse,
                labels(&Wave::IMPULSE, &[120.0, 110.0, 145.0, 130.0, 150.0]),
                97.46,
            );

            assert_eq!(
                count.summary(),
                "5-wave upward impulse structure detected with Wave 5 at 150.00. \
                 Strong Fibonacci conformance supports this count. Score: 97.5/100."
            );
        }

        #[test]
        fn confidence_brackets() {
            let waves = labels(&Wave::IMPULSE, &[80.0, 90.0, 60.0, 70.0, 50.0]);

            let moderate = WaveCount::new(PatternType::Impulse, waves.clone(), 60.0);
            let weak = WaveCount::new(PatternType::Impulse, waves, 59.9);

            assert!(moderate.summary().contains("downward"));
            assert!(moderate.summary().contains("Moderate Fibonacci conformance."));
            assert!(weak.summary().contains("Weak Fibonacci relationships."));
        }

        #[test]
        fn partial_impulse_is_incomplete() {
            let count = WaveCount::new(
                PatternType::Impulse,
                labels(&Wave::IMPULSE[..4], &[120.0, 110.0, 145.0, 130.0]),
                85.0,
            );

            assert_eq!(count.summary(), "Incomplete impulse pattern detected.");
        }

        #[test]
        fn corrective_brackets() {
            let waves = labels(&Wave::CORRECTIVE, &[120.0, 135.0, 110.0]);

            let good = WaveCount::new(PatternType::Corrective, waves.clone(), 70.0);
            let irregular = WaveCount::new(PatternType::Corrective, waves, 65.0);

            assert_eq!(
                good.summary(),
                "3-wave downward corrective ABC structure with Wave C at 110.00. \
                 Good proportional relationships. Score: 70.0/100."
            );
            assert!(
                irregular
                    .summary()
                    .contains("Irregular corrective proportions.")
            );
        }

        #[test]
        fn partial_correction_is_incomplete() {
            let count = WaveCount::new(
                PatternType::Corrective,
                labels(&Wave::CORRECTIVE[..2], &[120.0, 135.0]),
                100.0,
            );

            assert_eq!(count.summary(), "Incomplete corrective pattern detected.");
        }

        #[test]
        fn unlabelled_counts() {
            assert_eq!(
                WaveCount::new(PatternType::Impulse, Vec::new(), 0.0).summary(),
                "Incomplete impulse pattern detected."
            );
            assert_eq!(
                WaveCount::new(PatternType::Corrective, Vec::new(), 0.0).summary(),
                "Incomplete corrective pattern detected."
            );
            assert_eq!(
                WaveCount::new(PatternType::Unknown, Vec::new(), 12.34).summary(),
                "Pattern analysis incomplete. Score: 12.3/100."
            );
        }
    }

    #[test]
    fn finds_label_by_wave() {
        let count = WaveCount::new(
            PatternType::Corrective,
            labels(&Wave::CORRECTIVE, &[120.0, 135.0, 110.0]),
            100.0,
        );

        assert_eq!(count.label(Wave::B).map(WaveLabel::price), Some(135.0));
        assert!(count.label(Wave::One).is_none());
    }

    #[test]
    fn insufficient_data() {
        let count = WaveCount::insufficient_data();
        assert_eq!(count.summary(), "Insufficient data for wave analysis.");

        let invalidation = Invalidation::insufficient_data();
        assert_eq!(invalidation.price(), 0.0);
        assert_eq!(invalidation.reason(), "Insufficient data");
    }

    #[test]
    fn display_names() {
        assert_eq!(Wave::Three.to_string(), "3");
        assert_eq!(Wave::C.to_string(), "C");
        assert_eq!(PatternType::Corrective.to_string(), "corrective");
        assert_eq!(Trend::Sideways.to_string(), "sideways");
    }

    mod serialization {
        use super::*;

        #[test]
        fn label_wire_format() {
            let json = serde_json::to_value(WaveLabel::new(30, Wave::Three, 145.0)).unwrap();
            assert_eq!(
                json,
                serde_json::json!({"index": 30, "wave": "3", "price": 145.0})
            );
        }

        #[test]
        fn count_wire_format() {
            let json = serde_json::to_value(WaveCount::insufficient_data()).unwrap();
            assert_eq!(json["pattern_type"], "unknown");
            assert_eq!(json["score"], 0.0);
            assert_eq!(json["labels"], serde_json::json!([]));
        }

        #[test]
        fn corrective_wave_names() {
            let wave: Wave = serde_json::from_str(r#""B""#).unwrap();
            assert_eq!(wave, Wave::B);
            assert_eq!(serde_json::to_string(&Wave::Five).unwrap(), r#""5""#);
        }
    }
}
