use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{
    Confluence, DEFAULT_MAX_PIVOTS, FibLevel, FibRatios, Invalidation, Ohlcv, Percent, Pivot,
    SupportResistance, Trend, WaveCount, ZigzagConfig, analyze_waves_with, extract_pivots,
    fibonacci_levels, find_confluences, invalidation_level, overall_trend, recent_pivots,
    support_resistance_levels,
};

/// Configuration for [`WaveAnalyzer`].
///
/// Deserializes with every field optional, falling back to the defaults
/// below.
///
/// | Setting | Default |
/// |---------|---------|
/// | `zigzag` | [`ZigzagConfig::daily`] |
/// | `max_pivots` | 120 |
/// | `ratios` | [`FibRatios::default`] |
/// | `confluence_tolerance` | 2% |
///
/// # Example
///
/// ```
/// use quantedge_waves::{AnalysisConfig, Percent, ZigzagConfig};
///
/// let config = AnalysisConfig::builder()
///     .zigzag(ZigzagConfig::intraday())
///     .max_pivots(60)
///     .confluence_tolerance(Percent::new(1.5))
///     .build();
///
/// assert_eq!(config.max_pivots(), 60);
/// assert_eq!(config.zigzag().threshold(), Percent::new(2.0));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    zigzag: ZigzagConfig,
    max_pivots: NonZeroUsize,
    ratios: FibRatios,
    confluence_tolerance: Percent,
}

impl AnalysisConfig {
    #[must_use]
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new()
    }

    #[inline]
    #[must_use]
    pub fn zigzag(&self) -> &ZigzagConfig {
        &self.zigzag
    }

    /// Most recent pivots kept for wave scoring and level derivation.
    #[inline]
    #[must_use]
    pub fn max_pivots(&self) -> usize {
        self.max_pivots.get()
    }

    #[inline]
    #[must_use]
    pub fn ratios(&self) -> &FibRatios {
        &self.ratios
    }

    /// How close levels must lie to form a confluence.
    #[inline]
    #[must_use]
    pub fn confluence_tolerance(&self) -> Percent {
        self.confluence_tolerance
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`AnalysisConfig`].
pub struct AnalysisConfigBuilder {
    zigzag: ZigzagConfig,
    max_pivots: usize,
    ratios: FibRatios,
    confluence_tolerance: Percent,
}

impl AnalysisConfigBuilder {
    fn new() -> Self {
        Self {
            zigzag: ZigzagConfig::daily(),
            max_pivots: DEFAULT_MAX_PIVOTS,
            ratios: FibRatios::default(),
            confluence_tolerance: Percent::new(2.0),
        }
    }

    #[must_use]
    pub fn zigzag(mut self, zigzag: ZigzagConfig) -> Self {
        self.zigzag = zigzag;
        self
    }

    #[must_use]
    pub fn max_pivots(mut self, max_pivots: usize) -> Self {
        self.max_pivots = max_pivots;
        self
    }

    #[must_use]
    pub fn ratios(mut self, ratios: FibRatios) -> Self {
        self.ratios = ratios;
        self
    }

    #[must_use]
    pub fn confluence_tolerance(mut self, tolerance: Percent) -> Self {
        self.confluence_tolerance = tolerance;
        self
    }

    /// # Panics
    ///
    /// Panics if `max_pivots` is zero.
    #[must_use]
    pub fn build(self) -> AnalysisConfig {
        let Some(max_pivots) = NonZeroUsize::new(self.max_pivots) else {
            panic!("max_pivots must be greater than zero");
        };

        AnalysisConfig {
            zigzag: self.zigzag,
            max_pivots,
            ratios: self.ratios,
            confluence_tolerance: self.confluence_tolerance,
        }
    }
}

/// Everything [`WaveAnalyzer::analyze`] derives from one price series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Highest-scoring wave interpretation.
    pub primary: WaveCount,
    pub alternate: WaveCount,
    /// The analysed pivot window.
    pub pivots: Vec<Pivot>,
    pub retracements: Vec<FibLevel>,
    pub extensions: Vec<FibLevel>,
    pub abc_targets: Vec<FibLevel>,
    /// Where the primary count breaks.
    pub invalidation: Invalidation,
    pub alternate_invalidation: Invalidation,
    pub confluences: Vec<Confluence>,
    /// Swing levels around the last close.
    pub support_resistance: Vec<SupportResistance>,
    pub trend: Option<Trend>,
}

/// Runs the full wave analysis pipeline over a price series.
///
/// Holds only its configuration, so one analyzer can serve any number of
/// series, concurrently if needed.
///
/// # Example
///
/// ```
/// use quantedge_waves::{AnalysisConfig, PricePoint, WaveAnalyzer};
///
/// let closes = [100.0, 112.0, 124.0, 118.0, 112.0, 130.0, 150.0, 141.0, 132.0, 150.0, 170.0];
/// let series: Vec<PricePoint> = closes
///     .iter()
///     .enumerate()
///     .map(|(i, &c)| PricePoint::new(i, i as u64, c, c + 1.0, c - 1.0, c, 1_000))
///     .collect();
///
/// let analyzer = WaveAnalyzer::new(AnalysisConfig::default());
/// let result = analyzer.analyze(&series);
///
/// assert!(result.pivots.len() >= 3);
/// assert!((0.0..=100.0).contains(&result.primary.score()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct WaveAnalyzer {
    config: AnalysisConfig,
}

impl WaveAnalyzer {
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Extracts pivots from `series`, scores wave counts and derives price
    /// levels.
    ///
    /// Counts and levels use the most recent
    /// [`max_pivots`](AnalysisConfig::max_pivots) pivots; invalidation
    /// levels look back through the full pivot history.
    #[must_use]
    pub fn analyze<B: Ohlcv>(&self, series: &[B]) -> AnalysisResult {
        let history = extract_pivots(series, self.config.zigzag());
        let window = recent_pivots(&history, self.config.max_pivots());

        let waves = analyze_waves_with(window, self.config.max_pivots());
        let invalidation = invalidation_level(&waves.primary, &history);
        let alternate_invalidation = invalidation_level(&waves.alternate, &history);

        let levels = fibonacci_levels(window, self.config.ratios());
        let confluences = find_confluences(
            &[
                levels.retracements.as_slice(),
                levels.extensions.as_slice(),
                levels.abc_targets.as_slice(),
            ],
            self.config.confluence_tolerance(),
        );

        let support_resistance = series
            .last()
            .map(|bar| support_resistance_levels(window, bar.close()))
            .unwrap_or_default();

        log::debug!(
            "analysed {} bars: {} pivots, primary {} ({:.1}), {} confluences",
            series.len(),
            window.len(),
            waves.primary.pattern_type(),
            waves.primary.score(),
            confluences.len()
        );

        AnalysisResult {
            primary: waves.primary,
            alternate: waves.alternate,
            pivots: window.to_vec(),
            retracements: levels.retracements,
            extensions: levels.extensions,
            abc_targets: levels.abc_targets,
            invalidation,
            alternate_invalidation,
            confluences,
            support_resistance,
            trend: overall_trend(window),
        }
    }
}
