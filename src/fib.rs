use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Percent, Pivot, PivotDirection, Price, Ratios};

/// Pivots of each direction considered by [`support_resistance_levels`].
const SUPPORT_RESISTANCE_LOOKBACK: usize = 10;

/// A price level derived from a Fibonacci ratio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    level: f64,
    price: Price,
    label: String,
}

impl FibLevel {
    #[must_use]
    pub fn new(level: f64, price: Price, label: impl Into<String>) -> Self {
        Self {
            level,
            price,
            label: label.into(),
        }
    }

    /// The ratio this level was derived from.
    #[inline]
    #[must_use]
    pub fn level(&self) -> f64 {
        self.level
    }

    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Display for FibLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {:.2}", self.label, self.price)
    }
}

/// Pullback levels of the move from `start` to `end`.
///
/// Each ratio `r` gives `end - (end - start) * r`, labelled as a percentage
/// ("61.8% Retracement").
///
/// # Example
///
/// ```
/// use quantedge_waves::{retracement_levels, RETRACEMENT_RATIOS};
///
/// let levels = retracement_levels(100.0, 200.0, &RETRACEMENT_RATIOS);
///
/// assert_eq!(levels.len(), 5);
/// assert_eq!(levels[2].price(), 150.0);
/// assert_eq!(levels[2].label(), "50.0% Retracement");
/// ```
#[must_use]
pub fn retracement_levels(start: Price, end: Price, ratios: &[f64]) -> Vec<FibLevel> {
    let range = end - start;

    ratios
        .iter()
        .map(|&ratio| {
            FibLevel::new(
                ratio,
                end - range * ratio,
                format!("{:.1}% Retracement", ratio * 100.0),
            )
        })
        .collect()
}

/// `1.0` when `to` lies above `from`, otherwise `-1.0`.
fn move_sign(from: Price, to: Price) -> f64 {
    if to > from { 1.0 } else { -1.0 }
}

/// Targets projecting the move from `wave_start` to `wave_end` onwards from
/// `extension_start`.
///
/// Each ratio `r` gives `extension_start ± |wave_end - wave_start| * r`,
/// continuing in the direction of the measured wave.
///
/// # Example
///
/// ```
/// use quantedge_waves::{extension_levels, EXTENSION_RATIOS};
///
/// // Wave 1 rose 20 points; project wave 3 from the wave 2 low at 110.
/// let levels = extension_levels(100.0, 120.0, 110.0, &EXTENSION_RATIOS);
///
/// assert_eq!(levels[0].price(), 130.0);
/// assert_eq!(levels[0].label(), "1.000 Extension");
/// assert!(levels.iter().all(|l| l.price() > 110.0));
/// ```
#[must_use]
pub fn extension_levels(
    wave_start: Price,
    wave_end: Price,
    extension_start: Price,
    ratios: &[f64],
) -> Vec<FibLevel> {
    let length = (wave_end - wave_start).abs();
    let direction = move_sign(wave_start, wave_end);

    ratios
        .iter()
        .map(|&ratio| {
            FibLevel::new(
                ratio,
                extension_start + direction * length * ratio,
                format!("{ratio:.3} Extension"),
            )
        })
        .collect()
}

/// Retracements of the most recent swing, between the last two pivots.
#[must_use]
pub fn swing_retracements(pivots: &[Pivot], ratios: &[f64]) -> Vec<FibLevel> {
    match pivots {
        [.., start, end] => retracement_levels(start.price(), end.price(), ratios),
        _ => Vec::new(),
    }
}

fn prefixed(levels: Vec<FibLevel>, prefix: &str) -> impl Iterator<Item = FibLevel> {
    levels.into_iter().map(move |level| FibLevel {
        label: format!("{prefix} {}", level.label),
        ..level
    })
}

/// Wave 3 and wave 5 targets, reading the last five pivots as waves 1 to 4.
///
/// Both sets measure wave 1. Wave 3 targets project from the wave 2 end
/// (the third-to-last pivot), wave 5 targets from the wave 4 end (the last
/// pivot). Labels are prefixed "Wave 3" and "Wave 5". Needs five pivots.
#[must_use]
pub fn wave_extensions(pivots: &[Pivot], wave3_ratios: &[f64], wave5_ratios: &[f64]) -> Vec<FibLevel> {
    let [start, wave1_end, wave2_end, _, wave4_end] = match pivots {
        [.., a, b, c, d, e] => [a, b, c, d, e].map(Pivot::price),
        _ => return Vec::new(),
    };

    let wave3 = extension_levels(start, wave1_end, wave2_end, wave3_ratios);
    let wave5 = extension_levels(start, wave1_end, wave4_end, wave5_ratios);

    prefixed(wave3, "Wave 3")
        .chain(prefixed(wave5, "Wave 5"))
        .collect()
}

/// Wave C targets, reading the last three pivots as wave A start, wave A
/// end and wave B end.
///
/// Wave C continues in wave A's direction from the end of wave B, by
/// `|A| * r` for each ratio. Needs three pivots.
///
/// # Example
///
/// ```
/// use quantedge_waves::{abc_targets, Pivot, WAVE_C_TARGET_RATIOS};
///
/// let pivots = [Pivot::high(0, 150.0), Pivot::low(8, 120.0), Pivot::high(13, 135.0)];
/// let targets = abc_targets(&pivots, &WAVE_C_TARGET_RATIOS);
///
/// assert_eq!(targets[1].price(), 105.0);
/// assert_eq!(targets[1].label(), "Wave C 1.000 of A");
/// ```
#[must_use]
pub fn abc_targets(pivots: &[Pivot], ratios: &[f64]) -> Vec<FibLevel> {
    let [a_start, a_end, b_end] = match pivots {
        [.., a, b, c] => [a, b, c].map(Pivot::price),
        _ => return Vec::new(),
    };

    let length = (a_end - a_start).abs();
    let direction = move_sign(a_start, a_end);

    ratios
        .iter()
        .map(|&ratio| {
            FibLevel::new(
                ratio,
                b_end + direction * length * ratio,
                format!("Wave C {ratio:.3} of A"),
            )
        })
        .collect()
}

/// Ratio sets used by [`fibonacci_levels`].
///
/// Defaults to [`RETRACEMENT_RATIOS`](crate::RETRACEMENT_RATIOS),
/// [`WAVE3_TARGET_RATIOS`](crate::WAVE3_TARGET_RATIOS),
/// [`WAVE5_TARGET_RATIOS`](crate::WAVE5_TARGET_RATIOS) and
/// [`WAVE_C_TARGET_RATIOS`](crate::WAVE_C_TARGET_RATIOS).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibRatios {
    retracements: Ratios,
    wave3: Ratios,
    wave5: Ratios,
    wave_c: Ratios,
}

impl FibRatios {
    #[must_use]
    pub fn retracements(&self) -> &[f64] {
        &self.retracements
    }

    #[must_use]
    pub fn wave3(&self) -> &[f64] {
        &self.wave3
    }

    #[must_use]
    pub fn wave5(&self) -> &[f64] {
        &self.wave5
    }

    #[must_use]
    pub fn wave_c(&self) -> &[f64] {
        &self.wave_c
    }

    #[must_use]
    pub fn with_retracements(mut self, ratios: Ratios) -> Self {
        self.retracements = ratios;
        self
    }

    #[must_use]
    pub fn with_wave3(mut self, ratios: Ratios) -> Self {
        self.wave3 = ratios;
        self
    }

    #[must_use]
    pub fn with_wave5(mut self, ratios: Ratios) -> Self {
        self.wave5 = ratios;
        self
    }

    #[must_use]
    pub fn with_wave_c(mut self, ratios: Ratios) -> Self {
        self.wave_c = ratios;
        self
    }
}

impl Default for FibRatios {
    fn default() -> Self {
        Self {
            retracements: Ratios::retracements(),
            wave3: Ratios::wave3_targets(),
            wave5: Ratios::wave5_targets(),
            wave_c: Ratios::wave_c_targets(),
        }
    }
}

/// Every Fibonacci level derived from one pivot sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub retracements: Vec<FibLevel>,
    pub extensions: Vec<FibLevel>,
    pub abc_targets: Vec<FibLevel>,
}

/// Swing retracements, wave extensions and ABC targets for `pivots`.
///
/// Each set is empty when there are too few pivots for it.
#[must_use]
pub fn fibonacci_levels(pivots: &[Pivot], ratios: &FibRatios) -> FibonacciLevels {
    FibonacciLevels {
        retracements: swing_retracements(pivots, ratios.retracements()),
        extensions: wave_extensions(pivots, ratios.wave3(), ratios.wave5()),
        abc_targets: abc_targets(pivots, ratios.wave_c()),
    }
}

/// A cluster of levels from different calculations landing close together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Confluence {
    price: Price,
    count: usize,
    strength: usize,
    label: String,
    labels: Vec<String>,
}

impl Confluence {
    fn from_members(members: &[&FibLevel]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let price = members.iter().map(|level| level.price).sum::<f64>() / members.len() as f64;

        Self {
            price,
            count: members.len(),
            strength: members.len(),
            label: format!("Confluence ({} levels)", members.len()),
            labels: members.iter().map(|level| level.label.clone()).collect(),
        }
    }

    /// Average price of the clustered levels.
    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of clustered levels.
    #[inline]
    #[must_use]
    pub fn strength(&self) -> usize {
        self.strength
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Labels of the clustered levels, in input order.
    #[inline]
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// `true` when `price` lies within `tolerance` percent of `reference`.
fn within(reference: Price, price: Price, tolerance: f64) -> bool {
    if reference == 0.0 {
        return price == 0.0;
    }
    (price - reference).abs() / reference.abs() * 100.0 <= tolerance
}

/// Groups levels from several sets that lie within `tolerance` of each
/// other.
///
/// Levels are visited in input order. Each unclaimed level becomes a
/// reference and gathers every later unclaimed level within `tolerance`
/// percent of the reference price. Groups of two or more claim their members
/// and become a [`Confluence`]; a level belongs to at most one group.
/// Results are ordered by strength, strongest first, ties in discovery
/// order.
///
/// # Example
///
/// ```
/// use quantedge_waves::{find_confluences, FibLevel, Percent};
///
/// let retracements = [FibLevel::new(0.618, 123.6, "61.8% Retracement")];
/// let targets = [
///     FibLevel::new(1.0, 124.0, "Wave C 1.000 of A"),
///     FibLevel::new(1.618, 160.0, "Wave C 1.618 of A"),
/// ];
///
/// let confluences = find_confluences(&[&retracements, &targets], Percent::new(2.0));
///
/// assert_eq!(confluences.len(), 1);
/// assert_eq!(confluences[0].strength(), 2);
/// assert_eq!(confluences[0].label(), "Confluence (2 levels)");
/// ```
#[must_use]
pub fn find_confluences(level_sets: &[&[FibLevel]], tolerance: Percent) -> Vec<Confluence> {
    let levels: Vec<&FibLevel> = level_sets.iter().flat_map(|set| set.iter()).collect();
    let mut claimed = vec![false; levels.len()];
    let mut confluences = Vec::new();

    for (i, reference) in levels.iter().enumerate() {
        if claimed[i] {
            continue;
        }

        let members: Vec<usize> = std::iter::once(i)
            .chain((i + 1..levels.len()).filter(|&j| {
                !claimed[j] && within(reference.price, levels[j].price, tolerance.value())
            }))
            .collect();

        if members.len() < 2 {
            continue;
        }

        for &j in &members {
            claimed[j] = true;
        }

        let group: Vec<&FibLevel> = members.iter().map(|&j| levels[j]).collect();
        let confluence = Confluence::from_members(&group);
        log::trace!(
            "confluence of {} levels at {:.2}: {:?}",
            confluence.count,
            confluence.price,
            confluence.labels
        );
        confluences.push(confluence);
    }

    confluences.sort_by(|a, b| b.strength.cmp(&a.strength));
    confluences
}

/// A level annotated with its distance from the current price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedLevel {
    #[serde(flatten)]
    level: FibLevel,
    distance_pct: Option<f64>,
}

impl RankedLevel {
    #[inline]
    #[must_use]
    pub fn level(&self) -> &FibLevel {
        &self.level
    }

    /// Distance from the current price, in percent of it. `None` when no
    /// usable current price was given.
    #[inline]
    #[must_use]
    pub fn distance_pct(&self) -> Option<f64> {
        self.distance_pct
    }
}

/// Levels within `max_distance` percent of `current_price`, nearest first.
///
/// Without a positive `current_price` every level is returned unranked, in
/// input order.
///
/// # Example
///
/// ```
/// use quantedge_waves::{filter_relevant_levels, FibLevel, Percent};
///
/// let levels = [
///     FibLevel::new(1.618, 300.0, "far"),
///     FibLevel::new(0.5, 160.0, "near"),
/// ];
///
/// let relevant = filter_relevant_levels(&levels, 150.0, Percent::new(50.0));
///
/// assert_eq!(relevant.len(), 1);
/// assert_eq!(relevant[0].level().label(), "near");
/// ```
#[must_use]
pub fn filter_relevant_levels(
    levels: &[FibLevel],
    current_price: Price,
    max_distance: Percent,
) -> Vec<RankedLevel> {
    if current_price <= 0.0 {
        return levels
            .iter()
            .map(|level| RankedLevel {
                level: level.clone(),
                distance_pct: None,
            })
            .collect();
    }

    let mut ranked: Vec<RankedLevel> = levels
        .iter()
        .filter_map(|level| {
            let distance = (level.price - current_price).abs() / current_price * 100.0;
            (distance <= max_distance.value()).then(|| RankedLevel {
                level: level.clone(),
                distance_pct: Some(distance),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        let (a, b) = (a.distance_pct.unwrap_or(0.0), b.distance_pct.unwrap_or(0.0));
        a.total_cmp(&b)
    });
    ranked
}

/// Whether a swing level sits below or above the current price.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A recent swing price acting as support or resistance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    price: Price,
    kind: LevelKind,
    strength: u32,
    label: String,
}

impl SupportResistance {
    fn new(price: Price, kind: LevelKind) -> Self {
        let label = match kind {
            LevelKind::Support => format!("Support at {price:.2}"),
            LevelKind::Resistance => format!("Resistance at {price:.2}"),
        };

        Self {
            price,
            kind,
            strength: 1,
            label,
        }
    }

    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> LevelKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn strength(&self) -> u32 {
        self.strength
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

fn recent_of(pivots: &[Pivot], direction: PivotDirection) -> Vec<&Pivot> {
    let matching: Vec<&Pivot> = pivots
        .iter()
        .filter(|pivot| pivot.direction() == direction)
        .collect();
    let skip = matching.len().saturating_sub(SUPPORT_RESISTANCE_LOOKBACK);
    matching.into_iter().skip(skip).collect()
}

/// Recent swing highs above and swing lows below `current_price`.
///
/// Looks at the last ten highs for resistance and the last ten lows for
/// support, resistance first. Needs three pivots.
#[must_use]
pub fn support_resistance_levels(pivots: &[Pivot], current_price: Price) -> Vec<SupportResistance> {
    if pivots.len() < 3 {
        return Vec::new();
    }

    let resistance = recent_of(pivots, PivotDirection::High)
        .into_iter()
        .filter(|pivot| pivot.price() > current_price)
        .map(|pivot| SupportResistance::new(pivot.price(), LevelKind::Resistance));

    let support = recent_of(pivots, PivotDirection::Low)
        .into_iter()
        .filter(|pivot| pivot.price() < current_price)
        .map(|pivot| SupportResistance::new(pivot.price(), LevelKind::Support));

    resistance.chain(support).collect()
}
