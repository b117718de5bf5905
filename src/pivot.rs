use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Price;

/// Whether a pivot is a swing high or a swing low.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotDirection {
    High,
    Low,
}

impl PivotDirection {
    /// The other direction.
    #[inline]
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

impl Display for PivotDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A local price extremum selected by the zigzag.
///
/// `index` is the bar's position in the analysed series. A validated pivot
/// sequence has strictly increasing indices and alternating directions.
///
/// # Example
///
/// ```
/// use quantedge_waves::{Pivot, PivotDirection};
///
/// let high = Pivot::high(12, 105.0);
/// assert_eq!(high.direction(), PivotDirection::High);
/// assert!(Pivot::high(14, 106.0).is_more_extreme_than(&high));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    index: usize,
    price: Price,
    direction: PivotDirection,
}

impl Pivot {
    #[must_use]
    pub fn new(index: usize, price: Price, direction: PivotDirection) -> Self {
        Self {
            index,
            price,
            direction,
        }
    }

    /// Swing high at `index`.
    #[must_use]
    pub fn high(index: usize, price: Price) -> Self {
        Self::new(index, price, PivotDirection::High)
    }

    /// Swing low at `index`.
    #[must_use]
    pub fn low(index: usize, price: Price) -> Self {
        Self::new(index, price, PivotDirection::Low)
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> PivotDirection {
        self.direction
    }

    /// `true` when both pivots have the same direction and this one lies
    /// further out: a higher high or a lower low.
    #[inline]
    #[must_use]
    pub fn is_more_extreme_than(&self, other: &Pivot) -> bool {
        match (self.direction, other.direction) {
            (PivotDirection::High, PivotDirection::High) => self.price > other.price,
            (PivotDirection::Low, PivotDirection::Low) => self.price < other.price,
            _ => false,
        }
    }

    /// Percentage move from this pivot's price to `to`, relative to this
    /// pivot's price. Zero-priced pivots report no move.
    #[inline]
    #[must_use]
    pub fn move_pct(&self, to: &Pivot) -> f64 {
        if self.price == 0.0 {
            return 0.0;
        }

        ((to.price - self.price).abs() / self.price) * 100.0
    }
}

impl Display for Pivot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}({})", self.direction, self.index, self.price)
    }
}
