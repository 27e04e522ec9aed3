//! Closed float intervals for synthetic latitude/longitude attributes.

use rand::Rng;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::str::FromStr;

/// A closed interval `[lower, upper]`; empty when `upper < lower`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound.
    pub lower: f32,
    /// Upper bound.
    pub upper: f32,
}

impl Interval {
    /// The empty interval.
    pub const EMPTY: Self = Self {
        lower: 0.0,
        upper: -1.0,
    };

    /// Creates `[lower, upper]`.
    #[must_use]
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    /// Whether the interval contains no value (reversed or NaN bounds).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.upper.partial_cmp(&self.lower), Some(Ordering::Less) | None)
    }

    /// Whether the interval is a single point.
    // Reason: exact equality is the definition of a point interval
    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn is_point(&self) -> bool {
        self.lower == self.upper
    }

    /// Draws a uniform value from `[lower, upper)`.
    ///
    /// Callers must check [`Self::is_empty`] first; an empty interval yields `lower`.
    /// Interpolates between the bounds so spans wider than `f32::MAX` stay finite.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.is_point() || self.is_empty() {
            return self.lower;
        }
        let t: f32 = rng.gen();
        (self.lower * (1.0 - t) + self.upper * t).clamp(self.lower, self.upper)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl FromStr for Interval {
    type Err = Infallible;

    /// Parses `[lo,hi]` (brackets optional). Anything unparseable or
    /// non-finite (`inf`, `NaN`, out-of-range literals) is empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
        let mut bounds = trimmed
            .splitn(2, ',')
            .map(|part| part.trim().parse::<f32>().ok().filter(|b| b.is_finite()));

        Ok(match (bounds.next(), bounds.next()) {
            (Some(Some(lower)), Some(Some(upper))) => Self::new(lower, upper),
            _ => Self::EMPTY,
        })
    }
}
