//! Weighted multi-type item distance.
//!
//! Each attribute type contributes a normalized Euclidean aggregate over its
//! columns:
//!
//! ```text
//! d_type(a, b) = sqrt( Σ_i term_i(a, b) / n )
//! ```
//!
//! where `term_i` is in \[0, 1\]:
//!
//! | type        | term                                   |
//! |-------------|----------------------------------------|
//! | int / real  | `((a_i - b_i) / (max_i - min_i))²`, 0 when `max_i = min_i` |
//! | date        | same, on years                         |
//! | boolean     | 0 if equal, else 1                     |
//! | categorical | `(1 - |a_i ∩ b_i| / |a_i ∪ b_i|)²`, 0 when the union is empty |
//!
//! A type with no columns contributes 0. The total is a convex combination of
//! the five components, so it stays in \[0, 1\]: 0 for identical items, 1 for
//! maximally dissimilar ones.

use crate::error::{Error, Result};
use crate::model::{AttributeBounds, Item};

/// Weights of the five attribute-type components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceWeights {
    pub int: f64,
    pub real: f64,
    pub date: f64,
    pub boolean: f64,
    pub categorical: f64,
}

impl Default for DistanceWeights {
    fn default() -> Self {
        Self {
            int: 0.2,
            real: 0.2,
            date: 0.2,
            boolean: 0.1,
            categorical: 0.3,
        }
    }
}

impl DistanceWeights {
    /// Check the weights form a convex combination.
    pub fn validate(&self) -> Result<()> {
        let all = [self.int, self.real, self.date, self.boolean, self.categorical];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidParameter {
                name: "weights",
                message: "must be finite and non-negative",
            });
        }
        if (all.iter().sum::<f64>() - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidParameter {
                name: "weights",
                message: "must sum to 1",
            });
        }
        Ok(())
    }
}

/// Item distance over a catalog's attribute bounds.
#[derive(Clone, Debug)]
pub struct ItemDistance<'a> {
    bounds: &'a AttributeBounds,
    weights: DistanceWeights,
}

impl<'a> ItemDistance<'a> {
    pub fn new(bounds: &'a AttributeBounds) -> Self {
        Self {
            bounds,
            weights: DistanceWeights::default(),
        }
    }

    /// Use custom component weights.
    pub fn with_weights(mut self, weights: DistanceWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &DistanceWeights {
        &self.weights
    }

    /// Distance in \[0, 1\] between two items of the same catalog.
    pub fn distance(&self, a: &Item, b: &Item) -> f64 {
        let w = &self.weights;
        let d = w.int * self.int_distance(a, b)
            + w.real * self.real_distance(a, b)
            + w.date * self.date_distance(a, b)
            + w.boolean * boolean_distance(a, b)
            + w.categorical * categorical_distance(a, b);
        // Guard against rounding pushing a convex combination past the ends.
        d.clamp(0.0, 1.0)
    }

    fn int_distance(&self, a: &Item, b: &Item) -> f64 {
        normalized(a.ints().iter().zip(b.ints()).enumerate().map(|(col, (x, y))| {
            scaled_sq(*x as f64 - *y as f64, self.bounds.int_range(col))
        }))
    }

    fn real_distance(&self, a: &Item, b: &Item) -> f64 {
        normalized(a.reals().iter().zip(b.reals()).enumerate().map(|(col, (x, y))| {
            scaled_sq(x - y, self.bounds.real_range(col))
        }))
    }

    fn date_distance(&self, a: &Item, b: &Item) -> f64 {
        normalized(a.years().iter().zip(b.years()).enumerate().map(|(col, (x, y))| {
            scaled_sq(f64::from(*x) - f64::from(*y), self.bounds.year_range(col))
        }))
    }
}

fn boolean_distance(a: &Item, b: &Item) -> f64 {
    normalized(
        a.booleans()
            .iter()
            .zip(b.booleans())
            .map(|(x, y)| if x == y { 0.0 } else { 1.0 }),
    )
}

fn categorical_distance(a: &Item, b: &Item) -> f64 {
    normalized(
        a.categories()
            .iter()
            .zip(b.categories())
            .map(|(x, y)| x.jaccard_distance(y).powi(2)),
    )
}

/// `((diff) / range)²`, 0 for a degenerate column.
#[inline]
fn scaled_sq(diff: f64, range: f64) -> f64 {
    if range == 0.0 {
        return 0.0;
    }
    let t = diff / range;
    t * t
}

/// `sqrt(Σ terms / n)`, 0 for no terms.
fn normalized(terms: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = terms.fold((0.0, 0usize), |(s, n), t| (s + t, n + 1));
    if n == 0 {
        return 0.0;
    }
    (sum / n as f64).sqrt()
}
