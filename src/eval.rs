//! Ranking quality of predictions against held-out ratings.
//!
//! Discounted cumulative gain over the reference ranking:
//!
//! ```text
//! DCG = Σ_p gain(p) / log₂(p + 1),   gain = 2^rating - 1,   p = 1, 2, ...
//! ```
//!
//! The reference user's items are ordered by rating (descending; item id
//! descending on ties). The ideal DCG credits every item; the actual DCG
//! credits only the items the predicted user also has. The score returned is
//! their ratio (NDCG), in \[0, 1\] for non-negative ratings.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ItemId, User};

/// NDCG of `predicted` against `reference`.
///
/// Fails with [`Error::UndefinedScore`] when the reference has no gain to
/// normalize by (no ratings, or only zero ratings).
pub fn dcg(reference: &User, predicted: &User) -> Result<f64> {
    let mut order: Vec<(&ItemId, f64)> = reference.ratings().iter().map(|(k, &v)| (k, v)).collect();
    order.sort_by(relevance_order);

    let mut ideal = 0.0;
    let mut actual = 0.0;
    for (pos, (item, rating)) in order.iter().enumerate() {
        let term = gain(*rating) / discount(pos + 1);
        ideal += term;
        if predicted.has_rated(item.as_str()) {
            actual += term;
        }
    }

    if ideal == 0.0 {
        return Err(Error::UndefinedScore);
    }
    Ok(actual / ideal)
}

/// Mean NDCG over `(reference, predicted)` pairs.
///
/// Pairs whose score is undefined are skipped; if none is defined the mean is
/// undefined too.
pub fn mean_ndcg<'a>(pairs: impl IntoIterator<Item = (&'a User, &'a User)>) -> Result<f64> {
    let mut total = 0.0;
    let mut scored = 0usize;
    let mut skipped = 0usize;
    for (reference, predicted) in pairs {
        match dcg(reference, predicted) {
            Ok(score) => {
                total += score;
                scored += 1;
            }
            Err(Error::UndefinedScore) => skipped += 1,
            Err(e) => return Err(e),
        }
    }

    debug!(scored, skipped, "mean ndcg");
    if scored == 0 {
        return Err(Error::UndefinedScore);
    }
    Ok(total / scored as f64)
}

fn relevance_order(a: &(&ItemId, f64), b: &(&ItemId, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| b.0.cmp(a.0))
}

#[inline]
fn gain(rating: f64) -> f64 {
    rating.exp2() - 1.0
}

#[inline]
fn discount(position: usize) -> f64 {
    ((position + 1) as f64).log2()
}
