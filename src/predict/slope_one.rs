use std::collections::BTreeMap;

use tracing::debug;

use super::topk::TopK;
use super::Predictions;
use crate::model::{ItemId, User};

/// Weighted Slope-One predictor.
#[derive(Clone, Debug)]
pub struct SlopeOne {
    rating_ceiling: f64,
    top_k: usize,
}

impl SlopeOne {
    /// Predictions are clamped to `rating_ceiling` and at most `top_k` are kept.
    pub fn new(rating_ceiling: f64, top_k: usize) -> Self {
        Self {
            rating_ceiling,
            top_k,
        }
    }

    pub fn rating_ceiling(&self) -> f64 {
        self.rating_ceiling
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Predict the target's ratings of items its neighbors rated.
    ///
    /// Every item a neighbor rated other than the pivot item gets a deviation
    /// sample, including items the target already rated. Negative predictions
    /// are dropped. A neighbor with the target's id is ignored.
    pub fn predict<'a>(&self, target: &User, neighbors: impl IntoIterator<Item = &'a User>) -> Predictions {
        let neighbors: Vec<&User> = neighbors.into_iter().filter(|n| n.id() != target.id()).collect();

        let mut sums: BTreeMap<&ItemId, (f64, usize)> = BTreeMap::new();
        for (pivot, &target_rating) in target.ratings() {
            for neighbor in &neighbors {
                let Some(neighbor_pivot) = neighbor.rating(pivot.as_str()) else {
                    continue;
                };
                for (item, &r) in neighbor.ratings() {
                    if item == pivot {
                        continue;
                    }
                    let entry = sums.entry(item).or_insert((0.0, 0));
                    entry.0 += target_rating + (r - neighbor_pivot);
                    entry.1 += 1;
                }
            }
        }

        let mut top = TopK::new(self.top_k);
        for (item, (sum, count)) in &sums {
            let prediction = sum / *count as f64;
            if prediction >= 0.0 {
                top.offer(item, prediction.min(self.rating_ceiling));
            }
        }

        debug!(
            user = %target.id(),
            neighbors = neighbors.len(),
            candidates = sums.len(),
            kept = top.len(),
            "slope-one prediction"
        );
        top.into_predictions()
    }
}
