use tracing::{debug, trace};

use super::topk::TopK;
use super::Predictions;
use crate::distance::{DistanceWeights, ItemDistance};
use crate::error::{Error, Result};
use crate::model::{Catalog, Item, RatingTable, User};

/// Content-based k-nearest-neighbor predictor.
#[derive(Clone, Debug)]
pub struct ContentBased<'a> {
    catalog: &'a Catalog,
    ratings: &'a RatingTable,
    distance: ItemDistance<'a>,
    rating_ceiling: f64,
    top_k: usize,
}

impl<'a> ContentBased<'a> {
    /// Predict over `catalog`, using `ratings` for candidates' mean ratings and
    /// as the rating ceiling. At most `top_k` items are returned.
    pub fn new(catalog: &'a Catalog, ratings: &'a RatingTable, top_k: usize) -> Self {
        Self {
            catalog,
            ratings,
            distance: ItemDistance::new(catalog.bounds()),
            rating_ceiling: ratings.max_rating(),
            top_k,
        }
    }

    /// Override the rating ceiling taken from the rating table.
    pub fn with_rating_ceiling(mut self, rating_ceiling: f64) -> Self {
        self.rating_ceiling = rating_ceiling;
        self
    }

    /// Use custom item distance weights.
    pub fn with_weights(mut self, weights: DistanceWeights) -> Result<Self> {
        weights.validate()?;
        self.distance = self.distance.with_weights(weights);
        Ok(self)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Predict the target's ratings of unrated catalog items.
    pub fn predict(&self, target: &User) -> Result<Predictions> {
        if !(self.rating_ceiling.is_finite() && self.rating_ceiling > 0.0) {
            return Err(Error::InvalidParameter {
                name: "rating_ceiling",
                message: "must be finite and positive",
            });
        }

        let mut merged = TopK::new(self.top_k);
        for (seed_id, &rating) in target.ratings() {
            let Some(seed) = self.catalog.get(seed_id.as_str()) else {
                trace!(item = %seed_id, "rated item not in catalog, skipped as seed");
                continue;
            };
            let neighbors = self.nearest(seed, rating, target);
            for (item, score) in neighbors.iter() {
                merged.offer(item, score);
            }
        }

        debug!(user = %target.id(), kept = merged.len(), "content-based prediction");
        Ok(merged.into_predictions())
    }

    /// The `top_k` best-predicted unrated items from one seed item.
    fn nearest(&self, seed: &Item, rating: f64, target: &User) -> TopK {
        let mut top = TopK::new(self.top_k);
        for candidate in self.catalog.items() {
            if target.has_rated(candidate.id().as_str()) {
                continue;
            }
            top.offer(candidate.id(), self.score(seed, rating, candidate));
        }
        top
    }

    /// `(1 - d) * C - (C - r) / 2C [- (C - mean) / 2C]`, floored at 0.
    fn score(&self, seed: &Item, rating: f64, candidate: &Item) -> f64 {
        let c = self.rating_ceiling;
        let similarity = 1.0 - self.distance.distance(seed, candidate);
        let mut prediction = similarity * c - (c - rating) / (2.0 * c);
        if let Some(mean) = self.ratings.mean(candidate.id().as_str()) {
            prediction -= (c - mean) / (2.0 * c);
        }
        prediction.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Item::new("a").with_ints(vec![0]),
            Item::new("b").with_ints(vec![1]),
            Item::new("c").with_ints(vec![5]),
            Item::new("d").with_ints(vec![9]),
            Item::new("e").with_ints(vec![10]),
        ])
        .unwrap()
    }

    #[test]
    fn scores_follow_formula() {
        let catalog = catalog();
        let table = RatingTable::default().with_max_rating(5.0);
        let target = User::with_ratings(1, [("a", 5.0)]);

        let p = ContentBased::new(&catalog, &table, 10).predict(&target).unwrap();
        assert_eq!(p.len(), 4);
        assert!(!p.contains("a"));

        // d(a, b) = 0.2 * 0.1; rating equals the ceiling, so no penalty.
        let expected_b = (1.0 - 0.02) * 5.0;
        assert!((p.get("b").unwrap() - expected_b).abs() < 1e-12);
        // d(a, e) = 0.2.
        assert!((p.get("e").unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn mean_rating_penalty() {
        let catalog = catalog();
        let others = vec![User::with_ratings(2, [("b", 1.0), ("c", 5.0)])];
        let table = RatingTable::from_users(&others).with_max_rating(5.0);
        let target = User::with_ratings(1, [("a", 3.0)]);

        let p = ContentBased::new(&catalog, &table, 10).predict(&target).unwrap();
        // b: 0.98 * 5 - 2/10 - 4/10
        assert!((p.get("b").unwrap() - (4.9 - 0.2 - 0.4)).abs() < 1e-12);
        // c: (1 - 0.1) * 5 - 2/10 - 0
        assert!((p.get("c").unwrap() - (4.5 - 0.2)).abs() < 1e-12);
    }

    #[test]
    fn keeps_top_k_across_seeds() {
        let catalog = catalog();
        let table = RatingTable::default().with_max_rating(5.0);
        let target = User::with_ratings(1, [("a", 5.0), ("e", 5.0)]);

        let p = ContentBased::new(&catalog, &table, 2).predict(&target).unwrap();
        assert_eq!(p.len(), 2);
        // b is next to a, d is next to e; c is far from both.
        assert!(p.contains("b"));
        assert!(p.contains("d"));
        assert!(!p.contains("a") && !p.contains("e"));
    }

    #[test]
    fn repeated_candidate_keeps_best_score() {
        let catalog = catalog();
        let table = RatingTable::default().with_max_rating(5.0);
        let target = User::with_ratings(1, [("a", 1.0), ("e", 5.0)]);

        let p = ContentBased::new(&catalog, &table, 4).predict(&target).unwrap();
        // c is reachable from both seeds; the prediction from e (rated 5) wins.
        let from_e = (1.0 - 0.2 * 0.5) * 5.0;
        assert!((p.get("c").unwrap() - from_e).abs() < 1e-12);
    }

    #[test]
    fn floored_at_zero() {
        let catalog = Catalog::new(vec![
            Item::new("x").with_booleans(["t"]),
            Item::new("y").with_booleans(["f"]),
        ])
        .unwrap();
        let only_bool = DistanceWeights {
            int: 0.0,
            real: 0.0,
            date: 0.0,
            boolean: 1.0,
            categorical: 0.0,
        };
        let table = RatingTable::default().with_max_rating(5.0);
        let target = User::with_ratings(1, [("x", 0.0)]);

        let p = ContentBased::new(&catalog, &table, 3)
            .with_weights(only_bool)
            .unwrap()
            .predict(&target)
            .unwrap();
        assert_eq!(p.get("y"), Some(0.0));
    }

    #[test]
    fn invalid_ceiling() {
        let catalog = catalog();
        let table = RatingTable::default();
        let target = User::with_ratings(1, [("a", 5.0)]);
        assert!(ContentBased::new(&catalog, &table, 3).predict(&target).is_err());
    }

    #[test]
    fn unknown_rated_item_is_ignored() {
        let catalog = catalog();
        let table = RatingTable::default().with_max_rating(5.0);
        let target = User::with_ratings(1, [("zzz", 5.0)]);
        let p = ContentBased::new(&catalog, &table, 3).predict(&target).unwrap();
        assert!(p.is_empty());
    }
}
