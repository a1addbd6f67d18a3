use crate::model::{ItemId, Ratings, UserId};
use std::collections::BTreeMap;

/// Synthetic "average user" at the center of a cluster.
///
/// `means` is the rating profile distances are measured against. `sums` and
/// `counts` accumulate the ratings of the current members so that a membership
/// change costs O(|member ratings|) and `relocate` is a single pass over the
/// accumulated items. `means` only moves on [`Centroid::relocate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Centroid {
    seed: UserId,
    means: Ratings,
    sums: BTreeMap<ItemId, f64>,
    counts: BTreeMap<ItemId, usize>,
}

impl Centroid {
    /// A centroid positioned on a seed user's ratings, with no members yet.
    pub fn from_seed(seed: UserId, ratings: &Ratings) -> Self {
        Self {
            seed,
            means: ratings.clone(),
            sums: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    /// The user this centroid was seeded from.
    pub fn seed(&self) -> UserId {
        self.seed
    }

    /// Current position (mean rating per item).
    pub fn means(&self) -> &Ratings {
        &self.means
    }

    /// Accumulated rating sum per item over current members.
    pub fn sums(&self) -> &BTreeMap<ItemId, f64> {
        &self.sums
    }

    /// Number of current members that rated each item.
    pub fn counts(&self) -> &BTreeMap<ItemId, usize> {
        &self.counts
    }

    /// Accumulate a new member's ratings.
    pub fn add(&mut self, ratings: &Ratings) {
        for (item, &r) in ratings {
            *self.sums.entry(item.clone()).or_insert(0.0) += r;
            *self.counts.entry(item.clone()).or_insert(0) += 1;
        }
    }

    /// Withdraw a departing member's ratings.
    ///
    /// Items whose count drops to zero are removed from the accumulators.
    pub fn remove(&mut self, ratings: &Ratings) {
        for (item, &r) in ratings {
            let Some(count) = self.counts.get_mut(item) else {
                debug_assert!(false, "removing rating of {item} that was never added");
                continue;
            };
            *count -= 1;
            if *count == 0 {
                self.counts.remove(item);
                self.sums.remove(item);
            } else if let Some(sum) = self.sums.get_mut(item) {
                *sum -= r;
            }
        }
    }

    /// Move the centroid to the mean of its current members.
    ///
    /// A centroid without members ends up with no position at all, so every
    /// distance to it is undefined until members are added and it is relocated
    /// again.
    pub fn relocate(&mut self) {
        self.means = self
            .sums
            .iter()
            .filter_map(|(item, sum)| {
                let count = *self.counts.get(item)?;
                Some((item.clone(), sum / count as f64))
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(pairs: &[(&str, f64)]) -> Ratings {
        pairs.iter().map(|&(k, v)| (ItemId::new(k), v)).collect()
    }

    #[test]
    fn seeded_position_until_relocated() {
        let seed = ratings(&[("a", 5.0)]);
        let mut c = Centroid::from_seed(UserId(1), &seed);
        assert_eq!(c.means(), &seed);
        assert!(c.sums().is_empty());

        c.add(&ratings(&[("a", 1.0), ("b", 2.0)]));
        assert_eq!(c.means(), &seed);

        c.relocate();
        assert_eq!(c.means(), &ratings(&[("a", 1.0), ("b", 2.0)]));
    }

    #[test]
    fn add_remove_matches_members() {
        let u1 = ratings(&[("a", 4.0), ("b", 2.0)]);
        let u2 = ratings(&[("a", 2.0), ("c", 5.0)]);
        let u3 = ratings(&[("b", 3.0)]);

        let mut c = Centroid::from_seed(UserId(0), &u1);
        c.add(&u1);
        c.add(&u2);
        c.add(&u3);
        c.remove(&u1);

        assert_eq!(c.sums(), &ratings(&[("a", 2.0), ("b", 3.0), ("c", 5.0)]));
        assert_eq!(c.counts().get("a"), Some(&1));
        assert_eq!(c.counts().get("b"), Some(&1));

        c.relocate();
        assert_eq!(c.means(), &ratings(&[("a", 2.0), ("b", 3.0), ("c", 5.0)]));
    }

    #[test]
    fn emptied_centroid_loses_position() {
        let u = ratings(&[("a", 4.0)]);
        let mut c = Centroid::from_seed(UserId(0), &u);
        c.add(&u);
        c.remove(&u);
        assert!(c.sums().is_empty());
        assert!(c.counts().is_empty());

        c.relocate();
        assert!(c.means().is_empty());
    }

    #[test]
    fn relocate_averages() {
        let mut c = Centroid::from_seed(UserId(0), &Ratings::new());
        c.add(&ratings(&[("a", 4.0), ("b", 1.0)]));
        c.add(&ratings(&[("a", 2.0)]));
        c.relocate();
        assert_eq!(c.means(), &ratings(&[("a", 3.0), ("b", 1.0)]));
    }
}
