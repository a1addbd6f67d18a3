//! Rating predictors.
//!
//! ## Slope-One (collaborative)
//!
//! Predicts how the target would rate an item from how its neighbors rated it
//! *relative to* items the target also rated:
//!
//! ```text
//! p(J) = mean over (i, neighbor) of  target[i] + (neighbor[J] - neighbor[i])
//! ```
//!
//! Neighbors are normally the other members of the target's k-means cluster.
//!
//! ## Content-based (KNN)
//!
//! For each item the target rated, the most similar unrated catalog items (by
//! [`ItemDistance`](crate::distance::ItemDistance)) are scored from the
//! similarity, the target's rating of the seed item and the candidate's mean
//! rating elsewhere. Only the strongest `top_k` candidates survive.
//!
//! ## Hybrid
//!
//! [`hybrid::merge`] averages items both predictors proposed and fills the
//! rest from the two lists, strongest first.
//!
//! All predictors return [`Predictions`]; [`Predictions::ranked`] gives the
//! deterministic presentation order (score descending, item id ascending).

pub mod content;
pub mod hybrid;
pub mod slope_one;
mod topk;

pub use content::ContentBased;
pub use slope_one::SlopeOne;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{ItemId, User, UserId};

/// Predicted rating per item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Predictions(BTreeMap<ItemId, f64>);

impl Predictions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prediction for `item`, returning the previous one.
    pub fn insert(&mut self, item: impl Into<ItemId>, score: f64) -> Option<f64> {
        self.0.insert(item.into(), score)
    }

    pub fn get(&self, item: &str) -> Option<f64> {
        self.0.get(item).copied()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.contains_key(item)
    }

    pub fn remove(&mut self, item: &str) -> Option<f64> {
        self.0.remove(item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in item id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, f64)> {
        self.0.iter().map(|(k, &v)| (k, v))
    }

    /// Entries by score descending, item id ascending on ties.
    pub fn ranked(&self) -> Vec<(ItemId, f64)> {
        let mut entries: Vec<(ItemId, f64)> = self.0.iter().map(|(k, &v)| (k.clone(), v)).collect();
        entries.sort_by(rank_order);
        entries
    }

    /// The `n` best entries in ranked order.
    pub fn top(&self, n: usize) -> Vec<(ItemId, f64)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// View the predictions as a user's ratings, e.g. to evaluate them with
    /// [`eval::dcg`](crate::eval::dcg).
    pub fn into_user(self, id: impl Into<UserId>) -> User {
        User::with_ratings(id, self.0)
    }
}

impl FromIterator<(ItemId, f64)> for Predictions {
    fn from_iter<T: IntoIterator<Item = (ItemId, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Predictions {
    type Item = (ItemId, f64);
    type IntoIter = std::collections::btree_map::IntoIter<ItemId, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Score descending, then item id ascending.
pub(crate) fn rank_order(a: &(ItemId, f64), b: &(ItemId, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_breaks_ties_by_id() {
        let p: Predictions = [
            (ItemId::new("c"), 3.0),
            (ItemId::new("a"), 4.0),
            (ItemId::new("b"), 4.0),
            (ItemId::new("d"), 1.0),
        ]
        .into_iter()
        .collect();

        let ids: Vec<String> = p.ranked().into_iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(p.top(2).len(), 2);
        assert_eq!(p.top(10).len(), 4);
    }

    #[test]
    fn into_user_keeps_scores() {
        let mut p = Predictions::new();
        p.insert("x", 2.5);
        let u = p.into_user(3);
        assert_eq!(u.id(), UserId(3));
        assert_eq!(u.rating("x"), Some(2.5));
    }
}
