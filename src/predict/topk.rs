use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use super::Predictions;
use crate::model::ItemId;

/// A scored candidate. Orders by score, and on equal scores the smaller item
/// id is the stronger candidate.
#[derive(Clone, Debug)]
struct Scored {
    score: f64,
    item: ItemId,
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.item.cmp(&self.item))
    }
}

/// Bounded reservoir of the strongest `capacity` distinct items.
///
/// Offering an item already kept raises its score to the maximum seen. Once
/// full, a newcomer evicts the weakest kept item only if it is stronger.
#[derive(Debug)]
pub(crate) struct TopK {
    capacity: usize,
    ranked: BTreeSet<Scored>,
    best: HashMap<ItemId, f64>,
}

impl TopK {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ranked: BTreeSet::new(),
            best: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn offer(&mut self, item: &ItemId, score: f64) {
        if let Some(&kept) = self.best.get(item) {
            if score > kept {
                self.ranked.remove(&Scored {
                    score: kept,
                    item: item.clone(),
                });
                self.insert(item.clone(), score);
            }
            return;
        }
        if self.capacity == 0 {
            return;
        }

        let candidate = Scored {
            score,
            item: item.clone(),
        };
        if self.ranked.len() == self.capacity {
            match self.ranked.first() {
                Some(weakest) if candidate > *weakest => {}
                _ => return,
            }
            if let Some(evicted) = self.ranked.pop_first() {
                self.best.remove(&evicted.item);
            }
        }
        self.insert(candidate.item, candidate.score);
    }

    fn insert(&mut self, item: ItemId, score: f64) {
        self.best.insert(item.clone(), score);
        self.ranked.insert(Scored { score, item });
    }

    pub(crate) fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Kept items, strongest first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&ItemId, f64)> {
        self.ranked.iter().rev().map(|s| (&s.item, s.score))
    }

    pub(crate) fn into_predictions(self) -> Predictions {
        self.best.into_iter().collect()
    }
}
