use rand::prelude::*;
use tracing::debug;

use super::kmeans::{KMeans, Partition};
use crate::error::{Error, Result};
use crate::model::User;

/// Elbow-style selection of the number of user clusters.
///
/// For each `k` in `k_min..=k_max` k-means is run and the largest
/// user-to-centroid distance recorded. Growing `k` stops as soon as one more
/// cluster either barely helps (the maximum drops by less than
/// `plateau_threshold`) or hurts (it rises by more than
/// `instability_threshold`); the previous `k` is kept. If neither happens the
/// `k` with the smallest maximum distance wins.
///
/// The thresholds are empirical; the defaults are the values the heuristic
/// was tuned with on 5-star rating datasets.
#[derive(Clone, Debug)]
pub struct KSelection {
    /// Smallest cluster count tried.
    pub k_min: usize,
    /// Largest cluster count tried.
    pub k_max: usize,
    /// Pass limit of each k-means run.
    pub max_iter: usize,
    /// A decrease of the maximum distance smaller than this is a plateau.
    pub plateau_threshold: f64,
    /// An increase of the maximum distance larger than this is instability.
    pub instability_threshold: f64,
    /// Optional RNG seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for KSelection {
    fn default() -> Self {
        Self {
            k_min: 3,
            k_max: 12,
            max_iter: 100,
            plateau_threshold: 0.5,
            instability_threshold: 0.25,
            seed: None,
        }
    }
}

impl KSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the range of cluster counts tried.
    pub fn with_range(mut self, k_min: usize, k_max: usize) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_thresholds(mut self, plateau: f64, instability: f64) -> Self {
        self.plateau_threshold = plateau;
        self.instability_threshold = instability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pick a cluster count and return the partition computed for it.
    ///
    /// The chosen partition's assignment is left in `users`.
    pub fn fit(&self, users: &mut [User]) -> Result<Partition> {
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        self.fit_with_rng(users, &mut rng)
    }

    /// [`KSelection::fit`] drawing randomness from `rng`.
    pub fn fit_with_rng<R: Rng>(&self, users: &mut [User], rng: &mut R) -> Result<Partition> {
        self.validate()?;
        if users.len() < self.k_min {
            return Err(Error::InsufficientUsers {
                requested: self.k_min,
                available: users.len(),
            });
        }

        let k_max = self.k_max.min(users.len());
        let mut runs: Vec<(Partition, f64)> = Vec::with_capacity(k_max - self.k_min + 1);
        let mut chosen: Option<usize> = None;

        for k in self.k_min..=k_max {
            let partition = KMeans::new(k)
                .with_max_iter(self.max_iter)
                .fit_with_rng(users, rng)?;
            let max_distance = partition.max_distance().unwrap_or(0.0);
            debug!(k, max_distance, iterations = partition.iterations(), "k selection candidate");

            if let Some((_, previous)) = runs.last() {
                let previous = *previous;
                let plateau = previous >= max_distance && previous - max_distance < self.plateau_threshold;
                let unstable = max_distance > previous && max_distance - previous > self.instability_threshold;
                if plateau || unstable {
                    chosen = Some(runs.len() - 1);
                    debug!(k = k - 1, plateau, unstable, "k selection stopped");
                }
            }
            if chosen.is_some() {
                break;
            }
            runs.push((partition, max_distance));
        }

        let idx = match chosen {
            Some(idx) => idx,
            None => {
                // First k with the smallest maximum distance.
                let mut best = 0;
                for (i, (_, d)) in runs.iter().enumerate() {
                    if *d < runs[best].1 {
                        best = i;
                    }
                }
                debug!(k = self.k_min + best, "k selection fell back to smallest maximum distance");
                best
            }
        };

        let partition = runs.swap_remove(idx).0;
        partition.apply(users);
        Ok(partition)
    }

    fn validate(&self) -> Result<()> {
        if self.k_min == 0 {
            return Err(Error::InvalidParameter {
                name: "k_min",
                message: "must be at least 1",
            });
        }
        if self.k_max < self.k_min {
            return Err(Error::InvalidParameter {
                name: "k_max",
                message: "must be at least k_min",
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if !(self.plateau_threshold >= 0.0 && self.instability_threshold >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "thresholds",
                message: "must be non-negative",
            });
        }
        Ok(())
    }
}
