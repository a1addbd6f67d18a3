//! K-means over users' sparse rating maps.
//!
//! Differences from textbook Lloyd iterations:
//!
//! - Distances are partial (only over items a user and a centroid share), so a
//!   centroid may be "undefined" for a user. Such centroids are skipped; a user
//!   with no defined centroid at all is assigned uniformly at random.
//! - Centroids keep running sums/counts. A user moving between clusters is
//!   withdrawn from one accumulator and added to another, and a relocation is a
//!   single pass over the accumulated items instead of a scan over members.
//! - From the second pass on, a user whose distance to its current centroid is
//!   still within the distance recorded at its last assignment is left alone,
//!   without evaluating the other k - 1 centroids.

use std::collections::{BTreeMap, BTreeSet};

use rand::prelude::*;
use tracing::{debug, trace};

use super::centroid::Centroid;
use crate::distance::user::{euclidean, shared_items};
use crate::error::{Error, Result};
use crate::model::{Ratings, User, UserId};

/// K-means clustering of users by rating similarity.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    max_iter: usize,
    seed: Option<u64>,
}

impl KMeans {
    /// Create a k-means clusterer with `k` clusters.
    ///
    /// Defaults: `max_iter = 100`, unseeded RNG.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            seed: None,
        }
    }

    /// Set the maximum number of assignment passes.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Seed the RNG used for seeding and random fallback assignment.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configured number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Cluster `users`, seeding `k` centroids on distinct users drawn at random.
    ///
    /// Each user's cluster index and nearest distance are updated in place.
    /// A pool naming the same user id twice is rejected with
    /// [`Error::DuplicateUser`], even if it still holds `k` distinct users.
    pub fn fit(&self, users: &mut [User]) -> Result<Partition> {
        let mut rng = self.rng();
        self.fit_with_rng(users, &mut rng)
    }

    /// [`KMeans::fit`] drawing randomness from `rng`.
    pub fn fit_with_rng<R: Rng>(&self, users: &mut [User], rng: &mut R) -> Result<Partition> {
        self.validate(users)?;
        let centroids = random_seeds(users, self.k, rng);
        Ok(self.run(users, centroids, rng))
    }

    /// Cluster `users` starting from centroids seeded on the given users.
    ///
    /// `seeds` must name exactly `k` distinct users of the pool.
    pub fn fit_from_seeds(&self, users: &mut [User], seeds: &[UserId]) -> Result<Partition> {
        self.validate(users)?;
        if seeds.len() != self.k {
            return Err(Error::InvalidParameter {
                name: "seeds",
                message: "must name exactly k users",
            });
        }

        let mut centroids: Vec<Centroid> = Vec::with_capacity(self.k);
        for &id in seeds {
            if centroids.iter().any(|c| c.seed() == id) {
                return Err(Error::DuplicateUser(id));
            }
            let user = users
                .iter()
                .find(|u| u.id() == id)
                .ok_or(Error::UnknownUser(id))?;
            centroids.push(Centroid::from_seed(id, user.ratings()));
        }

        let mut rng = self.rng();
        Ok(self.run(users, centroids, &mut rng))
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    fn validate(&self, users: &[User]) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if users.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut seen = BTreeSet::new();
        for user in users {
            if !seen.insert(user.id()) {
                return Err(Error::DuplicateUser(user.id()));
            }
        }
        if users.len() < self.k {
            return Err(Error::InsufficientUsers {
                requested: self.k,
                available: users.len(),
            });
        }
        Ok(())
    }

    fn run<R: Rng>(&self, users: &mut [User], mut centroids: Vec<Centroid>, rng: &mut R) -> Partition {
        for user in users.iter_mut() {
            user.reset_assignment();
        }

        let k = centroids.len();
        let mut members: Vec<BTreeSet<UserId>> = vec![BTreeSet::new(); k];
        // Clusters come into existence the first time a user joins their centroid.
        let mut created: Vec<usize> = Vec::with_capacity(k);

        let mut iterations = 0;
        let mut converged = false;
        for iter in 0..self.max_iter {
            iterations = iter + 1;
            let mut moved = 0usize;

            for user in users.iter_mut() {
                let current = user.cluster();
                if let Some(c) = current {
                    if is_stable(user, &centroids[c]) {
                        continue;
                    }
                    centroids[c].remove(user.ratings());
                }

                let (nearest, dist) = nearest_centroid(user.ratings(), &centroids, rng);
                if dist.is_none() {
                    trace!(user = %user.id(), cluster = nearest, "no shared items with any centroid, assigned at random");
                }
                centroids[nearest].add(user.ratings());
                user.assign(nearest, dist);

                if current != Some(nearest) {
                    if let Some(c) = current {
                        members[c].remove(&user.id());
                    }
                    if !created.contains(&nearest) {
                        created.push(nearest);
                    }
                    members[nearest].insert(user.id());
                    moved += 1;
                }
            }

            trace!(iteration = iter, moved, "k-means pass");
            if moved == 0 {
                converged = true;
                break;
            }
            if iter + 1 == self.max_iter {
                break;
            }
            for centroid in &mut centroids {
                centroid.relocate();
            }
        }

        let max_distance = users
            .iter()
            .filter_map(|u| euclidean(u.ratings(), centroids[u.cluster()?].means()))
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))));

        let assignment: BTreeMap<UserId, (usize, Option<f64>)> = users
            .iter()
            .filter_map(|u| Some((u.id(), (u.cluster()?, u.nearest_distance()))))
            .collect();

        let mut slots: Vec<Option<Cluster>> = centroids
            .into_iter()
            .zip(members)
            .enumerate()
            .map(|(index, (centroid, members))| {
                Some(Cluster {
                    index,
                    centroid,
                    members,
                })
            })
            .collect();
        let clusters: Vec<Cluster> = created.iter().filter_map(|&c| slots[c].take()).collect();

        debug!(
            k = self.k,
            iterations,
            converged,
            clusters = clusters.len(),
            max_distance = ?max_distance,
            "k-means finished"
        );

        Partition {
            k: self.k,
            clusters,
            iterations,
            converged,
            max_distance,
            assignment,
        }
    }
}

/// Whether a user can keep its cluster without scanning every centroid.
fn is_stable(user: &User, centroid: &Centroid) -> bool {
    match euclidean(user.ratings(), centroid.means()) {
        None => true,
        Some(d) => d <= user.nearest_distance().unwrap_or(f64::INFINITY),
    }
}

/// Index of the nearest centroid and the distance to it.
///
/// Ties go to the centroid sharing more items with the user, then to the
/// first one scanned. With no defined distance, a random centroid and `None`.
fn nearest_centroid<R: Rng>(ratings: &Ratings, centroids: &[Centroid], rng: &mut R) -> (usize, Option<f64>) {
    let mut best: Option<(usize, f64, usize)> = None;
    for (idx, centroid) in centroids.iter().enumerate() {
        let Some(d) = euclidean(ratings, centroid.means()) else {
            continue;
        };
        let shared = shared_items(ratings, centroid.means());
        let better = match best {
            None => true,
            Some((_, best_d, best_shared)) => d < best_d || (d == best_d && shared > best_shared),
        };
        if better {
            best = Some((idx, d, shared));
        }
    }

    match best {
        Some((idx, d, _)) => (idx, Some(d)),
        None => (rng.random_range(0..centroids.len()), None),
    }
}

/// Seed `k` centroids on distinct users drawn uniformly at random.
///
/// The caller guarantees at least `k` distinct users.
fn random_seeds<R: Rng>(users: &[User], k: usize, rng: &mut R) -> Vec<Centroid> {
    let mut centroids: Vec<Centroid> = Vec::with_capacity(k);
    while centroids.len() < k {
        let candidate = &users[rng.random_range(0..users.len())];
        if centroids.iter().any(|c| c.seed() == candidate.id()) {
            continue;
        }
        centroids.push(Centroid::from_seed(candidate.id(), candidate.ratings()));
    }
    centroids
}

/// A group of users and the centroid summarizing them.
#[derive(Debug, Clone)]
pub struct Cluster {
    index: usize,
    centroid: Centroid,
    members: BTreeSet<UserId>,
}

impl Cluster {
    /// Index of this cluster's centroid; matches [`User::cluster`].
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn centroid(&self) -> &Centroid {
        &self.centroid
    }

    pub fn members(&self) -> &BTreeSet<UserId> {
        &self.members
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Result of one k-means run.
#[derive(Debug, Clone)]
pub struct Partition {
    k: usize,
    clusters: Vec<Cluster>,
    iterations: usize,
    converged: bool,
    max_distance: Option<f64>,
    assignment: BTreeMap<UserId, (usize, Option<f64>)>,
}

impl Partition {
    /// Number of centroids the run used.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Clusters in creation order. Centroids no user ever joined have no cluster.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// Number of assignment passes executed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the last pass moved no user.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Largest user-to-centroid distance at the end of the run.
    ///
    /// `None` if no user has a defined distance to its centroid.
    pub fn max_distance(&self) -> Option<f64> {
        self.max_distance
    }

    /// The cluster containing `user`.
    pub fn cluster_of(&self, user: UserId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.contains(user))
    }

    /// Write this run's assignment back into `users`.
    ///
    /// Users that were not part of the run are left unassigned.
    pub fn apply(&self, users: &mut [User]) {
        for user in users {
            match self.assignment.get(&user.id()) {
                Some(&(cluster, dist)) => user.assign(cluster, dist),
                None => user.reset_assignment(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemId;

    fn user(id: u32, pairs: &[(&str, f64)]) -> User {
        User::with_ratings(id, pairs.iter().map(|&(k, v)| (k, v)))
    }

    fn scratch_sums(cluster: &Cluster, users: &[User]) -> (BTreeMap<ItemId, f64>, BTreeMap<ItemId, usize>) {
        let mut sums = BTreeMap::new();
        let mut counts = BTreeMap::new();
        for u in users.iter().filter(|u| cluster.contains(u.id())) {
            for (item, &r) in u.ratings() {
                *sums.entry(item.clone()).or_insert(0.0) += r;
                *counts.entry(item.clone()).or_insert(0) += 1;
            }
        }
        (sums, counts)
    }

    fn two_groups() -> Vec<User> {
        vec![
            user(1, &[("a", 1.0), ("b", 1.0), ("c", 5.0)]),
            user(2, &[("a", 1.0), ("b", 2.0), ("c", 5.0)]),
            user(3, &[("a", 2.0), ("b", 1.0), ("c", 4.0)]),
            user(4, &[("a", 5.0), ("b", 5.0), ("c", 1.0)]),
            user(5, &[("a", 5.0), ("b", 4.0), ("c", 1.0)]),
            user(6, &[("a", 4.0), ("b", 5.0), ("c", 2.0)]),
        ]
    }

    #[test]
    fn third_user_joins_nearer_seed() {
        let mut users = vec![
            user(1, &[("A", 1.0), ("B", 1.0)]),
            user(2, &[("A", 5.0), ("B", 5.0)]),
            user(3, &[("A", 1.5), ("B", 1.0)]),
        ];
        let partition = KMeans::new(2)
            .with_max_iter(1)
            .fit_from_seeds(&mut users, &[UserId(1), UserId(2)])
            .unwrap();

        assert_eq!(partition.iterations(), 1);
        let total: usize = partition.clusters().iter().map(Cluster::len).sum();
        assert_eq!(total, 3);

        let near = partition.cluster_of(UserId(1)).unwrap();
        assert!(near.contains(UserId(3)));
        assert!(!near.contains(UserId(2)));
        assert_eq!(users[2].cluster(), Some(near.index()));
        assert_eq!(users[2].nearest_distance(), Some(0.5));
    }

    #[test]
    fn stable_user_keeps_cluster_after_relocation() {
        // After one pass the second centroid moves to a = 5.5, nearer to user 3
        // than its own centroid at a = 2. User 3's distance to its own centroid
        // dropped from 4 to 2, so it is not rescanned.
        let mut users = vec![
            user(1, &[("a", 0.0), ("b", 20.0)]),
            user(2, &[("a", 10.0), ("b", 0.0)]),
            user(3, &[("a", 4.0)]),
            user(4, &[("a", 4.0), ("b", 0.0)]),
            user(5, &[("a", 4.0), ("b", 0.0)]),
            user(6, &[("a", 4.0), ("b", 0.0)]),
        ];
        let partition = KMeans::new(2)
            .fit_from_seeds(&mut users, &[UserId(1), UserId(2)])
            .unwrap();

        assert!(partition.converged());
        assert_eq!(partition.iterations(), 2);

        let own = partition.cluster_of(UserId(3)).unwrap();
        let other = partition.cluster_of(UserId(2)).unwrap();
        assert!(own.contains(UserId(1)));
        assert_ne!(own.index(), other.index());
        assert_eq!(users[2].cluster(), Some(own.index()));
        assert_eq!(users[2].nearest_distance(), Some(4.0));

        let to_own = euclidean(users[2].ratings(), own.centroid().means()).unwrap();
        let to_other = euclidean(users[2].ratings(), other.centroid().means()).unwrap();
        assert_eq!(to_own, 2.0);
        assert_eq!(to_other, 1.5);
    }

    #[test]
    fn seeded_groups_separate() {
        let mut users = two_groups();
        let partition = KMeans::new(2)
            .fit_from_seeds(&mut users, &[UserId(1), UserId(4)])
            .unwrap();

        assert!(partition.converged());
        let left = partition.cluster_of(UserId(1)).unwrap();
        let right = partition.cluster_of(UserId(4)).unwrap();
        assert_eq!(left.members().iter().map(|u| u.0).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(right.members().iter().map(|u| u.0).collect::<Vec<_>>(), vec![4, 5, 6]);
    }

    #[test]
    fn every_user_in_exactly_one_cluster() {
        for seed in 0..20 {
            let mut users = two_groups();
            let partition = KMeans::new(3).with_seed(seed).fit(&mut users).unwrap();

            for u in &users {
                let owners: Vec<&Cluster> =
                    partition.clusters().iter().filter(|c| c.contains(u.id())).collect();
                assert_eq!(owners.len(), 1, "seed {seed}, user {}", u.id());
                assert_eq!(u.cluster(), Some(owners[0].index()));
            }
            let total: usize = partition.clusters().iter().map(Cluster::len).sum();
            assert_eq!(total, users.len());
        }
    }

    #[test]
    fn accumulators_match_members() {
        for seed in 0..20 {
            let mut users = two_groups();
            users.push(user(7, &[("d", 3.0)]));
            users.push(user(8, &[("a", 3.0), ("d", 2.0)]));
            let partition = KMeans::new(3).with_seed(seed).fit(&mut users).unwrap();

            for cluster in partition.clusters() {
                let (sums, counts) = scratch_sums(cluster, &users);
                assert_eq!(cluster.centroid().sums(), &sums, "seed {seed}");
                assert_eq!(cluster.centroid().counts(), &counts, "seed {seed}");
            }
        }
    }

    #[test]
    fn same_seed_same_partition() {
        let mut a = two_groups();
        let mut b = two_groups();
        let pa = KMeans::new(2).with_seed(9).fit(&mut a).unwrap();
        let pb = KMeans::new(2).with_seed(9).fit(&mut b).unwrap();
        let ma: Vec<_> = pa.clusters().iter().map(|c| c.members().clone()).collect();
        let mb: Vec<_> = pb.clusters().iter().map(|c| c.members().clone()).collect();
        assert_eq!(ma, mb);
    }

    #[test]
    fn user_without_overlap_is_assigned_at_random() {
        let mut users = vec![
            user(1, &[("a", 1.0)]),
            user(2, &[("a", 5.0)]),
            user(3, &[("z", 3.0)]),
        ];
        let partition = KMeans::new(2)
            .with_seed(3)
            .fit_from_seeds(&mut users, &[UserId(1), UserId(2)])
            .unwrap();

        assert!(users[2].cluster().is_some());
        assert_eq!(users[2].nearest_distance(), None);
        assert!(partition.cluster_of(UserId(3)).is_some());
    }

    #[test]
    fn tie_prefers_more_shared_items() {
        // User 3 is at distance 0 from both seeds, but shares two items with seed 2.
        let mut users = vec![
            user(1, &[("a", 3.0)]),
            user(2, &[("a", 3.0), ("b", 2.0)]),
            user(3, &[("a", 3.0), ("b", 2.0)]),
        ];
        let partition = KMeans::new(2)
            .with_max_iter(1)
            .fit_from_seeds(&mut users, &[UserId(1), UserId(2)])
            .unwrap();
        assert!(partition.cluster_of(UserId(2)).unwrap().contains(UserId(3)));
    }

    #[test]
    fn residual_tie_keeps_first_centroid() {
        let mut users = vec![
            user(1, &[("a", 2.0)]),
            user(2, &[("a", 4.0)]),
            user(3, &[("a", 3.0)]),
        ];
        let partition = KMeans::new(2)
            .with_max_iter(1)
            .fit_from_seeds(&mut users, &[UserId(1), UserId(2)])
            .unwrap();
        assert!(partition.cluster_of(UserId(1)).unwrap().contains(UserId(3)));
    }

    #[test]
    fn max_distance_reported() {
        let mut users = vec![
            user(1, &[("A", 1.0), ("B", 1.0)]),
            user(2, &[("A", 5.0), ("B", 5.0)]),
            user(3, &[("A", 1.5), ("B", 1.0)]),
        ];
        let partition = KMeans::new(2)
            .with_max_iter(1)
            .fit_from_seeds(&mut users, &[UserId(1), UserId(2)])
            .unwrap();
        // No relocation after the last pass: centroids sit on the seeds.
        assert_eq!(partition.max_distance(), Some(0.5));
    }

    #[test]
    fn apply_restores_assignment() {
        let mut users = two_groups();
        let partition = KMeans::new(2).with_seed(1).fit(&mut users).unwrap();
        let before: Vec<_> = users.iter().map(User::cluster).collect();

        let _ = KMeans::new(3).with_seed(2).fit(&mut users).unwrap();
        partition.apply(&mut users);
        let after: Vec<_> = users.iter().map(User::cluster).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn invalid_inputs() {
        let mut users = two_groups();
        assert_eq!(
            KMeans::new(0).fit(&mut users).unwrap_err(),
            Error::InvalidParameter {
                name: "k",
                message: "must be at least 1"
            }
        );
        assert!(KMeans::new(2).with_max_iter(0).fit(&mut users).is_err());
        assert_eq!(
            KMeans::new(7).fit(&mut users).unwrap_err(),
            Error::InsufficientUsers {
                requested: 7,
                available: 6
            }
        );
        assert_eq!(KMeans::new(1).fit(&mut []).unwrap_err(), Error::EmptyInput);

        users.push(user(1, &[("a", 1.0)]));
        assert_eq!(
            KMeans::new(2).fit(&mut users).unwrap_err(),
            Error::DuplicateUser(UserId(1))
        );
    }

    #[test]
    fn invalid_seeds() {
        let mut users = two_groups();
        let km = KMeans::new(2);
        assert!(km.fit_from_seeds(&mut users, &[UserId(1)]).is_err());
        assert_eq!(
            km.fit_from_seeds(&mut users, &[UserId(1), UserId(1)]).unwrap_err(),
            Error::DuplicateUser(UserId(1))
        );
        assert_eq!(
            km.fit_from_seeds(&mut users, &[UserId(1), UserId(99)]).unwrap_err(),
            Error::UnknownUser(UserId(99))
        );
    }
}
