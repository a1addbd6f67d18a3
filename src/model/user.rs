use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::item::ItemId;

/// Sparse rating map of one user (or one centroid). Unrated items are absent.
pub type Ratings = BTreeMap<ItemId, f64>;

/// User identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub u32);

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user and their ratings.
///
/// Besides the ratings, a user carries the state k-means keeps about it: the
/// index of the cluster it currently belongs to and the distance to that
/// cluster's centroid recorded when it was assigned. Only clustering writes
/// these fields. Users compare and hash by id.
#[derive(Clone, Debug)]
pub struct User {
    id: UserId,
    ratings: Ratings,
    cluster: Option<usize>,
    nearest_dist: Option<f64>,
}

impl User {
    /// A user with no ratings.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            ratings: Ratings::new(),
            cluster: None,
            nearest_dist: None,
        }
    }

    /// A user with the given ratings.
    pub fn with_ratings<I, K>(id: impl Into<UserId>, ratings: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<ItemId>,
    {
        let mut user = Self::new(id);
        user.ratings = ratings.into_iter().map(|(k, v)| (k.into(), v)).collect();
        user
    }

    /// Record (or overwrite) a rating.
    pub fn rate(&mut self, item: impl Into<ItemId>, rating: f64) {
        self.ratings.insert(item.into(), rating);
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    /// The rating given to `item`, if any.
    pub fn rating(&self, item: &str) -> Option<f64> {
        self.ratings.get(item).copied()
    }

    pub fn has_rated(&self, item: &str) -> bool {
        self.ratings.contains_key(item)
    }

    /// Index of the cluster this user was last assigned to.
    pub fn cluster(&self) -> Option<usize> {
        self.cluster
    }

    /// Distance to the centroid recorded at the last assignment.
    ///
    /// `None` when the user has never been assigned, or was assigned at random
    /// because it shared no items with any centroid.
    pub fn nearest_distance(&self) -> Option<f64> {
        self.nearest_dist
    }

    pub(crate) fn assign(&mut self, cluster: usize, nearest_dist: Option<f64>) {
        self.cluster = Some(cluster);
        self.nearest_dist = nearest_dist;
    }

    pub(crate) fn reset_assignment(&mut self) {
        self.cluster = None;
        self.nearest_dist = None;
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
