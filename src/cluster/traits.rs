use super::kmeans::{KMeans, Partition};
use super::select_k::KSelection;
use crate::error::Result;
use crate::model::User;

/// Common interface for user clusterers.
pub trait Clustering {
    /// Partition the users, leaving each user's cluster assignment in place.
    fn partition(&self, users: &mut [User]) -> Result<Partition>;

    /// The configured number of clusters (if fixed).
    ///
    /// For clusterers that choose the number of clusters themselves this
    /// returns 0.
    fn n_clusters(&self) -> usize;
}

impl Clustering for KMeans {
    fn partition(&self, users: &mut [User]) -> Result<Partition> {
        self.fit(users)
    }

    fn n_clusters(&self) -> usize {
        self.k()
    }
}

impl Clustering for KSelection {
    fn partition(&self, users: &mut [User]) -> Result<Partition> {
        self.fit(users)
    }

    /// Chosen per run, so this returns 0.
    fn n_clusters(&self) -> usize {
        0
    }
}
