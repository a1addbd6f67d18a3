//! One entry point over the three prediction strategies.

use tracing::debug;

use crate::cluster::{Clustering, KSelection};
use crate::distance::DistanceWeights;
use crate::error::{Error, Result};
use crate::model::{Catalog, RatingTable, User};
use crate::predict::{hybrid, ContentBased, Predictions, SlopeOne};

/// Prediction strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Slope-One over the target's k-means cluster.
    Collaborative,
    /// KNN over item attributes.
    ContentBased,
    /// Merge of the two.
    Hybrid,
}

/// Recommends items to users of a dataset.
///
/// Holds the user pool collaborative filtering clusters. Each collaborative
/// request clusters a copy of the pool with the target added (or its pool
/// entry replaced), so the pool itself never changes and a recommendation does
/// not depend on earlier requests.
pub struct Recommender<'a> {
    catalog: &'a Catalog,
    ratings: &'a RatingTable,
    pool: Vec<User>,
    top_k: usize,
    clustering: Box<dyn Clustering + 'a>,
    weights: DistanceWeights,
}

impl<'a> Recommender<'a> {
    /// Defaults: `top_k = 10`, k chosen by [`KSelection::default`], default
    /// distance weights.
    pub fn new(catalog: &'a Catalog, ratings: &'a RatingTable, pool: Vec<User>) -> Self {
        Self {
            catalog,
            ratings,
            pool,
            top_k: 10,
            clustering: Box::new(KSelection::default()),
            weights: DistanceWeights::default(),
        }
    }

    /// Set the number of items recommended.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Use another clusterer for the collaborative neighborhood.
    pub fn with_clustering(mut self, clustering: impl Clustering + 'a) -> Self {
        self.clustering = Box::new(clustering);
        self
    }

    /// Use custom item distance weights for content-based prediction.
    pub fn with_weights(mut self, weights: DistanceWeights) -> Self {
        self.weights = weights;
        self
    }

    /// The user pool, as given.
    pub fn pool(&self) -> &[User] {
        &self.pool
    }

    /// Predict the target's ratings with the given strategy.
    pub fn recommend(&self, target: &User, strategy: Strategy) -> Result<Predictions> {
        if self.top_k == 0 {
            return Err(Error::InvalidParameter {
                name: "top_k",
                message: "must be at least 1",
            });
        }
        let predictions = match strategy {
            Strategy::Collaborative => self.collaborative(target)?,
            Strategy::ContentBased => self.content_based(target)?,
            Strategy::Hybrid => {
                let collaborative = self.collaborative(target)?;
                let content = self.content_based(target)?;
                hybrid::merge(&collaborative, &content)
            }
        };
        debug!(user = %target.id(), ?strategy, items = predictions.len(), "recommendation");
        Ok(predictions)
    }

    fn collaborative(&self, target: &User) -> Result<Predictions> {
        // Cluster a copy; the stored pool never changes.
        let mut pool = self.pool.clone();
        match pool.iter().position(|u| u.id() == target.id()) {
            Some(pos) => pool[pos] = target.clone(),
            None => pool.push(target.clone()),
        }

        let partition = self.clustering.partition(&mut pool)?;
        let cluster = partition
            .cluster_of(target.id())
            .ok_or(Error::UnknownUser(target.id()))?;
        let neighbors = pool
            .iter()
            .filter(|u| u.id() != target.id() && cluster.contains(u.id()));

        Ok(SlopeOne::new(self.ratings.max_rating(), self.top_k).predict(target, neighbors))
    }

    fn content_based(&self, target: &User) -> Result<Predictions> {
        ContentBased::new(self.catalog, self.ratings, self.top_k)
            .with_weights(self.weights)?
            .predict(target)
    }
}
