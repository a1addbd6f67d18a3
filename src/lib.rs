//! Item recommendation from ratings.
//!
//! `recluster` predicts how a user would rate items they have not rated yet,
//! and measures how well such predictions rank held-out ratings.
//!
//! The public API is organized as:
//! - [`model`]: items, users, the catalog and rating table
//! - [`distance`]: item-to-item and user-to-centroid distances
//! - [`cluster`]: k-means over users, with elbow-based choice of k
//! - [`predict`]: Slope-One, content-based KNN and hybrid predictors
//! - [`eval`]: NDCG against a reference user
//! - [`recommender`]: one entry point over the three strategies
//!
//! ```rust
//! use recluster::{Catalog, Item, RatingTable, Recommender, Strategy, User};
//!
//! let catalog = Catalog::new(vec![
//!     Item::new("a").with_years(vec![1990]),
//!     Item::new("b").with_years(vec![1991]),
//!     Item::new("c").with_years(vec![2020]),
//! ])
//! .unwrap();
//! let pool = vec![User::with_ratings(1, [("a", 4.0), ("c", 2.0)])];
//! let table = RatingTable::from_users(&pool).with_max_rating(5.0);
//!
//! let rec = Recommender::new(&catalog, &table, pool).with_top_k(1);
//! let target = User::with_ratings(2, [("a", 5.0)]);
//! let predictions = rec.recommend(&target, Strategy::ContentBased).unwrap();
//! assert!(predictions.contains("b"));
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod distance;
pub mod error;
pub mod eval;
pub mod model;
pub mod predict;
pub mod recommender;

pub use cluster::{Centroid, Cluster, Clustering, KMeans, KSelection, Partition};
pub use distance::{DistanceWeights, ItemDistance};
pub use error::{Error, Result};
pub use eval::{dcg, mean_ndcg};
pub use model::{AttributeBounds, Catalog, CategorySet, Item, ItemId, RatingTable, Ratings, User, UserId};
pub use predict::{hybrid, ContentBased, Predictions, SlopeOne};
pub use recommender::{Recommender, Strategy};
