//! Distances used by the recommenders.
//!
//! - [`ItemDistance`]: weighted multi-type distance between two catalog items,
//!   normalized to \[0, 1\]. Drives content-based prediction.
//! - [`user::euclidean`]: Euclidean distance between a user's ratings and a
//!   centroid's ratings, restricted to the items both rated. Drives k-means.
//!
//! The user distance is *partial*: two rating maps with no item in common have
//! no distance at all. That case is returned as `None` and handled by the
//! caller (k-means skips such centroids) rather than reported as an error.

pub mod item;
pub mod user;

pub use item::{DistanceWeights, ItemDistance};
