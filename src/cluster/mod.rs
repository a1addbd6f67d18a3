//! Clustering users by rating similarity.
//!
//! Collaborative prediction only looks at users that rate like the target.
//! This module finds them by k-means over sparse rating maps.
//!
//! ## K-means
//!
//! Assign each user to the nearest centroid, then move each centroid to the
//! mean rating profile of its members. Repeat until no user moves.
//!
//! **Distance**: Euclidean, over the items a user and a centroid both have.
//! Users rate few items, so most pairs overlap only partially; a centroid with
//! no overlap at all is not a candidate for that user.
//!
//! **Incremental centroids**: every [`Centroid`] keeps per-item running sums
//! and counts of its members' ratings. Moving a user costs O(|its ratings|);
//! relocating a centroid never rescans members.
//!
//! **Stable users**: after the first pass, a user whose distance to its
//! (relocated) centroid is no larger than the distance recorded when it joined
//! keeps its cluster without comparing against the other centroids.
//!
//! ## Choosing k
//!
//! [`KSelection`] runs k-means for increasing k and watches the largest
//! user-to-centroid distance. It stops at the elbow: when one more cluster no
//! longer shrinks that distance by much, or makes it grow.
//!
//! ## Usage
//!
//! ```rust
//! use recluster::cluster::{Clustering, KMeans, KSelection};
//! use recluster::model::User;
//!
//! let mut users: Vec<User> = (0..8)
//!     .map(|i| {
//!         let r = if i < 4 { 1.0 } else { 5.0 };
//!         User::with_ratings(i, [("a", r), ("b", r)])
//!     })
//!     .collect();
//!
//! // Fixed k.
//! let partition = KMeans::new(2).with_seed(42).fit(&mut users).unwrap();
//! let total: usize = partition.clusters().iter().map(|c| c.len()).sum();
//! assert_eq!(total, 8);
//!
//! // k chosen by the elbow heuristic.
//! let partition = KSelection::new().with_seed(42).partition(&mut users).unwrap();
//! assert!(partition.k() >= 3);
//! assert!(users.iter().all(|u| u.cluster().is_some()));
//! ```

mod centroid;
mod kmeans;
mod select_k;
mod traits;

pub use centroid::Centroid;
pub use kmeans::{Cluster, KMeans, Partition};
pub use select_k::KSelection;
pub use traits::Clustering;
