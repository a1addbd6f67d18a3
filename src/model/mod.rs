//! Typed, in-memory dataset the recommenders operate on.
//!
//! Ingestion (CSV parsing, type inference, outlier clipping, one-hot encoding,
//! tokenization) happens upstream; this module only defines the shapes it
//! delivers:
//!
//! - [`Item`]: an identifier plus column-aligned typed attributes (integers,
//!   reals, years, booleans, one-hot [`CategorySet`]s)
//! - [`User`]: sparse [`Ratings`] plus the cluster bookkeeping k-means keeps
//! - [`Catalog`]: every item, with the [`AttributeBounds`] used to normalize
//!   item distances
//! - [`RatingTable`]: every observed rating per item, and the rating ceiling

mod catalog;
mod item;
mod user;

pub use catalog::{AttributeBounds, Catalog, RatingTable};
pub use item::{CategorySet, Item, ItemId};
pub use user::{Ratings, User, UserId};
