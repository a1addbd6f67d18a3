use crate::model::Ratings;

/// Euclidean distance between a user's ratings and a centroid's ratings over
/// the items both contain.
///
/// Returns `None` ("undefined") when they share no items.
pub fn euclidean(user: &Ratings, centroid: &Ratings) -> Option<f64> {
    let mut sum = 0.0;
    let mut shared = 0usize;
    for (item, r) in user {
        if let Some(c) = centroid.get(item) {
            let d = r - c;
            sum += d * d;
            shared += 1;
        }
    }
    (shared > 0).then(|| sum.sqrt())
}

/// Number of items rated in both maps.
pub fn shared_items(user: &Ratings, centroid: &Ratings) -> usize {
    user.keys().filter(|item| centroid.contains_key(*item)).count()
}
