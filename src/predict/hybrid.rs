use tracing::debug;

use super::Predictions;

/// Merge collaborative and content-based predictions.
///
/// The output targets `|content|` items. Items both predictors proposed come
/// first, scored as the mean of the two predictions. The remaining slots are
/// filled from the two leftover lists in ranked order, always taking the
/// stronger head; on equal scores the collaborative head goes first. Once one
/// list runs out the other keeps filling.
pub fn merge(collaborative: &Predictions, content: &Predictions) -> Predictions {
    let k = content.len();
    let mut merged = Predictions::new();

    for (item, score) in content.iter() {
        if let Some(other) = collaborative.get(item.as_str()) {
            merged.insert(item, (score + other) / 2.0);
        }
    }
    let shared = merged.len();

    let only_collaborative: Vec<_> = collaborative
        .ranked()
        .into_iter()
        .filter(|(item, _)| !merged.contains(item.as_str()))
        .collect();
    let only_content: Vec<_> = content
        .ranked()
        .into_iter()
        .filter(|(item, _)| !merged.contains(item.as_str()))
        .collect();

    let mut left = only_collaborative.into_iter().peekable();
    let mut right = only_content.into_iter().peekable();
    while merged.len() < k {
        let take_left = match (left.peek(), right.peek()) {
            (Some((_, a)), Some((_, b))) => a >= b,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        if let Some((item, score)) = next {
            merged.insert(item, score);
        }
    }

    debug!(target_size = k, shared, merged = merged.len(), "hybrid merge");
    merged
}
