//! First-N / last-N sampling of sorted matches.

use taxi_query_analytics_models::SampleSize;
use taxi_query_collections::OrderedList;

/// Head and tail samples of a sorted sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window<T> {
    pub first: Vec<T>,
    pub last: Vec<T>,
}

/// Cuts `sorted` into its first and last `size` elements.
///
/// When the sequence holds at most `2 * size` elements, `first` is the
/// whole sequence and `last` is a copy of `first`. Otherwise the two
/// samples are disjoint.
#[must_use]
pub fn window<T: Clone>(sorted: &OrderedList<T>, size: SampleSize) -> Window<T> {
    let n = size.get();

    if sorted.size() <= size.both_ends() {
        let first = sorted.as_slice().to_vec();
        return Window {
            last: first.clone(),
            first,
        };
    }

    Window {
        first: sorted.head(n).to_vec(),
        last: sorted.tail(n).to_vec(),
    }
}
