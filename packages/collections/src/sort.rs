//! Stable top-down merge sort.
//!
//! The ordering is given as a predicate `precedes(a, b)` that returns `true`
//! when `a` must come before `b`. The predicate is expected to be strict:
//! for two elements it considers equal it returns `false` in both
//! directions, and those elements keep their input order.

/// Sorts `items` in place with a stable merge sort.
///
/// Runs in `O(n log n)` comparisons and uses one scratch buffer of at most
/// `n` elements.
pub fn merge_sort<T, F>(items: &mut [T], precedes: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    if items.len() < 2 {
        return;
    }

    let mut scratch = Vec::with_capacity(items.len());
    sort_range(items, &mut scratch, precedes);
}

fn sort_range<T, F>(items: &mut [T], scratch: &mut Vec<T>, precedes: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let len = items.len();
    if len < 2 {
        return;
    }

    let mid = len / 2;
    sort_range(&mut items[..mid], scratch, precedes);
    sort_range(&mut items[mid..], scratch, precedes);

    // Already ordered across the split.
    if !precedes(&items[mid], &items[mid - 1]) {
        return;
    }

    merge(items, mid, scratch, precedes);
}

fn merge<T, F>(items: &mut [T], mid: usize, scratch: &mut Vec<T>, precedes: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    scratch.clear();

    let (left, right) = items.split_at(mid);
    let mut i = 0;
    let mut j = 0;

    while i < left.len() && j < right.len() {
        // Take from the right run only when it strictly precedes the left
        // one, so equal elements keep their relative order.
        if precedes(&right[j], &left[i]) {
            scratch.push(right[j].clone());
            j += 1;
        } else {
            scratch.push(left[i].clone());
            i += 1;
        }
    }

    scratch.extend_from_slice(&left[i..]);
    scratch.extend_from_slice(&right[j..]);

    items.clone_from_slice(&scratch[..]);
}
