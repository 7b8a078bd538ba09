//! Merge runs of adjacent items that share a tag.

/// Merges every maximal run of adjacent items for which `same_run` holds
/// into one item produced by `combine`, compacting `items` in place.
///
/// `same_run` compares the current merged item with the next input item.
/// `combine` receives the merged item so far and the next one and must be
/// associative. Single forward pass, O(n) time, no extra allocation.
pub fn collapse_consecutive_by<T, S, C>(items: &mut Vec<T>, mut same_run: S, mut combine: C)
where
    S: FnMut(&T, &T) -> bool,
    C: FnMut(&T, &T) -> T,
{
    if items.len() < 2 {
        return;
    }

    let mut write = 0;
    for read in 1..items.len() {
        if same_run(&items[write], &items[read]) {
            let merged = combine(&items[write], &items[read]);
            items[write] = merged;
        } else {
            write += 1;
            items.swap(write, read);
        }
    }
    items.truncate(write + 1);
}

/// [`collapse_consecutive_by`] keyed on a projection of each item.
pub fn collapse_consecutive_by_key<T, K, F, C>(items: &mut Vec<T>, mut key: F, combine: C)
where
    K: PartialEq,
    F: FnMut(&T) -> K,
    C: FnMut(&T, &T) -> T,
{
    collapse_consecutive_by(items, |lhs, rhs| key(lhs) == key(rhs), combine);
}
