//! Helpers for merging traversal results.
//!
//! Recursion depth equals directory depth, so results only ever nest one
//! level per directory and a plain concatenation is enough.

/// Concatenate per-branch result lists into one list, preserving order.
pub fn flatten<T>(nested: Vec<Vec<T>>) -> Vec<T> {
    let capacity = nested.iter().map(Vec::len).sum();
    let mut flat = Vec::with_capacity(capacity);
    for items in nested {
        flat.extend(items);
    }
    flat
}

/// Drop empty traversal results.
pub fn compact<T>(items: Vec<Option<T>>) -> Vec<T> {
    items.into_iter().flatten().collect()
}
