//! Set difference between before/after snapshots.

use std::collections::HashSet;
use std::hash::Hash;

/// Items gained and lost between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetChange<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> SetChange<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare two collections by identity key. Output keeps snapshot order.
pub fn diff_by<T, K, F>(before: &[T], after: &[T], key: F) -> SetChange<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let before_keys: HashSet<K> = before.iter().map(&key).collect();
    let after_keys: HashSet<K> = after.iter().map(&key).collect();

    let added = after
        .iter()
        .filter(|item| !before_keys.contains(&key(*item)))
        .cloned()
        .collect();
    let removed = before
        .iter()
        .filter(|item| !after_keys.contains(&key(*item)))
        .cloned()
        .collect();

    SetChange { added, removed }
}

/// Compare two collections of hashable values.
pub fn diff<T>(before: &[T], after: &[T]) -> SetChange<T>
where
    T: Clone + Eq + Hash,
{
    diff_by(before, after, |item| item.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_sides_reported() {
        let change = diff(&["A", "B"], &["B", "C"]);
        assert_eq!(change.added, vec!["C"]);
        assert_eq!(change.removed, vec!["A"]);
    }

    #[test]
    fn test_reordering_is_no_change() {
        let change = diff(&[1, 2, 3], &[3, 1, 2]);
        assert!(change.is_empty());
    }

    #[test]
    fn test_diff_by_key_ignores_other_fields() {
        let before = [(1, "old name")];
        let after = [(1, "new name"), (2, "fresh")];
        let change = diff_by(&before, &after, |(id, _)| *id);

        assert_eq!(change.added, vec![(2, "fresh")]);
        assert!(change.removed.is_empty());
    }
}
