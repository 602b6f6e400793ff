// ── Ordered, duplicate-free result collection ──

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// A record with a natural identity inside its result set.
pub trait Keyed {
    type Key: Ord + Clone + fmt::Debug;

    fn key(&self) -> Self::Key;
}

/// Result set kept sorted ascending by key, one record per key.
///
/// Backed by a sorted `Vec` so render code can borrow the whole set as a
/// slice. Streaming updates go through [`upsert`](Self::upsert), fresh
/// listings through [`replace_all`](Self::replace_all).
#[derive(Clone)]
pub struct KeyedSet<T: Keyed> {
    items: Vec<T>,
}

impl<T: Keyed> Default for KeyedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed + fmt::Debug> fmt::Debug for KeyedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<T: Keyed + PartialEq> PartialEq for KeyedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Keyed> KeyedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &T::Key) -> Result<usize, usize> {
        self.items.binary_search_by(|probe| probe.key().cmp(key))
    }

    /// Insert or replace in place. Returns `true` if the key was new.
    pub fn upsert(&mut self, item: T) -> bool {
        match self.position(&item.key()) {
            Ok(idx) => {
                self.items[idx] = item;
                false
            }
            Err(idx) => {
                self.items.insert(idx, item);
                true
            }
        }
    }

    /// Replace the whole set. Later duplicates win over earlier ones.
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = T>) {
        let mut items: Vec<T> = items.into_iter().collect();
        // Stable sort keeps arrival order among equal keys; keep the last.
        items.sort_by(|a, b| a.key().cmp(&b.key()));
        let mut deduped: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            match deduped.last_mut() {
                Some(last) if last.key().cmp(&item.key()) == Ordering::Equal => *last = item,
                _ => deduped.push(item),
            }
        }
        self.items = deduped;
    }

    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        self.position(key).ok().map(|idx| self.items.remove(idx))
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.position(key).ok().map(|idx| &self.items[idx])
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.position(key).is_ok()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.clone()
    }

    pub fn keys(&self) -> Vec<T::Key> {
        self.items.iter().map(Keyed::key).collect()
    }

    /// Mutate every record in place. Keys must not change.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for item in &mut self.items {
            f(item);
        }
        debug_assert!(
            self.items.windows(2).all(|w| w[0].key() < w[1].key()),
            "for_each_mut changed a key"
        );
    }
}

impl<'a, T: Keyed> IntoIterator for &'a KeyedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Keyed> FromIterator<T> for KeyedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.replace_all(iter);
        set
    }
}

impl<T: Keyed + Serialize> Serialize for KeyedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u16,
        label: &'static str,
    }

    impl Keyed for Row {
        type Key = u16;

        fn key(&self) -> u16 {
            self.id
        }
    }

    fn row(id: u16, label: &'static str) -> Row {
        Row { id, label }
    }

    #[test]
    fn upsert_keeps_one_row_per_key_sorted() {
        let mut set = KeyedSet::new();
        for (id, label) in [(443, "a"), (22, "b"), (80, "c"), (22, "d"), (443, "e")] {
            set.upsert(row(id, label));
        }

        assert_eq!(set.keys(), vec![22, 80, 443]);
        assert_eq!(set.get(&22).map(|r| r.label), Some("d"));
        assert_eq!(set.get(&443).map(|r| r.label), Some("e"));
    }

    #[test]
    fn upsert_reports_new_keys() {
        let mut set = KeyedSet::new();
        assert!(set.upsert(row(1, "x")));
        assert!(!set.upsert(row(1, "y")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn replace_all_discards_previous_and_collapses_duplicates() {
        let mut set: KeyedSet<Row> = [row(1, "old"), row(2, "old")].into_iter().collect();
        set.replace_all([row(9, "a"), row(3, "b"), row(9, "c")]);

        assert_eq!(set.keys(), vec![3, 9]);
        assert_eq!(set.get(&9).map(|r| r.label), Some("c"));
        assert!(!set.contains_key(&1));
    }

    #[test]
    fn remove_and_clear() {
        let mut set: KeyedSet<Row> = [row(1, "a"), row(2, "b")].into_iter().collect();
        assert_eq!(set.remove(&1).map(|r| r.label), Some("a"));
        assert_eq!(set.remove(&1), None);
        set.clear();
        assert!(set.is_empty());
    }
}
