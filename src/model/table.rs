use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A row type stored in a [`Table`], identified by its key.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    type Key: Copy + Eq + Hash + Debug + Send + Sync;

    fn key(&self) -> Self::Key;
}

/// An insertion-ordered collection with at most one row per key.
///
/// Saving a row whose key is already present replaces the old row in place,
/// so keys never appear twice.
#[derive(Debug, Clone)]
pub struct Table<T: Record> {
    rows: Vec<T>,
    positions: HashMap<T::Key, usize>,
}

impl<T: Record> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = T::Key> + '_ {
        self.rows.iter().map(Record::key)
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.positions.get(key).map(|&pos| &self.rows[pos])
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.positions.contains_key(key)
    }

    /// Insert `row`, replacing and returning any row with the same key.
    pub fn upsert(&mut self, row: T) -> Option<T> {
        let key = row.key();
        match self.positions.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.rows[pos], row)),
            None => {
                self.positions.insert(key, self.rows.len());
                self.rows.push(row);
                None
            }
        }
    }

    /// Remove and return the row with the given key, if any.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let pos = self.positions.remove(key)?;
        let row = self.rows.remove(pos);
        // Everything after the removed row shifts down by one.
        for later in &self.rows[pos..] {
            if let Some(p) = self.positions.get_mut(&later.key()) {
                *p -= 1;
            }
        }
        Some(row)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.positions.clear();
    }

    /// Mutable access to every row. Callers must not change row keys.
    pub(crate) fn values_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.rows.iter_mut()
    }

    /// Mutable access to one row. Callers must not change its key.
    pub(crate) fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        let pos = *self.positions.get(key)?;
        Some(&mut self.rows[pos])
    }
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> FromIterator<T> for Table<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<T: Record> Extend<T> for Table<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for row in iter {
            self.upsert(row);
        }
    }
}

impl<'a, T: Record> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
