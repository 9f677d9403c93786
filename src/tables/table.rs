use super::Record;
use std::collections::BTreeMap;

/// An immutable snapshot of a table, sorted by record key with at most one row per key.
#[derive(Debug, Clone)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R: Record> Table<R> {
    /// Builds a table from rows in arrival order; the last row seen for a key wins.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = R>) -> Self {
        let mut by_key = BTreeMap::new();
        for row in rows {
            let _ = by_key.insert(row.key(), row);
        }

        Self {
            rows: by_key.into_values().collect(),
        }
    }

    /// Consumes the snapshot and returns one with `batch` merged in, batch rows replacing stored rows with the same key.
    #[must_use]
    pub fn merge(self, batch: impl IntoIterator<Item = R>) -> Self {
        Self::from_rows(self.rows.into_iter().chain(batch))
    }

    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row with the greatest key.
    #[must_use]
    pub fn last(&self) -> Option<&R> {
        self.rows.last()
    }

    /// Index of the row with the given key.
    #[must_use]
    pub fn position(&self, key: &R::Key) -> Option<usize> {
        self.rows.binary_search_by(|row| row.key().cmp(key)).ok()
    }

    #[must_use]
    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.position(key).map(|index| &self.rows[index])
    }
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}
