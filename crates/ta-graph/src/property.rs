//! Dense per-edge property map.
//!
//! Lookups never create entries: a missing key is reported as `None`, or the
//! caller supplies the value to use in its place.

use ta_core::EdgeId;

/// Map from `EdgeId` to `T`, stored as a `Vec` indexed by edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMap<T> {
    values: Vec<Option<T>>,
    len:    usize,
}

impl<T> EdgeMap<T> {
    pub fn new() -> Self {
        Self { values: Vec::new(), len: 0 }
    }

    /// Pre-size for a graph whose edge arena has `edge_bound` slots.
    pub fn with_capacity(edge_bound: usize) -> Self {
        let mut values = Vec::with_capacity(edge_bound);
        values.resize_with(edge_bound, || None);
        Self { values, len: 0 }
    }

    pub fn get(&self, edge: EdgeId) -> Option<&T> {
        self.values.get(edge.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, edge: EdgeId) -> Option<&mut T> {
        self.values.get_mut(edge.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, edge: EdgeId) -> bool {
        self.get(edge).is_some()
    }

    /// Insert `value`, returning the previous one.
    pub fn insert(&mut self, edge: EdgeId, value: T) -> Option<T> {
        let i = edge.index();
        if i >= self.values.len() {
            self.values.resize_with(i + 1, || None);
        }
        let old = self.values[i].replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    pub fn remove(&mut self, edge: EdgeId) -> Option<T> {
        let old = self.values.get_mut(edge.index()).and_then(Option::take);
        if old.is_some() {
            self.len -= 1;
        }
        old
    }

    /// Mutable access to the entry for `edge`, inserting `default` first if
    /// it is missing.
    pub fn get_or_insert(&mut self, edge: EdgeId, default: T) -> &mut T {
        if !self.contains(edge) {
            self.insert(edge, default);
        }
        let i = edge.index();
        match self.values[i].as_mut() {
            Some(v) => v,
            None => unreachable!("entry {i} was just inserted"),
        }
    }

    /// `(edge, value)` pairs in ascending edge order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (EdgeId(i as u32), v)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.len = 0;
    }
}

impl<T: Clone> EdgeMap<T> {
    /// The stored value, or `default` when `edge` has no entry.
    pub fn get_or(&self, edge: EdgeId, default: T) -> T {
        self.get(edge).cloned().unwrap_or(default)
    }
}

impl<T> Default for EdgeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(EdgeId, T)> for EdgeMap<T> {
    fn from_iter<I: IntoIterator<Item = (EdgeId, T)>>(iter: I) -> Self {
        let mut map = EdgeMap::new();
        for (edge, value) in iter {
            map.insert(edge, value);
        }
        map
    }
}
