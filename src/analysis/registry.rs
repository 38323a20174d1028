//! Name registry and co-occurrence matrix.
//!
//! The registry and the matrix always have the same size and grow
//! together through [`Tally::ensure_present`]. An index handed out for a
//! name stays valid for the rest of the run.

use std::collections::HashMap;

/// Ordered, deduplicated participant names in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl NameRegistry {
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Append a name that is not yet known and return its index.
    fn push(&mut self, name: &str) -> usize {
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }
}

/// Square matrix of counts stored row-major in a single buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMatrix {
    size: usize,
    cells: Vec<u64>,
}

impl CountMatrix {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.cells[row * self.size + col]
    }

    /// Add one zeroed row and column. Existing cells keep their values.
    fn grow(&mut self) {
        let old = self.size;
        let new = old + 1;
        let mut cells = vec![0; new * new];
        for row in 0..old {
            cells[row * new..row * new + old].copy_from_slice(&self.cells[row * old..(row + 1) * old]);
        }
        self.cells = cells;
        self.size = new;
    }

    /// Add `value` to both `[a][b]` and `[b][a]`. The diagonal is never written.
    fn add_symmetric(&mut self, a: usize, b: usize, value: u64) {
        if a == b {
            return;
        }
        self.cells[a * self.size + b] += value;
        self.cells[b * self.size + a] += value;
    }

    /// Matrix as nested rows.
    pub fn rows(&self) -> Vec<Vec<u64>> {
        if self.size == 0 {
            return Vec::new();
        }
        self.cells.chunks(self.size).map(<[u64]>::to_vec).collect()
    }
}

/// Accumulator holding the registry and matrix for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    registry: NameRegistry,
    matrix: CountMatrix,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `name`, registering it (and growing the matrix) if needed.
    pub fn ensure_present(&mut self, name: &str) -> usize {
        if let Some(idx) = self.registry.get(name) {
            return idx;
        }
        self.matrix.grow();
        self.registry.push(name)
    }

    /// Record `value` joint assignments between two registered indices.
    pub(crate) fn record(&mut self, a: usize, b: usize, value: u64) {
        self.matrix.add_symmetric(a, b, value);
    }

    /// Count for two names, or `None` if either is unknown.
    #[cfg(test)]
    pub fn count(&self, a: &str, b: &str) -> Option<u64> {
        let i = self.registry.get(a)?;
        let j = self.registry.get(b)?;
        Some(self.matrix.get(i, j))
    }

    pub fn names(&self) -> &[String] {
        self.registry.names()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn matrix(&self) -> &CountMatrix {
        &self.matrix
    }

    pub fn rows(&self) -> Vec<Vec<u64>> {
        self.matrix.rows()
    }
}
