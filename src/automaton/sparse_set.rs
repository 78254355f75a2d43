//! Sparse set of NFA state indices with O(1) clear.
//!
//! Based on: https://research.swtch.com/sparse
//!
//! A query clears its active-state sets once per pattern byte and once per
//! chunk, so clearing must not touch memory. Membership is checked by
//! cross-referencing the dense and sparse arrays, which means neither array
//! needs initialising beyond its allocation.

/// A set of indices below a known capacity, iterated in insertion order.
#[derive(Clone, Debug, Default)]
pub struct SparseSet {
    len: usize,
    /// Members in insertion order; only `dense[..len]` is meaningful.
    dense: Vec<u32>,
    /// `sparse[id]` is the position of `id` in `dense` when `id` is a member.
    sparse: Vec<u32>,
}

impl SparseSet {
    pub fn new(capacity: usize) -> Self {
        SparseSet {
            len: 0,
            dense: vec![0; capacity],
            sparse: vec![0; capacity],
        }
    }

    /// Grow to at least `capacity`, clearing the set. Never shrinks.
    #[inline]
    pub fn ensure_capacity(&mut self, capacity: usize) {
        self.clear();
        if self.dense.len() < capacity {
            self.dense.resize(capacity, 0);
            self.sparse.resize(capacity, 0);
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `id`, returning true if it was not already present.
    ///
    /// Panics if `id >= capacity`.
    #[inline]
    pub fn insert(&mut self, id: u32) -> bool {
        if self.contains(id) {
            return false;
        }
        self.dense[self.len] = id;
        self.sparse[id as usize] = self.len as u32;
        self.len += 1;
        true
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        let pos = self.sparse[id as usize] as usize;
        pos < self.len && self.dense[pos] == id
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.dense[..self.len].iter().copied()
    }

    /// Bytes held by the two backing arrays.
    pub fn memory_usage(&self) -> usize {
        (self.dense.capacity() + self.sparse.capacity()) * std::mem::size_of::<u32>()
    }
}
