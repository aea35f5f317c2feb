//! Packed storage for symmetric relations over dense indices.
//!
//! Only the lower triangle (diagonal included) is stored. The entry for the
//! unordered pair {a, b} lives at `i*(i+1)/2 + j` with `i = max(a, b)` and
//! `j = min(a, b)`. Appending an index appends one row, so addresses of
//! existing pairs never move when the matrix grows.

/// Canonical ordering for an unordered pair: larger index first.
#[inline]
pub fn canonical_pair(a: usize, b: usize) -> (usize, usize) {
    if a >= b { (a, b) } else { (b, a) }
}

#[inline]
fn address(i: usize, j: usize) -> usize { i * (i + 1) / 2 + j }

#[inline]
fn slots(n: usize) -> usize { n * (n + 1) / 2 }

#[derive(Clone, Debug)]
pub struct SymmetricMatrix<T> {
    data: Vec<T>,
    n: usize,
    fill: T,
}

impl<T: Copy> SymmetricMatrix<T> {
    pub fn new(fill: T) -> Self { Self { data: Vec::new(), n: 0, fill } }

    pub fn with_size(n: usize, fill: T) -> Self {
        Self { data: vec![fill; slots(n)], n, fill }
    }

    /// Number of indices covered.
    #[inline] pub fn size(&self) -> usize { self.n }

    /// Value for the pair, or the fill value when either index is out of range.
    #[inline]
    pub fn get(&self, a: usize, b: usize) -> T {
        let (i, j) = canonical_pair(a, b);
        if i >= self.n { return self.fill; }
        self.data[address(i, j)]
    }

    /// Stores a value, growing the matrix if an index is out of range.
    #[inline]
    pub fn set(&mut self, a: usize, b: usize, value: T) {
        let (i, j) = canonical_pair(a, b);
        if i >= self.n { self.resize(i + 1); }
        self.data[address(i, j)] = value;
    }

    /// Grows by appending rows of fill values, or truncates trailing rows.
    pub fn resize(&mut self, n: usize) {
        self.data.resize(slots(n), self.fill);
        self.n = n;
    }

    /// Appends one row and returns the new index.
    pub fn push_row(&mut self) -> usize {
        let idx = self.n;
        self.resize(idx + 1);
        idx
    }

    /// Drops row and column `k`; indices above `k` shift down by one and
    /// keep their values.
    pub fn remove_index(&mut self, k: usize) {
        if k >= self.n { return; }
        let mut w = 0;
        for i in 0..self.n {
            for j in 0..=i {
                if i == k || j == k { continue; }
                // w never overtakes the read address, so compaction is in place
                self.data[w] = self.data[address(i, j)];
                w += 1;
            }
        }
        self.n -= 1;
        self.data.truncate(w);
    }

    /// Resets every entry to the fill value without reallocating.
    pub fn clear(&mut self) {
        let fill = self.fill;
        for v in self.data.iter_mut() { *v = fill; }
    }

    /// Exchanges contents with another matrix in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Every stored entry as `(i, j, value)` with `i >= j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.n).flat_map(move |i| (0..=i).map(move |j| (i, j, self.data[address(i, j)])))
    }
}

impl<T: Copy + PartialEq> SymmetricMatrix<T> {
    /// Number of entries that differ from the fill value.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|v| **v != self.fill).count()
    }
}

impl<T: Copy + Default> Default for SymmetricMatrix<T> {
    fn default() -> Self { Self::new(T::default()) }
}
