use tumble_core::SymmetricMatrix;

/// Which body pairs touched this step and the previous one.
///
/// Comparing the two buffers tells a new contact (rising edge) apart from a
/// sustained one, so collide events fire once per contiguous span of contact.
#[derive(Clone, Debug)]
pub struct CollisionMatrix {
    current: SymmetricMatrix<bool>,
    previous: SymmetricMatrix<bool>,
}

impl CollisionMatrix {
    pub fn new() -> Self {
        Self { current: SymmetricMatrix::new(false), previous: SymmetricMatrix::new(false) }
    }

    /// Current becomes previous; the new current starts empty. No allocation.
    pub fn tick(&mut self) {
        self.current.swap(&mut self.previous);
        self.current.clear();
    }

    #[inline] pub fn set(&mut self, a: usize, b: usize, touching: bool) { self.current.set(a, b, touching); }
    #[inline] pub fn get(&self, a: usize, b: usize) -> bool { self.current.get(a, b) }
    #[inline] pub fn get_previous(&self, a: usize, b: usize) -> bool { self.previous.get(a, b) }

    #[inline]
    pub fn is_rising_edge(&self, a: usize, b: usize) -> bool {
        self.get(a, b) && !self.get_previous(a, b)
    }

    /// Pairs that touched last step but not this one, as `(i, j)` with `i >= j`.
    pub fn falling_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.previous.iter().filter(move |&(i, j, was)| was && !self.current.get(i, j)).map(|(i, j, _)| (i, j))
    }

    /// Keeps both buffers sized to the body count.
    pub fn resize(&mut self, n: usize) {
        self.current.resize(n);
        self.previous.resize(n);
    }

    /// Drops a body's row and column; higher indices shift down with their state.
    pub fn remove_index(&mut self, k: usize) {
        self.current.remove_index(k);
        self.previous.remove_index(k);
    }

    #[inline] pub fn size(&self) -> usize { self.current.size() }
    pub fn touching_count(&self) -> usize { self.current.count_set() }
}

impl Default for CollisionMatrix {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_moves_current_to_previous() {
        let mut m = CollisionMatrix::new();
        m.resize(3);
        m.set(0, 2, true);
        assert!(m.is_rising_edge(2, 0));
        m.tick();
        assert!(m.get_previous(0, 2));
        assert!(!m.get(0, 2));
        assert_eq!(m.touching_count(), 0);
        m.set(2, 0, true);
        assert!(!m.is_rising_edge(0, 2));
    }

    #[test]
    fn falling_edge_after_separation() {
        let mut m = CollisionMatrix::new();
        m.resize(2);
        m.set(0, 1, true);
        m.tick();
        assert_eq!(m.falling_edges().collect::<Vec<_>>(), vec![(1, 0)]);
        m.set(0, 1, true);
        assert_eq!(m.falling_edges().count(), 0);
    }

    #[test]
    fn removal_keeps_other_pairs() {
        let mut m = CollisionMatrix::new();
        m.resize(3);
        m.set(0, 2, true);
        m.tick();
        m.set(0, 2, true);
        m.remove_index(1);
        assert_eq!(m.size(), 2);
        assert!(m.get(0, 1));
        assert!(m.get_previous(0, 1));
    }
}
