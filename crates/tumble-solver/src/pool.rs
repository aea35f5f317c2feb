/// Free list of equation records reused across steps.
///
/// `recycle` moves every live record back into the pool without freeing the
/// caller's buffer; `acquire` hands them out again before constructing new
/// ones. `fresh_count` reports how many records were ever constructed.
#[derive(Debug)]
pub struct EquationPool<T> {
    free: Vec<T>,
    fresh: usize,
}

impl<T: Default> EquationPool<T> {
    pub fn new() -> Self { Self { free: Vec::new(), fresh: 0 } }

    pub fn acquire(&mut self) -> T {
        match self.free.pop() {
            Some(eq) => eq,
            None => {
                self.fresh += 1;
                T::default()
            }
        }
    }

    #[inline] pub fn release(&mut self, eq: T) { self.free.push(eq); }

    /// Drains `live` into the pool; `live` keeps its capacity.
    pub fn recycle(&mut self, live: &mut Vec<T>) { self.free.append(live); }

    #[inline] pub fn available(&self) -> usize { self.free.len() }
    #[inline] pub fn fresh_count(&self) -> usize { self.fresh }
}

impl<T: Default> Default for EquationPool<T> {
    fn default() -> Self { Self::new() }
}
