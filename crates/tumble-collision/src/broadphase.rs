use tumble_core::BoxError;
use tumble_dynamics::Body;

/// Candidate body pairs, as dense indices with the lower index first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairBuffer { pairs: Vec<(usize, usize)> }

impl PairBuffer {
    pub fn new() -> Self { Self { pairs: Vec::new() } }

    #[inline]
    pub fn push(&mut self, a: usize, b: usize) {
        self.pairs.push(if a <= b { (a, b) } else { (b, a) });
    }

    #[inline] pub fn clear(&mut self) { self.pairs.clear(); }
    #[inline] pub fn len(&self) -> usize { self.pairs.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.pairs.is_empty() }
    #[inline] pub fn as_slice(&self) -> &[(usize, usize)] { &self.pairs }
    #[inline] pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ { self.pairs.iter().copied() }

    pub fn retain(&mut self, f: impl FnMut(&(usize, usize)) -> bool) { self.pairs.retain(f); }
    pub fn sort(&mut self) { self.pairs.sort_unstable(); }
}

/// Coarse pair finder consumed by the world step.
pub trait Broadphase: Send {
    /// Clears `out` and fills it with candidate pairs. Body AABBs are fresh
    /// when this is called.
    fn collision_pairs(&mut self, bodies: &[Body], out: &mut PairBuffer) -> Result<(), BoxError>;
}

/// Filter shared by every broadphase: collision groups must accept each other
/// and at least one body must be able to move.
#[inline]
pub fn needs_collision(a: &Body, b: &Body) -> bool {
    if a.collision_filter_group & b.collision_filter_mask == 0
        || b.collision_filter_group & a.collision_filter_mask == 0
    {
        return false;
    }
    let inert = |x: &Body| x.is_static() || x.is_sleeping();
    !(inert(a) && inert(b))
}

/// Tests every pair. Bounding spheres by default, AABBs on request.
#[derive(Clone, Debug, Default)]
pub struct NaiveBroadphase {
    pub use_aabbs: bool,
}

impl NaiveBroadphase {
    pub fn new() -> Self { Self::default() }

    #[inline]
    fn intersects(&self, a: &Body, b: &Body) -> bool {
        if self.use_aabbs {
            a.aabb.overlaps(&b.aabb)
        } else {
            let r = a.bounding_radius + b.bounding_radius;
            (b.position - a.position).length_squared() <= r * r
        }
    }
}

impl Broadphase for NaiveBroadphase {
    fn collision_pairs(&mut self, bodies: &[Body], out: &mut PairBuffer) -> Result<(), BoxError> {
        out.clear();
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let (a, b) = (&bodies[i], &bodies[j]);
                if !needs_collision(a, b) { continue; }
                if self.intersects(a, b) { out.push(i, j); }
            }
        }
        Ok(())
    }
}
