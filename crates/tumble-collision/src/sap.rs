use tumble_core::BoxError;
use tumble_dynamics::Body;

use crate::broadphase::{Broadphase, PairBuffer, needs_collision};

#[derive(Copy, Clone)]
struct Elem { min: f32, max: f32, idx: usize }

/// Sort-and-sweep along one axis with full AABB overlap confirmation.
/// NaN-safe and stable: bodies with non-finite bounds are skipped and ties
/// are broken by index.
#[derive(Debug)]
pub struct SapBroadphase {
    /// 0 = x, 1 = y, 2 = z.
    pub axis: usize,
    /// Re-pick the axis of largest center variance before each sweep.
    pub auto_detect_axis: bool,
    elems: Vec<Elem>,
    active: Vec<usize>,
}

impl core::fmt::Debug for Elem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}[{}, {}]", self.idx, self.min, self.max)
    }
}

impl SapBroadphase {
    pub fn new() -> Self { Self { axis: 0, auto_detect_axis: false, elems: Vec::new(), active: Vec::new() } }

    pub fn with_axis(mut self, axis: usize) -> Self { self.axis = axis.min(2); self }

    /// Axis along which body centers spread the most. Unbounded bodies are ignored.
    pub fn detect_axis(bodies: &[Body]) -> usize {
        let mut sum = [0.0f64; 3];
        let mut sum2 = [0.0f64; 3];
        let mut n = 0.0f64;
        for b in bodies {
            let c = b.aabb.center();
            if !c.is_finite() || b.bounding_radius >= f32::MAX { continue; }
            for k in 0..3 {
                let v = c[k] as f64;
                sum[k] += v;
                sum2[k] += v * v;
            }
            n += 1.0;
        }
        if n < 2.0 { return 0; }
        let var = |k: usize| sum2[k] / n - (sum[k] / n).powi(2);
        let (vx, vy, vz) = (var(0), var(1), var(2));
        if vx >= vy && vx >= vz { 0 } else if vy >= vz { 1 } else { 2 }
    }
}

impl Default for SapBroadphase {
    fn default() -> Self { Self::new() }
}

impl Broadphase for SapBroadphase {
    fn collision_pairs(&mut self, bodies: &[Body], out: &mut PairBuffer) -> Result<(), BoxError> {
        out.clear();
        if self.auto_detect_axis { self.axis = Self::detect_axis(bodies); }
        let axis = self.axis.min(2);

        self.elems.clear();
        for (i, b) in bodies.iter().enumerate() {
            let mut mn = b.aabb.min[axis];
            let mut mx = b.aabb.max[axis];
            if !mn.is_finite() || !mx.is_finite() { continue; }
            if mn > mx { core::mem::swap(&mut mn, &mut mx); }
            self.elems.push(Elem { min: mn, max: mx, idx: i });
        }
        self.elems.sort_by(|a, b| a.min.total_cmp(&b.min).then(a.idx.cmp(&b.idx)));

        self.active.clear();
        for e in self.elems.iter() {
            self.active.retain(|&j| bodies[j].aabb.max[axis] >= e.min);
            for &j in &self.active {
                let (a, b) = (&bodies[j], &bodies[e.idx]);
                if needs_collision(a, b) && a.aabb.overlaps(&b.aabb) { out.push(j, e.idx); }
            }
            self.active.push(e.idx);
        }
        out.sort();
        Ok(())
    }
}
