use tumble_core::types::Vec3;

/// Half-extent used for unbounded shapes; kept finite so sweep arithmetic never sees inf/NaN.
pub const UNBOUNDED: f32 = f32::MAX;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb { pub min: Vec3, pub max: Vec3 }

impl Aabb {
    pub const EVERYTHING: Aabb = Aabb {
        min: Vec3::new(-UNBOUNDED, -UNBOUNDED, -UNBOUNDED),
        max: Vec3::new(UNBOUNDED, UNBOUNDED, UNBOUNDED),
    };

    #[inline] pub fn new(min: Vec3, max: Vec3) -> Self { Self { min, max } }
    #[inline] pub fn from_center_half_extents(c: Vec3, he: Vec3) -> Self {
        Self { min: c - he, max: c + he }
    }
    #[inline] pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x || self.min.x > other.max.x ||
            self.max.y < other.min.y || self.min.y > other.max.y ||
            self.max.z < other.min.z || self.min.z > other.max.z)
    }
    #[inline] pub fn expand_by(&mut self, r: f32) {
        let e = Vec3::splat(r);
        self.min -= e; self.max += e;
    }
    #[inline] pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }
    #[inline] pub fn center(&self) -> Vec3 { (self.min + self.max) * 0.5 }
}
