use tumble_core::types::{Mat3, Vec3};
use tumble_core::{Quat, Scalar};
use crate::aabb::{Aabb, UNBOUNDED};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { r: f32 },
    Box { hx: f32, hy: f32, hz: f32 },
    Capsule { r: f32, hh: f32 }, // half-height along local Y
    /// Infinite plane through the local origin with its normal along local +Y.
    Plane,
}

impl Shape {
    #[inline] pub fn half_extents(hx: f32, hy: f32, hz: f32) -> Shape { Shape::Box { hx, hy, hz } }

    /// World-space bounds for the shape placed at `pos` with orientation `rot`.
    pub fn aabb(&self, pos: Vec3, rot: Quat) -> Aabb {
        match *self {
            Shape::Sphere { r } => Aabb::from_center_half_extents(pos, Vec3::splat(r)),
            Shape::Box { hx, hy, hz } => {
                let he = Vec3::new(hx, hy, hz);
                let m = Mat3::from_quat(rot);
                let abs = Mat3::from_cols(m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs());
                Aabb::from_center_half_extents(pos, abs * he)
            }
            Shape::Capsule { r, hh } => {
                let axis_world = rot * glam::Vec3::Y * hh.abs();
                let he = Vec3::from(axis_world).abs() + Vec3::splat(r);
                Aabb::from_center_half_extents(pos, he)
            }
            Shape::Plane => {
                // axis-aligned planes are bounded on their back side
                let n = Vec3::from(rot * glam::Vec3::Y);
                let mut bb = Aabb::EVERYTHING;
                if n.x == 1.0 { bb.max.x = pos.x } else if n.x == -1.0 { bb.min.x = pos.x }
                if n.y == 1.0 { bb.max.y = pos.y } else if n.y == -1.0 { bb.min.y = pos.y }
                if n.z == 1.0 { bb.max.z = pos.z } else if n.z == -1.0 { bb.min.z = pos.z }
                bb
            }
        }
    }

    /// Radius of a sphere around the local origin enclosing the shape.
    pub fn bounding_radius(&self) -> Scalar {
        match *self {
            Shape::Sphere { r } => r,
            Shape::Box { hx, hy, hz } => Vec3::new(hx, hy, hz).length(),
            Shape::Capsule { r, hh } => r + hh.abs(),
            Shape::Plane => UNBOUNDED,
        }
    }

    pub fn volume(&self) -> Scalar {
        use core::f32::consts::PI;
        match *self {
            Shape::Sphere { r } => (4.0 / 3.0) * PI * r * r * r,
            Shape::Box { hx, hy, hz } => 8.0 * hx * hy * hz,
            Shape::Capsule { r, hh } => PI * r * r * (2.0 * hh) + (4.0 / 3.0) * PI * r * r * r,
            Shape::Plane => UNBOUNDED,
        }
    }

    /// Diagonal of the local inertia tensor for a solid shape of the given mass.
    pub fn local_inertia(&self, mass: Scalar) -> Vec3 {
        match *self {
            Shape::Sphere { r } => Vec3::splat(0.4 * mass * r * r),
            Shape::Box { hx, hy, hz } => {
                let (x2, y2, z2) = (4.0 * hx * hx, 4.0 * hy * hy, 4.0 * hz * hz);
                Vec3::new(
                    (1.0 / 12.0) * mass * (y2 + z2),
                    (1.0 / 12.0) * mass * (x2 + z2),
                    (1.0 / 12.0) * mass * (x2 + y2),
                )
            }
            Shape::Capsule { r, hh } => {
                let h = 2.0 * hh;
                let ix = 0.25 * mass * r * r + (1.0 / 12.0) * mass * h * h;
                let iy = 0.5 * mass * r * r;
                Vec3::new(ix, iy, ix)
            }
            Shape::Plane => Vec3::ZERO,
        }
    }
}
