use tumble_core::{BoxError, Quat, Scalar, Vec3};
use tumble_dynamics::Body;
use tumble_geom::Shape;
use tumble_solver::{ContactEquation, EquationPool};

use crate::broadphase::PairBuffer;

/// Pair of surface points in world frame. `normal` points from A to B, and
/// the points are each shape's deepest point into the other, so
/// `(on_b - on_a) · normal` is negative while penetrating.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactPoint {
    pub on_a: Vec3,
    pub on_b: Vec3,
    pub normal: Vec3,
}

impl ContactPoint {
    #[inline]
    fn flipped(self) -> Self { Self { on_a: self.on_b, on_b: self.on_a, normal: -self.normal } }

    #[inline] pub fn depth(&self) -> Scalar { (self.on_a - self.on_b).dot(self.normal) }
}

/// Precise contact stage consumed by the world step.
pub trait ContactGenerator: Send {
    /// Appends one contact per touching point of every pair to `out`. Every
    /// record must come from `pool`; the caller owns and recycles them.
    fn get_contacts(
        &mut self,
        pairs: &PairBuffer,
        bodies: &[Body],
        pool: &mut EquationPool<ContactEquation>,
        out: &mut Vec<ContactEquation>,
    ) -> Result<(), BoxError>;
}

/// Contact generation for spheres, boxes, capsules and planes.
///
/// Box-box uses the world AABBs of the two boxes, which is exact only for
/// axis-aligned boxes.
#[derive(Debug, Default)]
pub struct Narrowphase {
    points: Vec<ContactPoint>,
}

impl Narrowphase {
    pub fn new() -> Self { Self::default() }

    /// Contact points between two placed shapes, appended to `out`.
    pub fn collide_shapes(a: &Shape, pa: Vec3, qa: Quat, b: &Shape, pb: Vec3, qb: Quat, out: &mut Vec<ContactPoint>) {
        use Shape::*;
        let start = out.len();
        match (*a, *b) {
            (Sphere { r: ra }, Sphere { r: rb }) => sphere_sphere(pa, ra, pb, rb, out),
            (Plane, Sphere { r }) => plane_sphere(pa, qa, pb, r, out),
            (Plane, Box { hx, hy, hz }) => plane_box(pa, qa, pb, qb, Vec3::new(hx, hy, hz), out),
            (Plane, Capsule { r, hh }) => plane_capsule(pa, qa, pb, qb, r, hh, out),
            (Box { hx, hy, hz }, Sphere { r }) => box_sphere(pa, qa, Vec3::new(hx, hy, hz), pb, r, out),
            (Box { hx, hy, hz }, Capsule { r, hh }) => box_capsule(pa, qa, Vec3::new(hx, hy, hz), pb, qb, r, hh, out),
            (Box { .. }, Box { .. }) => box_box(a, pa, qa, b, pb, qb, out),
            (Capsule { r, hh }, Sphere { r: rs }) => capsule_sphere(pa, qa, r, hh, pb, rs, out),
            (Capsule { r: r1, hh: h1 }, Capsule { r: r2, hh: h2 }) => capsule_capsule(pa, qa, r1, h1, pb, qb, r2, h2, out),
            (Plane, Plane) => {}
            // remaining combinations are the mirror of one above
            _ => {
                Self::collide_shapes(b, pb, qb, a, pa, qa, out);
                for p in &mut out[start..] { *p = p.flipped(); }
            }
        }
    }
}

impl ContactGenerator for Narrowphase {
    fn get_contacts(
        &mut self,
        pairs: &PairBuffer,
        bodies: &[Body],
        pool: &mut EquationPool<ContactEquation>,
        out: &mut Vec<ContactEquation>,
    ) -> Result<(), BoxError> {
        for (i, j) in pairs.iter() {
            let (bi, bj) = match (bodies.get(i), bodies.get(j)) {
                (Some(bi), Some(bj)) => (bi, bj),
                _ => return Err(format!("pair ({i}, {j}) out of range for {} bodies", bodies.len()).into()),
            };
            for sa in &bi.shapes {
                let (pa, qa) = (sa.world_position(bi.position, bi.quaternion), sa.world_orientation(bi.quaternion));
                for sb in &bj.shapes {
                    let (pb, qb) = (sb.world_position(bj.position, bj.quaternion), sb.world_orientation(bj.quaternion));
                    self.points.clear();
                    Self::collide_shapes(&sa.shape, pa, qa, &sb.shape, pb, qb, &mut self.points);
                    for p in &self.points {
                        let mut c = pool.acquire();
                        c.body_a = i;
                        c.body_b = j;
                        c.ri = p.on_a - bi.position;
                        c.rj = p.on_b - bj.position;
                        c.normal = p.normal;
                        c.enabled = true;
                        out.push(c);
                    }
                }
            }
        }
        Ok(())
    }
}

/* ---------- shape pairs ---------- */
fn sphere_sphere(ca: Vec3, ra: Scalar, cb: Vec3, rb: Scalar, out: &mut Vec<ContactPoint>) {
    let d = cb - ca;
    let dist2 = d.length_squared();
    let rsum = ra + rb;
    if dist2 >= rsum * rsum { return; }
    let dist = dist2.sqrt();
    let n = if dist > 1.0e-6 { d / dist } else { Vec3::X };
    out.push(ContactPoint { on_a: ca + n * ra, on_b: cb - n * rb, normal: n });
}

fn plane_sphere(pp: Vec3, qp: Quat, c: Vec3, r: Scalar, out: &mut Vec<ContactPoint>) {
    let n = qp * Vec3::Y;
    let d = (c - pp).dot(n);
    if d >= r { return; }
    out.push(ContactPoint { on_a: c - n * d, on_b: c - n * r, normal: n });
}

fn plane_box(pp: Vec3, qp: Quat, pb: Vec3, qb: Quat, he: Vec3, out: &mut Vec<ContactPoint>) {
    let n = qp * Vec3::Y;
    for k in 0..8 {
        let s = Vec3::new(
            if k & 1 == 0 { -1.0 } else { 1.0 },
            if k & 2 == 0 { -1.0 } else { 1.0 },
            if k & 4 == 0 { -1.0 } else { 1.0 },
        );
        let corner = pb + qb * (he * s);
        let d = (corner - pp).dot(n);
        if d < 0.0 {
            out.push(ContactPoint { on_a: corner - n * d, on_b: corner, normal: n });
        }
    }
}

fn plane_capsule(pp: Vec3, qp: Quat, pc: Vec3, qc: Quat, r: Scalar, hh: Scalar, out: &mut Vec<ContactPoint>) {
    let axis = qc * Vec3::Y * hh;
    plane_sphere(pp, qp, pc + axis, r, out);
    plane_sphere(pp, qp, pc - axis, r, out);
}

/// Sphere against a box centered at the origin with half extents `he`.
/// Returns the box surface point and the outward normal towards the sphere,
/// or `None` when they are apart.
fn box_sphere_local(he: Vec3, c: Vec3, r: Scalar) -> Option<(Vec3, Vec3)> {
    let q = clamp_vec3(c, -he, he);
    let diff = c - q;
    let d2 = diff.length_squared();
    if d2 > 1.0e-12 {
        if d2 >= r * r { return None; }
        return Some((q, diff / d2.sqrt()));
    }
    // center inside: push out through the nearest face
    let gap = he - c.abs();
    let axis = if gap.x <= gap.y && gap.x <= gap.z { 0 } else if gap.y <= gap.z { 1 } else { 2 };
    let sign = if c[axis] >= 0.0 { 1.0 } else { -1.0 };
    let mut n = Vec3::ZERO;
    n[axis] = sign;
    let mut on_box = c;
    on_box[axis] = sign * he[axis];
    Some((on_box, n))
}

fn box_sphere(pb: Vec3, qb: Quat, he: Vec3, c: Vec3, r: Scalar, out: &mut Vec<ContactPoint>) {
    let local = qb.inverse() * (c - pb);
    if let Some((on_box, n)) = box_sphere_local(he, local, r) {
        let n = qb * n;
        out.push(ContactPoint { on_a: pb + qb * on_box, on_b: c - n * r, normal: n });
    }
}

#[allow(clippy::too_many_arguments)]
fn box_capsule(pb: Vec3, qb: Quat, he: Vec3, pc: Vec3, qc: Quat, r: Scalar, hh: Scalar, out: &mut Vec<ContactPoint>) {
    let inv = qb.inverse();
    let axis = qc * Vec3::Y * hh;
    let la = inv * (pc + axis - pb);
    let lb = inv * (pc - axis - pb);
    let (p_seg, _) = closest_points_segment_aabb(la, lb, -he, he);
    if let Some((on_box, n)) = box_sphere_local(he, p_seg, r) {
        let n = qb * n;
        let center = pb + qb * p_seg;
        out.push(ContactPoint { on_a: pb + qb * on_box, on_b: center - n * r, normal: n });
    }
}

fn box_box(a: &Shape, pa: Vec3, qa: Quat, b: &Shape, pb: Vec3, qb: Quat, out: &mut Vec<ContactPoint>) {
    let aa = a.aabb(pa, qa);
    let bb = b.aabb(pb, qb);
    if !aa.overlaps(&bb) { return; }
    let (ca, cb) = (aa.center(), bb.center());
    let px = (aa.max.x - bb.min.x).min(bb.max.x - aa.min.x);
    let py = (aa.max.y - bb.min.y).min(bb.max.y - aa.min.y);
    let pz = (aa.max.z - bb.min.z).min(bb.max.z - aa.min.z);
    let (normal, depth) = if px <= py && px <= pz {
        let dir = if cb.x > ca.x { 1.0 } else { -1.0 }; (Vec3::new(dir, 0.0, 0.0), px)
    } else if py <= pz {
        let dir = if cb.y > ca.y { 1.0 } else { -1.0 }; (Vec3::new(0.0, dir, 0.0), py)
    } else {
        let dir = if cb.z > ca.z { 1.0 } else { -1.0 }; (Vec3::new(0.0, 0.0, dir), pz)
    };
    if depth <= 0.0 { return; }
    let mid = (aa.min.max(bb.min) + aa.max.min(bb.max)) * 0.5;
    out.push(ContactPoint { on_a: mid + normal * (0.5 * depth), on_b: mid - normal * (0.5 * depth), normal });
}

fn capsule_sphere(pc: Vec3, qc: Quat, r: Scalar, hh: Scalar, c: Vec3, rs: Scalar, out: &mut Vec<ContactPoint>) {
    let axis = qc * Vec3::Y * hh;
    let (q, _) = closest_point_on_segment(pc + axis, pc - axis, c);
    sphere_sphere(q, r, c, rs, out);
}

#[allow(clippy::too_many_arguments)]
fn capsule_capsule(
    pa: Vec3, qa: Quat, ra: Scalar, ha: Scalar,
    pb: Vec3, qb: Quat, rb: Scalar, hb: Scalar,
    out: &mut Vec<ContactPoint>,
) {
    let (axa, axb) = (qa * Vec3::Y * ha, qb * Vec3::Y * hb);
    let (c1, c2) = closest_points_segments(pa + axa, pa - axa, pb + axb, pb - axb);
    sphere_sphere(c1, ra, c2, rb, out);
}

/* ---------- helpers ---------- */
#[inline] fn clampf(x: f32, lo: f32, hi: f32) -> f32 { x.max(lo).min(hi) }
#[inline] fn clamp_vec3(p: Vec3, mn: Vec3, mx: Vec3) -> Vec3 {
    Vec3::new(clampf(p.x, mn.x, mx.x), clampf(p.y, mn.y, mx.y), clampf(p.z, mn.z, mx.z))
}
#[inline]
fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> (Vec3, f32) {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= 1.0e-12 { return (a, 0.0); }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (a + ab * t, t)
}
fn closest_points_segment_aabb(a: Vec3, b: Vec3, mn: Vec3, mx: Vec3) -> (Vec3, Vec3) {
    let mut ps = (a + b) * 0.5;
    let mut qs = clamp_vec3(ps, mn, mx);
    for _ in 0..3 {
        let (p2, _t) = closest_point_on_segment(a, b, qs);
        ps = p2;
        qs = clamp_vec3(ps, mn, mx);
    }
    (ps, qs)
}
fn closest_points_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    const EPS: f32 = 1.0e-9;
    let (d1, d2, r) = (q1 - p1, q2 - p2, p1 - p2);
    let (a, e, f) = (d1.length_squared(), d2.length_squared(), d2.dot(r));
    let (s, t) = if a <= EPS && e <= EPS {
        (0.0, 0.0)
    } else if a <= EPS {
        (0.0, clampf(f / e, 0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= EPS {
            (clampf(-c / a, 0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let s = if denom != 0.0 { clampf((b * f - c * e) / denom, 0.0, 1.0) } else { 0.0 };
            let t = (b * s + f) / e;
            if t < 0.0 {
                (clampf(-c / a, 0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (clampf((b - c) / a, 0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };
    (p1 + d1 * s, p2 + d2 * t)
}
