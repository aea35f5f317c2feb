use tumble_core::{Quat, Scalar, Vec3};

/// Advances `q` by angular velocity `w` over `dt`: q + (dt/2) * (w, 0) ⊗ q.
/// The result is not normalized.
#[inline]
pub fn integrate_quat(q: Quat, w: Vec3, dt: Scalar) -> Quat {
    let h = 0.5 * dt;
    let (ax, ay, az) = (w.x, w.y, w.z);
    let (bx, by, bz, bw) = (q.x, q.y, q.z, q.w);
    Quat::from_xyzw(
        bx + h * (ax * bw + ay * bz - az * by),
        by + h * (ay * bw + az * bx - ax * bz),
        bz + h * (az * bw + ax * by - ay * bx),
        bw + h * (-ax * bx - ay * by - az * bz),
    )
}

/// First-order renormalization, accurate when |q| is already close to 1.
#[inline]
pub fn normalize_quat_fast(q: Quat) -> Quat {
    let f = (3.0 - q.length_squared()) * 0.5;
    Quat::from_xyzw(q.x * f, q.y * f, q.z * f, q.w * f)
}
