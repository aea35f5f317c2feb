use tumble_core::{Scalar, Vec3};
use tumble_dynamics::Body;

use crate::equation::{Equation, JacobianElement};

/// Non-penetration row at a contact point. Bodies are dense indices, `normal`
/// points from A to B, and `ri`/`rj` are world-frame offsets from each body
/// center to its contact point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactEquation {
    pub body_a: usize,
    pub body_b: usize,
    pub ri: Vec3,
    pub rj: Vec3,
    pub normal: Vec3,
    pub restitution: Scalar,
    pub stiffness: Scalar,
    pub relaxation: Scalar,
    pub min_force: Scalar,
    pub max_force: Scalar,
    pub enabled: bool,
}

impl Default for ContactEquation {
    fn default() -> Self {
        Self {
            body_a: 0,
            body_b: 0,
            ri: Vec3::ZERO,
            rj: Vec3::ZERO,
            normal: Vec3::Y,
            restitution: 0.0,
            stiffness: 1.0e7,
            relaxation: 3.0,
            min_force: 0.0,
            max_force: 1.0e6,
            enabled: true,
        }
    }
}

impl ContactEquation {
    /// Signed gap along the normal; negative while penetrating.
    pub fn penetration(&self, bodies: &[Body]) -> Option<Scalar> {
        let (bi, bj) = (bodies.get(self.body_a)?, bodies.get(self.body_b)?);
        Some((bj.position + self.rj - bi.position - self.ri).dot(self.normal))
    }

    /// Relative approach speed along the normal at the contact point.
    pub fn impact_velocity_along_normal(&self, bodies: &[Body]) -> Option<Scalar> {
        let (bi, bj) = (bodies.get(self.body_a)?, bodies.get(self.body_b)?);
        let vi = bi.velocity_at_world_point(bi.position + self.ri);
        let vj = bj.velocity_at_world_point(bj.position + self.rj);
        Some(self.normal.dot(vi - vj))
    }

    pub fn equation(&self, bodies: &[Body]) -> Option<Equation> {
        let g = self.penetration(bodies)?;
        let n = self.normal;
        Some(Equation {
            body_a: self.body_a,
            body_b: self.body_b,
            jacobian_a: JacobianElement::new(-n, -self.ri.cross(n)),
            jacobian_b: JacobianElement::new(n, self.rj.cross(n)),
            min_force: self.min_force,
            max_force: self.max_force,
            stiffness: self.stiffness,
            relaxation: self.relaxation,
            violation: g,
            restitution: self.restitution,
            enabled: self.enabled,
        })
    }
}

/// Tangential row bounding sliding along `tangent` at a contact point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrictionEquation {
    pub body_a: usize,
    pub body_b: usize,
    pub ri: Vec3,
    pub rj: Vec3,
    pub tangent: Vec3,
    pub stiffness: Scalar,
    pub relaxation: Scalar,
    pub min_force: Scalar,
    pub max_force: Scalar,
    pub enabled: bool,
}

impl Default for FrictionEquation {
    fn default() -> Self {
        Self {
            body_a: 0,
            body_b: 0,
            ri: Vec3::ZERO,
            rj: Vec3::ZERO,
            tangent: Vec3::X,
            stiffness: 1.0e7,
            relaxation: 3.0,
            min_force: 0.0,
            max_force: 0.0,
            enabled: true,
        }
    }
}

impl FrictionEquation {
    /// Sets the symmetric force bound `[-slip_force, slip_force]`.
    #[inline]
    pub fn set_slip_force(&mut self, slip_force: Scalar) {
        self.max_force = slip_force;
        self.min_force = -slip_force;
    }

    pub fn equation(&self) -> Equation {
        let t = self.tangent;
        Equation {
            body_a: self.body_a,
            body_b: self.body_b,
            jacobian_a: JacobianElement::new(-t, -self.ri.cross(t)),
            jacobian_b: JacobianElement::new(t, self.rj.cross(t)),
            min_force: self.min_force,
            max_force: self.max_force,
            stiffness: self.stiffness,
            relaxation: self.relaxation,
            violation: 0.0,
            restitution: 0.0,
            enabled: self.enabled,
        }
    }
}

/// Two unit tangents spanning the plane orthogonal to `n`.
pub fn tangent_basis(n: Vec3) -> (Vec3, Vec3) {
    let len = n.length();
    if len <= 0.0 { return (Vec3::X, Vec3::Y); }
    let n = n / len;
    let base = if n.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let t1 = n.cross(base).normalize_or_zero();
    let t2 = n.cross(t1);
    (t1, t2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tumble_core::vec3;
    use tumble_geom::Shape;

    #[test]
    fn tangents_are_orthonormal() {
        for n in [Vec3::Y, Vec3::X, vec3(1.0, 2.0, -3.0).normalize(), vec3(-0.95, 0.1, 0.0).normalize()] {
            let (t1, t2) = tangent_basis(n);
            assert_abs_diff_eq!(t1.length(), 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!(t2.length(), 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!(t1.dot(n), 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(t2.dot(n), 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(t1.dot(t2), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn penetration_of_overlapping_spheres() {
        let bodies = vec![
            Body::dynamic(1.0, Shape::Sphere { r: 1.0 }, vec3(0.0, 0.0, 0.0)),
            Body::dynamic(1.0, Shape::Sphere { r: 1.0 }, vec3(1.5, 0.0, 0.0)),
        ];
        let c = ContactEquation {
            body_a: 0,
            body_b: 1,
            normal: Vec3::X,
            ri: vec3(1.0, 0.0, 0.0),
            rj: vec3(-1.0, 0.0, 0.0),
            ..Default::default()
        };
        assert_abs_diff_eq!(c.penetration(&bodies).unwrap(), -0.5, epsilon = 1e-6);
        let eq = c.equation(&bodies).unwrap();
        assert_eq!(eq.jacobian_a.spatial, -Vec3::X);
        assert_eq!(eq.min_force, 0.0);
        assert!(ContactEquation { body_b: 7, ..c }.equation(&bodies).is_none());
    }

    #[test]
    fn approach_speed_counts_spin_at_the_contact() {
        let mut bodies = vec![
            Body::dynamic(1.0, Shape::Sphere { r: 1.0 }, vec3(0.0, 0.0, 0.0)),
            Body::dynamic(1.0, Shape::Sphere { r: 1.0 }, vec3(1.5, 0.0, 0.0)),
        ];
        bodies[0].velocity = vec3(2.0, 0.0, 0.0);
        bodies[1].velocity = vec3(-1.0, 0.0, 0.0);
        let c = ContactEquation {
            body_a: 0,
            body_b: 1,
            normal: Vec3::X,
            ri: vec3(1.0, 0.0, 0.0),
            rj: vec3(-1.0, 0.0, 0.0),
            ..Default::default()
        };
        assert_abs_diff_eq!(c.impact_velocity_along_normal(&bodies).unwrap(), 3.0, epsilon = 1e-6);

        // spin about the normal adds nothing; spin about z moves B's contact point along -x
        bodies[0].angular_velocity = vec3(5.0, 0.0, 0.0);
        bodies[1].angular_velocity = vec3(0.0, 0.0, -1.0);
        // wj × rj = (0,0,-1) × (-1,0,0) = (0,1,0), no normal component
        assert_abs_diff_eq!(c.impact_velocity_along_normal(&bodies).unwrap(), 3.0, epsilon = 1e-6);
        let off_axis = ContactEquation { rj: vec3(-1.0, 1.0, 0.0), ..c };
        // wj × rj = (0,0,-1) × (-1,1,0) = (1,1,0)
        assert_abs_diff_eq!(off_axis.impact_velocity_along_normal(&bodies).unwrap(), 2.0, epsilon = 1e-6);
        assert!(ContactEquation { body_a: 9, ..c }.impact_velocity_along_normal(&bodies).is_none());
    }

    #[test]
    fn friction_bounds_are_symmetric() {
        let mut f = FrictionEquation::default();
        f.set_slip_force(2.5);
        let eq = f.equation();
        assert_eq!(eq.min_force, -2.5);
        assert_eq!(eq.max_force, 2.5);
        assert_eq!(eq.violation, 0.0);
    }
}
