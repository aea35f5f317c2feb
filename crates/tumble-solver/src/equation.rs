use tumble_core::{Scalar, Vec3};

/// One body's block of a constraint Jacobian row.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct JacobianElement {
    pub spatial: Vec3,
    pub rotational: Vec3,
}

impl JacobianElement {
    #[inline] pub fn new(spatial: Vec3, rotational: Vec3) -> Self { Self { spatial, rotational } }

    #[inline]
    pub fn multiply_vectors(&self, spatial: Vec3, rotational: Vec3) -> Scalar {
        self.spatial.dot(spatial) + self.rotational.dot(rotational)
    }
}

/// SPOOK regularization for a row, derived from stiffness `k`, relaxation `d`
/// (in steps) and step size `h`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spook { pub a: Scalar, pub b: Scalar, pub eps: Scalar }

impl Spook {
    pub fn new(stiffness: Scalar, relaxation: Scalar, h: Scalar) -> Self {
        let d = relaxation;
        let k = stiffness;
        Spook {
            a: 4.0 / (h * (1.0 + 4.0 * d)),
            b: (4.0 * d) / (1.0 + 4.0 * d),
            eps: 4.0 / (h * h * k * (1.0 + 4.0 * d)),
        }
    }
}

/// One scalar solver row between two bodies, addressed by dense index.
///
/// `violation` is the position error Gq at build time. `restitution` scales
/// the linear velocity term so contacts can bounce; it is zero for every
/// other kind of row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Equation {
    pub body_a: usize,
    pub body_b: usize,
    pub jacobian_a: JacobianElement,
    pub jacobian_b: JacobianElement,
    pub min_force: Scalar,
    pub max_force: Scalar,
    pub stiffness: Scalar,
    pub relaxation: Scalar,
    pub violation: Scalar,
    pub restitution: Scalar,
    pub enabled: bool,
}

impl Default for Equation {
    fn default() -> Self {
        Self {
            body_a: 0,
            body_b: 0,
            jacobian_a: JacobianElement::default(),
            jacobian_b: JacobianElement::default(),
            min_force: -1.0e6,
            max_force: 1.0e6,
            stiffness: 1.0e7,
            relaxation: 3.0,
            violation: 0.0,
            restitution: 0.0,
            enabled: true,
        }
    }
}
