use tumble_core::{BodyId, Scalar, Vec3};
use tumble_dynamics::Body;

use crate::equation::Equation;
use crate::contact::ContactEquation;

/// Dense index of the body with `id`.
///
/// Relies on the world keeping bodies sorted by id, which holds because ids
/// only grow and removal preserves relative order.
#[inline]
pub fn body_index(bodies: &[Body], id: BodyId) -> Option<usize> {
    bodies.binary_search_by_key(&id, Body::id).ok()
}

/// A user constraint contributing solver rows every step.
pub trait Constraint: Send {
    fn bodies(&self) -> (BodyId, BodyId);

    /// Whether the two bodies may still collide with each other.
    fn collide_connected(&self) -> bool { true }

    /// Rebuilds the rows from the current body state. Rows whose bodies are
    /// missing must come back disabled.
    fn update(&mut self, bodies: &[Body]);

    fn equations(&self) -> &[Equation];
}

/// Keeps the centers of two bodies at a fixed distance.
#[derive(Clone, Debug)]
pub struct DistanceConstraint {
    pub a: BodyId,
    pub b: BodyId,
    pub rest: Scalar,
    pub max_force: Scalar,
    pub collide_connected: bool,
    equations: [Equation; 1],
}

impl DistanceConstraint {
    pub fn new(a: BodyId, b: BodyId, rest: Scalar) -> Self {
        Self { a, b, rest, max_force: 1.0e6, collide_connected: true, equations: [Equation::default()] }
    }

    /// Uses the current separation of the two bodies as the rest length.
    pub fn from_current(bodies: &[Body], a: BodyId, b: BodyId) -> Option<Self> {
        let pa = bodies.get(body_index(bodies, a)?)?.position;
        let pb = bodies.get(body_index(bodies, b)?)?.position;
        Some(Self::new(a, b, (pb - pa).length()))
    }

    pub fn with_collide_connected(mut self, collide: bool) -> Self { self.collide_connected = collide; self }
}

impl Constraint for DistanceConstraint {
    fn bodies(&self) -> (BodyId, BodyId) { (self.a, self.b) }

    fn collide_connected(&self) -> bool { self.collide_connected }

    fn update(&mut self, bodies: &[Body]) {
        let (ia, ib) = match (body_index(bodies, self.a), body_index(bodies, self.b)) {
            (Some(ia), Some(ib)) => (ia, ib),
            _ => { self.equations[0].enabled = false; return; }
        };
        let d = bodies[ib].position - bodies[ia].position;
        let n = if d.length_squared() > 0.0 { d.normalize() } else { Vec3::X };
        let half = 0.5 * self.rest;
        // a contact row whose gap is |d| - rest, allowed to push and pull
        let row = ContactEquation {
            body_a: ia,
            body_b: ib,
            normal: n,
            ri: n * half,
            rj: n * -half,
            min_force: -self.max_force,
            max_force: self.max_force,
            ..Default::default()
        };
        match row.equation(bodies) {
            Some(eq) => self.equations[0] = eq,
            None => self.equations[0].enabled = false,
        }
    }

    fn equations(&self) -> &[Equation] { &self.equations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tumble_core::{vec3, WorldId};
    use tumble_geom::Shape;

    fn pair() -> Vec<Body> {
        let mut a = Body::dynamic(1.0, Shape::Sphere { r: 0.1 }, vec3(0.0, 0.0, 0.0));
        let mut b = Body::dynamic(1.0, Shape::Sphere { r: 0.1 }, vec3(3.0, 0.0, 0.0));
        a.attach(WorldId(0), BodyId(4), 0);
        b.attach(WorldId(0), BodyId(9), 1);
        vec![a, b]
    }

    #[test]
    fn lookup_by_id() {
        let bodies = pair();
        assert_eq!(body_index(&bodies, BodyId(9)), Some(1));
        assert_eq!(body_index(&bodies, BodyId(5)), None);
    }

    #[test]
    fn violation_is_stretch() {
        let bodies = pair();
        let mut c = DistanceConstraint::new(BodyId(4), BodyId(9), 2.0);
        c.update(&bodies);
        let eq = c.equations()[0];
        assert!(eq.enabled);
        assert_abs_diff_eq!(eq.violation, 1.0, epsilon = 1e-6);
        assert_eq!(eq.min_force, -1.0e6);
    }

    #[test]
    fn missing_body_disables_row() {
        let bodies = pair();
        let mut c = DistanceConstraint::new(BodyId(4), BodyId(77), 2.0);
        c.update(&bodies);
        assert!(!c.equations()[0].enabled);
    }

    #[test]
    fn rest_length_from_current_pose() {
        let bodies = pair();
        let c = DistanceConstraint::from_current(&bodies, BodyId(4), BodyId(9)).unwrap();
        assert_abs_diff_eq!(c.rest, 3.0);
    }
}
