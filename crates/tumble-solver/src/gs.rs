use tracing::trace;
use tumble_core::{BoxError, Mat3, Scalar, Vec3};
use tumble_dynamics::Body;

use crate::equation::{Equation, Spook};

/// Constraint solver interface consumed by the world step.
pub trait Solver: Send {
    fn add_equation(&mut self, eq: Equation);
    fn remove_all_equations(&mut self);
    fn equations(&self) -> &[Equation];
    /// Solves the queued rows and applies the resulting velocity changes.
    /// Returns the number of iterations performed.
    fn solve(&mut self, dt: Scalar, bodies: &mut [Body]) -> Result<usize, BoxError>;
}

/// Projected Gauss-Seidel over SPOOK-regularized rows.
#[derive(Debug)]
pub struct GsSolver {
    pub iterations: usize,
    pub tolerance: Scalar,
    equations: Vec<Equation>,
    // per-row scratch
    lambda: Vec<Scalar>,
    rhs: Vec<Scalar>,
    inv_c: Vec<Scalar>,
    eps: Vec<Scalar>,
    // per-body scratch
    vlambda: Vec<Vec3>,
    wlambda: Vec<Vec3>,
    inv_mass: Vec<Scalar>,
    inv_inertia: Vec<Mat3>,
}

impl GsSolver {
    pub fn new(iterations: usize, tolerance: Scalar) -> Self {
        Self {
            iterations,
            tolerance,
            equations: Vec::new(),
            lambda: Vec::new(),
            rhs: Vec::new(),
            inv_c: Vec::new(),
            eps: Vec::new(),
            vlambda: Vec::new(),
            wlambda: Vec::new(),
            inv_mass: Vec::new(),
            inv_inertia: Vec::new(),
        }
    }

    /// Most recent per-row multipliers (impulses), in queue order.
    pub fn lambdas(&self) -> &[Scalar] { &self.lambda }

    fn prepare(&mut self, h: Scalar, bodies: &[Body]) {
        self.vlambda.clear();
        self.vlambda.resize(bodies.len(), Vec3::ZERO);
        self.wlambda.clear();
        self.wlambda.resize(bodies.len(), Vec3::ZERO);
        self.inv_mass.clear();
        self.inv_mass.extend(bodies.iter().map(Body::inv_mass_solve));
        self.inv_inertia.clear();
        self.inv_inertia.extend(bodies.iter().map(Body::inv_inertia_world_solve));

        self.lambda.clear();
        self.rhs.clear();
        self.inv_c.clear();
        self.eps.clear();
        for eq in &self.equations {
            let (bi, bj) = (&bodies[eq.body_a], &bodies[eq.body_b]);
            let (mi, mj) = (self.inv_mass[eq.body_a], self.inv_mass[eq.body_b]);
            let (ii, ij) = (self.inv_inertia[eq.body_a], self.inv_inertia[eq.body_b]);
            let (ga, gb) = (&eq.jacobian_a, &eq.jacobian_b);
            let spook = Spook::new(eq.stiffness, eq.relaxation, h);

            let e1 = 1.0 + eq.restitution;
            let gw = e1 * (ga.spatial.dot(bi.velocity) + gb.spatial.dot(bj.velocity))
                + ga.rotational.dot(bi.angular_velocity)
                + gb.rotational.dot(bj.angular_velocity);
            let gimf = ga.spatial.dot(bi.force * mi) + ga.rotational.dot(ii * bi.torque)
                + gb.spatial.dot(bj.force * mj) + gb.rotational.dot(ij * bj.torque);
            let c = mi * ga.spatial.length_squared() + ga.rotational.dot(ii * ga.rotational)
                + mj * gb.spatial.length_squared() + gb.rotational.dot(ij * gb.rotational)
                + spook.eps;

            self.rhs.push(-eq.violation * spook.a - gw * spook.b - gimf * h);
            self.inv_c.push(if c > 0.0 { 1.0 / c } else { 0.0 });
            self.eps.push(spook.eps);
            self.lambda.push(0.0);
        }
    }
}

impl Default for GsSolver {
    fn default() -> Self { GsSolver::new(10, 1.0e-7) }
}

impl Solver for GsSolver {
    fn add_equation(&mut self, eq: Equation) {
        if eq.enabled { self.equations.push(eq); }
    }

    fn remove_all_equations(&mut self) { self.equations.clear(); }

    fn equations(&self) -> &[Equation] { &self.equations }

    fn solve(&mut self, dt: Scalar, bodies: &mut [Body]) -> Result<usize, BoxError> {
        let n = bodies.len();
        if let Some(eq) = self.equations.iter().find(|e| e.body_a >= n || e.body_b >= n) {
            return Err(format!("equation references body {}/{} but only {n} bodies exist", eq.body_a, eq.body_b).into());
        }
        if self.equations.is_empty() { return Ok(0); }

        self.prepare(dt, bodies);
        let tol2 = self.tolerance * self.tolerance;
        let mut iter = 0;
        while iter < self.iterations {
            iter += 1;
            let mut total = 0.0;
            for (k, eq) in self.equations.iter().enumerate() {
                let (a, b) = (eq.body_a, eq.body_b);
                let gw_lambda = eq.jacobian_a.multiply_vectors(self.vlambda[a], self.wlambda[a])
                    + eq.jacobian_b.multiply_vectors(self.vlambda[b], self.wlambda[b]);
                let lambda = self.lambda[k];
                let mut dl = self.inv_c[k] * (self.rhs[k] - gw_lambda - self.eps[k] * lambda);
                if lambda + dl < eq.min_force {
                    dl = eq.min_force - lambda;
                } else if lambda + dl > eq.max_force {
                    dl = eq.max_force - lambda;
                }
                self.lambda[k] += dl;
                total += dl.abs();

                self.vlambda[a] += eq.jacobian_a.spatial * (self.inv_mass[a] * dl);
                self.wlambda[a] += self.inv_inertia[a] * eq.jacobian_a.rotational * dl;
                self.vlambda[b] += eq.jacobian_b.spatial * (self.inv_mass[b] * dl);
                self.wlambda[b] += self.inv_inertia[b] * eq.jacobian_b.rotational * dl;
            }
            if total * total < tol2 { break; }
        }

        for (i, body) in bodies.iter_mut().enumerate() {
            body.velocity += self.vlambda[i];
            body.angular_velocity += self.wlambda[i];
        }
        trace!(equations = self.equations.len(), iterations = iter, "gauss-seidel solve");
        Ok(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactEquation;
    use approx::assert_abs_diff_eq;
    use tumble_core::vec3;
    use tumble_geom::Shape;

    fn resting_pair(gap: Scalar) -> Vec<Body> {
        vec![
            Body::fixed(Shape::Plane, Vec3::ZERO),
            Body::dynamic(1.0, Shape::Sphere { r: 1.0 }, vec3(0.0, 1.0 + gap, 0.0)),
        ]
    }

    #[test]
    fn contact_stops_falling_body() {
        let mut bodies = resting_pair(-0.01);
        bodies[1].velocity = vec3(0.0, -2.0, 0.0);
        let c = ContactEquation { body_a: 0, body_b: 1, normal: Vec3::Y, rj: vec3(0.0, -1.0, 0.0), ..Default::default() };
        let mut s = GsSolver::default();
        s.add_equation(c.equation(&bodies).unwrap());
        let iters = s.solve(1.0 / 60.0, &mut bodies).unwrap();
        assert!(iters >= 1);
        assert!(bodies[1].velocity.y >= 0.0);
        assert_eq!(bodies[0].velocity, Vec3::ZERO);
        assert!(s.lambdas()[0] >= 0.0);
    }

    #[test]
    fn contact_never_pulls() {
        let mut bodies = resting_pair(-0.001);
        bodies[1].velocity = vec3(0.0, 3.0, 0.0);
        let c = ContactEquation { body_a: 0, body_b: 1, normal: Vec3::Y, rj: vec3(0.0, -1.0, 0.0), ..Default::default() };
        let mut s = GsSolver::default();
        s.add_equation(c.equation(&bodies).unwrap());
        s.solve(1.0 / 60.0, &mut bodies).unwrap();
        assert_abs_diff_eq!(bodies[1].velocity.y, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn disabled_rows_are_ignored() {
        let mut s = GsSolver::default();
        s.add_equation(Equation { enabled: false, ..Default::default() });
        assert!(s.equations().is_empty());
    }

    #[test]
    fn out_of_range_rows_fail() {
        let mut bodies = resting_pair(0.0);
        let mut s = GsSolver::default();
        s.add_equation(Equation { body_a: 0, body_b: 5, ..Default::default() });
        assert!(s.solve(1.0 / 60.0, &mut bodies).is_err());
        s.remove_all_equations();
        assert_eq!(s.solve(1.0 / 60.0, &mut bodies).unwrap(), 0);
    }
}
