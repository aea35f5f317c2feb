use std::time::Instant;

use tracing::{debug, trace};
use tumble_core::{Scalar, StepProfile, StepStage, StepStats, WorldError};
use tumble_dynamics::{Body, SleepState, SleepTransition, StepCallback};
use tumble_solver::{ContactEquation, body_index, tangent_basis};

use crate::events::{ContactEvent, SleepEvent};
use crate::world::World;

impl World {
    /// Advances the world by `dt`. `None` reuses the previous step size, or
    /// the configured default on the first step.
    ///
    /// A collaborator error abandons the step in the stage it occurred in;
    /// phases already run are not rolled back.
    pub fn step(&mut self, dt: Option<Scalar>) -> Result<StepStats, WorldError> {
        let dt = dt.or(self.last_dt).unwrap_or(self.config.default_dt);
        if !(dt.is_finite() && dt > 0.0) {
            return Err(WorldError::InvalidTimeStep(dt));
        }
        self.last_dt = Some(dt);
        self.schedule.clear();
        self.stats = StepStats::default();
        self.profile = StepProfile::default();
        self.solver.remove_all_equations();
        let profiling = self.config.profiling;

        self.schedule.push(StepStage::ApplyGravity);
        let g = self.gravity;
        for b in self.bodies.iter_mut().filter(|b| b.is_dynamic()) {
            b.force += g * b.mass;
        }

        self.schedule.push(StepStage::UpdateSubsystems);
        for s in &mut self.subsystems {
            s.update();
        }

        self.schedule.push(StepStage::Broadphase);
        let t0 = profiling.then(Instant::now);
        self.broadphase_pass()?;
        if let Some(t) = t0 { self.profile.broadphase = t.elapsed(); }

        self.schedule.push(StepStage::CollisionMatrixTick);
        self.collision_matrix.tick();

        self.schedule.push(StepStage::Narrowphase);
        let t0 = profiling.then(Instant::now);
        self.narrowphase_pass()?;

        self.schedule.push(StepStage::EquationSynthesis);
        self.synthesize_equations();
        if let Some(t) = t0 { self.profile.narrowphase = t.elapsed(); }

        self.schedule.push(StepStage::ConstraintGather);
        for (_, c) in &mut self.constraints {
            c.update(&self.bodies);
            for eq in c.equations().iter().filter(|e| e.enabled) {
                self.solver.add_equation(*eq);
                self.stats.constraint_equations += 1;
            }
        }

        self.schedule.push(StepStage::Solve);
        let t0 = profiling.then(Instant::now);
        let solved = self.solver.solve(dt, &mut self.bodies);
        self.solver.remove_all_equations();
        self.stats.solver_iterations = solved.map_err(WorldError::collaborator(StepStage::Solve))? as u32;
        if let Some(t) = t0 { self.profile.solve = t.elapsed(); }

        self.schedule.push(StepStage::Damping);
        for b in &mut self.bodies {
            b.apply_damping(dt);
        }

        self.schedule.push(StepStage::PreStep);
        self.step_event.dt = dt;
        self.step_event.time = self.time;
        self.step_event.step_number = self.step_number;
        self.pre_step_events.dispatch(&self.step_event);
        for b in &mut self.bodies {
            run_callback(b, pre_step_slot);
        }

        self.schedule.push(StepStage::Integrate);
        let t0 = profiling.then(Instant::now);
        let normalize = self.step_number % (u64::from(self.config.quat_normalize_skip) + 1) == 0;
        let fast = self.config.quat_normalize_fast;
        for b in &mut self.bodies {
            b.integrate(dt, normalize, fast);
            b.clear_forces();
        }
        self.time += dt;
        self.step_number += 1;
        if let Some(t) = t0 { self.profile.integrate = t.elapsed(); }

        self.schedule.push(StepStage::PostStep);
        self.step_event.time = self.time;
        self.step_event.step_number = self.step_number;
        self.post_step_events.dispatch(&self.step_event);
        for b in &mut self.bodies {
            run_callback(b, post_step_slot);
        }

        self.schedule.push(StepStage::WorldInertiaRefresh);
        for b in self.bodies.iter_mut().filter(|b| b.auto_update_inertia_world) {
            b.update_inertia_world(false);
        }

        self.schedule.push(StepStage::SleepTick);
        if self.config.allow_sleep {
            for k in 0..self.bodies.len() {
                if let Some(tr) = self.bodies[k].sleep_tick(self.time) {
                    self.emit_sleep(k, tr);
                }
            }
        }

        trace!(
            step = self.step_number,
            pairs = self.stats.pairs_tested,
            contacts = self.stats.contacts,
            frictions = self.stats.friction_equations,
            iterations = self.stats.solver_iterations,
            "world step"
        );
        Ok(self.stats)
    }

    fn broadphase_pass(&mut self) -> Result<(), WorldError> {
        for b in self.bodies.iter_mut().filter(|b| b.aabb_needs_update) {
            b.update_aabb();
        }
        self.pairs.clear();
        self.broadphase
            .collision_pairs(&self.bodies, &mut self.pairs)
            .map_err(WorldError::collaborator(StepStage::Broadphase))?;

        self.excluded_pairs.clear();
        for (_, c) in self.constraints.iter().filter(|(_, c)| !c.collide_connected()) {
            let (a, b) = c.bodies();
            if let (Some(i), Some(j)) = (body_index(&self.bodies, a), body_index(&self.bodies, b)) {
                self.excluded_pairs.push((i.min(j), i.max(j)));
            }
        }
        if !self.excluded_pairs.is_empty() {
            let excluded = &self.excluded_pairs;
            self.pairs.retain(|p| !excluded.contains(p));
        }
        self.stats.pairs_tested = self.pairs.len() as u32;
        Ok(())
    }

    fn narrowphase_pass(&mut self) -> Result<(), WorldError> {
        self.contact_pool.recycle(&mut self.contacts);
        self.narrowphase
            .get_contacts(&self.pairs, &self.bodies, &mut self.contact_pool, &mut self.contacts)
            .map_err(WorldError::collaborator(StepStage::Narrowphase))?;
        let n = self.bodies.len();
        if let Some(c) = self.contacts.iter().find(|c| c.body_a >= n || c.body_b >= n || c.body_a == c.body_b) {
            let msg = format!("contact between bodies {} and {} is invalid for {n} bodies", c.body_a, c.body_b);
            return Err(WorldError::collaborator(StepStage::Narrowphase)(msg.into()));
        }
        Ok(())
    }

    /// Turns penetrating contacts into solver rows, updates the touching
    /// state and publishes first contacts.
    fn synthesize_equations(&mut self) {
        self.friction_pool.recycle(&mut self.frictions);
        let gravity = self.gravity.length();

        for k in 0..self.contacts.len() {
            let (i, j) = (self.contacts[k].body_a, self.contacts[k].body_b);
            let cm = self.materials.resolve(self.bodies[i].material, self.bodies[j].material, &self.default_contact_material);
            let c = &mut self.contacts[k];
            c.restitution = cm.restitution;
            c.stiffness = cm.contact_stiffness;
            c.relaxation = cm.contact_relaxation;
            let c = *c;

            match c.penetration(&self.bodies) {
                Some(g) if g < 0.0 => {}
                _ => continue,
            }

            let (bi, bj) = (&self.bodies[i], &self.bodies[j]);
            if bi.collision_response && bj.collision_response {
                if let Some(eq) = c.equation(&self.bodies) {
                    self.solver.add_equation(eq);
                    self.stats.contacts += 1;
                }
                if cm.friction > 0.0 {
                    let inv = bi.inv_mass + bj.inv_mass;
                    let reduced_mass = if inv > 0.0 { 1.0 / inv } else { 0.0 };
                    let slip = cm.friction * gravity * reduced_mass;
                    let (t1, t2) = tangent_basis(c.normal);
                    for t in [t1, t2] {
                        let mut f = self.friction_pool.acquire();
                        f.body_a = i;
                        f.body_b = j;
                        f.ri = c.ri;
                        f.rj = c.rj;
                        f.tangent = t;
                        f.stiffness = cm.friction_stiffness;
                        f.relaxation = cm.friction_relaxation;
                        f.enabled = true;
                        f.set_slip_force(slip);
                        self.solver.add_equation(f.equation());
                        self.frictions.push(f);
                    }
                    self.stats.friction_equations += 2;
                }
            }

            flag_wake(&mut self.bodies, i, j);
            flag_wake(&mut self.bodies, j, i);

            let was_touching = self.collision_matrix.get(i, j);
            self.collision_matrix.set(i, j, true);
            if !was_touching && self.collision_matrix.is_rising_edge(i, j) {
                self.first_contact(i, j, c);
            }
        }

        for k in 0..self.bodies.len() {
            if self.bodies[k].wake_up_after_narrowphase {
                if let Some(tr) = self.bodies[k].wake_up() {
                    self.emit_sleep(k, tr);
                }
            }
        }

        if self.contact_events.has_listeners() {
            let bodies = &self.bodies;
            for (i, j) in self.collision_matrix.falling_edges() {
                let (Some(a), Some(b)) = (bodies.get(j), bodies.get(i)) else { continue };
                self.contact_events.dispatch(&ContactEvent::End { a: a.id(), b: b.id() });
            }
        }
    }

    fn first_contact(&mut self, i: usize, j: usize, contact: ContactEquation) {
        let (a, b) = (self.bodies[i].id(), self.bodies[j].id());
        for (body, other) in [(a, b), (b, a)] {
            if let Some(bus) = self.collide_listeners.get_mut(&body) {
                self.collide_event.body = body;
                self.collide_event.other = other;
                self.collide_event.contact = contact;
                bus.dispatch(&self.collide_event);
            }
        }
        for k in [i, j] {
            if let Some(tr) = self.bodies[k].wake_up() {
                self.emit_sleep(k, tr);
            }
        }
        self.contact_events.dispatch(&ContactEvent::Begin { a, b });
    }

    fn emit_sleep(&mut self, k: usize, transition: SleepTransition) {
        let body = self.bodies[k].id();
        debug!(%body, ?transition, "sleep transition");
        self.sleep_events.dispatch(&SleepEvent { body, transition });
    }
}

/// Marks `sleeper` for waking when `other` is awake, non-static and moving
/// at least √2 times its own sleep speed limit.
fn flag_wake(bodies: &mut [Body], sleeper: usize, other: usize) {
    let o = &bodies[other];
    if o.sleep_state != SleepState::Awake || o.is_static() { return; }
    let speed2 = o.velocity.length_squared() + o.angular_velocity.length_squared();
    if speed2 < 2.0 * o.sleep_speed_limit * o.sleep_speed_limit { return; }
    let s = &mut bodies[sleeper];
    if s.allow_sleep && s.is_dynamic() && s.is_sleeping() {
        s.wake_up_after_narrowphase = true;
    }
}

fn pre_step_slot(b: &mut Body) -> &mut Option<StepCallback> { &mut b.pre_step }
fn post_step_slot(b: &mut Body) -> &mut Option<StepCallback> { &mut b.post_step }

/// Runs a per-body step callback. A callback that installs its own
/// replacement keeps the replacement.
fn run_callback(body: &mut Body, slot: fn(&mut Body) -> &mut Option<StepCallback>) {
    if let Some(mut cb) = slot(body).take() {
        cb(body);
        let s = slot(body);
        if s.is_none() { *s = Some(cb); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorldBuilder;
    use tumble_core::{BoxError, vec3};
    use tumble_collision::{Broadphase, PairBuffer};
    use tumble_geom::Shape;

    struct Failing;
    impl Broadphase for Failing {
        fn collision_pairs(&mut self, _: &[Body], _: &mut PairBuffer) -> Result<(), BoxError> {
            Err("index corrupted".into())
        }
    }

    #[test]
    fn rejects_bad_time_steps() {
        let mut w = WorldBuilder::new().build();
        for dt in [0.0, -1.0, Scalar::NAN, Scalar::INFINITY] {
            assert!(matches!(w.step(Some(dt)), Err(WorldError::InvalidTimeStep(_))));
        }
        assert!(w.schedule().is_empty());
        assert_eq!(w.step_number(), 0);
    }

    #[test]
    fn dt_defaults_to_previous_step() {
        let mut w = WorldBuilder::new().build();
        w.step(None).unwrap();
        assert!((w.time() - 1.0 / 60.0).abs() < 1e-7);
        w.step(Some(0.1)).unwrap();
        w.step(None).unwrap();
        assert!((w.time() - (1.0 / 60.0 + 0.2)).abs() < 1e-6);
    }

    #[test]
    fn broadphase_failure_names_the_stage() {
        let mut w = WorldBuilder::new().with_broadphase(Box::new(Failing)).build();
        w.add_body(Body::dynamic(1.0, Shape::Sphere { r: 1.0 }, vec3(0.0, 0.0, 0.0))).unwrap();
        match w.step(None) {
            Err(WorldError::Collaborator { stage, .. }) => assert_eq!(stage, StepStage::Broadphase),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn callbacks_run_around_integration() {
        let mut w = WorldBuilder::new().with_gravity(vec3(0.0, 0.0, 0.0)).build();
        let mut body = Body::dynamic(1.0, Shape::Sphere { r: 0.5 }, vec3(0.0, 0.0, 0.0));
        body.pre_step = Some(Box::new(|b: &mut Body| b.velocity = vec3(1.0, 0.0, 0.0)));
        body.post_step = Some(Box::new(|b: &mut Body| b.torque = vec3(0.0, 0.0, 7.0)));
        let id = w.add_body(body).unwrap();
        w.step(Some(0.5)).unwrap();
        let b = w.body(id).unwrap();
        assert!((b.position.x - 0.5).abs() < 1e-4);
        assert_eq!(b.torque, vec3(0.0, 0.0, 7.0));
        assert!(b.pre_step.is_some());
    }

    #[test]
    fn profiling_fills_the_profile() {
        let mut w = WorldBuilder::new().with_profiling(true).build();
        w.add_body(Body::dynamic(1.0, Shape::Sphere { r: 0.5 }, vec3(0.0, 1.0, 0.0))).unwrap();
        w.step(None).unwrap();
        assert_eq!(w.last_profile().total(), w.last_profile().broadphase
            + w.last_profile().narrowphase + w.last_profile().solve + w.last_profile().integrate);
        let mut quiet = WorldBuilder::new().build();
        quiet.step(None).unwrap();
        assert_eq!(quiet.last_profile(), StepProfile::default());
    }
}
