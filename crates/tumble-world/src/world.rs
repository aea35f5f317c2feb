use std::collections::BTreeMap;

use tracing::{debug, warn};
use tumble_core::{
    BodyId, ConstraintId, ContactMaterialId, EventBus, ListenerId, MaterialId, Scalar, ScheduleRecorder,
    StepHasher, StepProfile, StepStage, StepStats, Vec3, WorldError, WorldId, hash_quat, hash_scalar, hash_vec3,
};
use tumble_collision::{Broadphase, CollisionMatrix, ContactGenerator, PairBuffer};
use tumble_dynamics::Body;
use tumble_materials::{ContactMaterial, Material, MaterialPairTable};
use tumble_solver::{Constraint, ContactEquation, EquationPool, FrictionEquation, Solver, body_index};

use crate::config::WorldConfig;
use crate::events::{BodyEvent, CollideEvent, ContactEvent, SleepEvent, StepEvent};

/// A host-provided system updated once per step, right after gravity.
pub trait Subsystem: Send {
    fn update(&mut self);
}

/* ---------------- World ---------------- */
pub struct World {
    pub(crate) id: WorldId,
    pub(crate) config: WorldConfig,
    pub(crate) gravity: Vec3,
    pub(crate) time: Scalar,
    pub(crate) step_number: u64,
    pub(crate) last_dt: Option<Scalar>,
    pub(crate) accumulator: Scalar,

    pub(crate) next_body_id: u32,
    pub(crate) next_constraint_id: u32,
    pub(crate) bodies: Vec<Body>,
    pub(crate) constraints: Vec<(ConstraintId, Box<dyn Constraint>)>,
    pub(crate) subsystems: Vec<Box<dyn Subsystem>>,

    pub(crate) materials: MaterialPairTable,
    pub(crate) default_contact_material: ContactMaterial,

    pub(crate) broadphase: Box<dyn Broadphase>,
    pub(crate) narrowphase: Box<dyn ContactGenerator>,
    pub(crate) solver: Box<dyn Solver>,

    // per-step scratch, reused across steps
    pub(crate) collision_matrix: CollisionMatrix,
    pub(crate) pairs: PairBuffer,
    pub(crate) excluded_pairs: Vec<(usize, usize)>,
    pub(crate) contacts: Vec<ContactEquation>,
    pub(crate) frictions: Vec<FrictionEquation>,
    pub(crate) contact_pool: EquationPool<ContactEquation>,
    pub(crate) friction_pool: EquationPool<FrictionEquation>,

    pub(crate) add_body_events: EventBus<BodyEvent>,
    pub(crate) remove_body_events: EventBus<BodyEvent>,
    pub(crate) pre_step_events: EventBus<StepEvent>,
    pub(crate) post_step_events: EventBus<StepEvent>,
    pub(crate) sleep_events: EventBus<SleepEvent>,
    pub(crate) contact_events: EventBus<ContactEvent>,
    pub(crate) collide_listeners: BTreeMap<BodyId, EventBus<CollideEvent>>,
    pub(crate) body_event: BodyEvent,
    pub(crate) step_event: StepEvent,
    pub(crate) collide_event: CollideEvent,

    pub(crate) schedule: ScheduleRecorder,
    pub(crate) stats: StepStats,
    pub(crate) profile: StepProfile,
}

impl World {
    pub(crate) fn from_parts(
        config: WorldConfig,
        capacity: usize,
        broadphase: Box<dyn Broadphase>,
        narrowphase: Box<dyn ContactGenerator>,
        solver: Box<dyn Solver>,
    ) -> Self {
        Self {
            id: WorldId::next(),
            gravity: config.gravity_vec(),
            default_contact_material: config.default_contact_material(),
            config,
            time: 0.0,
            step_number: 0,
            last_dt: None,
            accumulator: 0.0,
            next_body_id: 0,
            next_constraint_id: 0,
            bodies: Vec::with_capacity(capacity),
            constraints: Vec::new(),
            subsystems: Vec::new(),
            materials: MaterialPairTable::new(),
            broadphase,
            narrowphase,
            solver,
            collision_matrix: CollisionMatrix::new(),
            pairs: PairBuffer::new(),
            excluded_pairs: Vec::new(),
            contacts: Vec::new(),
            frictions: Vec::new(),
            contact_pool: EquationPool::new(),
            friction_pool: EquationPool::new(),
            add_body_events: EventBus::new(),
            remove_body_events: EventBus::new(),
            pre_step_events: EventBus::new(),
            post_step_events: EventBus::new(),
            sleep_events: EventBus::new(),
            contact_events: EventBus::new(),
            collide_listeners: BTreeMap::new(),
            body_event: BodyEvent { body: BodyId(0) },
            step_event: StepEvent::default(),
            collide_event: CollideEvent { body: BodyId(0), other: BodyId(0), contact: ContactEquation::default() },
            schedule: ScheduleRecorder::new(),
            stats: StepStats::default(),
            profile: StepProfile::default(),
        }
    }

    /* ---------- registry ---------- */

    /// Admits a body, assigning its id and dense index. The body's initial
    /// state is copied into its live state.
    pub fn add_body(&mut self, mut body: Body) -> Result<BodyId, WorldError> {
        if let Some(owner) = body.world() {
            return Err(WorldError::InvalidState(format!("body {} already belongs to world {owner}", body.id())));
        }
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        let index = self.bodies.len();
        body.attach(self.id, id, index);

        body.position = body.init_position;
        body.previous_position = body.init_position;
        body.interpolated_position = body.init_position;
        body.velocity = body.init_velocity;
        if body.has_rotational_dof {
            body.quaternion = body.init_quaternion;
            body.previous_quaternion = body.init_quaternion;
            body.interpolated_quaternion = body.init_quaternion;
            body.angular_velocity = body.init_angular_velocity;
        }
        body.time_last_sleepy = self.time;
        body.update_inertia_world(true);
        body.aabb_needs_update = true;

        self.bodies.push(body);
        self.collision_matrix.resize(self.bodies.len());

        debug!(body = %id, index, "body added");
        self.body_event.body = id;
        self.add_body_events.dispatch(&self.body_event);
        Ok(id)
    }

    /// Removes a member body and hands it back detached. Later bodies shift
    /// down by one index; a non-member id is a no-op. Pairs the body was
    /// touching at the last step end with a `ContactEvent::End`.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let index = body_index(&self.bodies, id)?;
        let ended: Vec<ContactEvent> = if self.contact_events.has_listeners() {
            let matrix = &self.collision_matrix;
            self.bodies.iter().enumerate()
                .filter(|&(k, _)| k != index && matrix.get(index, k))
                .map(|(k, other)| if k < index {
                    ContactEvent::End { a: other.id(), b: id }
                } else {
                    ContactEvent::End { a: id, b: other.id() }
                })
                .collect()
        } else {
            Vec::new()
        };
        let mut body = self.bodies.remove(index);
        body.detach();
        for (k, b) in self.bodies.iter_mut().enumerate().skip(index) {
            b.set_index(k);
        }
        self.collision_matrix.remove_index(index);
        self.collide_listeners.remove(&id);
        // cached contacts hold dense indices that are now stale
        self.contact_pool.recycle(&mut self.contacts);
        self.friction_pool.recycle(&mut self.frictions);

        debug!(body = %id, index, "body removed");
        self.body_event.body = id;
        self.remove_body_events.dispatch(&self.body_event);
        for e in &ended {
            self.contact_events.dispatch(e);
        }
        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        let i = body_index(&self.bodies, id)?;
        self.bodies.get(i)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let i = body_index(&self.bodies, id)?;
        self.bodies.get_mut(i)
    }

    /// Dense body list, sorted by id.
    #[inline] pub fn bodies(&self) -> &[Body] { &self.bodies }
    #[inline] pub fn bodies_mut(&mut self) -> &mut [Body] { &mut self.bodies }
    #[inline] pub fn num_bodies(&self) -> usize { self.bodies.len() }

    /// Restores a body's initial state. Returns false for a non-member.
    pub fn reset_body(&mut self, id: BodyId) -> bool {
        match self.body_mut(id) {
            Some(b) => { b.reset_to_initial(); true }
            None => false,
        }
    }

    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) -> ConstraintId {
        let id = ConstraintId(self.next_constraint_id);
        self.next_constraint_id += 1;
        self.constraints.push((id, constraint));
        id
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> Option<Box<dyn Constraint>> {
        let pos = self.constraints.iter().position(|(cid, _)| *cid == id)?;
        Some(self.constraints.remove(pos).1)
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &dyn Constraint)> + '_ {
        self.constraints.iter().map(|(id, c)| (*id, c.as_ref()))
    }

    pub fn add_subsystem(&mut self, subsystem: Box<dyn Subsystem>) {
        self.subsystems.push(subsystem);
    }

    /* ---------- materials ---------- */
    pub fn add_material(&mut self, material: &mut Material) -> MaterialId {
        self.materials.add_material(material)
    }

    pub fn add_contact_material(&mut self, a: &mut Material, b: &mut Material, cm: ContactMaterial) -> ContactMaterialId {
        self.materials.add_contact_material(a, b, cm)
    }

    #[inline] pub fn materials(&self) -> &MaterialPairTable { &self.materials }
    #[inline] pub fn default_contact_material(&self) -> &ContactMaterial { &self.default_contact_material }
    pub fn set_default_contact_material(&mut self, cm: ContactMaterial) { self.default_contact_material = cm; }

    /* ---------- state ---------- */
    #[inline] pub fn id(&self) -> WorldId { self.id }
    #[inline] pub fn config(&self) -> &WorldConfig { &self.config }
    #[inline] pub fn time(&self) -> Scalar { self.time }
    #[inline] pub fn step_number(&self) -> u64 { self.step_number }
    #[inline] pub fn gravity(&self) -> Vec3 { self.gravity }
    pub fn set_gravity(&mut self, g: Vec3) { self.gravity = g; }

    /// Contacts generated by the last step, including non-penetrating ones.
    #[inline] pub fn contacts(&self) -> &[ContactEquation] { &self.contacts }
    #[inline] pub fn frictions(&self) -> &[FrictionEquation] { &self.frictions }
    #[inline] pub fn contact_pool(&self) -> &EquationPool<ContactEquation> { &self.contact_pool }
    #[inline] pub fn friction_pool(&self) -> &EquationPool<FrictionEquation> { &self.friction_pool }
    #[inline] pub fn collision_matrix(&self) -> &CollisionMatrix { &self.collision_matrix }
    #[inline] pub fn schedule(&self) -> &[StepStage] { self.schedule.stages() }
    #[inline] pub fn last_stats(&self) -> StepStats { self.stats }
    /// Phase timings of the last step; zero unless profiling is enabled.
    #[inline] pub fn last_profile(&self) -> StepProfile { self.profile }

    /// Whether two bodies were touching at the end of the last step.
    pub fn are_touching(&self, a: BodyId, b: BodyId) -> bool {
        match (body_index(&self.bodies, a), body_index(&self.bodies, b)) {
            (Some(i), Some(j)) => self.collision_matrix.get(i, j),
            _ => false,
        }
    }

    /* ---------- events ---------- */
    pub fn on_add_body(&mut self, f: impl FnMut(&BodyEvent) + Send + 'static) -> ListenerId {
        self.add_body_events.subscribe(f)
    }
    pub fn on_remove_body(&mut self, f: impl FnMut(&BodyEvent) + Send + 'static) -> ListenerId {
        self.remove_body_events.subscribe(f)
    }
    pub fn on_pre_step(&mut self, f: impl FnMut(&StepEvent) + Send + 'static) -> ListenerId {
        self.pre_step_events.subscribe(f)
    }
    pub fn on_post_step(&mut self, f: impl FnMut(&StepEvent) + Send + 'static) -> ListenerId {
        self.post_step_events.subscribe(f)
    }
    pub fn on_sleep(&mut self, f: impl FnMut(&SleepEvent) + Send + 'static) -> ListenerId {
        self.sleep_events.subscribe(f)
    }
    pub fn on_contact(&mut self, f: impl FnMut(&ContactEvent) + Send + 'static) -> ListenerId {
        self.contact_events.subscribe(f)
    }
    /// Listens for the first contact of `body` with any other body.
    /// Returns `None` for a non-member.
    pub fn on_collide(&mut self, body: BodyId, f: impl FnMut(&CollideEvent) + Send + 'static) -> Option<ListenerId> {
        body_index(&self.bodies, body)?;
        Some(self.collide_listeners.entry(body).or_default().subscribe(f))
    }

    #[inline] pub fn add_body_events(&mut self) -> &mut EventBus<BodyEvent> { &mut self.add_body_events }
    #[inline] pub fn remove_body_events(&mut self) -> &mut EventBus<BodyEvent> { &mut self.remove_body_events }
    #[inline] pub fn pre_step_events(&mut self) -> &mut EventBus<StepEvent> { &mut self.pre_step_events }
    #[inline] pub fn post_step_events(&mut self) -> &mut EventBus<StepEvent> { &mut self.post_step_events }
    #[inline] pub fn sleep_events(&mut self) -> &mut EventBus<SleepEvent> { &mut self.sleep_events }
    #[inline] pub fn contact_events(&mut self) -> &mut EventBus<ContactEvent> { &mut self.contact_events }
    pub fn collide_events(&mut self, body: BodyId) -> Option<&mut EventBus<CollideEvent>> {
        self.collide_listeners.get_mut(&body)
    }

    /* ---------- fixed-step driver ---------- */

    /// Runs as many `fixed_dt` steps as `frame_dt` of accumulated time allows,
    /// at most `max_sub_steps`, then interpolates every body's pose by the
    /// leftover fraction. Returns the number of steps taken.
    pub fn advance(&mut self, frame_dt: Scalar, fixed_dt: Scalar, max_sub_steps: u32) -> Result<u32, WorldError> {
        if !(fixed_dt.is_finite() && fixed_dt > 0.0) {
            return Err(WorldError::InvalidTimeStep(fixed_dt));
        }
        if !(frame_dt.is_finite() && frame_dt >= 0.0) {
            return Err(WorldError::InvalidTimeStep(frame_dt));
        }
        self.accumulator += frame_dt;
        let mut substeps = 0;
        while self.accumulator >= fixed_dt && substeps < max_sub_steps {
            self.step(Some(fixed_dt))?;
            self.accumulator -= fixed_dt;
            substeps += 1;
        }
        if self.accumulator >= fixed_dt {
            warn!(backlog = self.accumulator, fixed_dt, max_sub_steps, "dropping simulation backlog");
            self.accumulator %= fixed_dt;
        }
        let t = self.accumulator / fixed_dt;
        for b in &mut self.bodies {
            b.interpolated_position = b.previous_position.lerp(b.position, t);
            b.interpolated_quaternion = b.previous_quaternion.slerp(b.quaternion, t);
        }
        Ok(substeps)
    }

    /// Digest of the simulation state after the last step.
    pub fn step_hash(&self) -> [u8; 32] {
        let mut h = StepHasher::new();
        hash_scalar(&mut h, self.time);
        h.update_bytes(&self.step_number.to_le_bytes());
        h.update_bytes(&self.schedule.digest());
        for b in &self.bodies {
            h.update_bytes(&b.id().0.to_le_bytes());
            hash_vec3(&mut h, &b.position);
            hash_quat(&mut h, &b.quaternion);
            hash_vec3(&mut h, &b.velocity);
            hash_vec3(&mut h, &b.angular_velocity);
        }
        h.finalize()
    }
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("time", &self.time)
            .field("step_number", &self.step_number)
            .field("bodies", &self.bodies.len())
            .field("constraints", &self.constraints.len())
            .field("contacts", &self.contacts.len())
            .finish_non_exhaustive()
    }
}
