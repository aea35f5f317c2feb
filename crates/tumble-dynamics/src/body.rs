use core::fmt;

use tumble_core::types::{Mat3, Vec3};
use tumble_core::{BodyId, MaterialId, Quat, Scalar, WorldId};
use tumble_geom::{Aabb, Shape};

use crate::integrate::{integrate_quat, normalize_quat_fast};
use crate::motion::{MotionState, SleepState, SleepTransition};

/// Per-body hook run by the world before or after integration.
pub type StepCallback = Box<dyn FnMut(&mut Body) + Send>;

/// A shape attached to a body at a fixed local pose.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    pub offset: Vec3,
    pub orientation: Quat,
}

impl Collider {
    pub fn new(shape: Shape) -> Self { Self { shape, offset: Vec3::ZERO, orientation: Quat::IDENTITY } }

    #[inline] pub fn world_position(&self, body_pos: Vec3, body_rot: Quat) -> Vec3 {
        body_pos + body_rot * self.offset
    }
    #[inline] pub fn world_orientation(&self, body_rot: Quat) -> Quat { body_rot * self.orientation }
}

/// Input descriptor when creating a body.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub position: Vec3,
    pub velocity: Vec3,
    pub quaternion: Quat,
    pub angular_velocity: Vec3,
    pub mass: Scalar,
    /// Defaults to `Dynamic` when mass > 0, else `Static`.
    pub motion: Option<MotionState>,
    pub linear_damping: Scalar,
    pub angular_damping: Scalar,
    pub allow_sleep: bool,
    pub sleep_speed_limit: Scalar,
    pub sleep_time_limit: Scalar,
    pub collision_filter_group: u32,
    pub collision_filter_mask: u32,
    pub collision_response: bool,
    pub material: Option<MaterialId>,
    pub fixed_rotation: bool,
    pub has_rotational_dof: bool,
    pub shapes: Vec<Collider>,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            quaternion: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            mass: 0.0,
            motion: None,
            linear_damping: 0.01,
            angular_damping: 0.01,
            allow_sleep: true,
            sleep_speed_limit: 0.1,
            sleep_time_limit: 1.0,
            collision_filter_group: 1,
            collision_filter_mask: u32::MAX,
            collision_response: true,
            material: None,
            fixed_rotation: false,
            has_rotational_dof: true,
            shapes: Vec::new(),
        }
    }
}

/// A rigid body.
///
/// Kinematic state lives in the public fields. The `init_*` fields hold the
/// state the body was created with; the world copies them into the live
/// fields when the body is added and when it is reset.
pub struct Body {
    id: BodyId,
    index: usize,
    world: Option<WorldId>,

    /// Live position. `World::add_body` overwrites it with `init_position`,
    /// so set the initial pose through `init_*` or `BodyDesc` before adding.
    pub position: Vec3,
    /// Live velocity; replaced by `init_velocity` on `World::add_body`.
    pub velocity: Vec3,
    /// Replaced by `init_quaternion` on `World::add_body` when the body has
    /// rotational freedom.
    pub quaternion: Quat,
    pub angular_velocity: Vec3,
    pub init_position: Vec3,
    pub init_velocity: Vec3,
    pub init_quaternion: Quat,
    pub init_angular_velocity: Vec3,
    pub previous_position: Vec3,
    pub previous_quaternion: Quat,
    pub interpolated_position: Vec3,
    pub interpolated_quaternion: Quat,

    pub force: Vec3,
    pub torque: Vec3,

    pub mass: Scalar,
    pub inv_mass: Scalar,
    /// Diagonal of the local inertia tensor.
    pub inertia: Vec3,
    pub inv_inertia: Vec3,
    pub inertia_world: Mat3,
    pub inv_inertia_world: Mat3,
    pub auto_update_inertia_world: bool,
    pub fixed_rotation: bool,
    pub has_rotational_dof: bool,

    pub motion: MotionState,
    pub linear_damping: Scalar,
    pub angular_damping: Scalar,

    pub allow_sleep: bool,
    pub sleep_state: SleepState,
    pub sleep_speed_limit: Scalar,
    pub sleep_time_limit: Scalar,
    pub time_last_sleepy: Scalar,
    /// Set during contact synthesis when a fast body touches this sleeping one.
    pub wake_up_after_narrowphase: bool,

    pub collision_filter_group: u32,
    pub collision_filter_mask: u32,
    pub collision_response: bool,
    pub material: Option<MaterialId>,

    pub shapes: Vec<Collider>,
    pub aabb: Aabb,
    pub aabb_needs_update: bool,
    pub bounding_radius: Scalar,

    pub pre_step: Option<StepCallback>,
    pub post_step: Option<StepCallback>,
}

impl Body {
    pub fn new(desc: BodyDesc) -> Self {
        let motion = desc.motion.unwrap_or(if desc.mass > 0.0 { MotionState::Dynamic } else { MotionState::Static });
        let mut b = Body {
            id: BodyId(u32::MAX),
            index: 0,
            world: None,
            position: desc.position,
            velocity: desc.velocity,
            quaternion: desc.quaternion,
            angular_velocity: desc.angular_velocity,
            init_position: desc.position,
            init_velocity: desc.velocity,
            init_quaternion: desc.quaternion,
            init_angular_velocity: desc.angular_velocity,
            previous_position: desc.position,
            previous_quaternion: desc.quaternion,
            interpolated_position: desc.position,
            interpolated_quaternion: desc.quaternion,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            mass: desc.mass,
            inv_mass: 0.0,
            inertia: Vec3::ZERO,
            inv_inertia: Vec3::ZERO,
            inertia_world: Mat3::ZERO,
            inv_inertia_world: Mat3::ZERO,
            auto_update_inertia_world: true,
            fixed_rotation: desc.fixed_rotation,
            has_rotational_dof: desc.has_rotational_dof,
            motion,
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            allow_sleep: desc.allow_sleep,
            sleep_state: SleepState::Awake,
            sleep_speed_limit: desc.sleep_speed_limit,
            sleep_time_limit: desc.sleep_time_limit,
            time_last_sleepy: 0.0,
            wake_up_after_narrowphase: false,
            collision_filter_group: desc.collision_filter_group,
            collision_filter_mask: desc.collision_filter_mask,
            collision_response: desc.collision_response,
            material: desc.material,
            shapes: desc.shapes,
            aabb: Aabb::default(),
            aabb_needs_update: true,
            bounding_radius: 0.0,
            pre_step: None,
            post_step: None,
        };
        b.update_mass_properties();
        b.update_bounding_radius();
        b
    }

    /// Dynamic body with a single shape at its origin.
    pub fn dynamic(mass: Scalar, shape: Shape, position: Vec3) -> Self {
        Body::new(BodyDesc { mass, position, shapes: vec![Collider::new(shape)], ..Default::default() })
    }

    /// Static body with a single shape at its origin.
    pub fn fixed(shape: Shape, position: Vec3) -> Self {
        Body::new(BodyDesc { position, shapes: vec![Collider::new(shape)], ..Default::default() })
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.add_shape(Collider::new(shape));
        self
    }

    pub fn add_shape(&mut self, collider: Collider) -> &mut Self {
        self.shapes.push(collider);
        self.update_mass_properties();
        self.update_bounding_radius();
        self.aabb_needs_update = true;
        self
    }

    /* ---------- registry slot ---------- */
    #[inline] pub fn id(&self) -> BodyId { self.id }
    /// Position in the owning world's dense body list.
    #[inline] pub fn index(&self) -> usize { self.index }
    #[inline] pub fn world(&self) -> Option<WorldId> { self.world }

    /// Called by the owning world on admission.
    pub fn attach(&mut self, world: WorldId, id: BodyId, index: usize) {
        self.world = Some(world);
        self.id = id;
        self.index = index;
    }
    /// Called by the owning world on removal.
    pub fn detach(&mut self) { self.world = None; }
    /// Called by the owning world when the dense list is compacted.
    #[inline] pub fn set_index(&mut self, index: usize) { self.index = index; }

    /* ---------- motion ---------- */
    #[inline] pub fn is_dynamic(&self) -> bool { self.motion == MotionState::Dynamic }
    #[inline] pub fn is_static(&self) -> bool { self.motion == MotionState::Static }
    #[inline] pub fn is_kinematic(&self) -> bool { self.motion == MotionState::Kinematic }
    #[inline] pub fn is_movable(&self) -> bool { self.motion.is_movable() }

    /// Recomputes inverse mass and inertia from mass, motion state and shapes.
    pub fn update_mass_properties(&mut self) {
        self.inv_mass = if self.mass > 0.0 && self.is_dynamic() { 1.0 / self.mass } else { 0.0 };
        self.inertia = self.shapes.iter().fold(Vec3::ZERO, |acc, c| {
            // parallel-axis term for offset shapes
            let d2 = c.offset.length_squared();
            acc + c.shape.local_inertia(self.mass) + Vec3::splat(self.mass * d2) - self.mass * c.offset * c.offset
        });
        self.inv_inertia = if self.fixed_rotation || self.inv_mass == 0.0 {
            Vec3::ZERO
        } else {
            Vec3::new(recip_or_zero(self.inertia.x), recip_or_zero(self.inertia.y), recip_or_zero(self.inertia.z))
        };
        self.update_inertia_world(true);
    }

    /// World-frame inertia: R · diag(I) · Rᵀ. Skipped for isotropic inertia
    /// unless `force` is set, since rotation leaves it unchanged.
    pub fn update_inertia_world(&mut self, force: bool) {
        let i = self.inv_inertia;
        if !force && i.x == i.y && i.y == i.z { return; }
        let r = Mat3::from_quat(self.quaternion);
        let rt = r.transpose();
        self.inertia_world = r * Mat3::from_diagonal(self.inertia.into()) * rt;
        self.inv_inertia_world = r * Mat3::from_diagonal(i.into()) * rt;
    }

    /// Inverse mass seen by the solver; zero while asleep or when not dynamic.
    #[inline]
    pub fn inv_mass_solve(&self) -> Scalar {
        if self.sleep_state == SleepState::Sleeping || !self.is_dynamic() { 0.0 } else { self.inv_mass }
    }

    #[inline]
    pub fn inv_inertia_world_solve(&self) -> Mat3 {
        if self.sleep_state == SleepState::Sleeping || !self.is_dynamic() || !self.has_rotational_dof {
            Mat3::ZERO
        } else {
            self.inv_inertia_world
        }
    }

    /* ---------- forces ---------- */
    /// Force at a point given relative to the center of mass, in world frame.
    pub fn apply_force(&mut self, force: Vec3, relative_point: Vec3) {
        if !self.is_dynamic() { return; }
        if self.sleep_state == SleepState::Sleeping { self.wake_up(); }
        self.force += force;
        self.torque += relative_point.cross(force);
    }

    pub fn apply_torque(&mut self, torque: Vec3) {
        if !self.is_dynamic() { return; }
        if self.sleep_state == SleepState::Sleeping { self.wake_up(); }
        self.torque += torque;
    }

    /// Instantaneous velocity change from an impulse at a relative point.
    pub fn apply_impulse(&mut self, impulse: Vec3, relative_point: Vec3) {
        if !self.is_dynamic() { return; }
        if self.sleep_state == SleepState::Sleeping { self.wake_up(); }
        self.velocity += impulse * self.inv_mass;
        if self.has_rotational_dof {
            self.angular_velocity += self.inv_inertia_world * relative_point.cross(impulse);
        }
    }

    #[inline]
    pub fn velocity_at_world_point(&self, point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(point - self.position)
    }

    #[inline] pub fn point_to_world_frame(&self, local: Vec3) -> Vec3 { self.position + self.quaternion * local }
    #[inline] pub fn point_to_local_frame(&self, world: Vec3) -> Vec3 { self.quaternion.inverse() * (world - self.position) }

    #[inline]
    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /* ---------- sleep ---------- */
    #[inline] pub fn is_sleeping(&self) -> bool { self.sleep_state == SleepState::Sleeping }
    #[inline] pub fn is_awake(&self) -> bool { self.sleep_state == SleepState::Awake }

    /// Returns `Woke` only when the body was actually asleep.
    pub fn wake_up(&mut self) -> Option<SleepTransition> {
        let prev = self.sleep_state;
        self.sleep_state = SleepState::Awake;
        self.wake_up_after_narrowphase = false;
        (prev == SleepState::Sleeping).then_some(SleepTransition::Woke)
    }

    pub fn sleep(&mut self) {
        self.sleep_state = SleepState::Sleeping;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.wake_up_after_narrowphase = false;
    }

    /// Advances the awake → sleepy → sleeping machine given the world time.
    pub fn sleep_tick(&mut self, time: Scalar) -> Option<SleepTransition> {
        if !self.allow_sleep || self.is_static() { return None; }
        let speed2 = self.velocity.length_squared() + self.angular_velocity.length_squared();
        let limit2 = self.sleep_speed_limit * self.sleep_speed_limit;
        match self.sleep_state {
            SleepState::Awake if speed2 < limit2 => {
                self.sleep_state = SleepState::Sleepy;
                self.time_last_sleepy = time;
                Some(SleepTransition::Sleepy)
            }
            SleepState::Sleepy if speed2 > limit2 => self.wake_up(),
            SleepState::Sleepy if time - self.time_last_sleepy > self.sleep_time_limit => {
                self.sleep();
                Some(SleepTransition::Asleep)
            }
            _ => None,
        }
    }

    /* ---------- stepping ---------- */
    pub fn apply_damping(&mut self, dt: Scalar) {
        if !self.is_dynamic() { return; }
        self.velocity *= (1.0 - self.linear_damping).powf(dt);
        if self.has_rotational_dof {
            self.angular_velocity *= (1.0 - self.angular_damping).powf(dt);
        }
    }

    /// Semi-implicit Euler: velocity from force first, then pose from the new
    /// velocity. Sleeping and static bodies are left untouched.
    pub fn integrate(&mut self, dt: Scalar, normalize: bool, fast_normalize: bool) {
        self.previous_position = self.position;
        self.previous_quaternion = self.quaternion;
        if !self.is_movable() || self.is_sleeping() { return; }

        self.velocity += self.force * (self.inv_mass * dt);
        self.position += self.velocity * dt;

        if self.has_rotational_dof {
            self.angular_velocity += self.inv_inertia_world * self.torque * dt;
            self.quaternion = integrate_quat(self.quaternion, self.angular_velocity, dt);
            if normalize {
                self.quaternion = if fast_normalize { normalize_quat_fast(self.quaternion) } else { self.quaternion.normalize() };
            }
        }
        self.aabb_needs_update = true;
    }

    /* ---------- geometry ---------- */
    pub fn update_bounding_radius(&mut self) {
        self.bounding_radius = self.shapes.iter()
            .map(|c| c.offset.length() + c.shape.bounding_radius())
            .fold(0.0, Scalar::max);
    }

    /// Recomputes the cached world AABB from the attached shapes.
    pub fn update_aabb(&mut self) {
        let mut acc: Option<Aabb> = None;
        for c in &self.shapes {
            let bb = c.shape.aabb(c.world_position(self.position, self.quaternion), c.world_orientation(self.quaternion));
            acc = Some(match acc { Some(a) => a.union(&bb), None => bb });
        }
        self.aabb = acc.unwrap_or(Aabb::new(self.position, self.position));
        self.aabb_needs_update = false;
    }

    /// Restores the initial kinematic state and wakes the body.
    pub fn reset_to_initial(&mut self) {
        self.position = self.init_position;
        self.velocity = self.init_velocity;
        self.quaternion = self.init_quaternion;
        self.angular_velocity = self.init_angular_velocity;
        self.previous_position = self.position;
        self.previous_quaternion = self.quaternion;
        self.interpolated_position = self.position;
        self.interpolated_quaternion = self.quaternion;
        self.clear_forces();
        self.wake_up();
        self.aabb_needs_update = true;
        self.update_inertia_world(true);
    }
}

#[inline]
fn recip_or_zero(x: Scalar) -> Scalar { if x > 0.0 { 1.0 / x } else { 0.0 } }

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("motion", &self.motion)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("quaternion", &self.quaternion)
            .field("angular_velocity", &self.angular_velocity)
            .field("mass", &self.mass)
            .field("sleep_state", &self.sleep_state)
            .field("shapes", &self.shapes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tumble_core::vec3;

    fn ball() -> Body { Body::dynamic(2.0, Shape::Sphere { r: 0.5 }, vec3(0.0, 1.0, 0.0)) }

    #[test]
    fn mass_determines_motion() {
        assert!(ball().is_dynamic());
        assert!(Body::fixed(Shape::Plane, Vec3::ZERO).is_static());
        assert_eq!(Body::fixed(Shape::Plane, Vec3::ZERO).inv_mass, 0.0);
        assert_relative_eq!(ball().inv_mass, 0.5);
    }

    #[test]
    fn leapfrog_order() {
        let mut b = ball();
        b.force = vec3(0.0, -2.0, 0.0);
        b.integrate(0.5, true, false);
        // v = -2 * 0.5 * 0.5, x = 1 + v * 0.5
        assert_relative_eq!(b.velocity.y, -0.5);
        assert_relative_eq!(b.position.y, 0.75);
        assert!(b.aabb_needs_update);
    }

    #[test]
    fn sleeping_body_does_not_move() {
        let mut b = ball();
        b.velocity = vec3(1.0, 0.0, 0.0);
        b.sleep();
        b.force = vec3(10.0, 0.0, 0.0);
        b.integrate(1.0, true, false);
        assert_eq!(b.position, vec3(0.0, 1.0, 0.0));
        assert_eq!(b.inv_mass_solve(), 0.0);
    }

    #[test]
    fn sleep_machine() {
        let mut b = ball();
        b.velocity = vec3(0.01, 0.0, 0.0);
        assert_eq!(b.sleep_tick(0.0), Some(SleepTransition::Sleepy));
        assert_eq!(b.sleep_tick(0.5), None);
        assert_eq!(b.sleep_tick(1.5), Some(SleepTransition::Asleep));
        assert!(b.is_sleeping());
        assert_eq!(b.velocity, Vec3::ZERO);
        assert_eq!(b.wake_up(), Some(SleepTransition::Woke));
        assert_eq!(b.wake_up(), None);
    }

    #[test]
    fn sleepy_body_wakes_when_fast() {
        let mut b = ball();
        assert_eq!(b.sleep_tick(0.0), Some(SleepTransition::Sleepy));
        b.velocity = vec3(5.0, 0.0, 0.0);
        // leaving Sleepy is not a reportable wake-up
        assert_eq!(b.sleep_tick(0.1), None);
        assert!(b.is_awake());
    }

    #[test]
    fn damping_scales_velocity() {
        let mut b = ball();
        b.linear_damping = 0.5;
        b.velocity = vec3(4.0, 0.0, 0.0);
        b.apply_damping(2.0);
        assert_relative_eq!(b.velocity.x, 1.0);
    }

    #[test]
    fn world_inertia_follows_rotation() {
        let mut b = Body::dynamic(12.0, Shape::half_extents(1.0, 0.5, 0.5), Vec3::ZERO);
        let before = b.inv_inertia_world;
        b.quaternion = Quat::from_rotation_z(core::f32::consts::FRAC_PI_2);
        b.update_inertia_world(false);
        assert_relative_eq!(b.inv_inertia_world.x_axis.x, before.y_axis.y, epsilon = 1e-5);
        assert_relative_eq!(b.inv_inertia_world.y_axis.y, before.x_axis.x, epsilon = 1e-5);
    }

    #[test]
    fn aabb_covers_offset_shapes() {
        let mut b = ball();
        b.add_shape(Collider { shape: Shape::Sphere { r: 0.5 }, offset: vec3(2.0, 0.0, 0.0), orientation: Quat::IDENTITY });
        b.update_aabb();
        assert_relative_eq!(b.aabb.max.x, 2.5);
        assert_relative_eq!(b.aabb.min.x, -0.5);
        assert!(!b.aabb_needs_update);
        assert_relative_eq!(b.bounding_radius, 2.5);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut b = ball();
        b.velocity = vec3(3.0, 0.0, 0.0);
        b.integrate(1.0, true, false);
        b.reset_to_initial();
        assert_eq!(b.position, b.init_position);
        assert_eq!(b.velocity, Vec3::ZERO);
    }

    #[test]
    fn off_center_force_adds_torque_and_wakes() {
        let mut b = ball();
        b.sleep();
        b.apply_force(vec3(0.0, 0.0, 4.0), vec3(1.0, 0.0, 0.0));
        assert!(b.is_awake());
        assert_eq!(b.force, vec3(0.0, 0.0, 4.0));
        assert_eq!(b.torque, vec3(0.0, -4.0, 0.0));
    }

    #[test]
    fn static_body_ignores_loads() {
        let mut ground = Body::fixed(Shape::Plane, Vec3::ZERO);
        ground.apply_force(vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0));
        ground.apply_torque(vec3(0.0, 3.0, 0.0));
        ground.apply_impulse(vec3(1.0, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(ground.force, Vec3::ZERO);
        assert_eq!(ground.torque, Vec3::ZERO);
        assert_eq!(ground.velocity, Vec3::ZERO);

        let mut b = ball();
        b.sleep();
        b.apply_torque(vec3(0.0, 3.0, 0.0));
        assert!(b.is_awake());
        assert_eq!(b.torque, vec3(0.0, 3.0, 0.0));
    }

    #[test]
    fn impulse_changes_velocity_directly() {
        let mut b = ball();
        b.sleep();
        b.apply_impulse(vec3(2.0, 0.0, 0.0), vec3(0.0, 0.5, 0.0));
        assert!(b.is_awake());
        assert_relative_eq!(b.velocity.x, 1.0);
        // I = 2/5 m r² = 0.2, r × J = (0, 0, -1)
        assert_relative_eq!(b.angular_velocity.z, -5.0, epsilon = 1e-5);
        assert_eq!(b.force, Vec3::ZERO);
    }

    #[test]
    fn frames_round_trip_on_a_rotated_body() {
        let mut b = ball();
        b.position = vec3(1.0, 2.0, 3.0);
        b.quaternion = Quat::from_rotation_z(core::f32::consts::FRAC_PI_2);
        let w = b.point_to_world_frame(vec3(1.0, 0.0, 0.0));
        assert_relative_eq!(w.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(w.y, 3.0, epsilon = 1e-5);
        assert_relative_eq!(w.z, 3.0, epsilon = 1e-5);
        let back = b.point_to_local_frame(w);
        assert_relative_eq!(back.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(back.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn with_shape_refreshes_mass_properties() {
        let bare = Body::new(BodyDesc { mass: 2.0, ..Default::default() });
        assert_eq!(bare.inv_inertia, Vec3::ZERO);
        assert_eq!(bare.bounding_radius, 0.0);
        let b = bare.with_shape(Shape::Sphere { r: 1.0 });
        assert_eq!(b.shapes.len(), 1);
        assert_relative_eq!(b.bounding_radius, 1.0);
        assert_relative_eq!(b.inertia.x, 0.8);
        assert_relative_eq!(b.inv_inertia.y, 1.25);
        assert!(b.aabb_needs_update);
    }

    #[test]
    fn no_rotational_freedom_keeps_orientation() {
        let mut b = ball();
        b.has_rotational_dof = false;
        b.angular_damping = 0.5;
        b.angular_velocity = vec3(0.0, 1.0, 0.0);
        b.torque = vec3(0.0, 0.0, 3.0);
        b.apply_damping(1.0);
        b.integrate(0.5, true, false);
        assert_eq!(b.angular_velocity, vec3(0.0, 1.0, 0.0));
        assert_eq!(b.quaternion, Quat::IDENTITY);
        assert_eq!(b.inv_inertia_world_solve(), Mat3::ZERO);
        b.apply_impulse(vec3(1.0, 0.0, 0.0), vec3(0.0, 0.5, 0.0));
        assert_eq!(b.angular_velocity, vec3(0.0, 1.0, 0.0));
        assert_relative_eq!(b.velocity.x, 0.5);
    }
}
