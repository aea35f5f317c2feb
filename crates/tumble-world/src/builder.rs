use tumble_core::{Scalar, Vec3};
use tumble_collision::{Broadphase, ContactGenerator, NaiveBroadphase, Narrowphase, SapBroadphase};
use tumble_solver::{GsSolver, Solver};

use crate::config::{BroadphaseKind, WorldConfig};
use crate::world::World;

/* ---------------- Builder ---------------- */
pub struct WorldBuilder {
    pub config: WorldConfig,
    pub bodies: usize,
    broadphase: Option<Box<dyn Broadphase>>,
    narrowphase: Option<Box<dyn ContactGenerator>>,
    solver: Option<Box<dyn Solver>>,
}

impl WorldBuilder {
    pub fn new() -> Self { Self::from_config(WorldConfig::default()) }

    pub fn from_config(config: WorldConfig) -> Self {
        Self { config, bodies: 128, broadphase: None, narrowphase: None, solver: None }
    }

    pub fn with_gravity(mut self, g: Vec3) -> Self { self.config.gravity = g.to_array(); self }
    pub fn with_allow_sleep(mut self, allow: bool) -> Self { self.config.allow_sleep = allow; self }

    /// Renormalize every `skip + 1` steps, optionally with the fast approximation.
    pub fn with_quat_normalize(mut self, skip: u32, fast: bool) -> Self {
        self.config.quat_normalize_skip = skip;
        self.config.quat_normalize_fast = fast;
        self
    }

    pub fn with_default_dt(mut self, dt: Scalar) -> Self { self.config.default_dt = dt; self }
    pub fn with_profiling(mut self, on: bool) -> Self { self.config.profiling = on; self }

    pub fn with_solver_iterations(mut self, iterations: usize, tolerance: Scalar) -> Self {
        self.config.solver_iterations = iterations;
        self.config.solver_tolerance = tolerance;
        self
    }

    pub fn with_default_material(mut self, friction: Scalar, restitution: Scalar) -> Self {
        self.config.default_friction = friction;
        self.config.default_restitution = restitution;
        self
    }

    pub fn with_capacity(mut self, bodies: usize) -> Self { self.bodies = bodies; self }

    /// Overrides the broadphase chosen by the config.
    pub fn with_broadphase(mut self, bp: Box<dyn Broadphase>) -> Self { self.broadphase = Some(bp); self }
    pub fn with_contact_generator(mut self, np: Box<dyn ContactGenerator>) -> Self { self.narrowphase = Some(np); self }
    pub fn with_solver(mut self, solver: Box<dyn Solver>) -> Self { self.solver = Some(solver); self }

    pub fn build(self) -> World {
        let cfg = self.config;
        let broadphase: Box<dyn Broadphase> = match (self.broadphase, cfg.broadphase) {
            (Some(bp), _) => bp,
            (None, BroadphaseKind::Naive) => Box::new(NaiveBroadphase::new()),
            (None, BroadphaseKind::Sap) => {
                let mut sap = SapBroadphase::new();
                sap.auto_detect_axis = true;
                Box::new(sap)
            }
        };
        let narrowphase: Box<dyn ContactGenerator> = match self.narrowphase {
            Some(np) => np,
            None => Box::new(Narrowphase::new()),
        };
        let solver: Box<dyn Solver> = match self.solver {
            Some(s) => s,
            None => Box::new(GsSolver::new(cfg.solver_iterations, cfg.solver_tolerance)),
        };
        World::from_parts(cfg, self.bodies, broadphase, narrowphase, solver)
    }
}

impl Default for WorldBuilder {
    fn default() -> Self { Self::new() }
}
