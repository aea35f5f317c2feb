//! Rigid-body world: body registry, material pairs and the fixed 14-phase
//! step pipeline.
//!
//! ```no_run
//! use tumble_world::{Body, Shape, WorldBuilder, vec3};
//!
//! let mut world = WorldBuilder::new().build();
//! world.add_body(Body::fixed(Shape::Plane, vec3(0.0, 0.0, 0.0))).unwrap();
//! let ball = world.add_body(Body::dynamic(1.0, Shape::Sphere { r: 0.5 }, vec3(0.0, 5.0, 0.0))).unwrap();
//! for _ in 0..60 {
//!     world.step(Some(1.0 / 60.0)).unwrap();
//! }
//! println!("{:?}", world.body(ball).map(|b| b.position));
//! ```

mod config;
mod events;
mod builder;
mod world;
mod step;

pub use config::{BroadphaseKind, WorldConfig};
pub use events::{BodyEvent, CollideEvent, ContactEvent, SleepEvent, StepEvent};
pub use builder::WorldBuilder;
pub use world::{Subsystem, World};

pub use tumble_core::{
    BodyId, BoxError, ConstraintId, ContactMaterialId, EventBus, ListenerId, MaterialId, Quat, Scalar,
    StepProfile, StepStage, StepStats, Vec3, WorldError, vec3,
};
pub use tumble_collision::{Broadphase, CollisionMatrix, ContactGenerator, NaiveBroadphase, Narrowphase, PairBuffer, SapBroadphase};
pub use tumble_dynamics::{Body, BodyDesc, Collider, MotionState, SleepState, SleepTransition};
pub use tumble_geom::Shape;
pub use tumble_materials::{ContactMaterial, Material, MaterialPairTable};
pub use tumble_solver::{Constraint, ContactEquation, DistanceConstraint, EquationPool, FrictionEquation, GsSolver, Solver};
