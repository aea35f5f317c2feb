pub mod broadphase;
pub mod sap;
pub mod matrix;
pub mod narrowphase;

pub use broadphase::{Broadphase, NaiveBroadphase, PairBuffer, needs_collision};
pub use sap::SapBroadphase;
pub use matrix::CollisionMatrix;
pub use narrowphase::{ContactGenerator, ContactPoint, Narrowphase};
