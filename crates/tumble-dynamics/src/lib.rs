pub mod motion;
pub mod body;
pub mod integrate;

pub use motion::{MotionState, SleepState, SleepTransition};
pub use body::{Body, BodyDesc, Collider, StepCallback};
pub use integrate::{integrate_quat, normalize_quat_fast};
