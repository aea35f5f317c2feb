pub mod scalar;
pub mod ids;
pub mod types;
pub mod hash;
pub mod time;
pub mod schedule;
pub mod error;
pub mod event;
pub mod pairs;

pub use scalar::Scalar;
pub use ids::{BodyId, ConstraintId, ContactMaterialId, ListenerId, MaterialId, WorldId};
pub use types::{Vec3, Mat3, vec3, quat_identity};
pub use hash::{StepHasher, hash_vec3, hash_quat, hash_scalar};
pub use time::{StepStats, StepProfile};
pub use schedule::{StepStage, ScheduleRecorder, schedule_digest};
pub use error::{BoxError, WorldError};
pub use event::EventBus;
pub use pairs::{SymmetricMatrix, canonical_pair};
pub use glam::Quat;
