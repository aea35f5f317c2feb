use thiserror::Error;
use crate::{Scalar, StepStage};

/// Error type produced by pluggable collaborators (broadphase, narrowphase, solver).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum WorldError {
    /// Registry misuse, e.g. adding a body that already lives in a world.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid time step {0}; must be finite and positive")]
    InvalidTimeStep(Scalar),

    #[error("invalid world config: {0}")]
    Config(String),

    /// A collaborator failed; the step was abandoned in the given stage.
    #[error("{stage} failed: {source}")]
    Collaborator {
        stage: StepStage,
        #[source]
        source: BoxError,
    },
}

impl WorldError {
    pub fn collaborator(stage: StepStage) -> impl FnOnce(BoxError) -> WorldError {
        move |source| WorldError::Collaborator { stage, source }
    }
}
