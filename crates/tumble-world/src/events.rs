use tumble_core::{BodyId, Scalar};
use tumble_dynamics::SleepTransition;
use tumble_solver::ContactEquation;

/// Payload of the add-body and remove-body events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BodyEvent { pub body: BodyId }

/// Payload of the pre-step and post-step events.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepEvent {
    pub dt: Scalar,
    pub time: Scalar,
    pub step_number: u64,
}

/// Delivered to `body` when it starts touching `other`. The contact's body
/// indices refer to the world's dense list at the time of the step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollideEvent {
    pub body: BodyId,
    pub other: BodyId,
    pub contact: ContactEquation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SleepEvent {
    pub body: BodyId,
    pub transition: SleepTransition,
}

/// World-wide begin/end notifications, one per pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContactEvent {
    Begin { a: BodyId, b: BodyId },
    End { a: BodyId, b: BodyId },
}
