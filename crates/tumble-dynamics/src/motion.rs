use serde::{Deserialize, Serialize};

/// How a body participates in the simulation. The discriminants are bit flags
/// so that sets of states can be tested with a mask.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MotionState {
    /// Moved by forces and contacts.
    Dynamic = 1,
    /// Never moves; infinite mass.
    Static = 2,
    /// Moved only by its own velocity; infinite mass towards contacts.
    Kinematic = 4,
}

impl MotionState {
    pub const MOVABLE: u8 = MotionState::Dynamic as u8 | MotionState::Kinematic as u8;

    #[inline] pub fn bits(self) -> u8 { self as u8 }
    #[inline] pub fn is_movable(self) -> bool { self.bits() & Self::MOVABLE != 0 }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum SleepState {
    #[default]
    Awake,
    /// Slow for less than the sleep time limit.
    Sleepy,
    /// Excluded from integration until woken.
    Sleeping,
}

/// Reported by `Body::sleep_tick` and `Body::wake_up` when observers care.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SleepTransition {
    Sleepy,
    Asleep,
    Woke,
}
