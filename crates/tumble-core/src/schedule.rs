use core::fmt;
use crate::StepHasher;

/// Phases of one world step, in execution order.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StepStage {
    ApplyGravity = 1,
    UpdateSubsystems = 2,
    Broadphase = 3,
    CollisionMatrixTick = 4,
    Narrowphase = 5,
    EquationSynthesis = 6,
    ConstraintGather = 7,
    Solve = 8,
    Damping = 9,
    PreStep = 10,
    Integrate = 11,
    PostStep = 12,
    WorldInertiaRefresh = 13,
    SleepTick = 14,
}

impl StepStage {
    pub const ORDER: [StepStage; 14] = [
        StepStage::ApplyGravity,
        StepStage::UpdateSubsystems,
        StepStage::Broadphase,
        StepStage::CollisionMatrixTick,
        StepStage::Narrowphase,
        StepStage::EquationSynthesis,
        StepStage::ConstraintGather,
        StepStage::Solve,
        StepStage::Damping,
        StepStage::PreStep,
        StepStage::Integrate,
        StepStage::PostStep,
        StepStage::WorldInertiaRefresh,
        StepStage::SleepTick,
    ];
}

impl fmt::Display for StepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(self, f) }
}

pub fn schedule_digest(stages: &[StepStage]) -> [u8; 32] {
    let mut h = StepHasher::new();
    for s in stages { h.update_bytes(&[*s as u8]); }
    h.finalize()
}

/// Stages actually executed during the most recent step.
#[derive(Clone, Debug, Default)]
pub struct ScheduleRecorder { stages: Vec<StepStage> }

impl ScheduleRecorder {
    pub fn new() -> Self { Self { stages: Vec::with_capacity(StepStage::ORDER.len()) } }
    pub fn push(&mut self, s: StepStage) { self.stages.push(s); }
    pub fn clear(&mut self) { self.stages.clear(); }
    pub fn stages(&self) -> &[StepStage] { &self.stages }
    pub fn digest(&self) -> [u8; 32] { schedule_digest(&self.stages) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_numbered_sequentially() {
        for (i, s) in StepStage::ORDER.iter().enumerate() {
            assert_eq!(*s as u8 as usize, i + 1);
        }
    }

    #[test]
    fn digest_depends_on_order() {
        let a = schedule_digest(&[StepStage::Solve, StepStage::Integrate]);
        let b = schedule_digest(&[StepStage::Integrate, StepStage::Solve]);
        assert_ne!(a, b);
    }
}
