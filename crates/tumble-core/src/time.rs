use std::time::Duration;

/// Counters reported by every step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub pairs_tested: u32,
    pub contacts: u32,
    pub friction_equations: u32,
    pub constraint_equations: u32,
    pub solver_iterations: u32,
}

/// Wall-clock time of the expensive phases of the last step.
/// Only filled in when profiling is enabled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepProfile {
    pub broadphase: Duration,
    pub narrowphase: Duration,
    pub solve: Duration,
    pub integrate: Duration,
}

impl StepProfile {
    pub fn total(&self) -> Duration {
        self.broadphase + self.narrowphase + self.solve + self.integrate
    }
}
