use serde::{Deserialize, Serialize};
use tumble_core::{Scalar, Vec3, WorldError};
use tumble_materials::ContactMaterial;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadphaseKind {
    /// All pairs, bounding-sphere test.
    #[default]
    Naive,
    /// Sort and sweep with automatic axis selection.
    Sap,
}

/// World settings; every field has a default so partial JSON is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: [Scalar; 3],
    pub allow_sleep: bool,
    /// Renormalize orientations every `quat_normalize_skip + 1` steps.
    pub quat_normalize_skip: u32,
    pub quat_normalize_fast: bool,
    /// Step size used when `step(None)` is called before any explicit size.
    pub default_dt: Scalar,
    pub profiling: bool,
    pub solver_iterations: usize,
    pub solver_tolerance: Scalar,
    pub broadphase: BroadphaseKind,
    pub default_friction: Scalar,
    pub default_restitution: Scalar,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            allow_sleep: false,
            quat_normalize_skip: 0,
            quat_normalize_fast: false,
            default_dt: 1.0 / 60.0,
            profiling: false,
            solver_iterations: 10,
            solver_tolerance: 1.0e-7,
            broadphase: BroadphaseKind::Naive,
            default_friction: 0.3,
            default_restitution: 0.0,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(s: &str) -> Result<Self, WorldError> {
        let cfg: WorldConfig = serde_json::from_str(s).map_err(|e| WorldError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> Result<String, WorldError> {
        serde_json::to_string_pretty(self).map_err(|e| WorldError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        if !(self.default_dt.is_finite() && self.default_dt > 0.0) {
            return Err(WorldError::Config(format!("default_dt must be positive, got {}", self.default_dt)));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(WorldError::Config("gravity must be finite".into()));
        }
        Ok(())
    }

    #[inline] pub fn gravity_vec(&self) -> Vec3 { Vec3::from_array(self.gravity) }

    pub fn default_contact_material(&self) -> ContactMaterial {
        ContactMaterial::new(self.default_friction, self.default_restitution)
    }
}
