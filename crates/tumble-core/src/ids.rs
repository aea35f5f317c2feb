use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};
use serde::{Deserialize, Serialize};

/// Body handle. Minted by the world on add, strictly increasing, never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BodyId(pub u32);
impl fmt::Display for BodyId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "BodyId({})", self.0) } }

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ConstraintId(pub u32);
impl fmt::Display for ConstraintId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ConstraintId({})", self.0) } }

/// Dense material index, sequential from 0 in registration order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);
impl fmt::Display for MaterialId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "MaterialId({})", self.0) } }

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ContactMaterialId(pub u32);
impl fmt::Display for ContactMaterialId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ContactMaterialId({})", self.0) } }

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub u32);
impl fmt::Display for ListenerId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ListenerId({})", self.0) } }

/// Identifies a world instance; bodies remember which world owns them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WorldId(pub u32);
impl fmt::Display for WorldId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "WorldId({})", self.0) } }

static NEXT_WORLD: AtomicU32 = AtomicU32::new(0);

impl WorldId {
    pub fn next() -> Self { WorldId(NEXT_WORLD.fetch_add(1, Ordering::Relaxed)) }
}
