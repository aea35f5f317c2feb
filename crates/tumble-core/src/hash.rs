use blake3::Hasher;
use crate::types::Vec3;
use crate::Scalar;
use glam::Quat;

/// Running digest of simulation state, used to compare two runs step by step.
pub struct StepHasher(Hasher);

impl StepHasher {
    pub fn new() -> Self { StepHasher(Hasher::new()) }
    pub fn update_bytes(&mut self, bytes: &[u8]) { self.0.update(bytes); }
    pub fn finalize(self) -> [u8; 32] { *self.0.finalize().as_bytes() }
}

impl Default for StepHasher {
    fn default() -> Self { Self::new() }
}

#[inline]
pub fn hash_scalar(h: &mut StepHasher, s: Scalar) { h.update_bytes(&s.to_le_bytes()); }

#[inline]
pub fn hash_vec3(h: &mut StepHasher, v: &Vec3) {
    for c in [v.x, v.y, v.z] { h.update_bytes(&c.to_le_bytes()); }
}

#[inline]
pub fn hash_quat(h: &mut StepHasher, q: &Quat) {
    for c in [q.x, q.y, q.z, q.w] { h.update_bytes(&c.to_le_bytes()); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn same_input_same_digest() {
        let mut a = StepHasher::new();
        let mut b = StepHasher::new();
        hash_vec3(&mut a, &vec3(1.0, 2.0, 3.0));
        hash_vec3(&mut b, &vec3(1.0, 2.0, 3.0));
        assert_eq!(a.finalize(), b.finalize());
    }

    #[test]
    fn component_order_matters() {
        let mut a = StepHasher::new();
        let mut b = StepHasher::new();
        hash_vec3(&mut a, &vec3(1.0, 2.0, 3.0));
        hash_vec3(&mut b, &vec3(3.0, 2.0, 1.0));
        assert_ne!(a.finalize(), b.finalize());
    }
}
