//! Surface materials and per-pair contact properties.
//!
//! Materials are registered once and never removed. Each unordered pair of
//! registered materials may carry a `ContactMaterial`; lookups are symmetric.

use serde::{Deserialize, Serialize};
use tracing::debug;
use tumble_core::{ContactMaterialId, MaterialId, Scalar, SymmetricMatrix};

/// A named surface. `id` stays `None` until the material is registered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(skip)]
    pub id: Option<MaterialId>,
    /// Used for mixing when no contact material covers a pair.
    pub friction: Option<Scalar>,
    pub restitution: Option<Scalar>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_friction(mut self, friction: Scalar) -> Self { self.friction = Some(friction); self }
    pub fn with_restitution(mut self, restitution: Scalar) -> Self { self.restitution = Some(restitution); self }
}

/// What happens when two materials touch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactMaterial {
    #[serde(skip)]
    pub id: Option<ContactMaterialId>,
    /// Canonical pair (higher id first); filled in on registration.
    #[serde(skip)]
    pub materials: Option<(MaterialId, MaterialId)>,
    pub friction: Scalar,
    pub restitution: Scalar,
    pub contact_stiffness: Scalar,
    /// Regularization time of contact equations, in steps.
    pub contact_relaxation: Scalar,
    pub friction_stiffness: Scalar,
    pub friction_relaxation: Scalar,
}

impl ContactMaterial {
    pub fn new(friction: Scalar, restitution: Scalar) -> Self {
        Self {
            id: None,
            materials: None,
            friction,
            restitution,
            contact_stiffness: 1.0e7,
            contact_relaxation: 3.0,
            friction_stiffness: 1.0e7,
            friction_relaxation: 3.0,
        }
    }
}

impl Default for ContactMaterial {
    fn default() -> Self { ContactMaterial::new(0.3, 0.0) }
}

/// Registry of materials and the contact materials between them.
#[derive(Clone, Debug)]
pub struct MaterialPairTable {
    materials: Vec<Material>,
    contact_materials: Vec<ContactMaterial>,
    pairs: SymmetricMatrix<Option<ContactMaterialId>>,
}

impl MaterialPairTable {
    pub fn new() -> Self {
        Self { materials: Vec::new(), contact_materials: Vec::new(), pairs: SymmetricMatrix::new(None) }
    }

    /// Registers the material and writes its id back. Idempotent.
    pub fn add_material(&mut self, material: &mut Material) -> MaterialId {
        if let Some(id) = material.id { return id; }
        let id = MaterialId(self.materials.len() as u32);
        material.id = Some(id);
        self.materials.push(material.clone());
        self.pairs.push_row();
        debug!(%id, name = %material.name, "material registered");
        id
    }

    /// Registers both materials if needed, then binds `cm` to their pair.
    /// A later registration for the same pair replaces the earlier binding.
    pub fn add_contact_material(&mut self, a: &mut Material, b: &mut Material, mut cm: ContactMaterial) -> ContactMaterialId {
        let ia = self.add_material(a);
        let ib = self.add_material(b);
        let id = ContactMaterialId(self.contact_materials.len() as u32);
        cm.id = Some(id);
        cm.materials = Some(if ia >= ib { (ia, ib) } else { (ib, ia) });
        self.pairs.set(ia.0 as usize, ib.0 as usize, Some(id));
        self.contact_materials.push(cm);
        debug!(%id, a = %ia, b = %ib, friction = cm.friction, restitution = cm.restitution, "contact material registered");
        id
    }

    /// Symmetric lookup. `None` if either material is unregistered or the pair has no binding.
    pub fn get_contact_material(&self, a: &Material, b: &Material) -> Option<&ContactMaterial> {
        self.contact_material_between(a.id?, b.id?)
    }

    pub fn contact_material_between(&self, a: MaterialId, b: MaterialId) -> Option<&ContactMaterial> {
        let id = self.pairs.get(a.0 as usize, b.0 as usize)?;
        self.contact_materials.get(id.0 as usize)
    }

    /// Contact properties for two bodies' materials.
    ///
    /// Uses the registered contact material when one exists. Otherwise starts
    /// from `default` and, when both materials define friction (or
    /// restitution), replaces it with the product of the two.
    pub fn resolve(&self, a: Option<MaterialId>, b: Option<MaterialId>, default: &ContactMaterial) -> ContactMaterial {
        let (ma, mb) = match (a, b) {
            (Some(a), Some(b)) => {
                if let Some(cm) = self.contact_material_between(a, b) { return *cm; }
                (self.material(a), self.material(b))
            }
            _ => return *default,
        };
        let mut out = *default;
        if let (Some(ma), Some(mb)) = (ma, mb) {
            if let (Some(fa), Some(fb)) = (ma.friction, mb.friction) { out.friction = fa * fb; }
            if let (Some(ra), Some(rb)) = (ma.restitution, mb.restitution) { out.restitution = ra * rb; }
        }
        out
    }

    #[inline] pub fn material(&self, id: MaterialId) -> Option<&Material> { self.materials.get(id.0 as usize) }
    #[inline] pub fn materials(&self) -> &[Material] { &self.materials }
    #[inline] pub fn contact_materials(&self) -> &[ContactMaterial] { &self.contact_materials }
    #[inline] pub fn num_materials(&self) -> usize { self.materials.len() }
}

impl Default for MaterialPairTable {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ids_are_sequential_and_idempotent() {
        let mut t = MaterialPairTable::new();
        let mut a = Material::new("a");
        let mut b = Material::new("b");
        assert_eq!(t.add_material(&mut a), MaterialId(0));
        assert_eq!(t.add_material(&mut b), MaterialId(1));
        assert_eq!(t.add_material(&mut a), MaterialId(0));
        assert_eq!(t.num_materials(), 2);
    }

    #[test]
    fn symmetry() {
        let mut t = MaterialPairTable::new();
        let mut ice = Material::new("ice");
        let mut rubber = Material::new("rubber");
        t.add_contact_material(&mut ice, &mut rubber, ContactMaterial::new(0.05, 0.1));
        let p1 = t.get_contact_material(&ice, &rubber).unwrap();
        let p2 = t.get_contact_material(&rubber, &ice).unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.materials, Some((MaterialId(1), MaterialId(0))));
    }

    #[test]
    fn unregistered_pairs_miss() {
        let mut t = MaterialPairTable::new();
        let mut a = Material::new("a");
        let mut b = Material::new("b");
        let mut c = Material::new("c");
        t.add_contact_material(&mut a, &mut b, ContactMaterial::new(0.0, 0.5));
        assert!(t.get_contact_material(&a, &c).is_none());
        t.add_material(&mut c);
        assert!(t.get_contact_material(&a, &c).is_none());
        assert!(t.get_contact_material(&b, &a).is_some());
    }

    #[test]
    fn bindings_survive_later_materials() {
        let mut t = MaterialPairTable::new();
        let mut a = Material::new("a");
        let mut b = Material::new("b");
        t.add_contact_material(&mut a, &mut b, ContactMaterial::new(0.7, 0.0));
        for i in 0..10 { t.add_material(&mut Material::new(format!("m{i}"))); }
        assert_relative_eq!(t.get_contact_material(&a, &b).unwrap().friction, 0.7);
    }

    #[test]
    fn same_material_pair() {
        let mut t = MaterialPairTable::new();
        let mut a = Material::new("a");
        t.add_material(&mut a);
        let mut a2 = a.clone();
        t.add_contact_material(&mut a, &mut a2, ContactMaterial::new(0.9, 0.0));
        assert_relative_eq!(t.get_contact_material(&a, &a).unwrap().friction, 0.9);
    }

    #[test]
    fn rebinding_replaces() {
        let mut t = MaterialPairTable::new();
        let mut a = Material::new("a");
        let mut b = Material::new("b");
        t.add_contact_material(&mut a, &mut b, ContactMaterial::new(0.1, 0.0));
        let id = t.add_contact_material(&mut b, &mut a, ContactMaterial::new(0.2, 0.0));
        let cm = t.get_contact_material(&a, &b).unwrap();
        assert_eq!(cm.id, Some(id));
        assert_relative_eq!(cm.friction, 0.2);
    }

    #[test]
    fn resolve_mixes_material_values() {
        let mut t = MaterialPairTable::new();
        let a = t.add_material(&mut Material::new("a").with_friction(0.5).with_restitution(0.4));
        let b = t.add_material(&mut Material::new("b").with_friction(0.4));
        let d = ContactMaterial::default();
        let cm = t.resolve(Some(a), Some(b), &d);
        assert_relative_eq!(cm.friction, 0.2);
        assert_relative_eq!(cm.restitution, d.restitution);
        assert_eq!(t.resolve(None, Some(b), &d), d);
    }
}
