use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Structural function of a slice within a layer.
///
/// Radiator detection compares roles, never material names: a slice is the
/// layer's absorber because it says so, not because its material happens to
/// be called "tungsten".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialRole {
    Absorber,
    Structural,
    Sensor,
    Other,
}

/// Opaque material token.
///
/// The core never inspects material physics; it only needs an
/// equality-comparable handle to attach to volumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub name: String,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Library of named materials.
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    materials: HashMap<String, Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    /// Adds a material to the registry.
    pub fn add(&mut self, material: Material) -> Result<()> {
        if self.materials.contains_key(&material.name) {
            return Err(anyhow!("Material is already present: {}", &material.name));
        }
        self.materials.insert(material.name.clone(), material);
        Ok(())
    }

    /// Returns a reference to a material by name.
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Creates a registry pre-populated with the materials of a silicon-tungsten
    /// sampling calorimeter.
    pub fn with_presets() -> Self {
        let mut reg = Self::new();
        for name in [
            "air",
            "tungsten",
            "silicon",
            "copper",
            "g10",
            "glue",
            "steel235",
            "polystyrene",
        ] {
            // Names are distinct, add cannot fail here.
            let _ = reg.add(Material::new(name));
        }
        reg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut reg = MaterialRegistry::new();
        reg.add(Material::new("tungsten")).unwrap();
        assert_eq!(reg.get("tungsten").unwrap().name, "tungsten");
        assert!(reg.get("lead").is_none());
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut reg = MaterialRegistry::new();
        reg.add(Material::new("air")).unwrap();
        assert!(reg.add(Material::new("air")).is_err());
    }

    #[test]
    fn test_presets() {
        let reg = MaterialRegistry::with_presets();
        assert!(reg.get("tungsten").is_some());
        assert!(reg.get("silicon").is_some());
        assert!(reg.get("air").is_some());
    }

    #[test]
    fn test_tokens_compare_by_name() {
        let a = Material::new("tungsten");
        let b = Material::new("tungsten");
        assert_eq!(a, b);
    }
}
