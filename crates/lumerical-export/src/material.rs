//! Optical materials and their Lumerical database names

use std::collections::HashMap;

use crate::error::ConfigError;

/// A material known to the exporter
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Short name used in settings (`si`, `sio2`, ...)
    pub name: String,
    /// Entry in the Lumerical material database
    pub lumerical_name: String,
}

impl Material {
    pub fn new(name: &str, lumerical_name: &str) -> Self {
        Self {
            name: name.to_string(),
            lumerical_name: lumerical_name.to_string(),
        }
    }

    pub fn silicon() -> Self {
        Self::new("si", "Si (Silicon) - Palik")
    }

    pub fn silica() -> Self {
        Self::new("sio2", "SiO2 (Glass) - Palik")
    }

    pub fn silicon_nitride() -> Self {
        Self::new("sin", "Si3N4 (Silicon Nitride) - Phillip")
    }
}

/// Material library keyed by short name (case-insensitive)
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        let mut lib = Self {
            materials: HashMap::new(),
        };

        lib.add(Material::silicon());
        lib.add(Material::silica());
        lib.add(Material::silicon_nitride());

        lib
    }

    pub fn add(&mut self, material: Material) {
        self.materials.insert(material.name.to_lowercase(), material);
    }

    /// Look up `name`. Unknown names are an error.
    pub fn get(&self, name: &str) -> Result<&Material, ConfigError> {
        self.materials
            .get(&name.to_lowercase())
            .ok_or_else(|| ConfigError::UnknownMaterial {
                name: name.to_string(),
                allowed: self.names(),
            })
    }

    /// Sorted short names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.materials.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_materials() {
        let lib = MaterialLibrary::default();
        assert_eq!(lib.get("si").unwrap().lumerical_name, "Si (Silicon) - Palik");
        assert_eq!(lib.get("SiO2").unwrap().lumerical_name, "SiO2 (Glass) - Palik");
        assert_eq!(lib.names(), vec!["si", "sin", "sio2"]);
    }

    #[test]
    fn test_unknown_material_lists_allowed() {
        let lib = MaterialLibrary::default();
        let err = lib.get("gold").unwrap_err().to_string();
        assert!(err.contains("gold"));
        assert!(err.contains("sio2"));
    }

    #[test]
    fn test_custom_material() {
        let mut lib = MaterialLibrary::new();
        lib.add(Material::new("Ge", "Ge (Germanium) - Palik"));
        assert_eq!(lib.get("ge").unwrap().lumerical_name, "Ge (Germanium) - Palik");
        assert_eq!(lib.names(), vec!["ge", "si", "sin", "sio2"]);
    }
}
