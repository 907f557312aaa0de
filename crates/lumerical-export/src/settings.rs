//! Simulation settings
//!
//! Settings are resolved once per export from three layers: the defaults,
//! overrides attached to the component, and overrides from the caller. Later
//! layers replace whole values (a `layer2nm` override replaces the full map).
//! Only keys that exist in the defaults may be overridden.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use pic_layout::layers::{self, Layer, WGCLAD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Upper bound (m) for physical extents. Catches values passed in µm.
pub const MAX_EXTENT: f64 = 5e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// Layer thickness (nm)
    pub layer2nm: BTreeMap<Layer, f64>,
    /// Sidewall angle (degrees), 90 when absent
    pub layer2swa: BTreeMap<Layer, f64>,
    /// Material short name per layer
    pub layer2material: BTreeMap<Layer, String>,
    /// Layers stripped before simulation
    pub remove_layers: Vec<Layer>,
    pub background_material: String,
    /// Port width (m)
    pub port_width: f64,
    /// Port height (m)
    pub port_height: f64,
    /// Port extension (µm)
    pub port_extension_um: f64,
    /// 1: coarse, 2: fine, 3: superfine
    pub mesh_accuracy: u8,
    /// Vertical margin of the FDTD region (m)
    pub zmargin: f64,
    /// Lateral margin of the FDTD region (m)
    pub ymargin: f64,
    /// (m)
    pub wavelength_start: f64,
    /// (m)
    pub wavelength_stop: f64,
    pub wavelength_points: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            layer2nm: layers::layer2nm(),
            layer2swa: layers::layer2swa(),
            layer2material: layers::layer2material(),
            remove_layers: vec![WGCLAD],
            background_material: "sio2".to_string(),
            port_width: 3e-6,
            port_height: 1.5e-6,
            port_extension_um: 1.0,
            mesh_accuracy: 2,
            zmargin: 1e-6,
            ymargin: 2e-6,
            wavelength_start: 1.2e-6,
            wavelength_stop: 1.6e-6,
            wavelength_points: 500,
        }
    }
}

impl SimulationSettings {
    /// Merge `component` and then `caller` overrides on top of fresh defaults.
    pub fn resolve(
        component: Option<&SettingsOverrides>,
        caller: &SettingsOverrides,
    ) -> Result<Self, ConfigError> {
        let defaults =
            serde_json::to_value(Self::default()).map_err(ConfigError::InvalidValue)?;
        let mut merged: Map<String, Value> =
            serde_json::from_value(defaults).map_err(ConfigError::InvalidValue)?;

        for overrides in component.into_iter().chain(Some(caller)) {
            for (key, value) in &overrides.0 {
                if !merged.contains_key(key) {
                    return Err(ConfigError::UnknownSetting {
                        key: key.clone(),
                        allowed: merged.keys().cloned().collect(),
                    });
                }
                merged.insert(key.clone(), value.clone());
            }
        }

        let settings: Self =
            serde_json::from_value(Value::Object(merged)).map_err(ConfigError::InvalidValue)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the physical extents against [`MAX_EXTENT`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extents = [
            ("port_width", self.port_width),
            ("port_height", self.port_height),
            ("zmargin", self.zmargin),
            ("ymargin", self.ymargin),
        ];
        for (setting, value) in extents {
            if !(value < MAX_EXTENT) {
                return Err(ConfigError::ExtentCeiling {
                    setting,
                    value,
                    ceiling: MAX_EXTENT,
                });
            }
        }
        Ok(())
    }

    /// Sidewall angle for `layer`, vertical when not configured.
    pub fn sidewall_angle(&self, layer: &Layer) -> f64 {
        self.layer2swa.get(layer).copied().unwrap_or(90.0)
    }

    /// Flatten the per-layer tables into `layer_datatype_value` strings,
    /// keeping only layers present on the component.
    pub fn clean(&self, present: &BTreeSet<Layer>) -> CleanedSettings {
        CleanedSettings {
            layer2nm: layer_entries(&self.layer2nm, present),
            layer2swa: layer_entries(&self.layer2swa, present),
            layer2material: layer_entries(&self.layer2material, present),
            remove_layers: self.remove_layers.iter().map(layer_key).collect(),
            background_material: self.background_material.clone(),
            port_width: self.port_width,
            port_height: self.port_height,
            port_extension_um: self.port_extension_um,
            mesh_accuracy: self.mesh_accuracy,
            zmargin: self.zmargin,
            ymargin: self.ymargin,
            wavelength_start: self.wavelength_start,
            wavelength_stop: self.wavelength_stop,
            wavelength_points: self.wavelength_points,
        }
    }
}

/// Settings as recorded in the `.yml` file next to the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedSettings {
    pub layer2nm: Vec<String>,
    pub layer2swa: Vec<String>,
    pub layer2material: Vec<String>,
    pub remove_layers: Vec<String>,
    pub background_material: String,
    pub port_width: f64,
    pub port_height: f64,
    pub port_extension_um: f64,
    pub mesh_accuracy: u8,
    pub zmargin: f64,
    pub ymargin: f64,
    pub wavelength_start: f64,
    pub wavelength_stop: f64,
    pub wavelength_points: u32,
}

fn layer_key(layer: &Layer) -> String {
    format!("{}_{}", layer.layer, layer.datatype)
}

fn layer_entries<T: Display>(table: &BTreeMap<Layer, T>, present: &BTreeSet<Layer>) -> Vec<String> {
    table
        .iter()
        .filter(|(layer, _)| present.contains(layer))
        .map(|(layer, value)| format!("{}_{}", layer_key(layer), value))
        .collect()
}

/// Parse a `layer_datatype` key back into a [`Layer`].
pub fn parse_layer_key(entry: &str) -> Result<Layer, ConfigError> {
    let invalid = || ConfigError::InvalidLayerEntry(entry.to_string());
    let (layer, datatype) = entry.split_once('_').ok_or_else(invalid)?;
    Ok(Layer::new(
        layer.parse().map_err(|_| invalid())?,
        datatype.parse().map_err(|_| invalid())?,
    ))
}

/// Parse `layer_datatype_value` entries back into `(layer, value)` pairs.
pub fn parse_layer_entries<T: FromStr>(entries: &[String]) -> Result<Vec<(Layer, T)>, ConfigError> {
    entries
        .iter()
        .map(|entry| {
            let invalid = || ConfigError::InvalidLayerEntry(entry.clone());
            let mut parts = entry.splitn(3, '_');
            let (Some(layer), Some(datatype), Some(value)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid());
            };
            let layer = Layer::new(
                layer.parse().map_err(|_| invalid())?,
                datatype.parse().map_err(|_| invalid())?,
            );
            let value = value.parse().map_err(|_| invalid())?;
            Ok((layer, value))
        })
        .collect()
}

/// Setting overrides keyed by setting name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsOverrides(pub BTreeMap<String, Value>);

impl SettingsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Parse a YAML (or JSON) mapping of overrides.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Apply a `key=value` assignment. Values are read as numbers when
    /// possible, then as YAML.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidAssignment(assignment.to_string()))?;
        let raw = raw.trim();
        let value = if let Ok(int) = raw.parse::<i64>() {
            Value::from(int)
        } else if let Ok(float) = raw.parse::<f64>() {
            Value::from(float)
        } else {
            serde_yaml::from_str(raw)
                .map_err(|_| ConfigError::InvalidAssignment(assignment.to_string()))?
        };
        self.insert(key.trim(), value);
        Ok(())
    }
}

impl From<BTreeMap<String, Value>> for SettingsOverrides {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}
