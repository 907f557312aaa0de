//! Per-layer extrusion: thickness, sidewall angle and material

use std::collections::BTreeSet;

use pic_layout::Layer;
use tracing::debug;

use crate::error::ExportError;
use crate::material::MaterialLibrary;
use crate::settings::SimulationSettings;

/// One layer to import and extrude in the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct LayerExtrusion {
    pub layer: Layer,
    pub thickness_nm: f64,
    /// Degrees from the substrate plane, 90 is vertical
    pub sidewall_angle: f64,
    /// Lumerical material database name
    pub material: String,
}

impl LayerExtrusion {
    /// Name Lumerical gives the group created by importing this layer.
    pub fn group_name(&self) -> String {
        format!("GDS_LAYER_{}:{}", self.layer.layer, self.layer.datatype)
    }
}

/// Resolve the layers of `present` that have a thickness.
///
/// Layers without a thickness are not physical (labels, markers) and are
/// skipped. A layer with a thickness but no material is an error.
pub fn resolve_layer_stack(
    settings: &SimulationSettings,
    present: &BTreeSet<Layer>,
    materials: &MaterialLibrary,
) -> Result<Vec<LayerExtrusion>, ExportError> {
    let mut stack = Vec::new();
    for (layer, nm) in &settings.layer2nm {
        if !present.contains(layer) {
            debug!("layer {} not on component, skipping", layer);
            continue;
        }
        let short_name =
            settings
                .layer2material
                .get(layer)
                .ok_or_else(|| ExportError::MissingMaterial {
                    layer: layer.to_string(),
                    available: settings.layer2material.keys().map(|l| l.to_string()).collect(),
                })?;
        let material = materials.get(short_name)?;
        stack.push(LayerExtrusion {
            layer: *layer,
            thickness_nm: *nm,
            sidewall_angle: settings.sidewall_angle(layer),
            material: material.lumerical_name.clone(),
        });
    }
    Ok(stack)
}
