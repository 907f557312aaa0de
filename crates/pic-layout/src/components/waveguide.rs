//! Straight waveguide

use crate::component::{component_name, Component};
use crate::error::{LayoutError, LayoutResult};
use crate::geometry::Polygon;
use crate::layers::{Layer, WG};
use crate::port::Port;

/// Straight waveguide along +x with ports `W0` at the origin and `E0` at `length`.
pub fn waveguide(length: f64, width: f64, layer: Layer) -> LayoutResult<Component> {
    if !(width > 0.0) || !(length >= 0.0) {
        return Err(LayoutError::InvalidParameter {
            component: "waveguide".to_string(),
            message: format!("length {} and width {} must be positive", length, width),
        });
    }

    let mut c = Component::new(component_name("waveguide", &[("L", length), ("W", width)]));
    c.add_polygon(Polygon::rect(layer, (0.0, -width / 2.0), (length, width / 2.0)));
    c.add_port(Port::new("W0", (0.0, 0.0), 180.0, width).with_layer(layer))?;
    c.add_port(Port::new("E0", (length, 0.0), 0.0, width).with_layer(layer))?;
    c.set_setting("length", length);
    c.set_setting("width", width);
    c.set_setting("layer", layer.to_string());
    Ok(c)
}

/// Waveguide with default parameters: 10 µm long, 0.5 µm wide, on `WG`.
pub fn default_waveguide() -> LayoutResult<Component> {
    waveguide(10.0, 0.5, WG)
}
