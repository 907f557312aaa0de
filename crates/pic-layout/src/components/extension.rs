//! Straight port extensions

use std::sync::Arc;

use crate::component::{clean_value, Component};
use crate::error::LayoutResult;
use crate::geometry::{path_outline, Polygon};

/// Wrap `component` and extend every port by a straight section of `length` µm.
///
/// The returned component keeps the port names and orientations, with each
/// port moved to the end of its extension.
pub fn extend_ports(component: &Component, length: f64) -> LayoutResult<Component> {
    let mut c = Component::new(format!("{}_e{}", component.name, clean_value(length)));
    let inner = Arc::new(component.clone());
    c.add_ref(inner);

    for port in component.ports() {
        let end = port.moved_along(length);
        if length > 0.0 {
            let outline = path_outline(&[port.midpoint, end.midpoint], port.width);
            c.add_polygon(Polygon::new(port.layer, outline));
        }
        c.add_port(end)?;
    }

    for (key, value) in component.settings() {
        c.set_setting(&key, value);
    }
    c.set_setting("extension_length", length);
    Ok(c)
}
