//! Distributed Bragg reflector

use crate::component::{component_name, Component};
use crate::error::{LayoutError, LayoutResult};
use crate::geometry::Polygon;
use crate::layers::{Layer, WG};
use crate::port::Port;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbrParams {
    pub w1: f64,
    pub l1: f64,
    pub w2: f64,
    pub l2: f64,
    /// Number of periods
    pub n: u32,
    pub layer: Layer,
}

impl Default for DbrParams {
    fn default() -> Self {
        Self {
            w1: 0.45,
            l1: 0.16,
            w2: 0.55,
            l2: 0.16,
            n: 10,
            layer: WG,
        }
    }
}

/// `n` periods of alternating `(l1, w1)` and `(l2, w2)` sections.
pub fn dbr(params: &DbrParams) -> LayoutResult<Component> {
    let DbrParams { w1, l1, w2, l2, n, layer } = *params;
    if n == 0 || w1 <= 0.0 || w2 <= 0.0 || l1 <= 0.0 || l2 <= 0.0 {
        return Err(LayoutError::InvalidParameter {
            component: "dbr".to_string(),
            message: format!("sizes must be positive and n > 0 (n = {})", n),
        });
    }

    let name = component_name(
        "dbr",
        &[("W1", w1), ("L1", l1), ("W2", w2), ("L2", l2), ("N", n as f64)],
    );
    let mut c = Component::new(name);

    let period = l1 + l2;
    for i in 0..n {
        let x0 = i as f64 * period;
        c.add_polygon(Polygon::rect(layer, (x0, -w1 / 2.0), (x0 + l1, w1 / 2.0)));
        c.add_polygon(Polygon::rect(layer, (x0 + l1, -w2 / 2.0), (x0 + period, w2 / 2.0)));
    }

    let total = n as f64 * period;
    c.add_port(Port::new("W0", (0.0, 0.0), 180.0, w1).with_layer(layer))?;
    c.add_port(Port::new("E0", (total, 0.0), 0.0, w2).with_layer(layer))?;

    c.set_setting("w1", w1);
    c.set_setting("l1", l1);
    c.set_setting("w2", w2);
    c.set_setting("l2", l2);
    c.set_setting("n", n);
    c.set_setting("layer", layer.to_string());
    Ok(c)
}
