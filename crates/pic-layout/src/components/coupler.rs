//! Directional coupler

use std::f64::consts::PI;

use nalgebra::Point2;

use crate::component::{component_name, Component};
use crate::error::{LayoutError, LayoutResult};
use crate::geometry::{path_outline, Polygon};
use crate::layers::{Layer, WG};
use crate::port::Port;

const BEND_POINTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplerParams {
    /// Length of the straight coupling section
    pub length: f64,
    /// Edge-to-edge gap in the coupling section
    pub gap: f64,
    pub wg_width: f64,
    /// Horizontal length of each S-bend
    pub dx: f64,
    /// Vertical distance between the two ports on each side
    pub dy: f64,
    pub layer: Layer,
}

impl Default for CouplerParams {
    fn default() -> Self {
        Self {
            length: 20.0,
            gap: 0.236,
            wg_width: 0.5,
            dx: 10.0,
            dy: 5.0,
            layer: WG,
        }
    }
}

/// Two waveguides brought to `gap` over `length` by cosine S-bends.
///
/// ```text
///    W1 __                  __ E1
///         \                /
///          ================
///          ================
///    W0 __/                \__ E0
/// ```
pub fn coupler(params: &CouplerParams) -> LayoutResult<Component> {
    let CouplerParams {
        length,
        gap,
        wg_width,
        dx,
        dy,
        layer,
    } = *params;

    let inner = (gap + wg_width) / 2.0;
    if dy / 2.0 < inner || gap < 0.0 || wg_width <= 0.0 || dx <= 0.0 || length < 0.0 {
        return Err(LayoutError::InvalidParameter {
            component: "coupler".to_string(),
            message: format!(
                "need dy/2 >= (gap + wg_width)/2 and positive sizes (gap {}, wg_width {}, dx {}, dy {}, length {})",
                gap, wg_width, dx, dy, length
            ),
        });
    }

    let name = component_name(
        "coupler",
        &[("L", length), ("G", gap), ("W", wg_width), ("DY", dy)],
    );
    let mut c = Component::new(name);

    for sign in [-1.0, 1.0] {
        let outer_y = sign * dy / 2.0;
        let inner_y = sign * inner;
        let mut centerline = s_bend((-dx, outer_y), (0.0, inner_y));
        centerline.extend(s_bend((length, inner_y), (length + dx, outer_y)));
        c.add_polygon(Polygon::new(layer, path_outline(&centerline, wg_width)));
    }

    c.add_port(Port::new("W0", (-dx, -dy / 2.0), 180.0, wg_width).with_layer(layer))?;
    c.add_port(Port::new("W1", (-dx, dy / 2.0), 180.0, wg_width).with_layer(layer))?;
    c.add_port(Port::new("E0", (length + dx, -dy / 2.0), 0.0, wg_width).with_layer(layer))?;
    c.add_port(Port::new("E1", (length + dx, dy / 2.0), 0.0, wg_width).with_layer(layer))?;

    c.set_setting("length", length);
    c.set_setting("gap", gap);
    c.set_setting("wg_width", wg_width);
    c.set_setting("dx", dx);
    c.set_setting("dy", dy);
    c.set_setting("layer", layer.to_string());
    Ok(c)
}

/// Raised-cosine S-bend centerline between two points.
fn s_bend(start: (f64, f64), end: (f64, f64)) -> Vec<Point2<f64>> {
    (0..=BEND_POINTS)
        .map(|i| {
            let t = i as f64 / BEND_POINTS as f64;
            let x = start.0 + (end.0 - start.0) * t;
            let y = start.1 + (end.1 - start.1) * (1.0 - (PI * t).cos()) / 2.0;
            Point2::new(x, y)
        })
        .collect()
}
