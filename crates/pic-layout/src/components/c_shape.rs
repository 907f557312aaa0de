//! "C" shaped trace with ports on both ends

use crate::component::{component_name, Component};
use crate::error::LayoutResult;
use crate::geometry::Polygon;
use crate::layers::{Layer, M3};
use crate::port::Port;
use nalgebra::Point2;

/// A `C` of line `width` whose base is `size.0` long and `size.1` tall.
///
/// Ports `1` (top arm) and `2` (bottom arm) both face east.
pub fn c_shape(width: f64, size: (f64, f64), layer: Layer) -> LayoutResult<Component> {
    let w = width / 2.0;
    let (s1, s2) = size;
    let points = [
        (-w, -w),
        (s1, -w),
        (s1, w),
        (w, w),
        (w, s2 - w),
        (s1, s2 - w),
        (s1, s2 + w),
        (-w, s2 + w),
    ];

    let mut c = Component::new(component_name("C", &[("W", width), ("L", s1), ("H", s2)]));
    c.add_polygon(Polygon::new(
        layer,
        points.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
    ));
    c.add_port(Port::new("1", (s1, s2), 0.0, width).with_layer(layer))?;
    c.add_port(Port::new("2", (s1, 0.0), 0.0, width).with_layer(layer))?;
    c.set_setting("width", width);
    c.set_setting("size", vec![s1, s2]);
    c.set_setting("layer", layer.to_string());
    Ok(c)
}

pub fn default_c_shape() -> LayoutResult<Component> {
    c_shape(1.0, (10.0, 20.0), M3)
}
