//! Ports: named directional terminals on a component

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::geometry::Placement;
use crate::layers::{Layer, WG};

/// A named terminal with a midpoint, an orientation and a width.
///
/// `orientation` is in degrees and points out of the component, so a port
/// facing west has orientation 180.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub midpoint: Point2<f64>,
    pub orientation: f64,
    pub width: f64,
    pub layer: Layer,
}

impl Port {
    pub fn new(name: impl Into<String>, midpoint: (f64, f64), orientation: f64, width: f64) -> Self {
        Self {
            name: name.into(),
            midpoint: Point2::new(midpoint.0, midpoint.1),
            orientation,
            width,
            layer: WG,
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn x(&self) -> f64 {
        self.midpoint.x
    }

    pub fn y(&self) -> f64 {
        self.midpoint.y
    }

    /// Unit vector along the port orientation.
    pub fn direction(&self) -> Vector2<f64> {
        let rad = self.orientation.to_radians();
        Vector2::new(rad.cos(), rad.sin())
    }

    /// A copy of this port placed into a parent frame.
    pub fn transformed(&self, placement: &Placement) -> Self {
        Self {
            name: self.name.clone(),
            midpoint: placement.apply(&self.midpoint),
            orientation: placement.apply_angle(self.orientation),
            width: self.width,
            layer: self.layer,
        }
    }

    /// A copy of this port moved `distance` µm along its orientation.
    pub fn moved_along(&self, distance: f64) -> Self {
        Self {
            midpoint: self.midpoint + self.direction() * distance,
            ..self.clone()
        }
    }

    /// A copy with a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transformed_port_keeps_original() {
        let port = Port::new("E0", (10.0, 0.0), 0.0, 0.5);
        let mut placement = Placement::identity();
        placement.rotate(90.0, &Point2::origin());

        let moved = port.transformed(&placement);
        assert!((moved.x() - 0.0).abs() < 1e-9);
        assert!((moved.y() - 10.0).abs() < 1e-9);
        assert_eq!(moved.orientation, 90.0);
        assert_eq!(port.midpoint, Point2::new(10.0, 0.0));
    }

    #[test]
    fn test_moved_along_orientation() {
        let port = Port::new("W0", (0.0, 0.0), 180.0, 0.5);
        let moved = port.moved_along(2.0);
        assert!((moved.x() + 2.0).abs() < 1e-12);
        assert!(moved.y().abs() < 1e-12);
    }
}
