//! Planar geometry: polygons, placements and bounding boxes
//!
//! All coordinates are in µm. Angles are in degrees, counter-clockwise,
//! with 0 pointing along +x.

use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::layers::Layer;

/// A closed polygon on one layer. The closing vertex is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub layer: Layer,
    pub points: Vec<Point2<f64>>,
}

impl Polygon {
    pub fn new(layer: Layer, points: Vec<Point2<f64>>) -> Self {
        Self { layer, points }
    }

    /// Axis-aligned rectangle from two opposite corners.
    pub fn rect(layer: Layer, p0: (f64, f64), p1: (f64, f64)) -> Self {
        let (x0, x1) = (p0.0.min(p1.0), p0.0.max(p1.0));
        let (y0, y1) = (p0.1.min(p1.1), p0.1.max(p1.1));
        Self::new(
            layer,
            vec![
                Point2::new(x0, y0),
                Point2::new(x1, y0),
                Point2::new(x1, y1),
                Point2::new(x0, y1),
            ],
        )
    }

    pub fn transformed(&self, placement: &Placement) -> Self {
        Self {
            layer: self.layer,
            points: self.points.iter().map(|p| placement.apply(p)).collect(),
        }
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(self.points.iter())
    }
}

/// Rigid placement of a reference: optional reflection about the x-axis,
/// then rotation about the origin, then translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub origin: Vector2<f64>,
    pub rotation: f64,
    pub x_reflection: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            origin: Vector2::zeros(),
            rotation: 0.0,
            x_reflection: false,
        }
    }
}

impl Placement {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Map a point from the referenced component's frame into the parent frame.
    pub fn apply(&self, p: &Point2<f64>) -> Point2<f64> {
        let local = if self.x_reflection {
            Vector2::new(p.x, -p.y)
        } else {
            p.coords
        };
        let rotated = Rotation2::new(self.rotation.to_radians()) * local;
        Point2::from(rotated + self.origin)
    }

    /// Map an orientation angle into the parent frame, wrapped to `[0, 360)`.
    pub fn apply_angle(&self, angle: f64) -> f64 {
        let local = if self.x_reflection { -angle } else { angle };
        wrap_angle(local + self.rotation)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.origin += Vector2::new(dx, dy);
    }

    /// Rotate by `angle` degrees about `center` (parent frame).
    pub fn rotate(&mut self, angle: f64, center: &Point2<f64>) {
        let rot = Rotation2::new(angle.to_radians());
        self.origin = rot * (self.origin - center.coords) + center.coords;
        self.rotation = wrap_angle(self.rotation + angle);
    }

    /// The placement equivalent to applying `self` and then `outer`.
    pub fn then(&self, outer: &Placement) -> Placement {
        let rotation = if outer.x_reflection {
            outer.rotation - self.rotation
        } else {
            outer.rotation + self.rotation
        };
        Placement {
            origin: outer.apply(&Point2::from(self.origin)).coords,
            rotation: wrap_angle(rotation),
            x_reflection: self.x_reflection ^ outer.x_reflection,
        }
    }
}

/// Wrap an angle in degrees to `[0, 360)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl BBox {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BBox {
            min: *first,
            max: *first,
        };
        for p in iter {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Outline of a constant-width path along `centerline`.
///
/// Each vertex is offset along the normal averaged over its adjacent segments.
pub fn path_outline(centerline: &[Point2<f64>], width: f64) -> Vec<Point2<f64>> {
    if centerline.len() < 2 {
        return Vec::new();
    }

    let half = width / 2.0;
    let n = centerline.len();
    let segment_normal = |a: &Point2<f64>, b: &Point2<f64>| {
        let d = b - a;
        let len = d.norm();
        if len == 0.0 {
            Vector2::zeros()
        } else {
            Vector2::new(-d.y / len, d.x / len)
        }
    };

    let normals: Vec<Vector2<f64>> = (0..n)
        .map(|i| {
            let prev = if i > 0 {
                segment_normal(&centerline[i - 1], &centerline[i])
            } else {
                Vector2::zeros()
            };
            let next = if i + 1 < n {
                segment_normal(&centerline[i], &centerline[i + 1])
            } else {
                Vector2::zeros()
            };
            let sum = prev + next;
            let len = sum.norm();
            if len == 0.0 {
                sum
            } else {
                sum / len
            }
        })
        .collect();

    let left = centerline
        .iter()
        .zip(&normals)
        .map(|(p, nrm)| p + nrm * half);
    let right = centerline
        .iter()
        .zip(&normals)
        .rev()
        .map(|(p, nrm)| p - nrm * half);

    left.chain(right).collect()
}
