//! pic-layout: parametric photonic components
//!
//! This crate provides:
//! - Components: polygons per layer plus named ports
//! - References: placed, transformed instances of shared components
//! - Port-based connection of references
//! - Component generators (waveguide, coupler, DBR, cavity, ...)
//! - GDSII output of flattened components
//!
//! Coordinates are in µm and angles in degrees.

pub mod component;
pub mod components;
pub mod error;
pub mod gds;
pub mod geometry;
pub mod layers;
pub mod port;

pub use component::{Component, ComponentReference, RefId};
pub use components::{component_factory, extend_ports, COMPONENT_NAMES};
pub use error::{LayoutError, LayoutResult};
pub use gds::{to_gds_library, write_gds, GdsError};
pub use geometry::{BBox, Placement, Polygon};
pub use layers::Layer;
pub use port::Port;
