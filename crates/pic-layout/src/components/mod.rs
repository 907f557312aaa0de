//! Parametric component generators

pub mod c_shape;
pub mod cavity;
pub mod coupler;
pub mod dbr;
pub mod extension;
pub mod waveguide;

use std::sync::Arc;

pub use c_shape::c_shape;
pub use cavity::cavity;
pub use coupler::{coupler, CouplerParams};
pub use dbr::{dbr, DbrParams};
pub use extension::extend_ports;
pub use waveguide::waveguide;

use crate::component::Component;
use crate::error::{LayoutError, LayoutResult};

/// Names accepted by [`component_factory`].
pub const COMPONENT_NAMES: &[&str] = &["waveguide", "C", "coupler", "dbr", "cavity"];

/// Build a component with its default parameters by name.
pub fn component_factory(name: &str) -> LayoutResult<Component> {
    match name {
        "waveguide" => waveguide::default_waveguide(),
        "C" => c_shape::default_c_shape(),
        "coupler" => coupler(&CouplerParams::default()),
        "dbr" => dbr(&DbrParams::default()),
        "cavity" => {
            let mirror = Arc::new(dbr(&DbrParams::default())?);
            let params = CouplerParams {
                length: 0.1,
                gap: 0.2,
                wg_width: 0.5,
                ..Default::default()
            };
            cavity(mirror, &params)
        }
        _ => Err(LayoutError::UnknownComponent {
            name: name.to_string(),
            available: COMPONENT_NAMES.iter().map(|s| s.to_string()).collect(),
        }),
    }
}
