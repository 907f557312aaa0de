//! lumerical-export: S-parameters of photonic components with Lumerical FDTD
//!
//! This crate provides:
//! - Validated simulation settings merged from defaults, component and caller overrides
//! - Per-layer thickness, sidewall angle and material resolution
//! - Port orientation to injection axis/direction classification
//! - A narrow [`FdtdSession`] interface over the Lumerical scripting API,
//!   with a script-rendering implementation that can run the solver in batch mode
//! - Normalisation of S-parameter sweeps into magnitude/unwrapped phase, cached on disk
//!
//! Layout coordinates are in µm; Lumerical works in meters. Settings that
//! describe simulation extents are given in meters.

pub mod error;
pub mod layer_stack;
pub mod material;
pub mod orientation;
pub mod results;
pub mod script;
pub mod session;
pub mod settings;
pub mod sidewall;
pub mod sweep_file;
pub mod write;

pub use error::{ConfigError, ExportError, SessionError};
pub use layer_stack::{resolve_layer_stack, LayerExtrusion};
pub use material::{Material, MaterialLibrary};
pub use orientation::{classify, port_injection, Direction, InjectionAxis, PortInjection};
pub use results::{unwrap_phase, SParameterResults};
pub use script::{ScriptSession, SolverCommand};
pub use session::{FdtdOptions, FdtdSession, RawSParameters, Region, ScriptValue};
pub use sidewall::extrude_sidewalls;
pub use sweep_file::read_sweep_file;
pub use settings::{CleanedSettings, SettingsOverrides, SimulationSettings};
pub use write::{sparameters_path, write_sparameters, WriteOptions, SWEEP_NAME};

/// Version recorded next to every simulation result.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Units of the lengths handed over from the layout side: µm for
/// coordinates, nm for layer thicknesses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthUnit {
    Micrometer,
    Nanometer,
}

impl LengthUnit {
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            LengthUnit::Micrometer => value * 1e-6,
            LengthUnit::Nanometer => value * 1e-9,
        }
    }
}
