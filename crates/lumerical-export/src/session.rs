//! The FDTD session interface
//!
//! [`FdtdSession`] is the narrow set of Lumerical scripting calls the exporter
//! needs. Property names and object names are the ones Lumerical uses
//! (`"z span"`, `"FDTD::ports::port 1"`). Lengths are in meters.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use num_complex::Complex64;
use pic_layout::Layer;

use crate::error::SessionError;

pub type SessionResult<T> = Result<T, SessionError>;

/// A value assigned to an object property
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Number(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for ScriptValue {
    /// Lumerical script literal
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Number(v) => write!(f, "{:e}", v),
            ScriptValue::Int(v) => write!(f, "{}", v),
            ScriptValue::Bool(v) => write!(f, "{}", u8::from(*v)),
            ScriptValue::Text(s) => write!(f, "{}", quote(s)),
        }
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        ScriptValue::Number(v)
    }
}

impl From<i64> for ScriptValue {
    fn from(v: i64) -> Self {
        ScriptValue::Int(v)
    }
}

impl From<u32> for ScriptValue {
    fn from(v: u32) -> Self {
        ScriptValue::Int(v.into())
    }
}

impl From<u8> for ScriptValue {
    fn from(v: u8) -> Self {
        ScriptValue::Int(v.into())
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        ScriptValue::Bool(v)
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        ScriptValue::Text(v.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(v: String) -> Self {
        ScriptValue::Text(v)
    }
}

/// Double-quoted Lumerical string literal
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "'"))
}

/// Axis-aligned simulation region (m)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z: f64,
    pub z_span: f64,
}

/// FDTD solver region options
#[derive(Debug, Clone, PartialEq)]
pub struct FdtdOptions {
    pub dimension: String,
    /// (s)
    pub simulation_time: f64,
    pub mesh_accuracy: u8,
    pub use_early_shutoff: bool,
    pub auto_shutoff_min: f64,
}

impl FdtdOptions {
    pub fn with_mesh_accuracy(mesh_accuracy: u8) -> Self {
        Self {
            dimension: "3D".to_string(),
            simulation_time: 5e-12,
            mesh_accuracy,
            use_early_shutoff: true,
            auto_shutoff_min: 1e-4,
        }
    }
}

/// S-parameters as returned by a sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSParameters {
    /// Wavelength of each sample (m)
    pub wavelength: Vec<f64>,
    /// `S11`, `S21`, ... one complex sample per wavelength
    pub parameters: BTreeMap<String, Vec<Complex64>>,
}

pub trait FdtdSession {
    /// Start from an empty project.
    fn new_project(&mut self) -> SessionResult<()>;

    /// Add a named rectangle covering `region`.
    fn add_rect(&mut self, name: &str, region: &Region, index: f64) -> SessionResult<()>;

    /// Add the FDTD solver region.
    fn add_fdtd(&mut self, region: &Region, options: &FdtdOptions) -> SessionResult<()>;

    /// Import one layer of cell `cell` from a GDSII file.
    fn gds_import(&mut self, gdspath: &Path, cell: &str, layer: Layer) -> SessionResult<()>;

    fn set_named(&mut self, name: &str, property: &str, value: ScriptValue) -> SessionResult<()>;

    /// Add a port to the FDTD solver. Ports are named `FDTD::ports::port N`
    /// in creation order.
    fn add_port(&mut self) -> SessionResult<()>;

    fn set_global_source(&mut self, property: &str, value: ScriptValue) -> SessionResult<()>;

    /// Evaluate raw Lumerical script.
    fn eval(&mut self, script: &str) -> SessionResult<()>;

    /// Save the project (`.fsp`).
    fn save(&mut self, path: &Path) -> SessionResult<()>;

    /// Run the S-parameter sweep `sweep`, exciting every port, and export its
    /// result to `export_path`.
    fn run_sparameter_sweep(&mut self, sweep: &str, export_path: &Path) -> SessionResult<RawSParameters>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every call and returns a canned sweep result.
    #[derive(Debug, Default)]
    pub struct FakeSession {
        pub calls: Vec<String>,
        pub sweeps: usize,
        pub result: RawSParameters,
    }

    impl FakeSession {
        pub fn with_result(result: RawSParameters) -> Self {
            Self {
                result,
                ..Default::default()
            }
        }

        pub fn calls_starting_with(&self, prefix: &str) -> Vec<&String> {
            self.calls.iter().filter(|c| c.starts_with(prefix)).collect()
        }
    }

    impl FdtdSession for FakeSession {
        fn new_project(&mut self) -> SessionResult<()> {
            self.calls.push("newproject".to_string());
            Ok(())
        }

        fn add_rect(&mut self, name: &str, region: &Region, index: f64) -> SessionResult<()> {
            self.calls.push(format!("addrect {} {:?} {}", name, region, index));
            Ok(())
        }

        fn add_fdtd(&mut self, region: &Region, options: &FdtdOptions) -> SessionResult<()> {
            self.calls.push(format!("addfdtd {:?} {:?}", region, options));
            Ok(())
        }

        fn gds_import(&mut self, gdspath: &Path, cell: &str, layer: Layer) -> SessionResult<()> {
            self.calls.push(format!("gdsimport {} {} {}", gdspath.display(), cell, layer));
            Ok(())
        }

        fn set_named(&mut self, name: &str, property: &str, value: ScriptValue) -> SessionResult<()> {
            self.calls.push(format!("setnamed {}|{}|{}", name, property, value));
            Ok(())
        }

        fn add_port(&mut self) -> SessionResult<()> {
            self.calls.push("addport".to_string());
            Ok(())
        }

        fn set_global_source(&mut self, property: &str, value: ScriptValue) -> SessionResult<()> {
            self.calls.push(format!("setglobalsource {}|{}", property, value));
            Ok(())
        }

        fn eval(&mut self, script: &str) -> SessionResult<()> {
            self.calls.push(format!("eval {}", script));
            Ok(())
        }

        fn save(&mut self, path: &Path) -> SessionResult<()> {
            self.calls.push(format!("save {}", path.display()));
            Ok(())
        }

        fn run_sparameter_sweep(&mut self, sweep: &str, export_path: &Path) -> SessionResult<RawSParameters> {
            self.sweeps += 1;
            self.calls.push(format!("runsweep {} {}", sweep, export_path.display()));
            Ok(self.result.clone())
        }
    }
}
