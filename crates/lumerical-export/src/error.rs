//! Error types
//!
//! Configuration errors and environment (session) errors are kept apart so
//! callers can tell a bad setting from a missing solver. Every error is fatal
//! for the current export.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use pic_layout::{GdsError, LayoutError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("`{key}` is not a valid setting ({allowed:?})")]
    UnknownSetting { key: String, allowed: Vec<String> },

    #[error("invalid settings value: {0}")]
    InvalidValue(#[source] serde_json::Error),

    #[error("{setting} = {value} must be < {ceiling} m (was it given in µm?)")]
    ExtentCeiling {
        setting: &'static str,
        value: f64,
        ceiling: f64,
    },

    #[error("material `{name}` not in {allowed:?}")]
    UnknownMaterial { name: String, allowed: Vec<String> },

    #[error("port {port} with orientation {orientation} is not a valid number")]
    InvalidOrientation { port: String, orientation: f64 },

    #[error("invalid layer entry `{0}`")]
    InvalidLayerEntry(String),

    #[error("invalid setting assignment `{0}`, expected KEY=VALUE")]
    InvalidAssignment(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("FDTD session unavailable: {0}")]
    Unavailable(String),

    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Solver { program: String, status: ExitStatus },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("sweep file {path:?}, line {line}: {message}")]
    SweepFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Gds(#[from] GdsError),

    #[error("layer {layer} has a thickness but no material (materials given for {available:?})")]
    MissingMaterial { layer: String, available: Vec<String> },

    #[error("component `{0}` has no ports to simulate")]
    NoPorts(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid results file {path:?}: {source}")]
    Results {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
