//! Layout error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("invalid layer `{0}`, expected `layer/datatype`")]
    InvalidLayer(String),

    #[error("port `{port}` not found in `{component}` (ports: {available:?})")]
    PortNotFound {
        component: String,
        port: String,
        available: Vec<String>,
    },

    #[error("port `{port}` already exists in `{component}`")]
    DuplicatePort { component: String, port: String },

    #[error("unknown component `{name}` (available: {available:?})")]
    UnknownComponent { name: String, available: Vec<String> },

    #[error("invalid parameter for `{component}`: {message}")]
    InvalidParameter { component: String, message: String },
}

pub type LayoutResult<T> = Result<T, LayoutError>;
