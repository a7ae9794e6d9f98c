//! Error types shared by the registry, dispatcher and file collaborator

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while building the tool registry at startup
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    DuplicateName(String),

    #[error("invalid input schema for tool {tool}: {reason}")]
    InvalidSchema { tool: String, reason: String },
}

/// A validated argument record that does not fit the handler's typed form
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ArgumentDecodeError(#[from] pub serde_json::Error);

/// Classification of a failed dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FaultKind {
    MethodNotFound,
    InvalidArguments,
    InternalError,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultKind::MethodNotFound => "method not found",
            FaultKind::InvalidArguments => "invalid arguments",
            FaultKind::InternalError => "internal error",
        };
        f.write_str(s)
    }
}

/// A classified dispatch failure, prior to envelope translation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

impl Fault {
    pub fn method_not_found(tool: &str) -> Self {
        Self {
            kind: FaultKind::MethodNotFound,
            message: format!("Unknown tool: {tool}"),
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::InvalidArguments,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::InternalError,
            message: message.into(),
        }
    }
}

/// I/O failure reported by a [`crate::files::FileWriter`]
#[derive(Error, Debug)]
#[error("failed to {op} {}", .path.display())]
pub struct FileError {
    pub op: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl FileError {
    pub fn new(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            op,
            path: path.into(),
            source,
        }
    }
}
