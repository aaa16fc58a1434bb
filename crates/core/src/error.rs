use std::{fmt, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Media could not be turned into an inline payload.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to read media {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    #[error("Model service error{}: {message}", .status.map(|s| format!(" (http {s})")).unwrap_or_default())]
    Model { status: Option<u16>, message: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network {
            reason: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed analysis response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Field {field} out of range [0, 100]: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Rejections raised before a run leaves Idle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please provide at least one input (text or video)")]
    EmptySubmission,

    #[error("An analysis is already running")]
    Busy,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Encode(EncodeError::Io { .. }) => ErrorKind::Io,
            PipelineError::Gateway(GatewayError::Network { .. }) => ErrorKind::Network,
            PipelineError::Gateway(GatewayError::Auth { .. }) => ErrorKind::Auth,
            PipelineError::Gateway(GatewayError::Model { .. }) => ErrorKind::Model,
            PipelineError::Decode(_) => ErrorKind::Decode,
        }
    }
}

/// Coarse classification of a failed run, kept on the run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    Network,
    Auth,
    Model,
    Decode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Io => "io",
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::Model => "model",
            ErrorKind::Decode => "decode",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
