use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use tokio::sync::mpsc::error::SendError as TokioSendError;

use crate::event::ViewEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum PathwayError {
    #[error("Pathway description error: {0}")]
    Codec(String),
    #[error("Invalid Command: {0}")]
    Command(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("Adjacency invariant violated: {0}")]
    InvariantViolation(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl PathwayError {
    /// `NotFound` has a defined fallback (show the pathway unfiltered); everything else aborts the
    /// enclosing composition pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PathwayError::NotFound(_))
    }
}

impl From<toml::de::Error> for PathwayError {
    fn from(src: toml::de::Error) -> PathwayError {
        PathwayError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for PathwayError {
    fn from(src: toml::ser::Error) -> PathwayError {
        PathwayError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for PathwayError {
    fn from(src: JsonError) -> PathwayError {
        PathwayError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<uuid::Error> for PathwayError {
    fn from(src: uuid::Error) -> PathwayError {
        PathwayError::Serialization(format!("UUID conversion failed: {src}"))
    }
}

impl From<io::Error> for PathwayError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => PathwayError::NotFound(format!("{x}")),
            _ => PathwayError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for PathwayError {
    fn from(x: fmt::Error) -> Self {
        PathwayError::Custom(format!("{x}"))
    }
}

impl From<TokioSendError<ViewEvent>> for PathwayError {
    fn from(x: TokioSendError<ViewEvent>) -> Self {
        PathwayError::Io(format!(
            "Channel update send Error, could not transmit view event {:?}",
            x.0
        ))
    }
}
