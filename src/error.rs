use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error reading {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {source_name}: {message}")]
    ParseError {
        source_name: String,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ParseError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the input data rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::ParseError { .. } | Error::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
