//! Error handling for roster processing.
//!
//! Every fatal failure class of a run has its own variant so the binary can
//! map it to a distinct exit code. Remote lookup failures and rejected phone
//! numbers are absorbed by their passes and never surface here.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for event manager operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Roster file missing, unreadable, not valid CSV, or carrying an unusable id
    #[error("Roster error in file '{path}': {message}")]
    Source {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Roster header lacks a column the passes depend on
    #[error("Roster '{path}' is missing required column '{missing}'")]
    Schema { path: PathBuf, missing: String },

    /// Registration timestamp could not be parsed
    #[error("Invalid registration timestamp '{value}' on line {line}")]
    Timestamp {
        line: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Template missing, unreadable or referencing an unknown placeholder
    #[error("Template error in '{name}': {message}")]
    Template { name: String, message: String },

    /// Output directory or file could not be written
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create a roster source error
    pub fn roster(
        path: impl AsRef<Path>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::Source {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
            source,
        }
    }

    /// Create a schema error for a missing column
    pub fn schema(path: impl AsRef<Path>, missing: impl Into<String>) -> Self {
        Self::Schema {
            path: path.as_ref().to_path_buf(),
            missing: missing.into(),
        }
    }

    /// Create a timestamp parsing error
    pub fn timestamp(line: u64, value: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::Timestamp {
            line,
            value: value.into(),
            source,
        }
    }

    /// Create a template error
    pub fn template(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error bound to the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Process exit code for this failure class
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Source { .. } | Self::Schema { .. } => 2,
            Self::Io { .. } => 3,
            Self::Timestamp { .. } => 4,
            Self::Template { .. } => 5,
            Self::Configuration { .. } => 6,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: error,
        }
    }
}
