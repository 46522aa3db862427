/// Where OAuth tokens are cached between runs.
use common::err_context::ErrorContext;
use std::fmt;

use crate::domain::Token;

#[cfg_attr(test, mockall::automock)]
pub trait TokenStore {
    /// `None` when no token was cached yet.
    fn load(&self) -> Result<Option<Token>, Error>;

    fn save(&self, token: &Token) -> Result<(), Error>;
}

#[derive(Debug)]
pub enum Error {
    Io {
        context: String,
        source: std::io::Error,
    },
    Format {
        context: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { context, source } => {
                write!(fmt, "Token Store IO: {context} | {source}")
            }
            Error::Format { context, source } => {
                write!(fmt, "Token Store Format: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<std::io::Error>> for Error {
    fn from(err: ErrorContext<std::io::Error>) -> Self {
        Error::Io {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<serde_json::Error>> for Error {
    fn from(err: ErrorContext<serde_json::Error>) -> Self {
        Error::Format {
            context: err.0,
            source: err.1,
        }
    }
}
