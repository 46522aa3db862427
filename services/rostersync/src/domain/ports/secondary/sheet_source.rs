/// Interface to the spreadsheet holding the roster.
use async_trait::async_trait;
use common::err_context::ErrorContext;
use std::fmt;

use crate::domain::SourceRow;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetSource {
    /// Returns the rows of `range` (A1 notation), in sheet order.
    async fn fetch_rows(&self, spreadsheet_id: &str, range: &str)
        -> Result<Vec<SourceRow>, Error>;
}

#[derive(Debug)]
pub enum Error {
    /// Cannot reach the spreadsheet service
    Connection {
        context: String,
        source: reqwest::Error,
    },
    /// The service answered with an error status
    Response {
        context: String,
        status: u16,
        message: String,
    },
    Configuration {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection { context, source } => {
                write!(fmt, "Spreadsheet Connection: {context} | {source}")
            }
            Error::Response {
                context,
                status,
                message,
            } => {
                write!(fmt, "Spreadsheet Response: {context} | {status}: {message}")
            }
            Error::Configuration { context } => {
                write!(fmt, "Spreadsheet Configuration: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<reqwest::Error>> for Error {
    fn from(err: ErrorContext<reqwest::Error>) -> Self {
        Error::Connection {
            context: err.0,
            source: err.1,
        }
    }
}
