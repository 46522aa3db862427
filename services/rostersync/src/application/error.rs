use common::err_context::ErrorContext;
use std::fmt;

use crate::domain::ports::secondary::{MailingListError, SheetFetchError, UploadError};
use crate::services::google::{AuthError, CredentialsError, OAuthError};

#[derive(Debug)]
pub enum Error {
    Credentials {
        context: String,
        source: CredentialsError,
    },
    OAuth {
        context: String,
        source: OAuthError,
    },
    Authentication {
        context: String,
        source: AuthError,
    },
    SheetFetch {
        context: String,
        source: SheetFetchError,
    },
    MailingList {
        context: String,
        source: MailingListError,
    },
    Serialization {
        context: String,
        source: serde_json::Error,
    },
    Upload {
        context: String,
        source: UploadError,
    },
    Output {
        context: String,
        source: std::io::Error,
    },
    Configuration {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Credentials { context, source } => {
                write!(fmt, "Client Credentials Error: {context} | {source}")
            }
            Error::OAuth { context, source } => {
                write!(fmt, "OAuth Error: {context} | {source}")
            }
            Error::Authentication { context, source } => {
                write!(fmt, "Authentication Error: {context} | {source}")
            }
            Error::SheetFetch { context, source } => {
                write!(fmt, "Sheet Fetch Error: {context} | {source}")
            }
            Error::MailingList { context, source } => {
                write!(fmt, "Mailing List Error: {context} | {source}")
            }
            Error::Serialization { context, source } => {
                write!(fmt, "Serialization Error: {context} | {source}")
            }
            Error::Upload { context, source } => {
                write!(fmt, "Upload Error: {context} | {source}")
            }
            Error::Output { context, source } => {
                write!(fmt, "IO Error: {context} | {source}")
            }
            Error::Configuration { context } => {
                write!(fmt, "Configuration Error: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<CredentialsError>> for Error {
    fn from(err: ErrorContext<CredentialsError>) -> Self {
        Error::Credentials {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<OAuthError>> for Error {
    fn from(err: ErrorContext<OAuthError>) -> Self {
        Error::OAuth {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<AuthError>> for Error {
    fn from(err: ErrorContext<AuthError>) -> Self {
        Error::Authentication {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<SheetFetchError>> for Error {
    fn from(err: ErrorContext<SheetFetchError>) -> Self {
        Error::SheetFetch {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<MailingListError>> for Error {
    fn from(err: ErrorContext<MailingListError>) -> Self {
        Error::MailingList {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<serde_json::Error>> for Error {
    fn from(err: ErrorContext<serde_json::Error>) -> Self {
        Error::Serialization {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<UploadError>> for Error {
    fn from(err: ErrorContext<UploadError>) -> Self {
        Error::Upload {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<std::io::Error>> for Error {
    fn from(err: ErrorContext<std::io::Error>) -> Self {
        Error::Output {
            context: err.0,
            source: err.1,
        }
    }
}
