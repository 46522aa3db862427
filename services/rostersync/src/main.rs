use clap::Parser;
use std::fmt;

use common::err_context::{ErrorContext, ErrorContextExt};
use common::settings::Settings;
use common::tracing::{init_tracing, Error as TracingError};
use rostersync::application::opts::{Command, Error as OptsError, Opts};
use rostersync::application::{authenticator, ApplicationBuilder, Error as ApplicationError};
use rostersync::services::google::AuthError;

#[derive(Debug)]
pub enum Error {
    Options {
        context: String,
        source: OptsError,
    },
    Tracing {
        context: String,
        source: TracingError,
    },
    Application {
        context: String,
        source: ApplicationError,
    },
    Authentication {
        context: String,
        source: AuthError,
    },
    Serialization {
        context: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Options { context, source } => {
                write!(fmt, "Options Error: {context} | {source}")
            }
            Error::Tracing { context, source } => {
                write!(fmt, "Tracing Error: {context} | {source}")
            }
            Error::Application { context, source } => {
                write!(fmt, "Application Error: {context} | {source}")
            }
            Error::Authentication { context, source } => {
                write!(fmt, "Authentication Error: {context} | {source}")
            }
            Error::Serialization { context, source } => {
                write!(fmt, "Serialization Error: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<OptsError>> for Error {
    fn from(err: ErrorContext<OptsError>) -> Self {
        Error::Options {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<TracingError>> for Error {
    fn from(err: ErrorContext<TracingError>) -> Self {
        Error::Tracing {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<ApplicationError>> for Error {
    fn from(err: ErrorContext<ApplicationError>) -> Self {
        Error::Application {
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

impl From<ErrorContext<serde_json::Error>> for Error {
    fn from(err: ErrorContext<serde_json::Error>) -> Self {
        Error::Serialization {
            context: err.0,
            source: err.1,
        }
    }
}

#[allow(clippy::result_large_err)]
#[tokio::main]
async fn main() -> Result<(), Error> {
    let opts = Opts::parse();

    let cmd = opts.cmd.clone();

    let settings: Settings = opts.try_into().context("Compiling Application Settings")?;

    init_tracing(&settings.tracing).context("Initializing tracing")?;

    match cmd {
        Command::Config => {
            let settings =
                serde_json::to_string_pretty(&settings).context("Printing settings")?;
            println!("{settings}");
        }
        Command::Authorize => {
            authenticator(&settings.google)
                .context("Building authenticator")?
                .token()
                .await
                .context("Authorizing access to the spreadsheet")?;
        }
        cmd @ Command::Run { .. } => {
            let upload = cmd.upload(&settings);
            let app = ApplicationBuilder::new(settings, upload)
                .await
                .context("could not build application")?
                .build()
                .context("could not build application")?;
            let mut stdout = std::io::stdout().lock();
            app.run(&mut stdout)
                .await
                .context("roster sync error")?;
        }
    }
    Ok(())
}
