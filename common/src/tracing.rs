use crate::settings::{LogFormat, TracingSettings};
use std::fmt;
use tracing_subscriber::{fmt as tfmt, layer::SubscriberExt, EnvFilter, Registry};

#[derive(Debug)]
pub enum Error {
    Logger {
        context: String,
        source: tracing_log::log::SetLoggerError,
    },
    Subscriber {
        context: String,
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Logger { context, source } => {
                write!(fmt, "Could not bridge log records: {context} | {source}")
            }
            Error::Subscriber { context, source } => {
                write!(fmt, "Could not install subscriber: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Initialize tracing: apply an `EnvFilter` using the `RUST_LOG` environment variable to define the
/// log levels, falling back to the configured level, and add a formatter layer writing to stderr.
///
/// Standard output is reserved for the serialized batch.
pub fn init_tracing(settings: &TracingSettings) -> Result<(), Error> {
    let TracingSettings { level, format } = settings;

    tracing_log::LogTracer::init().map_err(|source| Error::Logger {
        context: "LogTracer".to_string(),
        source,
    })?;

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = Registry::default().with(filter_layer);

    let res = match format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(tfmt::Layer::new().json().with_writer(std::io::stderr)),
        ),
        LogFormat::Plain => tracing::subscriber::set_global_default(
            registry.with(tfmt::Layer::new().with_writer(std::io::stderr)),
        ),
    };

    res.map_err(|source| Error::Subscriber {
        context: format!("{format:?} formatter"),
        source,
    })
}
