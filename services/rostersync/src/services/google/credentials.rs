use common::err_context::{ErrorContext, ErrorContextExt};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// The OAuth client, as downloaded from the Google Cloud console.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    /// The first redirect URI of the file.
    pub redirect_uri: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

// Either an "installed" (desktop) or a "web" application.
#[derive(Deserialize)]
struct CredentialsFile {
    installed: Option<CredentialsSection>,
    web: Option<CredentialsSection>,
}

#[derive(Deserialize)]
struct CredentialsSection {
    client_id: String,
    #[serde(default)]
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
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
    Invalid {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { context, source } => write!(fmt, "Credentials IO: {context} | {source}"),
            Error::Format { context, source } => {
                write!(fmt, "Credentials Format: {context} | {source}")
            }
            Error::Invalid { context } => write!(fmt, "Credentials Invalid: {context}"),
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

impl ClientCredentials {
    pub fn from_file(path: &Path) -> Result<ClientCredentials, Error> {
        let content = std::fs::read_to_string(path).context(format!(
            "Unable to read client secret file {}",
            path.display()
        ))?;
        ClientCredentials::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<ClientCredentials, Error> {
        let file: CredentialsFile =
            serde_json::from_str(content).context("Unable to parse client secret file")?;
        let section = file.web.or(file.installed).ok_or(Error::Invalid {
            context: "no 'installed' or 'web' section".to_string(),
        })?;
        let redirect_uri = section
            .redirect_uris
            .into_iter()
            .next()
            .ok_or(Error::Invalid {
                context: "missing redirect URL".to_string(),
            })?;
        Ok(ClientCredentials {
            client_id: section.client_id,
            client_secret: section.client_secret,
            auth_uri: section.auth_uri,
            token_uri: section.token_uri,
            redirect_uri,
        })
    }
}
