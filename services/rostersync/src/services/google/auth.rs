use common::err_context::{ErrorContext, ErrorContextExt};
use reqwest::Url;
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{info, warn};

use super::oauth::{Error as OAuthError, OAuthClient};
use crate::domain::ports::secondary::{TokenStore, TokenStoreError};
use crate::domain::Token;

/// Asks the user to visit the consent page and paste back the authorization code.
#[cfg_attr(test, mockall::automock)]
pub trait CodePrompt {
    fn authorization_code(&self, url: &Url) -> Result<String, std::io::Error>;
}

/// Prompts on stderr and reads the code from stdin; stdout is kept for the batch.
#[derive(Debug, Clone, Default)]
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    fn authorization_code(&self, url: &Url) -> Result<String, std::io::Error> {
        eprintln!(
            "Go to the following link in your browser then type the authorization code: \n{url}"
        );
        let mut code = String::new();
        std::io::stdin().lock().read_line(&mut code)?;
        Ok(code.trim().to_string())
    }
}

#[derive(Debug)]
pub enum Error {
    TokenStore {
        context: String,
        source: TokenStoreError,
    },
    OAuth {
        context: String,
        source: OAuthError,
    },
    Prompt {
        context: String,
        source: std::io::Error,
    },
    /// The user gave no code.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TokenStore { context, source } => {
                write!(fmt, "Authentication Token Store: {context} | {source}")
            }
            Error::OAuth { context, source } => {
                write!(fmt, "Authentication OAuth: {context} | {source}")
            }
            Error::Prompt { context, source } => {
                write!(fmt, "Authentication Prompt: {context} | {source}")
            }
            Error::Cancelled => write!(fmt, "Authentication cancelled: no authorization code"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<TokenStoreError>> for Error {
    fn from(err: ErrorContext<TokenStoreError>) -> Self {
        Error::TokenStore {
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

impl From<ErrorContext<std::io::Error>> for Error {
    fn from(err: ErrorContext<std::io::Error>) -> Self {
        Error::Prompt {
            context: err.0,
            source: err.1,
        }
    }
}

/// Hands out a valid access token: the cached one, a refreshed one, or one obtained
/// through the consent page.
pub struct Authenticator {
    oauth: OAuthClient,
    store: Arc<dyn TokenStore + Send + Sync>,
    prompt: Arc<dyn CodePrompt + Send + Sync>,
}

impl Authenticator {
    pub fn new(
        oauth: OAuthClient,
        store: Arc<dyn TokenStore + Send + Sync>,
        prompt: Arc<dyn CodePrompt + Send + Sync>,
    ) -> Self {
        Authenticator {
            oauth,
            store,
            prompt,
        }
    }

    pub async fn token(&self) -> Result<Token, Error> {
        let cached = match self.store.load() {
            Ok(cached) => cached,
            Err(TokenStoreError::Format { context, source }) => {
                warn!("Ignoring unreadable cached token ({context}: {source})");
                None
            }
            Err(err) => {
                return Err(Error::TokenStore {
                    context: "Loading cached token".to_string(),
                    source: err,
                })
            }
        };

        match cached {
            Some(token) if !token.is_expired() => {
                info!("Using cached token");
                Ok(token)
            }
            Some(token) if token.can_refresh() => match self.oauth.refresh(&token).await {
                Ok(token) => {
                    self.store.save(&token).context("Saving refreshed token")?;
                    Ok(token)
                }
                Err(OAuthError::Response { status, body, .. }) if (400..500).contains(&status) => {
                    warn!("Token refresh refused ({status}: {body}), asking for consent again");
                    self.consent().await
                }
                Err(err) => Err(Error::OAuth {
                    context: "Refreshing expired token".to_string(),
                    source: err,
                }),
            },
            _ => self.consent().await,
        }
    }

    /// Goes through the consent page, and caches the resulting token.
    pub async fn consent(&self) -> Result<Token, Error> {
        let url = self
            .oauth
            .authorize_url()
            .context("Building authorization url")?;
        let code = self
            .prompt
            .authorization_code(&url)
            .context("Unable to read authorization code")?;
        if code.is_empty() {
            return Err(Error::Cancelled);
        }
        let token = self
            .oauth
            .exchange_code(&code)
            .await
            .context("Unable to retrieve token from web")?;
        self.store.save(&token).context("Unable to cache oauth token")?;
        Ok(token)
    }
}
