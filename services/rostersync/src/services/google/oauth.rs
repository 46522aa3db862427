use chrono::{Duration, Utc};
use common::err_context::{ErrorContext, ErrorContextExt};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use super::credentials::ClientCredentials;
use crate::domain::Token;

/// State parameter sent along the authorization request.
pub const STATE: &str = "state-token";

#[derive(Debug)]
pub enum Error {
    /// Cannot reach the token endpoint
    Connection {
        context: String,
        source: reqwest::Error,
    },
    /// The token endpoint refused the grant
    Response {
        context: String,
        status: u16,
        body: String,
    },
    Configuration {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection { context, source } => {
                write!(fmt, "OAuth Connection: {context} | {source}")
            }
            Error::Response {
                context,
                status,
                body,
            } => {
                write!(fmt, "OAuth Response: {context} | {status}: {body}")
            }
            Error::Configuration { context } => {
                write!(fmt, "OAuth Configuration: {context}")
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

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh: Option<String>) -> Token {
        Token {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            // A refresh response usually omits the refresh token, we keep the one we had.
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry: self
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// The OAuth2 authorization code flow against the endpoints of the client credentials.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http_client: Client,
    credentials: ClientCredentials,
    scopes: Vec<String>,
}

impl OAuthClient {
    pub fn new(
        credentials: ClientCredentials,
        scopes: Vec<String>,
        timeout: u64,
    ) -> Result<OAuthClient, Error> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout))
            .build()
            .map_err(|err| Error::Configuration {
                context: format!("Could not build OAuth http client: {err}"),
            })?;
        Ok(OAuthClient {
            http_client,
            credentials,
            scopes,
        })
    }

    /// The page the user visits to grant access, asking for offline access so we get a
    /// refresh token.
    pub fn authorize_url(&self) -> Result<Url, Error> {
        let scope = self.scopes.join(" ");
        Url::parse_with_params(
            &self.credentials.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", STATE),
            ],
        )
        .map_err(|err| Error::Configuration {
            context: format!("Invalid auth uri {}: {err}", self.credentials.auth_uri),
        })
    }

    #[tracing::instrument(name = "Exchanging authorization code", skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<Token, Error> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];
        let response = self.request_token(&form, "authorization code exchange").await?;
        Ok(response.into_token(None))
    }

    #[tracing::instrument(name = "Refreshing access token", skip_all)]
    pub async fn refresh(&self, token: &Token) -> Result<Token, Error> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(Error::Configuration {
                context: "token has no refresh token".to_string(),
            })?;
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];
        let response = self.request_token(&form, "token refresh").await?;
        Ok(response.into_token(token.refresh_token.clone()))
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        what: &str,
    ) -> Result<TokenResponse, Error> {
        debug!("Requesting token from {}", self.credentials.token_uri);
        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(form)
            .send()
            .await
            .context(format!("http client request for {what}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Response {
                context: format!("Unable to complete {what}"),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .context(format!("decoding {what} response"))
            .map_err(Error::from)
    }
}
