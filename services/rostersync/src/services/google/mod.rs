//! Google APIs: client credentials, the OAuth2 flow and the Sheets values endpoint.

pub mod auth;
pub mod credentials;
pub mod oauth;
pub mod sheets;

pub use auth::{Authenticator, CodePrompt, Error as AuthError, StdinPrompt};
pub use credentials::{ClientCredentials, Error as CredentialsError};
pub use oauth::{Error as OAuthError, OAuthClient};
pub use sheets::SheetsClient;
