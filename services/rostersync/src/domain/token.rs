use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Tokens expiring within this window are treated as expired.
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// An OAuth2 token, as cached in the token file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_expiry",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Some writers store a token without expiry as the zero time `0001-01-01T00:00:00Z`.
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let expiry = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(expiry.filter(|expiry| expiry.year() > 1))
}

impl Token {
    /// A token without expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= now + Duration::seconds(EXPIRY_SKEW_SECONDS),
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expiry", &self.expiry)
            .finish()
    }
}
