use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize, Serializer};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Scope requested when asking the user for consent.
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    /// OAuth client secret file downloaded from the Google Cloud console.
    pub credentials_path: PathBuf,
    /// Where the access and refresh tokens are cached between runs.
    pub token_path: PathBuf,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout: u64,
}

fn default_scopes() -> Vec<String> {
    vec![SHEETS_READONLY_SCOPE.to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSettings {
    /// Base URL of the Sheets API.
    pub server_url: String,
    /// The id found in the spreadsheet URL, between `/d/` and `/edit`.
    pub spreadsheet_id: String,
    /// A1 notation, eg `Entire data base!A2:D5`.
    pub range: String,
}

/// Which members of the batch are pushed to the mailing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum MatchPolicy {
    All,
    Emails(Vec<String>),
    Ids(Vec<String>),
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::Emails(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailchimpSettings {
    /// Whether `run` uploads by default.
    #[serde(default)]
    pub enabled: bool,
    #[serde(serialize_with = "redact")]
    pub api_key: Secret<String>,
    pub list_id: String,
    /// Overrides the URL derived from the data center suffix of the api key.
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout: u64,
    #[serde(default)]
    pub match_policy: MatchPolicy,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub merge_fields: BTreeMap<String, String>,
}

fn default_status() -> String {
    "subscribed".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSettings {
    /// Lowercase emails before hashing them. Off by default, so ids match what the
    /// spreadsheet holds byte for byte.
    #[serde(default)]
    pub normalize_email_case: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingSettings {
    /// Used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub google: GoogleSettings,
    pub sheet: SheetSettings,
    pub mailchimp: MailchimpSettings,
    #[serde(default)]
    pub roster: RosterSettings,
    pub tracing: TracingSettings,
    pub mode: String,
}

fn redact<S>(secret: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if secret.expose_secret().is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("[REDACTED]")
    }
}
