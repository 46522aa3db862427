use serde::{Deserialize, Serialize};

use super::payment_status::PaymentStatus;
use super::run_date::RunDate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Tag {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Tag { name: name.into() }
    }
}

/// How the email is turned into the member id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmailHashing {
    /// Hash the bytes as read from the sheet.
    #[default]
    Raw,
    /// Lowercase first, as Mailchimp does for its subscriber hash.
    Lowercase,
}

impl EmailHashing {
    /// MD5 of the email, as 32 lowercase hex characters.
    pub fn digest(&self, email: &str) -> String {
        match self {
            EmailHashing::Raw => format!("{:x}", md5::compute(email.as_bytes())),
            EmailHashing::Lowercase => {
                format!("{:x}", md5::compute(email.to_lowercase().as_bytes()))
            }
        }
    }
}

/// A member of the mailing list audience, as serialized in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceMember {
    #[serde(rename = "id", default, skip_serializing_if = "String::is_empty")]
    hashed_email: String,
    #[serde(rename = "email_address", default, skip_serializing_if = "String::is_empty")]
    email: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<Tag>,
}

impl AudienceMember {
    /// The payment tag always comes first, then the run date.
    pub fn new(
        email: &str,
        status: PaymentStatus,
        date: &RunDate,
        hashing: EmailHashing,
    ) -> AudienceMember {
        AudienceMember {
            hashed_email: hashing.digest(email),
            email: email.to_string(),
            tags: vec![Tag::new(status.as_str()), Tag::new(date.as_str())],
        }
    }

    pub fn hashed_email(&self) -> &str {
        &self.hashed_email
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}
