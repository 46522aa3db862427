/// Interface to a mailing list service holding audiences (lists) and their members.
use async_trait::async_trait;
use common::err_context::ErrorContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::Tag;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailingListService {
    async fn get_list(&self, list_id: &str) -> Result<ListDetails, Error>;

    /// `None` when the list has no member with that subscriber hash.
    async fn get_member(
        &self,
        list_id: &str,
        subscriber_hash: &str,
    ) -> Result<Option<ListMember>, Error>;

    async fn update_member(
        &self,
        list_id: &str,
        subscriber_hash: &str,
        update: &MemberUpdate,
    ) -> Result<ListMember, Error>;

    /// Marks the given tags active on the member.
    async fn add_member_tags(
        &self,
        list_id: &str,
        subscriber_hash: &str,
        tags: &[Tag],
    ) -> Result<(), Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListStats {
    #[serde(default)]
    pub member_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stats: Option<ListStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMember {
    /// The subscriber hash.
    pub id: String,
    pub email_address: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub email_address: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub merge_fields: BTreeMap<String, String>,
}

#[derive(Debug)]
pub enum Error {
    /// Cannot reach the mailing list service
    Connection {
        context: String,
        source: reqwest::Error,
    },
    /// The service answered with an error status
    Response {
        context: String,
        status: u16,
        detail: String,
    },
    Configuration {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection { context, source } => {
                write!(fmt, "Mailing List Connection: {context} | {source}")
            }
            Error::Response {
                context,
                status,
                detail,
            } => {
                write!(fmt, "Mailing List Response: {context} | {status}: {detail}")
            }
            Error::Configuration { context } => {
                write!(fmt, "Mailing List Configuration: {context}")
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
