/// Pushes a batch of members to a mailing list audience.
use async_trait::async_trait;
use common::err_context::ErrorContext;
use std::fmt;

use super::mailing_list::Error as MailingListError;
use crate::domain::AudienceMember;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudienceUploader {
    async fn upload(&self, members: &[AudienceMember]) -> Result<UploadReport, Error>;
}

/// What happened to the members of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    pub list_name: String,
    /// Hashed emails of the members updated on the list.
    pub updated: Vec<String>,
    /// Members the match predicate selected but the list does not know.
    pub not_found: Vec<String>,
    /// Members found under their hash, but with a different email address.
    pub mismatched: Vec<String>,
    /// Members left out by the match predicate.
    pub ignored: usize,
}

#[derive(Debug)]
pub enum Error {
    MailingList {
        context: String,
        source: MailingListError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MailingList { context, source } => {
                write!(fmt, "Upload: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<MailingListError>> for Error {
    fn from(err: ErrorContext<MailingListError>) -> Self {
        Error::MailingList {
            context: err.0,
            source: err.1,
        }
    }
}
