use serde::Serialize;
use tracing::warn;

use super::audience_member::{AudienceMember, EmailHashing};
use super::payment_status::PaymentStatus;
use super::run_date::RunDate;
use super::source_row::{MalformedRowError, SourceRow};

/// A row that could not be turned into a member.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// Position in the fetched range, starting at 0.
    pub index: usize,
    pub error: MalformedRowError,
}

/// The batch of members built from one fetch, in sheet order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Roster {
    members: Vec<AudienceMember>,
    #[serde(skip)]
    rejected: Vec<RejectedRow>,
}

impl Roster {
    /// Builds the batch. Rows with an empty email are skipped, malformed rows are
    /// rejected with a warning; neither stops the batch.
    pub fn from_rows<I>(rows: I, date: &RunDate, hashing: EmailHashing) -> Roster
    where
        I: IntoIterator<Item = SourceRow>,
    {
        rows.into_iter()
            .enumerate()
            .fold(Roster::default(), |mut roster, (index, row)| {
                match row.fields() {
                    Ok(Some(fields)) => {
                        let status = PaymentStatus::from_status_text(fields.status);
                        roster
                            .members
                            .push(AudienceMember::new(fields.email, status, date, hashing));
                    }
                    Ok(None) => {}
                    Err(error) => {
                        warn!(row = index, "Skipping row: {error}");
                        roster.rejected.push(RejectedRow { index, error });
                    }
                }
                roster
            })
    }

    pub fn members(&self) -> &[AudienceMember] {
        &self.members
    }

    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// The batch as a JSON array.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
