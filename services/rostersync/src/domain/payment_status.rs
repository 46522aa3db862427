use std::fmt;

/// Derived from the free text status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    /// Case insensitive substring match on "paid".
    ///
    /// Note that "unpaid" contains "paid", and is therefore `Paid`.
    pub fn from_status_text(status: &str) -> PaymentStatus {
        // TODO: tell an empty status apart from an explicit "unpaid" once the sheet has a
        // dedicated payment column.
        if !status.is_empty() && status.to_lowercase().contains("paid") {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
