pub mod audience_member;
pub mod cell;
pub mod payment_status;
pub mod ports;
pub mod roster;
pub mod run_date;
pub mod source_row;
pub mod token;

pub use audience_member::{AudienceMember, EmailHashing, Tag};
pub use cell::CellValue;
pub use payment_status::PaymentStatus;
pub use roster::{RejectedRow, Roster};
pub use run_date::RunDate;
pub use source_row::{MalformedRowError, SourceRow};
pub use token::Token;
