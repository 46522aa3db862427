//! Mailchimp Marketing API: the list client and the batch uploader built on it.

pub mod client;
pub mod uploader;

pub use client::MailchimpClient;
pub use uploader::{member_predicate, MailchimpUploader, MemberPredicate};
