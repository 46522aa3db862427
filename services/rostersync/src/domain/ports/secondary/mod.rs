pub mod audience_uploader;
pub mod mailing_list;
pub mod sheet_source;
pub mod token_store;

pub use audience_uploader::{AudienceUploader, Error as UploadError, UploadReport};
pub use mailing_list::{
    Error as MailingListError, ListDetails, ListMember, MailingListService, MemberUpdate,
};
pub use sheet_source::{Error as SheetFetchError, SheetSource};
pub use token_store::{Error as TokenStoreError, TokenStore};

#[cfg(test)]
pub use audience_uploader::MockAudienceUploader;

#[cfg(test)]
pub use mailing_list::MockMailingListService;

#[cfg(test)]
pub use sheet_source::MockSheetSource;

#[cfg(test)]
pub use token_store::MockTokenStore;
