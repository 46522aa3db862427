pub mod google;
pub mod mailchimp;
pub mod token_file;
