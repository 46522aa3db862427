use async_trait::async_trait;
use common::err_context::ErrorContextExt;
use common::settings::{MailchimpSettings, MatchPolicy};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::ports::secondary::{
    AudienceUploader, MailingListService, MemberUpdate, UploadError as Error, UploadReport,
};
use crate::domain::{AudienceMember, EmailHashing};

/// Decides which members of a batch are pushed.
pub type MemberPredicate = Box<dyn Fn(&AudienceMember) -> bool + Send + Sync>;

/// Turns the configured policy into a predicate. Emails are compared without case.
pub fn member_predicate(policy: &MatchPolicy) -> MemberPredicate {
    match policy {
        MatchPolicy::All => Box::new(|_| true),
        MatchPolicy::Emails(emails) => {
            let emails: HashSet<String> = emails.iter().map(|e| e.to_lowercase()).collect();
            Box::new(move |member| emails.contains(&member.email().to_lowercase()))
        }
        MatchPolicy::Ids(ids) => {
            let ids: HashSet<String> = ids.iter().cloned().collect();
            Box::new(move |member| ids.contains(member.hashed_email()))
        }
    }
}

/// Updates the members of a list that the predicate selects, and tags them with the
/// batch tags.
///
/// Members are looked up by their subscriber hash, the MD5 of the lowercased email, whatever
/// hashing produced the batch ids. Reports carry subscriber hashes.
///
/// Members are never created: a member unknown to the list is reported, not added.
pub struct MailchimpUploader {
    service: Arc<dyn MailingListService + Send + Sync>,
    list_id: String,
    status: String,
    merge_fields: BTreeMap<String, String>,
    matches: MemberPredicate,
}

impl fmt::Debug for MailchimpUploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailchimpUploader")
            .field("list_id", &self.list_id)
            .field("status", &self.status)
            .finish()
    }
}

impl MailchimpUploader {
    pub fn new(
        service: Arc<dyn MailingListService + Send + Sync>,
        settings: &MailchimpSettings,
    ) -> Self {
        MailchimpUploader {
            service,
            list_id: settings.list_id.clone(),
            status: settings.status.clone(),
            // Configuration keys come back lowercased, merge tags are uppercase.
            merge_fields: settings
                .merge_fields
                .iter()
                .map(|(tag, value)| (tag.to_uppercase(), value.clone()))
                .collect(),
            matches: member_predicate(&settings.match_policy),
        }
    }

    /// Replaces the predicate built from the settings.
    pub fn with_predicate(mut self, matches: MemberPredicate) -> Self {
        self.matches = matches;
        self
    }
}

#[async_trait]
impl AudienceUploader for MailchimpUploader {
    #[tracing::instrument(name = "Uploading batch", skip_all, fields(list = %self.list_id))]
    async fn upload(&self, members: &[AudienceMember]) -> Result<UploadReport, Error> {
        let list = self
            .service
            .get_list(&self.list_id)
            .await
            .context(format!("Fetching list {}", self.list_id))?;
        info!("Uploading to list {}", list.name);

        let mut report = UploadReport {
            list_name: list.name,
            ..UploadReport::default()
        };

        for member in members {
            if !(self.matches)(member) {
                report.ignored += 1;
                continue;
            }
            let hash = EmailHashing::Lowercase.digest(member.email());
            let hash = hash.as_str();
            let existing = self
                .service
                .get_member(&self.list_id, hash)
                .await
                .context(format!("Fetching member {hash}"))?;
            let Some(existing) = existing else {
                warn!("Member {hash} is not on the list");
                report.not_found.push(hash.to_string());
                continue;
            };
            if !existing.email_address.eq_ignore_ascii_case(member.email()) {
                warn!(
                    "Member {hash} is registered as {}, not {}",
                    existing.email_address,
                    member.email()
                );
                report.mismatched.push(hash.to_string());
                continue;
            }
            let update = MemberUpdate {
                email_address: existing.email_address,
                status: self.status.clone(),
                merge_fields: self.merge_fields.clone(),
            };
            self.service
                .update_member(&self.list_id, hash, &update)
                .await
                .context(format!("Updating member {hash}"))?;
            self.service
                .add_member_tags(&self.list_id, hash, member.tags())
                .await
                .context(format!("Tagging member {hash}"))?;
            report.updated.push(hash.to_string());
        }

        info!(
            updated = report.updated.len(),
            not_found = report.not_found.len(),
            mismatched = report.mismatched.len(),
            ignored = report.ignored,
            "Upload complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::secondary::{
        ListDetails, ListMember, MailingListError, MockMailingListService,
    };
    use crate::domain::{EmailHashing, PaymentStatus, RunDate};
    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use secrecy::Secret;
    use speculoos::prelude::*;

    fn member(email: &str) -> AudienceMember {
        let date = RunDate::from(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        AudienceMember::new(email, PaymentStatus::Paid, &date, EmailHashing::Raw)
    }

    fn settings(policy: MatchPolicy) -> MailchimpSettings {
        MailchimpSettings {
            enabled: true,
            api_key: Secret::new("key-us6".to_string()),
            list_id: "list-id".to_string(),
            server_url: None,
            timeout: 10,
            match_policy: policy,
            status: "subscribed".to_string(),
            merge_fields: BTreeMap::new(),
        }
    }

    fn list(service: &mut MockMailingListService) {
        service.expect_get_list().with(eq("list-id")).returning(|id| {
            Ok(ListDetails {
                id: id.to_string(),
                name: "Westport".to_string(),
                stats: None,
            })
        });
    }

    fn known(email: &'static str) -> impl Fn(&str, &str) -> Result<Option<ListMember>, MailingListError> {
        move |_, hash| {
            Ok(Some(ListMember {
                id: hash.to_string(),
                email_address: email.to_string(),
                status: "unsubscribed".to_string(),
            }))
        }
    }

    #[test]
    fn email_predicate_should_ignore_case() {
        let matches = member_predicate(&MatchPolicy::Emails(vec!["A@B.com".to_string()]));
        assert!(matches(&member("a@b.com")));
        assert!(!matches(&member("c@d.com")));
    }

    #[test]
    fn id_predicate_should_match_hashes() {
        let target = member("a@b.com");
        let matches = member_predicate(&MatchPolicy::Ids(vec![target.hashed_email().to_string()]));
        assert!(matches(&target));
        assert!(!matches(&member("c@d.com")));
    }

    #[test]
    fn default_policy_should_match_nobody() {
        let matches = member_predicate(&MatchPolicy::default());
        assert!(!matches(&member("a@b.com")));
    }

    #[tokio::test]
    async fn matching_member_should_be_subscribed_and_tagged() {
        let target = member("a@b.com");
        let hash = target.hashed_email().to_string();

        let mut service = MockMailingListService::new();
        list(&mut service);
        service
            .expect_get_member()
            .with(eq("list-id"), eq(hash.clone()))
            .times(1)
            .returning(known("a@b.com"));
        service
            .expect_update_member()
            .withf(|_, _, update: &MemberUpdate| update.status == "subscribed")
            .times(1)
            .returning(|_, hash, update| {
                Ok(ListMember {
                    id: hash.to_string(),
                    email_address: update.email_address.clone(),
                    status: update.status.clone(),
                })
            });
        service
            .expect_add_member_tags()
            .withf(|_, _, tags| tags.len() == 2 && tags[0].name == "Paid")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let uploader = MailchimpUploader::new(Arc::new(service), &settings(MatchPolicy::All));
        let report = uploader.upload(&[target]).await.unwrap();
        assert_that(&report.list_name.as_str()).is_equal_to("Westport");
        assert_that(&report.updated).is_equal_to(vec![hash]);
    }

    #[tokio::test]
    async fn mixed_case_email_should_be_looked_up_by_subscriber_hash() {
        let target = member("John@Example.com");
        // md5 -s "john@example.com"
        let subscriber_hash = "d4c74594d841139328695756648b6bd6".to_string();
        assert_that(&target.hashed_email()).is_not_equal_to(subscriber_hash.as_str());

        let mut service = MockMailingListService::new();
        list(&mut service);
        service
            .expect_get_member()
            .with(eq("list-id"), eq(subscriber_hash.clone()))
            .times(1)
            .returning(known("john@example.com"));
        let expected = subscriber_hash.clone();
        service
            .expect_update_member()
            .withf(move |_, hash, _| hash == expected)
            .times(1)
            .returning(|_, hash, update| {
                Ok(ListMember {
                    id: hash.to_string(),
                    email_address: update.email_address.clone(),
                    status: update.status.clone(),
                })
            });
        let expected = subscriber_hash.clone();
        service
            .expect_add_member_tags()
            .withf(move |_, hash, _| hash == expected)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let uploader = MailchimpUploader::new(Arc::new(service), &settings(MatchPolicy::All));
        let report = uploader.upload(&[target]).await.unwrap();
        assert_that(&report.updated).is_equal_to(vec![subscriber_hash]);
        assert_that(&report.not_found).is_empty();
    }

    #[tokio::test]
    async fn unmatched_members_should_not_be_touched() {
        let mut service = MockMailingListService::new();
        list(&mut service);
        service.expect_get_member().never();
        service.expect_update_member().never();
        service.expect_add_member_tags().never();

        let uploader = MailchimpUploader::new(
            Arc::new(service),
            &settings(MatchPolicy::Emails(vec!["nobody@example.com".to_string()])),
        );
        let report = uploader
            .upload(&[member("a@b.com"), member("c@d.com")])
            .await
            .unwrap();
        assert_that(&report.ignored).is_equal_to(2);
        assert_that(&report.updated).is_empty();
    }

    #[tokio::test]
    async fn unknown_and_mismatched_members_should_be_reported() {
        let absent = member("a@b.com");
        let other = member("c@d.com");
        let absent_hash = absent.hashed_email().to_string();
        let other_hash = other.hashed_email().to_string();

        let mut service = MockMailingListService::new();
        list(&mut service);
        let lookup = absent_hash.clone();
        service.expect_get_member().returning(move |_, hash| {
            if hash == lookup {
                Ok(None)
            } else {
                known("someone@else.com")("list-id", hash)
            }
        });
        service.expect_update_member().never();

        let uploader = MailchimpUploader::new(Arc::new(service), &settings(MatchPolicy::All));
        let report = uploader.upload(&[absent, other]).await.unwrap();
        assert_that(&report.not_found).is_equal_to(vec![absent_hash]);
        assert_that(&report.mismatched).is_equal_to(vec![other_hash]);
    }

    #[tokio::test]
    async fn list_failure_should_stop_the_upload() {
        let mut service = MockMailingListService::new();
        service.expect_get_list().returning(|_| {
            Err(MailingListError::Response {
                context: "get list".to_string(),
                status: 404,
                detail: "Resource Not Found".to_string(),
            })
        });
        service.expect_get_member().never();

        let uploader = MailchimpUploader::new(Arc::new(service), &settings(MatchPolicy::All));
        let outcome = uploader.upload(&[member("a@b.com")]).await;
        assert!(matches!(outcome, Err(Error::MailingList { .. })));
    }

    #[tokio::test]
    async fn custom_predicate_should_replace_the_policy() {
        let mut service = MockMailingListService::new();
        list(&mut service);
        service.expect_get_member().never();

        let uploader = MailchimpUploader::new(Arc::new(service), &settings(MatchPolicy::All))
            .with_predicate(Box::new(|_| false));
        let report = uploader.upload(&[member("a@b.com")]).await.unwrap();
        assert_that(&report.ignored).is_equal_to(1);
    }
}
