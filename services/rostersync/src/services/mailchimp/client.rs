use async_trait::async_trait;
use common::err_context::ErrorContextExt;
use common::settings::MailchimpSettings;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::secondary::{
    ListDetails, ListMember, MailingListError as Error, MailingListService, MemberUpdate,
};
use crate::domain::Tag;

/// Client for the Mailchimp Marketing API v3.
#[derive(Debug, Clone)]
pub struct MailchimpClient {
    http_client: Client,
    server_url: Url,
    api_key: Secret<String>,
}

#[derive(Deserialize)]
struct ProblemDetail {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

#[derive(Serialize)]
struct TagUpdate<'a> {
    name: &'a str,
    status: &'static str,
}

#[derive(Serialize)]
struct TagsRequest<'a> {
    tags: Vec<TagUpdate<'a>>,
}

/// The API lives in the data center named after the dash of the api key, eg `…-us6`.
pub fn server_url_from_api_key(api_key: &str) -> Option<String> {
    api_key
        .rsplit_once('-')
        .map(|(_, dc)| dc)
        .filter(|dc| !dc.is_empty() && dc.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|dc| format!("https://{dc}.api.mailchimp.com/3.0"))
}

impl MailchimpClient {
    pub fn new(settings: &MailchimpSettings) -> Result<MailchimpClient, Error> {
        let server_url = match &settings.server_url {
            Some(url) => url.clone(),
            None => server_url_from_api_key(settings.api_key.expose_secret()).ok_or(
                Error::Configuration {
                    context: "api key has no data center suffix".to_string(),
                },
            )?,
        };
        let server_url = Url::parse(&server_url).map_err(|err| Error::Configuration {
            context: format!("Invalid mailchimp server url {server_url}: {err}"),
        })?;
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout))
            .build()
            .map_err(|err| Error::Configuration {
                context: format!("Could not build mailchimp http client: {err}"),
            })?;
        Ok(MailchimpClient {
            http_client,
            server_url,
            api_key: settings.api_key.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.server_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Configuration {
                context: format!("Mailchimp server url {} cannot be a base", self.server_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth("anystring", Some(self.api_key.expose_secret()))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, Error> {
        let response = self
            .authorized(request)
            .send()
            .await
            .context(format!("http client request to mailchimp: {what}"))?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(problem(response, what).await)
        }
    }
}

async fn problem(response: Response, what: &str) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ProblemDetail>(&body) {
        Ok(problem) if !problem.detail.is_empty() => format!("{}: {}", problem.title, problem.detail),
        _ => body,
    };
    Error::Response {
        context: format!("Mailchimp refused to {what}"),
        status,
        detail,
    }
}

#[async_trait]
impl MailingListService for MailchimpClient {
    #[tracing::instrument(name = "Getting mailing list", skip(self))]
    async fn get_list(&self, list_id: &str) -> Result<ListDetails, Error> {
        let url = self.url(&["lists", list_id])?;
        let response = self.send(self.http_client.get(url), "get list").await?;
        let list = response
            .json::<ListDetails>()
            .await
            .context("decoding mailchimp list")?;
        debug!("Got list {} ({})", list.name, list.id);
        Ok(list)
    }

    #[tracing::instrument(name = "Getting list member", skip(self))]
    async fn get_member(
        &self,
        list_id: &str,
        subscriber_hash: &str,
    ) -> Result<Option<ListMember>, Error> {
        let url = self.url(&["lists", list_id, "members", subscriber_hash])?;
        let response = self
            .authorized(self.http_client.get(url))
            .send()
            .await
            .context("http client request to mailchimp: get member")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(problem(response, "get member").await);
        }
        let member = response
            .json::<ListMember>()
            .await
            .context("decoding mailchimp member")?;
        Ok(Some(member))
    }

    #[tracing::instrument(name = "Updating list member", skip(self, update))]
    async fn update_member(
        &self,
        list_id: &str,
        subscriber_hash: &str,
        update: &MemberUpdate,
    ) -> Result<ListMember, Error> {
        let url = self.url(&["lists", list_id, "members", subscriber_hash])?;
        let response = self
            .send(self.http_client.patch(url).json(update), "update member")
            .await?;
        response
            .json::<ListMember>()
            .await
            .context("decoding updated mailchimp member")
            .map_err(Error::from)
    }

    #[tracing::instrument(name = "Tagging list member", skip(self, tags))]
    async fn add_member_tags(
        &self,
        list_id: &str,
        subscriber_hash: &str,
        tags: &[Tag],
    ) -> Result<(), Error> {
        let url = self.url(&["lists", list_id, "members", subscriber_hash, "tags"])?;
        let body = TagsRequest {
            tags: tags
                .iter()
                .filter(|tag| !tag.name.is_empty())
                .map(|tag| TagUpdate {
                    name: &tag.name,
                    status: "active",
                })
                .collect(),
        };
        self.send(self.http_client.post(url).json(&body), "tag member")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::settings::MatchPolicy;
    use fake::{Fake, Faker};
    use speculoos::prelude::*;
    use std::collections::BTreeMap;
    use wiremock::matchers::{any, body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HASH: &str = "357a20e8c56e69d6f9734d23ef9517e8";

    fn settings(server_url: Option<String>, api_key: &str, timeout: u64) -> MailchimpSettings {
        MailchimpSettings {
            enabled: true,
            api_key: Secret::new(api_key.to_string()),
            list_id: "list-id".to_string(),
            server_url,
            timeout,
            match_policy: MatchPolicy::All,
            status: "subscribed".to_string(),
            merge_fields: BTreeMap::new(),
        }
    }

    async fn client(mock_server: &MockServer) -> MailchimpClient {
        let key = format!("{}-us6", Faker.fake::<String>());
        MailchimpClient::new(&settings(Some(mock_server.uri()), &key, 3)).expect("mailchimp client")
    }

    #[test]
    fn server_url_should_come_from_the_data_center_suffix() {
        assert_that(&server_url_from_api_key("0123456789abcdef-us6"))
            .is_equal_to(Some("https://us6.api.mailchimp.com/3.0".to_string()));
        assert_that(&server_url_from_api_key("0123456789abcdef")).is_none();
    }

    #[test]
    fn api_key_without_data_center_should_be_a_configuration_error() {
        let outcome = MailchimpClient::new(&settings(None, "nodatacenter", 3));
        assert!(matches!(outcome, Err(Error::Configuration { .. })));
    }

    #[tokio::test]
    async fn get_list_should_fire_an_authenticated_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lists/list-id"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "list-id",
                "name": "Westport",
                "stats": { "member_count": 42 }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let list = client(&mock_server).await.get_list("list-id").await.unwrap();
        assert_that(&list.name.as_str()).is_equal_to("Westport");
    }

    #[tokio::test]
    async fn unknown_member_should_be_none() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/lists/list-id/members/{HASH}")))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "title": "Resource Not Found",
                "status": 404,
                "detail": "The requested resource could not be found."
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let member = client(&mock_server)
            .await
            .get_member("list-id", HASH)
            .await
            .unwrap();
        assert_that(&member).is_none();
    }

    #[tokio::test]
    async fn update_member_should_patch_status_and_merge_fields() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("/lists/list-id/members/{HASH}")))
            .and(body_json(serde_json::json!({
                "email_address": "a@b.com",
                "status": "subscribed",
                "merge_fields": { "FNAME": "Dopey" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": HASH,
                "email_address": "a@b.com",
                "status": "subscribed"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let update = MemberUpdate {
            email_address: "a@b.com".to_string(),
            status: "subscribed".to_string(),
            merge_fields: BTreeMap::from([("FNAME".to_string(), "Dopey".to_string())]),
        };
        let member = client(&mock_server)
            .await
            .update_member("list-id", HASH, &update)
            .await
            .unwrap();
        assert_that(&member.status.as_str()).is_equal_to("subscribed");
    }

    #[tokio::test]
    async fn tags_should_be_posted_as_active() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/lists/list-id/members/{HASH}/tags")))
            .and(body_json(serde_json::json!({
                "tags": [
                    { "name": "Paid", "status": "active" },
                    { "name": "March 5 2024", "status": "active" }
                ]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server)
            .await
            .add_member_tags("list-id", HASH, &[Tag::new("Paid"), Tag::new("March 5 2024")])
            .await;
        assert_that(&outcome).is_ok();
    }

    #[tokio::test]
    async fn server_error_should_carry_the_problem_detail() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "title": "API Key Invalid",
                "status": 401,
                "detail": "Your API key may be invalid."
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server).await.get_list("list-id").await;
        match outcome {
            Err(Error::Response { status, detail, .. }) => {
                assert_that(&status).is_equal_to(401);
                assert_that(&detail.as_str())
                    .is_equal_to("API Key Invalid: Your API key may be invalid.");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_times_out_if_the_server_takes_too_long() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(6)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server).await.get_list("list-id").await;
        assert!(matches!(outcome, Err(Error::Connection { .. })));
    }
}
