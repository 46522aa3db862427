use async_trait::async_trait;
use common::err_context::ErrorContextExt;
use common::settings::SheetSettings;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::ports::secondary::{SheetFetchError as Error, SheetSource};
use crate::domain::{SourceRow, Token};

/// Client for the `spreadsheets.values.get` endpoint of the Sheets API v4.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http_client: Client,
    server_url: Url,
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default)]
    range: String,
    // Absent when the range holds no data.
    #[serde(default)]
    values: Vec<SourceRow>,
}

impl SheetsClient {
    pub fn new(settings: &SheetSettings, token: &Token, timeout: u64) -> Result<Self, Error> {
        let server_url = Url::parse(&settings.server_url).map_err(|err| Error::Configuration {
            context: format!("Invalid sheets server url {}: {err}", settings.server_url),
        })?;
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout))
            .build()
            .map_err(|err| Error::Configuration {
                context: format!("Could not build sheets http client: {err}"),
            })?;
        Ok(SheetsClient {
            http_client,
            server_url,
            access_token: token.access_token.clone(),
        })
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, Error> {
        let mut url = self.server_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Configuration {
                context: format!("Sheets server url {} cannot be a base", self.server_url),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        url.query_pairs_mut().append_pair("majorDimension", "ROWS");
        Ok(url)
    }
}

#[async_trait]
impl SheetSource for SheetsClient {
    #[tracing::instrument(name = "Fetching sheet rows", skip(self))]
    async fn fetch_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<SourceRow>, Error> {
        let url = self.values_url(spreadsheet_id, range)?;
        debug!("GET {url}");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("http client request to sheets service")?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Response {
                context: "Unable to retrieve data from sheet".to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let ValueRange { range, values } = response
            .json::<ValueRange>()
            .await
            .context("decoding sheets value range")?;

        info!(range = range.as_str(), rows = values.len(), "Fetched sheet rows");
        Ok(values)
    }
}
