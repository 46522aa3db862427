mod error;
pub mod opts;

pub use self::error::Error;

use common::err_context::ErrorContextExt;
use common::settings::{GoogleSettings, MailchimpSettings, RosterSettings, SheetSettings, Settings};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use crate::domain::ports::secondary::{AudienceUploader, SheetSource, UploadReport};
use crate::domain::{EmailHashing, Roster, RunDate, Token};
use crate::services::google::{
    Authenticator, ClientCredentials, OAuthClient, SheetsClient, StdinPrompt,
};
use crate::services::mailchimp::{MailchimpClient, MailchimpUploader};
use crate::services::token_file::FileTokenStore;

/// One sync: fetch the roster range, print the batch, and optionally upload it.
pub struct Application {
    sheet: Arc<dyn SheetSource + Send + Sync>,
    uploader: Option<Arc<dyn AudienceUploader + Send + Sync>>,
    spreadsheet_id: String,
    range: String,
    hashing: EmailHashing,
    date: Option<RunDate>,
}

/// What a sync produced.
#[derive(Debug)]
pub struct SyncOutcome {
    pub roster: Roster,
    /// `None` when no upload was requested.
    pub report: Option<UploadReport>,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }
}

#[derive(Default)]
pub struct ApplicationBuilder {
    pub sheet: Option<Arc<dyn SheetSource + Send + Sync>>,
    pub uploader: Option<Arc<dyn AudienceUploader + Send + Sync>>,
    pub spreadsheet_id: Option<String>,
    pub range: Option<String>,
    pub hashing: EmailHashing,
    pub date: Option<RunDate>,
}

impl ApplicationBuilder {
    /// Authenticates against Google, and sets up the Mailchimp uploader when `upload` is set.
    pub async fn new(settings: Settings, upload: bool) -> Result<Self, Error> {
        let Settings {
            google,
            sheet,
            mailchimp,
            roster,
            tracing: _,
            mode: _,
        } = settings;
        let token = authenticator(&google)?
            .token()
            .await
            .context("Unable to retrieve an access token")?;
        let builder = Self::default()
            .sheet(&sheet, &token, google.timeout)?
            .range(sheet.spreadsheet_id, sheet.range)
            .hashing(email_hashing(&roster));
        if upload {
            builder.mailchimp(&mailchimp)
        } else {
            Ok(builder)
        }
    }

    pub fn sheet(
        mut self,
        settings: &SheetSettings,
        token: &Token,
        timeout: u64,
    ) -> Result<Self, Error> {
        let client = SheetsClient::new(settings, token, timeout)
            .context("Unable to retrieve Sheets client")?;
        self.sheet = Some(Arc::new(client));
        Ok(self)
    }

    pub fn sheet_source(mut self, sheet: Arc<dyn SheetSource + Send + Sync>) -> Self {
        self.sheet = Some(sheet);
        self
    }

    pub fn mailchimp(mut self, settings: &MailchimpSettings) -> Result<Self, Error> {
        let client = MailchimpClient::new(settings)
            .context("Establishing a mailchimp client".to_string())?;
        let uploader = MailchimpUploader::new(Arc::new(client), settings);
        self.uploader = Some(Arc::new(uploader));
        Ok(self)
    }

    pub fn audience_uploader(mut self, uploader: Arc<dyn AudienceUploader + Send + Sync>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn range(mut self, spreadsheet_id: String, range: String) -> Self {
        self.spreadsheet_id = Some(spreadsheet_id);
        self.range = Some(range);
        self
    }

    pub fn hashing(mut self, hashing: EmailHashing) -> Self {
        self.hashing = hashing;
        self
    }

    /// Stamps the batch with this date instead of today's.
    pub fn date(mut self, date: RunDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn build(self) -> Result<Application, Error> {
        let ApplicationBuilder {
            sheet,
            uploader,
            spreadsheet_id,
            range,
            hashing,
            date,
        } = self;
        let missing = |what: &str| Error::Configuration {
            context: format!("Application built without {what}"),
        };
        Ok(Application {
            sheet: sheet.ok_or_else(|| missing("a sheet source"))?,
            uploader,
            spreadsheet_id: spreadsheet_id.ok_or_else(|| missing("a spreadsheet id"))?,
            range: range.ok_or_else(|| missing("a range"))?,
            hashing,
            date,
        })
    }
}

/// How batch ids are derived from emails.
pub fn email_hashing(settings: &RosterSettings) -> EmailHashing {
    if settings.normalize_email_case {
        EmailHashing::Lowercase
    } else {
        EmailHashing::Raw
    }
}

/// The authenticator for the configured Google client, caching tokens in the token file
/// and prompting on the terminal.
pub fn authenticator(settings: &GoogleSettings) -> Result<Authenticator, Error> {
    let credentials = ClientCredentials::from_file(&settings.credentials_path).context(format!(
        "Unable to read client secret file {}",
        settings.credentials_path.display()
    ))?;
    let oauth = OAuthClient::new(credentials, settings.scopes.clone(), settings.timeout)
        .context("Unable to parse client secret file to config")?;
    let store = Arc::new(FileTokenStore::new(settings.token_path.clone()));
    Ok(Authenticator::new(oauth, store, Arc::new(StdinPrompt)))
}

impl Application {
    /// Writes the batch to `out` before uploading, so a failed upload never loses the output.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<SyncOutcome, Error> {
        let rows = self
            .sheet
            .fetch_rows(&self.spreadsheet_id, &self.range)
            .await
            .context("Unable to retrieve data from sheet")?;
        if rows.is_empty() {
            info!("No data found.");
        }

        let date = self.date.clone().unwrap_or_else(RunDate::today);
        let roster = Roster::from_rows(rows, &date, self.hashing);
        info!(
            members = roster.len(),
            rejected = roster.rejected().len(),
            date = date.as_str(),
            "Built roster"
        );

        let payload = roster.to_json().context("Serializing roster")?;
        out.write_all(&payload).context("Writing roster")?;
        out.flush().context("Flushing roster")?;

        let report = match &self.uploader {
            Some(uploader) => Some(
                uploader
                    .upload(roster.members())
                    .await
                    .context("Uploading roster")?,
            ),
            None => None,
        };

        Ok(SyncOutcome { roster, report })
    }
}
