use common::config;
use common::settings::Settings;
use std::path::PathBuf;

use super::Error;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

/// Configuration sub directories, merged in this order.
pub const CONFIG_SUB_DIRS: [&str; 6] = [
    "service", "google", "sheet", "mailchimp", "roster", "tracing",
];

/// Prefix of the environment variables overriding settings, eg `ROSTERSYNC__SHEET__RANGE`.
pub const ENV_PREFIX: &str = "ROSTERSYNC";

#[derive(Debug, Clone, clap::Parser)]
#[clap(
    name = "rostersync",
    about = "Publishes a spreadsheet roster as a mailing list audience batch",
    version = VERSION,
    author = AUTHORS
    )]
pub struct Opts {
    /// Defines the config directory
    #[arg(value_parser = clap::value_parser!(PathBuf), short = 'c', long = "config-dir")]
    pub config_dir: PathBuf,

    /// Defines the run mode in {testing, dev, prod, ...}
    ///
    /// If no run mode is provided, only the default and local settings are used.
    #[arg(short = 'm', long = "run-mode")]
    pub run_mode: Option<String>,

    /// Override settings values using key=value
    #[arg(short = 's', long = "setting")]
    pub settings: Vec<String>,

    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Fetch the roster, print the batch, and upload it if requested
    Run {
        /// Upload the batch to the mailing list
        #[arg(long, conflicts_with = "no_upload")]
        upload: bool,

        /// Only print the batch
        #[arg(long)]
        no_upload: bool,
    },
    /// Obtain and cache a Google access token
    Authorize,
    /// Prints the merged configuration
    Config,
}

impl Command {
    /// Whether `run` should upload, the flags winning over `mailchimp.enabled`.
    pub fn upload(&self, settings: &Settings) -> bool {
        match self {
            Command::Run { upload: true, .. } => true,
            Command::Run {
                no_upload: true, ..
            } => false,
            Command::Run { .. } => settings.mailchimp.enabled,
            _ => false,
        }
    }
}

impl TryInto<Settings> for Opts {
    type Error = Error;

    fn try_into(self) -> Result<Settings, Self::Error> {
        config::merge_configuration(
            self.config_dir.as_ref(),
            &CONFIG_SUB_DIRS,
            self.run_mode.as_deref(),
            ENV_PREFIX,
            self.settings.clone(),
        )
        .map_err(|err| Error::Merging {
            context: "RosterSync Settings: Could not merge configuration".to_string(),
            source: err,
        })?
        .try_deserialize()
        .map_err(|err| Error::Deserializing {
            context: "RosterSync Settings: Could not deserialize configuration".to_string(),
            source: err,
        })
    }
}
