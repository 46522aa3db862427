mod error;
pub use self::error::Error;

use config::{Config, Environment, File};
use std::{env, path::Path};
use tracing::trace;

use crate::err_context::ErrorContextExt;

static DEFAULT_ENV_NAME: &str = "default";
static LOCAL_ENV_NAME: &str = "local";

/// Environment variable selecting the profile, it takes precedence over the profile argument.
pub static PROFILE_ENV_VAR: &str = "ROSTERSYNC_PROFILE";

/// Builds a layered configuration.
///
/// For each sub directory of `root_dir`, we read `default`, then the profile (if any), then
/// `local`. Environment variables starting with `prefix` come next, and finally the `key=value`
/// overrides, so the last layer wins.
pub fn merge_configuration<
    'a,
    R: Into<Option<&'a str>>,
    P: Into<Option<&'a str>>,
    D: AsRef<str>,
>(
    root_dir: &Path,
    sub_dirs: &[D],
    profile: R,
    prefix: P,
    overrides: Vec<String>,
) -> Result<Config, Error> {
    if !root_dir.is_dir() {
        return Err(Error::Directory {
            path: root_dir.to_path_buf(),
        });
    }

    let profile = env::var(PROFILE_ENV_VAR)
        .ok()
        .or_else(|| profile.into().map(String::from));

    let mut builder = sub_dirs
        .iter()
        .fold(Config::builder(), |mut builder, sub_dir| {
            let dir_path = root_dir.join(sub_dir.as_ref());

            let default_path = dir_path.join(DEFAULT_ENV_NAME);

            trace!(
                "Reading default configuration from: {}",
                default_path.display()
            );

            builder = builder.add_source(File::from(default_path));

            if let Some(profile) = profile.as_deref() {
                let profile_path = dir_path.join(profile);

                trace!(
                    "Reading profile configuration from: {}",
                    profile_path.display()
                );

                builder = builder.add_source(File::from(profile_path).required(false));
            }

            // Not checked in to git, holds api keys and the like.
            let local_path = dir_path.join(LOCAL_ENV_NAME);

            trace!("Reading local configuration from: {}", local_path.display());

            builder.add_source(File::from(local_path).required(false))
        });

    if let Some(prefix) = prefix.into() {
        let prefix = Environment::with_prefix(prefix)
            .prefix_separator("__")
            .separator("__");
        builder = builder.add_source(prefix)
    }

    if !overrides.is_empty() {
        builder = builder.add_source(config_from_args(overrides)?)
    }

    builder
        .build()
        .context("Could not merge configuration")
        .map_err(|err| err.into())
}

// Create a new configuration source from a list of assignments key=value
fn config_from_args(args: impl IntoIterator<Item = String>) -> Result<Config, Error> {
    let builder = args.into_iter().fold(Config::builder(), |builder, arg| {
        builder.add_source(File::from_str(&arg, config::FileFormat::Toml))
    });
    builder
        .build()
        .context("Could not build configuration from args")
        .map_err(|err| err.into())
}
