use common::err_context::ErrorContextExt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::ports::secondary::{TokenStore, TokenStoreError as Error};
use crate::domain::Token;

/// Caches the token as JSON in a file only the current user can read.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileTokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Token>, Error> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No cached token at {}", self.path.display());
                return Ok(None);
            }
            Err(err) => {
                return Err(Error::Io {
                    context: format!("Could not read token file {}", self.path.display()),
                    source: err,
                })
            }
        };
        let token = serde_json::from_str(&content)
            .context(format!("Could not parse token file {}", self.path.display()))?;
        Ok(Some(token))
    }

    fn save(&self, token: &Token) -> Result<(), Error> {
        info!("Saving credential file to: {}", self.path.display());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Could not create directory {}", parent.display()))?;
        }

        let content = serde_json::to_vec(token).context("Could not serialize token")?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .context(format!("Could not open token file {}", self.path.display()))?;
        file.write_all(&content)
            .context(format!("Could not write token file {}", self.path.display()))?;
        Ok(())
    }
}
