//! Runtime settings resolved from flags, environment and platform directories.

use crate::cli::{Cli, Command};
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "wordle-client";
const SESSION_FILE: &str = "session.json";
const LOG_FILE: &str = "wordle-client.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory on this platform; pass --session-file")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    /// Where logs go; `None` keeps them on stderr.
    pub log_file: Option<PathBuf>,
    pub verbose: u8,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let session_file = match &cli.session_file {
            Some(path) => path.clone(),
            None => default_session_file()?,
        };
        let log_file = cli
            .log_file
            .clone()
            .or_else(|| owns_terminal(&cli.command).then(default_log_file).flatten());
        Ok(Self {
            api_url: cli.api_url.trim_end_matches('/').to_string(),
            session_file,
            log_file,
            verbose: cli.verbose,
        })
    }

    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Full-screen commands draw over stderr, so their logs are sent to a file.
fn owns_terminal(command: &Command) -> bool {
    matches!(command, Command::Play { plain: false } | Command::Demo)
}

pub fn default_session_file() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SESSION_FILE))
        .ok_or(ConfigError::NoConfigDir)
}

#[must_use]
pub fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(APP_DIR).join(LOG_FILE))
}
