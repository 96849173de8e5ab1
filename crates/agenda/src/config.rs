//! Server configuration from environment variables and command-line flags.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;

/// Where the server listens and where it keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Directory holding `user_<token>.json` files
    pub data_dir: PathBuf,
    /// Directory served for any path without a route
    pub static_dir: PathBuf,
    /// JSON file listing the users allowed to log in
    pub credentials: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("data"),
            static_dir: PathBuf::from("static"),
            credentials: PathBuf::from("users/creds.json"),
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Reads `AGENDA_PORT`, `AGENDA_DATA_DIR`, `AGENDA_STATIC_DIR` and
    /// `AGENDA_CREDENTIALS`, either from the environment or from a `.env`
    /// file. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("AGENDA_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("AGENDA_PORT is not a valid port: {:?}", port))?;
        }
        if let Some(dir) = lookup("AGENDA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("AGENDA_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("AGENDA_CREDENTIALS") {
            config.credentials = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Apply command-line flags on top; flags win over the environment.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        static_dir: Option<PathBuf>,
        credentials: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = static_dir {
            self.static_dir = dir;
        }
        if let Some(path) = credentials {
            self.credentials = path;
        }
        self
    }
}
