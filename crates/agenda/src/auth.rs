//! Login against the credentials file.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Name of the cookie carrying the user token
pub const TOKEN_COOKIE: &str = "userToken";

/// Token cookie lifetime: seven days
const COOKIE_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read credentials file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Body of a login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    username: String,
    password: String,
}

/// Credentials file of the form `{"users": [{"username", "password"}]}`.
///
/// The file is read on every check, so edits apply without a restart.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the username/password pair appears in the file
    pub fn verify(&self, login: &LoginRequest) -> Result<bool, AuthError> {
        let content = fs::read_to_string(&self.path).map_err(|source| {
            error!(path = %self.path.display(), "Failed to open credentials file");
            AuthError::Read {
                path: self.path.clone(),
                source,
            }
        })?;

        let file: CredentialsFile =
            serde_json::from_str(&content).map_err(|source| AuthError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let valid = file
            .users
            .iter()
            .any(|u| u.username == login.username && u.password == login.password);

        debug!(username = %login.username, valid, "Login checked");
        Ok(valid)
    }
}

/// `Set-Cookie` value handing the user token to the browser
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax; HttpOnly",
        TOKEN_COOKIE, token, COOKIE_MAX_AGE_SECS
    )
}

/// Find the user token in a `Cookie` header value
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(TOKEN_COOKIE)?.strip_prefix('='))
        .filter(|token| !token.is_empty())
}
