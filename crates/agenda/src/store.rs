//! Per-user commitment files.
//!
//! Each user token owns `user_<token>.json` in the data directory, holding a
//! flat JSON array of commitments. Saves append to it; loads create it empty
//! when it does not exist yet.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::Commitment;

/// Longest token accepted in a file name
const MAX_TOKEN_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token: {0:?}")]
    InvalidToken(String),

    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize commitments: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Check a token before it becomes part of a file name
pub fn validate_token(token: &str) -> Result<&str, StoreError> {
    if token.is_empty() {
        return Err(StoreError::MissingToken);
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if token.len() > MAX_TOKEN_LEN || !token.chars().all(allowed) {
        return Err(StoreError::InvalidToken(token.to_string()));
    }
    Ok(token)
}

#[derive(Debug, Clone)]
pub struct CommitmentStore {
    data_dir: PathBuf,
}

impl CommitmentStore {
    /// Use `data_dir` for user files, creating it if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|source| StoreError::Io {
                path: data_dir.clone(),
                source,
            })?;
            info!(path = %data_dir.display(), "Created data directory");
        }
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, token: &str) -> Result<PathBuf, StoreError> {
        let token = validate_token(token)?;
        Ok(self.data_dir.join(format!("user_{}.json", token)))
    }

    /// All commitments saved under `token`. A missing file is created as an
    /// empty list.
    pub fn load(&self, token: &str) -> Result<Vec<Commitment>, StoreError> {
        let path = self.path_for(token)?;

        if !path.exists() {
            warn!(path = %path.display(), "File not found, creating new one");
            write_file(&path, "[]")?;
            return Ok(Vec::new());
        }

        read_entries(&path)
    }

    /// Append `new` to the user's list and return the new total.
    ///
    /// Existing content that is not a commitment array is discarded.
    pub fn append(&self, token: &str, new: Vec<Commitment>) -> Result<usize, StoreError> {
        let path = self.path_for(token)?;

        let mut entries = if path.exists() {
            read_entries(&path)?
        } else {
            Vec::new()
        };
        let added = new.len();
        entries.extend(new);

        let json = serde_json::to_string(&entries)?;
        write_file(&path, &json)?;

        debug!(path = %path.display(), added, total = entries.len(), "Commitments saved");
        Ok(entries.len())
    }
}

fn read_entries(path: &Path) -> Result<Vec<Commitment>, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str(&content) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Stored data unreadable, starting over");
            Ok(Vec::new())
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), StoreError> {
    fs::write(path, content).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
