//! Which document, chat message, and price list the user is currently working with.
//!
//! Each new submission overwrites the previous id of its kind. Export and
//! status commands read from here when no explicit id is given.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{InputError, SessionError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedJob {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    pub tracked_at: DateTime<Utc>,
}

impl TrackedJob {
    fn new(id: impl Into<String>, filename: Option<String>) -> Self {
        Self {
            id: id.into(),
            filename,
            tracked_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub document: Option<TrackedJob>,
    #[serde(default)]
    pub chat_message: Option<TrackedJob>,
    #[serde(default)]
    pub price_list: Option<TrackedJob>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_document(&mut self, id: impl Into<String>, filename: impl Into<String>) {
        self.document = Some(TrackedJob::new(id, Some(filename.into())));
    }

    pub fn track_chat_message(&mut self, id: impl Into<String>) {
        self.chat_message = Some(TrackedJob::new(id, None));
    }

    pub fn track_price_list(&mut self, id: impl Into<String>, filename: impl Into<String>) {
        self.price_list = Some(TrackedJob::new(id, Some(filename.into())));
    }

    /// Forget the current document, as when starting over with another file.
    pub fn clear_document(&mut self) {
        self.document = None;
    }

    pub fn require_document(&self) -> Result<&TrackedJob, InputError> {
        self.document.as_ref().ok_or(InputError::NoDocumentLoaded)
    }

    pub fn require_chat_message(&self) -> Result<&TrackedJob, InputError> {
        self.chat_message.as_ref().ok_or(InputError::NoChatMessage)
    }

    pub fn require_price_list(&self) -> Result<&TrackedJob, InputError> {
        self.price_list.as_ref().ok_or(InputError::NoPriceList)
    }

    /// Load a saved session. A missing file yields an empty session.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no session file, starting fresh");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SessionError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| SessionError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the session atomically: a temp file in the same directory is
    /// renamed over `path`, so an interrupted save leaves the old file intact.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(io_err)?;
                parent
            }
            None => Path::new("."),
        };
        let json = serde_json::to_vec_pretty(self).map_err(|source| SessionError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }
}
