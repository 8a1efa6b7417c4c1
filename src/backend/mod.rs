//! Note storage backends.
//!
//! Every backend implements [`Backend`]. The CLI and the REST server receive
//! the backend they should use as an explicit argument.

mod layout;
mod local;
mod remote;

pub use layout::StoreLayout;
pub use local::{LocalBackend, StoreReport};
pub use remote::RemoteBackend;

use crate::domain::Note;
use crate::infra::IndexError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid name for note: '{0}'")]
    InvalidName(String),

    #[error("note name already exists: '{0}'")]
    NoteExist(String),

    #[error("note not found: '{0}'")]
    NotFound(String),

    /// The stored content no longer hashes to the note's id. The loaded note
    /// is kept so that callers which only need its identity can go on.
    #[error("note integrity check failed: '{}'", .0.name())]
    IntegrityFail(Box<Note>),

    #[error("note not modified: '{0}'")]
    NotModified(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid user input")]
    BadRequest,

    #[error("unauthenticated request")]
    Unauthorized,

    #[error("invalid response from server: HTTP {0}")]
    InvalidResponse(u16),
}

impl BackendError {
    /// Returns the note carried by an `IntegrityFail`, or the error itself.
    ///
    /// Used by operations that only need a note's identity, such as delete.
    pub fn recover_note(self) -> Result<Note, BackendError> {
        match self {
            BackendError::IntegrityFail(note) => Ok(*note),
            other => Err(other),
        }
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Operations every note backend supports.
pub trait Backend: Send + Sync {
    /// Prepares the backend for use. Safe to call more than once.
    fn init(&self) -> BackendResult<()>;

    /// Stores a new note under a name that is not yet in use.
    fn create(&self, note: &Note) -> BackendResult<()>;

    /// Fetches the most recent note called `name`, with its content.
    ///
    /// A note whose content fails verification is returned inside
    /// `BackendError::IntegrityFail`.
    fn get(&self, name: &str) -> BackendResult<Note>;

    /// Replaces the content of `name`.
    ///
    /// Returns `BackendError::NotModified` if `data` equals the current content.
    fn update(&self, name: &str, data: &[u8]) -> BackendResult<()>;

    /// Removes the entry matching both the id and name of `note`, and its
    /// content once nothing else references it.
    ///
    /// A stale `note` whose name now points at different content leaves the
    /// current note in place.
    fn delete(&self, note: &Note) -> BackendResult<()>;

    /// Lists notes whose name contains `filter`, newest first. An empty
    /// filter lists every note. Listed notes carry no content.
    fn list(&self, filter: &str) -> BackendResult<Vec<Note>>;

    /// Returns notes whose content contains `query`, ignoring case, with
    /// content loaded.
    fn search(&self, query: &str) -> BackendResult<Vec<Note>>;
}
