//! Note entity: content-hash identity, name rules and the index line form.

use crate::infra::{ContentHash, IndexRecord, base64_data};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Date format used in index lines. Sortable, second precision, UTC.
pub const INDEX_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Characters that may not appear in a note name.
const FORBIDDEN_NAME_CHARS: [char; 8] = [' ', '<', '>', ':', '"', '|', '?', '*'];

/// Errors raised by note construction and verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("invalid name for note: '{0}'")]
    InvalidName(String),

    #[error("note integrity check failed: expected {expected}, content hashes to {actual}")]
    IntegrityFail {
        expected: ContentHash,
        actual: ContentHash,
    },

    #[error("note content not loaded: '{0}'")]
    NotLoaded(String),
}

/// Returns true if `name` cannot be used as a note name.
///
/// A name is rejected if it contains a space, any of `<>:"|?*`, or `..`.
pub fn invalid_name(name: &str) -> bool {
    name.contains(FORBIDDEN_NAME_CHARS) || name.contains("..")
}

/// A note and, once loaded, its content.
///
/// The `id` is always the SHA-256 of the content. Notes read from the index
/// carry metadata only; [`Note::data`] returns `None` until the content has
/// been attached by a backend.
///
/// # Examples
///
/// ```
/// use note::domain::Note;
///
/// let n = Note::new("todo", "buy milk").unwrap();
/// assert_eq!(n.size(), 8);
/// assert!(n.check().is_ok());
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    id: ContentHash,
    name: String,
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    size: usize,
    #[serde(default, with = "base64_data", skip_serializing_if = "Option::is_none")]
    data: Option<Vec<u8>>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Note {
    /// Creates a note stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::InvalidName` before hashing if the name is not allowed.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<Self, NoteError> {
        Self::with_date(name, data, Utc::now())
    }

    /// Creates a note with an explicit creation date.
    pub fn with_date(
        name: impl Into<String>,
        data: impl Into<Vec<u8>>,
        date: DateTime<Utc>,
    ) -> Result<Self, NoteError> {
        let name = name.into();
        if invalid_name(&name) {
            return Err(NoteError::InvalidName(name));
        }

        let data = data.into();
        Ok(Self {
            id: ContentHash::compute(&data),
            name,
            date,
            tags: Vec::new(),
            groups: Vec::new(),
            size: data.len(),
            data: Some(data),
        })
    }

    /// Returns the content hash identifying this note.
    pub fn id(&self) -> &ContentHash {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns when the note was created.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Returns the byte length of the content as last recorded.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the content, or `None` for a metadata-only note.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Attaches content read from storage. The id is left untouched so that
    /// [`Note::check`] can detect a mismatch.
    pub fn attach_data(&mut self, data: Vec<u8>) {
        self.size = data.len();
        self.data = Some(data);
    }

    /// Copies tags and groups from `previous`.
    pub fn carry_metadata_from(mut self, previous: &Note) -> Self {
        self.tags = previous.tags.clone();
        self.groups = previous.groups.clone();
        self
    }

    /// Verifies that the loaded content still hashes to the note's id and
    /// that the name is valid.
    ///
    /// # Errors
    ///
    /// - `NoteError::NotLoaded` if the note carries no content
    /// - `NoteError::IntegrityFail` on hash mismatch
    /// - `NoteError::InvalidName` if the name is not allowed
    pub fn check(&self) -> Result<(), NoteError> {
        let data = self
            .data
            .as_deref()
            .ok_or_else(|| NoteError::NotLoaded(self.name.clone()))?;

        let actual = ContentHash::compute(data);
        if actual != self.id {
            return Err(NoteError::IntegrityFail {
                expected: self.id.clone(),
                actual,
            });
        }
        if invalid_name(&self.name) {
            return Err(NoteError::InvalidName(self.name.clone()));
        }
        Ok(())
    }
}

impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Note")
            .field("id", &self.id.as_str())
            .field("name", &self.name)
            .field("date", &self.date)
            .field("tags", &self.tags)
            .field("groups", &self.groups)
            .field("size", &self.size)
            .field("loaded", &self.data.is_some())
            .finish()
    }
}

/// Reason an index line could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseIndexLineErrorKind {
    FieldCount(usize),
    Id,
    Date,
}

/// Error returned when an index line is not `id,date,name`.
#[derive(Debug, Clone)]
pub struct ParseIndexLineError {
    kind: ParseIndexLineErrorKind,
    line: String,
}

impl fmt::Display for ParseIndexLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseIndexLineErrorKind::FieldCount(n) => {
                write!(f, "invalid note line '{}': expected 3 fields, got {}", self.line, n)
            }
            ParseIndexLineErrorKind::Id => write!(f, "invalid note line '{}': bad id", self.line),
            ParseIndexLineErrorKind::Date => {
                write!(f, "invalid note line '{}': bad date", self.line)
            }
        }
    }
}

impl std::error::Error for ParseIndexLineError {}

impl IndexRecord for Note {
    type Err = ParseIndexLineError;

    fn to_line(&self) -> String {
        format!(
            "{},{},{}",
            self.id,
            self.date.format(INDEX_DATE_FORMAT),
            self.name
        )
    }

    fn from_line(line: &str) -> Result<Self, Self::Err> {
        let fail = |kind| ParseIndexLineError {
            kind,
            line: line.to_string(),
        };

        let fields: Vec<&str> = line.split(',').collect();
        let &[id, date, name] = fields.as_slice() else {
            return Err(fail(ParseIndexLineErrorKind::FieldCount(fields.len())));
        };

        let id = ContentHash::from_hex(id).map_err(|_| fail(ParseIndexLineErrorKind::Id))?;
        let date = NaiveDateTime::parse_from_str(date, INDEX_DATE_FORMAT)
            .map_err(|_| fail(ParseIndexLineErrorKind::Date))?
            .and_utc();

        Ok(Self {
            id,
            name: name.to_string(),
            date,
            tags: Vec::new(),
            groups: Vec::new(),
            size: 0,
            data: None,
        })
    }
}
