//! Append-only, line-per-record file store.
//!
//! Each record serializes to exactly one line. Records are appended at the
//! end of the file, read back in file order, and removed by rewriting the
//! file without them. Nothing here locks the file: two processes writing the
//! same store at once can lose updates.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// A value that can be stored as a single line.
///
/// `to_line` must never produce a newline, and `from_line(&r.to_line())`
/// must yield a record equal to `r` in every stored field.
pub trait IndexRecord: Sized {
    type Err: std::error::Error;

    fn to_line(&self) -> String;

    fn from_line(line: &str) -> Result<Self, Self::Err>;
}

/// Errors from line store operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The store file does not exist yet.
    #[error("index not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl IndexError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => IndexError::NotFound { path: path.into() },
            _ => IndexError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// Appends one record to the store, creating the file if needed.
///
/// The line is written with a single write call and synced to disk before
/// returning.
pub fn append_entry<R: IndexRecord>(path: &Path, record: &R) -> Result<(), IndexError> {
    let mut line = record.to_line();
    line.push('\n');

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| IndexError::from_io(path, e))?;

    file.write_all(line.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| IndexError::Io {
            path: path.into(),
            source: e,
        })
}

/// Reads every record in file order.
///
/// Blank lines are skipped. The first line that fails to parse aborts the
/// read.
///
/// # Errors
///
/// Returns `IndexError::NotFound` if the file does not exist, so callers can
/// tell an empty store apart from an unreadable one.
pub fn open<R: IndexRecord>(path: &Path) -> Result<Vec<R>, IndexError> {
    let file = File::open(path).map_err(|e| IndexError::from_io(path, e))?;

    let mut records = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| IndexError::Io {
            path: path.into(),
            source: e,
        })?;
        if line.is_empty() {
            continue;
        }
        let record = R::from_line(&line).map_err(|e| IndexError::Parse {
            path: path.into(),
            line: i + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Removes every record for which `matches` returns true.
///
/// Records are compared on their parsed fields, never on raw line text.
/// Returns the number of records removed; the file is left untouched when
/// nothing matches.
pub fn delete_entry<R, F>(path: &Path, mut matches: F) -> Result<usize, IndexError>
where
    R: IndexRecord,
    F: FnMut(&R) -> bool,
{
    let records: Vec<R> = open(path)?;
    let before = records.len();
    let kept: Vec<R> = records.into_iter().filter(|r| !matches(r)).collect();
    let removed = before - kept.len();

    if removed > 0 {
        save(path, &kept)?;
    }
    Ok(removed)
}

/// Rewrites the whole store from `records`.
///
/// Writes to a temporary file in the same directory and renames it over the
/// store, so readers see either the old or the new file.
pub fn save<R: IndexRecord>(path: &Path, records: &[R]) -> Result<(), IndexError> {
    let io_err = |e: io::Error| IndexError::Io {
        path: path.into(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut contents = String::new();
    for record in records {
        contents.push_str(&record.to_line());
        contents.push('\n');
    }

    let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(contents.as_bytes()).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
