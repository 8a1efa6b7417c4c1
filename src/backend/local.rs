//! Content-addressed note store on the local filesystem.

use super::{Backend, BackendError, BackendResult, StoreLayout};
use crate::domain::{Note, NoteError, invalid_name};
use crate::infra::line_store;
use crate::infra::{ContentHash, IndexError};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Backend storing note content in a fan-out blob tree with a line index.
///
/// Mutating operations (`create`, `update`, `delete` and [`Self::check`])
/// hold an in-process write lock shared by every clone, so threads sharing
/// one backend never interleave index rewrites. Reads take no lock; the
/// index is only ever appended to or replaced by rename.
///
/// Nothing coordinates separate processes: two processes mutating the same
/// store concurrently can lose index updates.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    layout: StoreLayout,
    write_lock: Arc<Mutex<()>>,
}

/// Result of a consistency scan over the local store.
#[derive(Debug, Default)]
pub struct StoreReport {
    /// Number of index entries examined.
    pub checked: usize,
    /// Index entries whose blob file is absent.
    pub missing: Vec<Note>,
    /// Index entries whose blob no longer hashes to the entry's id.
    pub corrupt: Vec<Note>,
    /// Index entries whose name is not a valid note name.
    pub invalid: Vec<Note>,
    /// Blob files not referenced by any index entry.
    pub orphans: Vec<PathBuf>,
    /// Files in the blob tree that are not named after a content hash.
    pub stray: Vec<PathBuf>,
}

impl StoreReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.corrupt.is_empty()
            && self.invalid.is_empty()
            && self.orphans.is_empty()
            && self.stray.is_empty()
    }
}

impl LocalBackend {
    pub fn new(layout: StoreLayout) -> Self {
        Self {
            layout,
            write_lock: Arc::default(),
        }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// The lock guards no data, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the index newest first. A store without an index is empty.
    fn load_index(&self) -> BackendResult<Vec<Note>> {
        match line_store::open::<Note>(&self.layout.index_path()) {
            Ok(mut notes) => {
                notes.reverse();
                Ok(notes)
            }
            Err(IndexError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_blob(&self, id: &ContentHash) -> BackendResult<Vec<u8>> {
        let path = self.layout.blob_path(id.as_str())?;
        fs::read(&path).map_err(|source| BackendError::Io { path, source })
    }

    /// Loads a metadata-only note's content and verifies it.
    fn load(&self, mut note: Note) -> BackendResult<Note> {
        let data = self.read_blob(note.id())?;
        note.attach_data(data);
        verify(note)
    }

    /// Writes content under its hash via a temporary file and rename.
    fn write_blob(&self, note: &Note) -> BackendResult<()> {
        let path = self.layout.blob_path(note.id().as_str())?;
        let data = note
            .data()
            .ok_or_else(|| BackendError::IntegrityFail(Box::new(note.clone())))?;
        let io_err = |source: io::Error| BackendError::Io {
            path: path.clone(),
            source,
        };

        let parent = path
            .parent()
            .ok_or_else(|| BackendError::InvalidPath(path.display().to_string()))?;
        fs::create_dir_all(parent).map_err(io_err)?;

        let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
        temp.write_all(data).map_err(io_err)?;
        temp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Writes the blob, then appends the index entry.
    ///
    /// A failed append leaves the blob behind as an orphan; [`Self::check`]
    /// reports it.
    fn store(&self, note: &Note) -> BackendResult<()> {
        self.write_blob(note)?;
        line_store::append_entry(&self.layout.index_path(), note)?;
        tracing::debug!(name = note.name(), id = %note.id(), "stored note");
        Ok(())
    }

    /// Drops the entry matching `note` by id and name, then its blob unless
    /// another entry still references it. Callers hold the write lock.
    fn remove(&self, note: &Note) -> BackendResult<()> {
        let index_path = self.layout.index_path();
        let removed = match line_store::delete_entry(&index_path, |n: &Note| {
            n.id() == note.id() && n.name() == note.name()
        }) {
            Ok(n) => n,
            Err(IndexError::NotFound { .. }) => 0,
            Err(e) => return Err(e.into()),
        };
        if removed == 0 {
            tracing::debug!(name = note.name(), "no index entry to remove");
        }

        if self.load_index()?.iter().any(|n| n.id() == note.id()) {
            tracing::debug!(id = %note.id(), "content still referenced, keeping blob");
            return Ok(());
        }

        let path = self.layout.blob_path(note.id().as_str())?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "blob already removed");
            }
            Err(source) => return Err(BackendError::Io { path, source }),
        }
        tracing::debug!(name = note.name(), id = %note.id(), "deleted note");
        Ok(())
    }

    /// Scans the index and the blob tree for inconsistencies.
    ///
    /// Nothing is repaired or removed.
    pub fn check(&self) -> BackendResult<StoreReport> {
        let _guard = self.lock();
        let mut report = StoreReport::default();
        let index = self.load_index()?;
        let live: HashSet<ContentHash> = index.iter().map(|n| n.id().clone()).collect();

        for note in index {
            report.checked += 1;
            match self.load(note.clone()) {
                Ok(_) => {}
                Err(BackendError::IntegrityFail(note)) => report.corrupt.push(*note),
                Err(BackendError::InvalidName(_)) => report.invalid.push(note),
                Err(BackendError::Io { source, .. })
                    if source.kind() == io::ErrorKind::NotFound =>
                {
                    report.missing.push(note)
                }
                Err(e) => return Err(e),
            }
        }

        let data_dir = self.layout.data_dir();
        if !data_dir.exists() {
            return Ok(report);
        }

        let reserved = [self.layout.tags_dir(), self.layout.groups_dir()];
        let walker = WalkDir::new(data_dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !reserved.iter().any(|r| r == e.path()));

        for entry in walker {
            let entry = entry.map_err(|e| BackendError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_default(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() || entry.path() == self.layout.index_path() {
                continue;
            }
            match self.layout.id_from_blob_path(entry.path()) {
                Ok(id) if live.contains(&id) => {}
                Ok(_) => report.orphans.push(entry.into_path()),
                Err(_) => report.stray.push(entry.into_path()),
            }
        }

        tracing::debug!(
            checked = report.checked,
            missing = report.missing.len(),
            corrupt = report.corrupt.len(),
            invalid = report.invalid.len(),
            orphans = report.orphans.len(),
            stray = report.stray.len(),
            "store check finished"
        );
        Ok(report)
    }
}

/// Maps a failed [`Note::check`] onto the backend taxonomy.
fn verify(note: Note) -> BackendResult<Note> {
    match note.check() {
        Ok(()) => Ok(note),
        Err(NoteError::InvalidName(name)) => Err(BackendError::InvalidName(name)),
        Err(NoteError::IntegrityFail { .. }) | Err(NoteError::NotLoaded(_)) => {
            Err(BackendError::IntegrityFail(Box::new(note)))
        }
    }
}

/// Names that would break the `id,date,name` line format.
fn breaks_index_line(name: &str) -> bool {
    name.is_empty() || name.contains([',', '\n', '\r'])
}

impl Backend for LocalBackend {
    fn init(&self) -> BackendResult<()> {
        let dirs = [
            self.layout.config_dir().to_path_buf(),
            self.layout.data_dir().to_path_buf(),
            self.layout.tags_dir(),
            self.layout.groups_dir(),
        ];
        for dir in dirs {
            fs::create_dir_all(&dir).map_err(|source| BackendError::Io { path: dir, source })?;
        }
        Ok(())
    }

    fn create(&self, note: &Note) -> BackendResult<()> {
        if invalid_name(note.name()) || breaks_index_line(note.name()) {
            return Err(BackendError::InvalidName(note.name().to_string()));
        }
        let note = verify(note.clone())?;

        let _guard = self.lock();
        if self.load_index()?.iter().any(|n| n.name() == note.name()) {
            return Err(BackendError::NoteExist(note.name().to_string()));
        }

        self.store(&note)
    }

    fn get(&self, name: &str) -> BackendResult<Note> {
        let entry = self
            .list(name)?
            .into_iter()
            .find(|n| n.name() == name)
            .ok_or_else(|| BackendError::NotFound(name.to_string()))?;
        self.load(entry)
    }

    fn update(&self, name: &str, data: &[u8]) -> BackendResult<()> {
        let candidate = Note::new(name, data).map_err(|_| BackendError::InvalidName(name.into()))?;

        let _guard = self.lock();

        let (current, intact) = match self.get(name) {
            Ok(note) => (note, true),
            Err(e) => (e.recover_note()?, false),
        };

        if current.id() == candidate.id() {
            if intact {
                return Err(BackendError::NotModified(name.to_string()));
            }
            // Same hash over a damaged blob: rewriting the blob repairs it.
            tracing::warn!(name, id = %current.id(), "rewriting corrupt note content");
            return self.write_blob(&candidate);
        }

        let candidate = candidate.carry_metadata_from(&current);
        self.store(&candidate)?;

        let written = self.read_blob(candidate.id())?;
        if !candidate.id().matches(&written) {
            return Err(BackendError::IntegrityFail(Box::new(candidate)));
        }

        // The old entry is matched by id and name, so the new one survives.
        self.remove(&current)?;
        tracing::debug!(name, old = %current.id(), new = %candidate.id(), "updated note");
        Ok(())
    }

    fn delete(&self, note: &Note) -> BackendResult<()> {
        let _guard = self.lock();
        self.remove(note)
    }

    fn list(&self, filter: &str) -> BackendResult<Vec<Note>> {
        if invalid_name(filter) {
            return Err(BackendError::InvalidName(filter.to_string()));
        }
        let mut notes = self.load_index()?;
        if !filter.is_empty() {
            notes.retain(|n| n.name().contains(filter));
        }
        Ok(notes)
    }

    fn search(&self, query: &str) -> BackendResult<Vec<Note>> {
        let query = query.to_lowercase();
        let mut matches = Vec::new();

        for entry in self.load_index()? {
            let note = match self.load(entry) {
                Ok(note) => note,
                Err(BackendError::IntegrityFail(note)) => {
                    tracing::warn!(name = note.name(), "skipping note that failed integrity check");
                    continue;
                }
                Err(BackendError::InvalidName(name)) => {
                    tracing::warn!(name = %name, "skipping index entry with an invalid name");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let text = String::from_utf8_lossy(note.data().unwrap_or_default()).to_lowercase();
            if text.contains(&query) {
                matches.push(note);
            }
        }
        Ok(matches)
    }
}
