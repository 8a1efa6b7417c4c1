//! On-disk layout of the local store.
//!
//! ```text
//! <data>/index            one `id,date,name` line per live note
//! <data>/<id[0:2]>/<id[2:]> note content, one file per content hash
//! <data>/tags/, <data>/groups/   reserved
//! ```

use super::{BackendError, BackendResult};
use crate::infra::ContentHash;
use std::path::{Component, Path, PathBuf};

/// Length of the fan-out directory name taken from the front of an id.
const FANOUT_PREFIX_LEN: usize = 2;

/// Directory locations used by [`super::LocalBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl StoreLayout {
    pub fn new(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    pub fn tags_dir(&self) -> PathBuf {
        self.data_dir.join("tags")
    }

    pub fn groups_dir(&self) -> PathBuf {
        self.data_dir.join("groups")
    }

    /// Returns `<data>/<id[0:2]>/<id[2:]>` for a 64-character hex id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidPath` for anything that is not a
    /// content hash.
    pub fn blob_path(&self, id: &str) -> BackendResult<PathBuf> {
        let hash = ContentHash::from_hex(id)
            .map_err(|e| BackendError::InvalidPath(format!("'{}': {}", id, e)))?;
        let (prefix, rest) = hash.as_str().split_at(FANOUT_PREFIX_LEN);
        Ok(self.data_dir.join(prefix).join(rest))
    }

    /// Recovers the content hash a blob path was derived from.
    ///
    /// The path must lie inside the data directory, exactly two levels deep.
    pub fn id_from_blob_path(&self, path: &Path) -> BackendResult<ContentHash> {
        let invalid = || BackendError::InvalidPath(path.display().to_string());

        let relative = path.strip_prefix(&self.data_dir).map_err(|_| invalid())?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| match c {
                Component::Normal(s) => s.to_str().ok_or_else(invalid),
                _ => Err(invalid()),
            })
            .collect::<Result<_, _>>()?;

        let &[prefix, rest] = parts.as_slice() else {
            return Err(invalid());
        };
        if prefix.len() != FANOUT_PREFIX_LEN {
            return Err(invalid());
        }

        let hex = format!("{}{}", prefix, rest);
        let hash = ContentHash::from_hex(&hex).map_err(|_| invalid())?;
        // Uppercase names would map to the same hash but a different file.
        if hash.as_str() != hex {
            return Err(invalid());
        }
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layout() -> StoreLayout {
        StoreLayout::new("/cfg/note", "/home/u/.note")
    }

    #[test]
    fn fixed_paths() {
        let l = layout();
        assert_eq!(l.index_path(), PathBuf::from("/home/u/.note/index"));
        assert_eq!(l.tags_dir(), PathBuf::from("/home/u/.note/tags"));
        assert_eq!(l.groups_dir(), PathBuf::from("/home/u/.note/groups"));
    }

    #[test]
    fn blob_path_fans_out_on_prefix() {
        let id = ContentHash::compute(b"buy milk");
        let path = layout().blob_path(id.as_str()).unwrap();
        let expected = PathBuf::from("/home/u/.note")
            .join(&id.as_str()[..2])
            .join(&id.as_str()[2..]);
        assert_eq!(path, expected);
    }

    #[test]
    fn blob_path_rejects_non_hash_ids() {
        for id in ["", "abc", "../../etc/passwd", &"z".repeat(64)] {
            assert!(
                matches!(layout().blob_path(id), Err(BackendError::InvalidPath(_))),
                "{:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn id_from_blob_path_inverts_blob_path() {
        let l = layout();
        let id = ContentHash::compute(b"hello");
        let path = l.blob_path(id.as_str()).unwrap();
        assert_eq!(l.id_from_blob_path(&path).unwrap(), id);
    }

    #[test]
    fn id_from_blob_path_rejects_malformed_paths() {
        let l = layout();
        let id = ContentHash::compute(b"hello");
        let hex = id.as_str();
        let bad = [
            PathBuf::from("/elsewhere").join(&hex[..2]).join(&hex[2..]),
            l.data_dir().join("index"),
            l.data_dir().join(&hex[..3]).join(&hex[3..]),
            l.data_dir().join(&hex[..2]).join("short"),
            l.data_dir()
                .join(&hex[..2])
                .join(hex[2..].to_ascii_uppercase()),
            l.data_dir().join("tags").join(&hex[..2]).join(&hex[2..]),
        ];
        for path in bad {
            assert!(
                matches!(l.id_from_blob_path(&path), Err(BackendError::InvalidPath(_))),
                "{} should be rejected",
                path.display()
            );
        }
    }
}
