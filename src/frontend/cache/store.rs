//! On-disk blob store for compiled units.
//!
//! # Directory structure
//!
//! ```text
//! <cache_dir>/
//! ├── <file-id hash>.bin    # header + bincode-encoded CompiledUnit
//! └── ...
//! ```
//!
//! Every blob starts with a header carrying the blob format version and the `stexls` version that
//! wrote it. A blob with another header, or one that fails to decode, is treated as a cache miss.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Fingerprint;
use crate::frontend::location::FileId;
use crate::frontend::symbols::CompiledUnit;
use crate::version::STEXLS_VERSION;

/// Bumped whenever the encoding of [`CompiledUnit`] changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct BlobHeader {
    format_version: u32,
    core_version: String,
}

impl BlobHeader {
    fn current() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            core_version: STEXLS_VERSION.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode or decode cache blob: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("cache blob written by format {format_version} / stexls {core_version}")]
    Version { format_version: u32, core_version: String },
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One bincode blob per compiled unit, keyed by the hash of its [`FileId`].
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the blob holding `file`'s unit.
    pub fn blob_path(&self, file: &FileId) -> PathBuf {
        self.dir.join(format!("{}.bin", Fingerprint::of(file)))
    }

    /// Write `unit`, replacing any previous blob for its file.
    pub fn save(&self, unit: &CompiledUnit) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;
        let mut bytes = bincode::serialize(&BlobHeader::current())?;
        bytes.extend(bincode::serialize(unit)?);

        let path = self.blob_path(&unit.file);
        let staging = path.with_extension("tmp");
        fs::write(&staging, &bytes).map_err(|e| CacheError::io(&staging, e))?;
        fs::rename(&staging, &path).map_err(|e| CacheError::io(&path, e))
    }

    /// Read the unit of `file`. A missing blob is `Ok(None)`.
    pub fn load(&self, file: &FileId) -> Result<Option<CompiledUnit>, CacheError> {
        let path = self.blob_path(file);
        match fs::read(&path) {
            Ok(bytes) => decode(&bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    /// Read every blob in the store. Unreadable or stale blobs are skipped with a warning.
    pub fn load_all(&self) -> Vec<CompiledUnit> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "cannot read cache directory");
                return Vec::new();
            }
        };

        let mut units = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "bin") {
                continue;
            }
            let decoded = fs::read(&path)
                .map_err(|e| CacheError::io(&path, e))
                .and_then(|bytes| decode(&bytes));
            match decoded {
                Ok(unit) => units.push(unit),
                Err(e) => tracing::warn!(blob = %path.display(), error = %e, "dropping cache blob"),
            }
        }
        units.sort_by(|a, b| a.file.cmp(&b.file));
        tracing::debug!(count = units.len(), "loaded cache blobs");
        units
    }

    /// Delete the blob of `file`, if any.
    pub fn remove(&self, file: &FileId) -> Result<(), CacheError> {
        let path = self.blob_path(file);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }
}

fn decode(bytes: &[u8]) -> Result<CompiledUnit, CacheError> {
    let mut reader = bytes;
    let header: BlobHeader = bincode::deserialize_from(&mut reader)?;
    if header.format_version != FORMAT_VERSION || header.core_version != STEXLS_VERSION {
        return Err(CacheError::Version {
            format_version: header.format_version,
            core_version: header.core_version,
        });
    }
    Ok(bincode::deserialize_from(&mut reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::compiler::compile;

    fn unit() -> CompiledUnit {
        compile(
            &FileId::new("repo", "dir", "x"),
            r"\begin{modsig}{x}\symi{a}\end{modsig}",
        )
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        let unit = unit();
        store.save(&unit).unwrap();
        assert_eq!(store.load(&unit.file).unwrap(), Some(unit.clone()));
        assert_eq!(store.load_all(), vec![unit]);
    }

    #[test]
    fn test_missing_blob_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().join("absent"));
        assert_eq!(store.load(&FileId::new("r", "", "x")).unwrap(), None);
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_corrupt_blob_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        let unit = unit();
        fs::write(store.blob_path(&unit.file), b"not a blob").unwrap();
        assert!(store.load(&unit.file).is_err());
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_foreign_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        let unit = unit();
        let header = BlobHeader {
            format_version: FORMAT_VERSION,
            core_version: "0.0.0-other".to_string(),
        };
        let mut bytes = bincode::serialize(&header).unwrap();
        bytes.extend(bincode::serialize(&unit).unwrap());
        fs::write(store.blob_path(&unit.file), bytes).unwrap();
        assert!(matches!(store.load(&unit.file), Err(CacheError::Version { .. })));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        let unit = unit();
        store.save(&unit).unwrap();
        store.remove(&unit.file).unwrap();
        store.remove(&unit.file).unwrap();
        assert_eq!(store.load(&unit.file).unwrap(), None);
    }
}
