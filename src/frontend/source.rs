//! Reading source files.

use std::io;
use std::path::{Path, PathBuf};

/// Failure to obtain a file's text.
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read a source file as UTF-8, replacing invalid sequences.
pub fn read_source(path: &Path) -> Result<String, LexError> {
    let bytes = std::fs::read(path).map_err(|source| LexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
