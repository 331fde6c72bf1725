//! File and module identity, and the on-disk layout of a stex corpus
//!
//! A corpus is a root directory holding repositories. Each repository keeps its documents below a
//! `source` directory:
//!
//! ```text
//! <root>/<repository>/source/<directory>/<file>.tex
//! ```
//!
//! Repositories may be nested (`smglom/sets`), directories may be empty. [`RootConvention`] maps
//! between paths and [`FileId`]s in both directions.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::WorkspaceConfig;

/// Identity of one source file: repository, directory below `source`, and file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId {
    pub repository: String,
    /// `/`-separated directory relative to the repository's `source` directory; empty for files
    /// directly in `source`.
    pub directory: String,
    /// File stem without extension.
    pub name: String,
}

impl FileId {
    pub fn new(repository: impl Into<String>, directory: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repository: trim_slashes(repository.into()),
            directory: trim_slashes(directory.into()),
            name: name.into(),
        }
    }

    /// Another file in the same directory.
    pub fn sibling(&self, name: impl Into<String>) -> FileId {
        FileId::new(self.repository.clone(), self.directory.clone(), name)
    }

    /// A file directly in this repository's `source` directory.
    pub fn at_source_root(&self, name: impl Into<String>) -> FileId {
        FileId::new(self.repository.clone(), "", name)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.directory.is_empty() {
            write!(f, "{}/{}", self.repository, self.name)
        } else {
            write!(f, "{}/{}/{}", self.repository, self.directory, self.name)
        }
    }
}

/// Identity of a module: the file declaring it plus its name (`x`, or `x.en` for bindings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    pub file: FileId,
    pub name: String,
}

impl ModuleId {
    pub fn new(file: FileId, name: impl Into<String>) -> Self {
        Self {
            file,
            name: name.into(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?{}", self.file, self.name)
    }
}

fn trim_slashes(s: String) -> String {
    let trimmed = s.trim_matches('/');
    if trimmed.len() == s.len() {
        s
    } else {
        trimmed.to_string()
    }
}

/// Path layout of a corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootConvention {
    pub root: PathBuf,
    pub source_dir: String,
    pub extension: String,
}

impl RootConvention {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source_dir: "source".to_string(),
            extension: "tex".to_string(),
        }
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self {
            root: config.root.clone(),
            source_dir: config.source_dir.clone(),
            extension: config.extension.clone(),
        }
    }

    /// `<root>/<repository>/<source_dir>`.
    pub fn source_root(&self, repository: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(repository.split('/').filter(|s| !s.is_empty()));
        path.push(&self.source_dir);
        path
    }

    /// On-disk path of a file.
    pub fn path_of(&self, file: &FileId) -> PathBuf {
        let mut path = self.source_root(&file.repository);
        path.extend(file.directory.split('/').filter(|s| !s.is_empty()));
        path.push(format!("{}.{}", file.name, self.extension));
        path
    }

    /// Identity of the file at `path`, if it follows the layout.
    ///
    /// The repository is everything between the root and the first `source` component, so
    /// `<root>/smglom/sets/source/mod/set.tex` is file `set` in directory `mod` of `smglom/sets`.
    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        let relative = path.strip_prefix(&self.root).ok()?;
        if relative.extension()?.to_str()? != self.extension {
            return None;
        }
        let name = relative.file_stem()?.to_str()?.to_string();
        let parts: Vec<&str> = relative
            .parent()?
            .components()
            .map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect::<Option<_>>()?;
        let source_at = parts.iter().position(|p| *p == self.source_dir)?;
        if source_at == 0 {
            return None;
        }
        Some(FileId::new(
            parts[..source_at].join("/"),
            parts[source_at + 1..].join("/"),
            name,
        ))
    }

    /// Identity of the file a root-relative `load=` path names.
    ///
    /// `load=p` points at the directory `<root>/p`; the file is named after the imported module.
    pub fn load_target(&self, load: &str, module: &str) -> Option<FileId> {
        let mut path = self.root.clone();
        path.extend(load.split('/').filter(|s| !s.is_empty()));
        path.push(format!("{module}.{}", self.extension));
        self.file_id(&path)
    }
}
