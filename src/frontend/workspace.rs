//! Workspace driver: incremental compile and link of a corpus.
//!
//! A [`Workspace`] owns the unit cache, the optional blob store and the current [`LinkedGraph`].
//! Each run compiles the files whose text changed (in parallel), then relinks. Units that finish
//! compiling are committed and written to the blob store even if the run is cancelled afterwards;
//! a cancelled link leaves the previous graph current.
//!
//! ## Examples
//!
//! ```rust
//! use stexls::config::WorkspaceConfig;
//! use stexls::frontend::location::FileId;
//! use stexls::frontend::workspace::{CancellationToken, SourceInput, Workspace};
//!
//! let mut ws = Workspace::new(WorkspaceConfig::new("/mh")).unwrap();
//! let input = SourceInput::new(FileId::new("repo", "", "x"), r"\begin{modsig}{x}\symi{a}\end{modsig}");
//! let report = ws.update(vec![input], &CancellationToken::new()).unwrap();
//! assert_eq!(report.compiled.len(), 1);
//! assert!(ws.graph().diagnostics().is_empty());
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::config::WorkspaceConfig;
use crate::frontend::advisory::{self, SpanOracle};
use crate::frontend::cache::{BlobStore, CacheError, Fingerprint, UnitCache};
use crate::frontend::compiler::compile;
use crate::frontend::diagnostics::Diagnostic;
use crate::frontend::linker::{self, LinkedGraph};
use crate::frontend::location::{FileId, RootConvention};
use crate::frontend::source::{LexError, read_source};
use crate::frontend::symbols::CompiledUnit;

/// Cooperative cancellation flag shared between a run and whoever may cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The current text of one file, or why it could not be read.
#[derive(Debug)]
pub struct SourceInput {
    pub file: FileId,
    pub text: Result<String, LexError>,
}

impl SourceInput {
    pub fn new(file: FileId, text: impl Into<String>) -> Self {
        Self {
            file,
            text: Ok(text.into()),
        }
    }

    pub fn failed(file: FileId, error: LexError) -> Self {
        Self { file, text: Err(error) }
    }
}

/// What a run did, per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub compiled: Vec<FileId>,
    pub reused: Vec<FileId>,
    pub evicted: Vec<FileId>,
    pub relinked: Vec<FileId>,
    pub failed: Vec<FileId>,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("the run was cancelled")]
    Cancelled,
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// An incrementally analyzed corpus.
pub struct Workspace {
    config: WorkspaceConfig,
    convention: RootConvention,
    cache: UnitCache,
    store: Option<BlobStore>,
    graph: LinkedGraph,
    /// Compiled units not yet written to the blob store.
    unsaved: BTreeSet<FileId>,
    pool: Option<rayon::ThreadPool>,
}

impl Workspace {
    /// An empty workspace. Blobs are written to the configured cache directory but not read.
    pub fn new(config: WorkspaceConfig) -> Result<Self, WorkspaceError> {
        let pool = match config.jobs {
            Some(jobs) => Some(rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?),
            None => None,
        };
        Ok(Self {
            convention: RootConvention::from_config(&config),
            store: config.cache_dir.clone().map(BlobStore::new),
            cache: UnitCache::new(),
            graph: LinkedGraph::default(),
            unsaved: BTreeSet::new(),
            pool,
            config,
        })
    }

    /// A workspace whose cache is preloaded from the blob store, so units whose text is unchanged
    /// are reused by the first run.
    pub fn open(config: WorkspaceConfig) -> Result<Self, WorkspaceError> {
        let mut workspace = Self::new(config)?;
        if let Some(store) = &workspace.store {
            for unit in store.load_all() {
                workspace.cache.insert(Arc::new(unit));
            }
            tracing::info!(units = workspace.cache.len(), "preloaded cache");
        }
        Ok(workspace)
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn convention(&self) -> &RootConvention {
        &self.convention
    }

    /// The graph of the last completed run.
    pub fn graph(&self) -> &LinkedGraph {
        &self.graph
    }

    pub fn unit(&self, file: &FileId) -> Option<&Arc<CompiledUnit>> {
        self.cache.get(file)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileId> {
        self.cache.files()
    }

    /// Tagger hints for `file`, whose current text is `text`, at the configured threshold.
    pub fn advisory_hints(&self, file: &FileId, text: &str, oracle: &dyn SpanOracle) -> Vec<Diagnostic> {
        match self.cache.get(file) {
            Some(unit) => advisory::advisory_hints(unit, text, oracle, self.config.advisory_threshold),
            None => Vec::new(),
        }
    }

    /// Apply new texts for some files, then relink.
    #[tracing::instrument(skip_all, fields(inputs = inputs.len()))]
    pub fn update(&mut self, inputs: Vec<SourceInput>, cancel: &CancellationToken) -> Result<RunReport, WorkspaceError> {
        self.run(inputs, Vec::new(), cancel)
    }

    /// Forget some files, then relink.
    pub fn remove(&mut self, files: &[FileId], cancel: &CancellationToken) -> Result<RunReport, WorkspaceError> {
        self.run(Vec::new(), files.to_vec(), cancel)
    }

    /// Read every document under the root; files that disappeared are evicted.
    pub fn update_from_disk(&mut self, cancel: &CancellationToken) -> Result<RunReport, WorkspaceError> {
        let paths = discover(&self.config.root, &self.config.extension, self.config.ignore_hidden)?;
        let convention = &self.convention;
        let inputs: Vec<SourceInput> = install(self.pool.as_ref(), || {
            paths
                .par_iter()
                .filter_map(|path| {
                    let file = convention.file_id(path)?;
                    Some(match read_source(path) {
                        Ok(text) => SourceInput::new(file, text),
                        Err(e) => SourceInput::failed(file, e),
                    })
                })
                .collect()
        });
        let present: rustc_hash::FxHashSet<&FileId> = inputs.iter().map(|i| &i.file).collect();
        let gone: Vec<FileId> = self.cache.files().filter(|f| !present.contains(f)).cloned().collect();
        tracing::debug!(found = inputs.len(), gone = gone.len(), "discovered documents");
        self.run(inputs, gone, cancel)
    }

    fn run(
        &mut self,
        inputs: Vec<SourceInput>,
        evict: Vec<FileId>,
        cancel: &CancellationToken,
    ) -> Result<RunReport, WorkspaceError> {
        let mut report = RunReport::default();

        for file in evict {
            self.unsaved.remove(&file);
            if self.cache.evict(&file).is_some() {
                if let Some(store) = &self.store {
                    store.remove(&file)?;
                }
                report.evicted.push(file);
            }
        }

        let mut pending = Vec::new();
        for input in inputs {
            match input.text {
                Err(e) => {
                    tracing::warn!(file = %input.file, error = %e, "read failed, keeping previous unit");
                    report.failed.push(input.file);
                }
                Ok(text) => {
                    if self.cache.lookup(&input.file, Fingerprint::of(text.as_str())).is_some() {
                        tracing::debug!(file = %input.file, "unchanged, reusing unit");
                        report.reused.push(input.file);
                    } else {
                        pending.push((input.file, text));
                    }
                }
            }
        }

        report.compiled = self.compile_pending(pending, cancel)?;
        if cancel.is_cancelled() {
            tracing::info!(compiled = report.compiled.len(), "cancelled after compiling");
            return Err(WorkspaceError::Cancelled);
        }
        report.relinked = self.relink(cancel)?;

        tracing::info!(
            compiled = report.compiled.len(),
            reused = report.reused.len(),
            evicted = report.evicted.len(),
            relinked = report.relinked.len(),
            failed = report.failed.len(),
            "run finished"
        );
        Ok(report)
    }

    /// Compile `pending` until cancelled, then commit and persist what was compiled.
    fn compile_pending(
        &mut self,
        pending: Vec<(FileId, String)>,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileId>, WorkspaceError> {
        let compiled: Vec<CompiledUnit> = install(self.pool.as_ref(), || {
            pending
                .par_iter()
                .filter_map(|(file, text)| (!cancel.is_cancelled()).then(|| compile(file, text)))
                .collect()
        });
        let mut files = Vec::with_capacity(compiled.len());
        for unit in compiled {
            files.push(unit.file.clone());
            self.unsaved.insert(unit.file.clone());
            self.cache.insert(Arc::new(unit));
        }
        self.flush()?;
        Ok(files)
    }

    /// Write every unit not yet in the blob store. A unit whose save fails stays pending for the
    /// next run.
    fn flush(&mut self) -> Result<(), CacheError> {
        let Some(store) = &self.store else {
            self.unsaved.clear();
            return Ok(());
        };
        while let Some(file) = self.unsaved.pop_first() {
            let Some(unit) = self.cache.get(&file) else {
                continue;
            };
            if let Err(e) = store.save(unit) {
                self.unsaved.insert(file);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Relink every cached unit against the previous graph; the graph is replaced only on success.
    fn relink(&mut self, cancel: &CancellationToken) -> Result<Vec<FileId>, WorkspaceError> {
        let units: Vec<_> = self.cache.units().cloned().collect();
        let previous = &self.graph;
        let convention = &self.convention;
        let graph = install(self.pool.as_ref(), || linker::link_with(Some(previous), units, convention, cancel))
            .ok_or(WorkspaceError::Cancelled)?;
        let relinked = graph.relinked().to_vec();
        self.graph = graph;
        Ok(relinked)
    }
}

/// Run `f` on the dedicated pool when there is one.
fn install<R: Send>(pool: Option<&rayon::ThreadPool>, f: impl FnOnce() -> R + Send) -> R {
    match pool {
        Some(pool) => pool.install(f),
        None => f(),
    }
}

/// Every file with `extension` below `root`, sorted.
fn discover(root: &Path, extension: &str, ignore_hidden: bool) -> Result<Vec<PathBuf>, WorkspaceError> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| WorkspaceError::Io {
            path: dir.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if ignore_hidden && hidden {
                continue;
            }
            match entry.file_type() {
                Ok(t) if t.is_dir() => pending.push(path),
                Ok(t) if t.is_file() && path.extension().is_some_and(|e| e == extension) => found.push(path),
                _ => {}
            }
        }
    }
    found.sort();
    Ok(found)
}
