//! Incremental cache of compiled units.
//!
//! Units are keyed by [`FileId`] and shared through `Arc`. A unit whose source fingerprint matches
//! the incoming text is reused verbatim; anything else is recompiled and replaces the old unit
//! wholesale. The [`BlobStore`] persists units across processes.

pub mod fingerprint;
pub mod store;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use fingerprint::{Fingerprint, FingerprintBuilder};
pub use store::{BlobStore, CacheError};

use crate::frontend::location::FileId;
use crate::frontend::symbols::CompiledUnit;

/// In-memory arena of compiled units, ordered by file.
#[derive(Debug, Clone, Default)]
pub struct UnitCache {
    units: BTreeMap<FileId, Arc<CompiledUnit>>,
}

impl UnitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file: &FileId) -> Option<&Arc<CompiledUnit>> {
        self.units.get(file)
    }

    /// The cached unit of `file`, if it was compiled from text with this fingerprint.
    pub fn lookup(&self, file: &FileId, fingerprint: Fingerprint) -> Option<Arc<CompiledUnit>> {
        self.units
            .get(file)
            .filter(|unit| unit.fingerprint == fingerprint)
            .cloned()
    }

    /// Store a unit, returning the one it replaces.
    pub fn insert(&mut self, unit: Arc<CompiledUnit>) -> Option<Arc<CompiledUnit>> {
        self.units.insert(unit.file.clone(), unit)
    }

    pub fn evict(&mut self, file: &FileId) -> Option<Arc<CompiledUnit>> {
        self.units.remove(file)
    }

    pub fn contains(&self, file: &FileId) -> bool {
        self.units.contains_key(file)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileId> {
        self.units.keys()
    }

    pub fn units(&self) -> impl Iterator<Item = &Arc<CompiledUnit>> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
