//! Reference Sources
//!
//! The outbound "fetch all rows" contract. A consumer calls
//! [`ReferenceSource::fetch_tables`] once and indexes the result into a
//! [`ReferenceDataStore`](super::store::ReferenceDataStore); no source is
//! ever queried per line item.

use std::path::PathBuf;

use tracing::info;

use super::loaders::{builtin_loaders, LoaderRunner};
use super::tables::ReferenceTables;
use crate::errors::EngineResult;
use crate::file_io::load_snapshot;

/// Anything that can hand over the complete set of reference tables.
pub trait ReferenceSource {
    fn fetch_tables(&self) -> EngineResult<ReferenceTables>;
}

/// Runs the built-in seed and correction loaders against empty tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededSource;

impl SeededSource {
    pub fn new() -> Self {
        SeededSource
    }
}

impl ReferenceSource for SeededSource {
    fn fetch_tables(&self) -> EngineResult<ReferenceTables> {
        let mut tables = ReferenceTables::new();
        let applied = LoaderRunner::apply_all(&mut tables, &builtin_loaders())?;
        info!(loaders = applied, "seeded reference tables");
        Ok(tables)
    }
}

/// Reads tables from a JSON snapshot written by [`crate::file_io::save_snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotSource { path: path.into() }
    }
}

impl ReferenceSource for SnapshotSource {
    fn fetch_tables(&self) -> EngineResult<ReferenceTables> {
        let snapshot = load_snapshot(&self.path)?;
        info!(
            path = %self.path.display(),
            snapshot_id = %snapshot.meta.snapshot_id,
            "loaded reference snapshot"
        );
        Ok(snapshot.tables)
    }
}

/// Already-materialised tables, e.g. a snapshot topped up with later loaders.
impl ReferenceSource for ReferenceTables {
    fn fetch_tables(&self) -> EngineResult<ReferenceTables> {
        Ok(self.clone())
    }
}
