//! # Reference Data
//!
//! Canonical engineering tables and the machinery that fills and indexes them.
//!
//! - [`tables`] - mutable rows with natural-key upserts, written by loaders
//! - [`loaders`] - versioned seed and correction scripts
//! - [`store`] - the immutable, indexed view resolvers read from
//! - [`source`] - where a store's rows come from (built-in seed, snapshot file)
//! - [`keys`] - pressure-class spellings and banding
//!
//! ## Example
//!
//! ```rust
//! use piping_core::reference::builtin_store;
//!
//! let store = builtin_store();
//! assert_eq!(store.outside_diameter(100), Some(114.3));
//! ```

pub mod entities;
pub mod keys;
pub mod loaders;
pub mod source;
pub mod store;
pub mod tables;

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::error;

use crate::errors::EngineResult;

pub use entities::*;
pub use source::{ReferenceSource, SeededSource, SnapshotSource};
pub use store::{FlangeRecord, ReferenceDataStore};
pub use tables::ReferenceTables;

static BUILTIN_STORE: Lazy<EngineResult<Arc<ReferenceDataStore>>> = Lazy::new(|| {
    ReferenceDataStore::from_source(&SeededSource::new())
        .map(Arc::new)
        .map_err(|e| {
            error!(error = %e, "built-in reference data failed to load");
            e
        })
});

/// Process-wide store built from the built-in loaders on first use.
///
/// A loader failure is kept and returned to every caller.
pub fn try_builtin_store() -> EngineResult<Arc<ReferenceDataStore>> {
    match &*BUILTIN_STORE {
        Ok(store) => Ok(Arc::clone(store)),
        Err(e) => Err(e.clone()),
    }
}

/// Like [`try_builtin_store`] for callers that treat the compiled-in seed
/// data as infallible.
///
/// # Panics
///
/// Panics if a built-in loader fails, which means the seed data itself is
/// inconsistent.
pub fn builtin_store() -> Arc<ReferenceDataStore> {
    match try_builtin_store() {
        Ok(store) => store,
        Err(e) => panic!("built-in reference data failed to load: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_store_is_shared() {
        let a = builtin_store();
        let b = builtin_store();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.flange_records().is_empty());
    }

    #[test]
    fn test_try_builtin_store_matches_builtin() {
        let store = try_builtin_store().unwrap();
        assert!(Arc::ptr_eq(&store, &builtin_store()));
    }

    #[test]
    fn test_seed_failure_is_an_error_not_an_empty_store() {
        // The same path the process-wide store takes, over a broken source
        struct Broken;
        impl ReferenceSource for Broken {
            fn fetch_tables(&self) -> EngineResult<ReferenceTables> {
                Err(crate::errors::EngineError::loader_failed(200, "flange_dimensions", "bad row"))
            }
        }
        let err = ReferenceDataStore::from_source(&Broken).unwrap_err();
        assert_eq!(err.error_code(), "LOADER_FAILED");
    }
}
