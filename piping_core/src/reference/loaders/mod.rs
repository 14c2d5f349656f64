//! # Reference Loaders
//!
//! Versioned, idempotent scripts that populate [`ReferenceTables`]. Each
//! loader checks natural keys before inserting, so running `up` twice is
//! harmless, and the [`LoaderRunner`] additionally records applied versions
//! in the tables' ledger so a full re-run is a no-op.
//!
//! ## Built-in Loaders
//!
//! | Version | Loader |
//! |---------|--------|
//! | 100 | [`base_catalog`] - standards, pressure classes, flange types, NB→OD |
//! | 200 | [`flange_dimensions`] - flange geometry and masses |
//! | 300 | [`fasteners`] - bolts, nuts, washers, bolting materials, BNW sets |
//! | 400 | [`gaskets`] - gasket masses per NB |
//! | 500 | [`pt_ratings`] - pressure-temperature curves |
//! | 600 | [`thermoplastics`] - HDPE/PVC-U pipe and fitting tables |
//! | 700 | [`corrections::Sabs1123Correction`] (corrective) |
//! | 800 | [`corrections::Bs4504Correction`] (corrective) |
//!
//! ## Transactions
//!
//! Every loader runs against a working copy of the tables. The copy replaces
//! the live tables only when `up` succeeds, so a failing loader leaves nothing
//! half-applied.

pub mod base_catalog;
pub mod corrections;
pub mod fasteners;
pub mod flange_dimensions;
pub mod gaskets;
pub mod pt_ratings;
pub mod thermoplastics;

use chrono::Utc;
use tracing::{info, warn};

use super::entities::{Bolt, FlangeGeometry, RowId};
use super::tables::{AppliedLoader, ReferenceTables};
use crate::errors::{EngineError, EngineResult};

/// A versioned reference-data script.
pub trait Loader: Send + Sync {
    /// Ordering key; loaders run in ascending version order.
    fn version(&self) -> u64;

    fn name(&self) -> &'static str;

    /// Apply the script. Must be safe to run on tables that already hold its rows.
    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()>;

    /// Undo the script.
    fn down(&self, tables: &mut ReferenceTables) -> EngineResult<()>;

    /// Corrective loaders overwrite rows in place and cannot restore the
    /// previous values; their `down` is a logged no-op.
    fn is_corrective(&self) -> bool {
        false
    }
}

/// The loaders that build the standard reference data set, in version order.
pub fn builtin_loaders() -> Vec<Box<dyn Loader>> {
    vec![
        Box::new(base_catalog::BaseCatalog),
        Box::new(flange_dimensions::FlangeDimensions),
        Box::new(fasteners::Fasteners),
        Box::new(gaskets::GasketWeights),
        Box::new(pt_ratings::PtRatings),
        Box::new(thermoplastics::Thermoplastics),
        Box::new(corrections::Sabs1123Correction),
        Box::new(corrections::Bs4504Correction),
    ]
}

/// Applies and reverts loaders against a set of tables.
pub struct LoaderRunner;

impl LoaderRunner {
    /// Apply every loader not yet recorded in the ledger, in version order.
    ///
    /// Returns the number of loaders applied by this call. Stops at the first
    /// failure; loaders applied before it stay committed.
    pub fn apply_all(tables: &mut ReferenceTables, loaders: &[Box<dyn Loader>]) -> EngineResult<usize> {
        let mut ordered: Vec<&dyn Loader> = loaders.iter().map(|l| l.as_ref()).collect();
        ordered.sort_by_key(|l| l.version());

        let mut applied = 0;
        for loader in ordered {
            if Self::apply(tables, loader)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Apply one loader in its own transaction. Returns `false` if it was
    /// already in the ledger.
    pub fn apply(tables: &mut ReferenceTables, loader: &dyn Loader) -> EngineResult<bool> {
        if tables.is_applied(loader.version()) {
            return Ok(false);
        }

        let mut working = tables.clone();
        loader
            .up(&mut working)
            .map_err(|e| EngineError::loader_failed(loader.version(), loader.name(), e.to_string()))?;
        working.applied.insert(
            loader.version(),
            AppliedLoader {
                name: loader.name().to_string(),
                applied_at: Utc::now(),
            },
        );
        *tables = working;

        info!(version = loader.version(), name = loader.name(), "applied loader");
        Ok(true)
    }

    /// Run a loader's `down` and drop its ledger entry.
    ///
    /// Loaders revert newest first: while any later version is still in the
    /// ledger this returns [`EngineError::RevertOutOfOrder`]. Otherwise a
    /// re-seeding loader could be re-applied underneath a correction that
    /// no longer runs. For a corrective loader the rows are left as
    /// corrected and a warning is logged; only the ledger entry goes.
    pub fn revert(tables: &mut ReferenceTables, loader: &dyn Loader) -> EngineResult<()> {
        if let Some((&later_version, _)) = tables.applied.range(loader.version() + 1..).next_back() {
            return Err(EngineError::RevertOutOfOrder {
                version: loader.version(),
                name: loader.name().to_string(),
                later_version,
            });
        }

        let mut working = tables.clone();
        if loader.is_corrective() {
            warn!(
                version = loader.version(),
                name = loader.name(),
                "corrective loader cannot restore prior values; rows left as corrected"
            );
        } else {
            loader
                .down(&mut working)
                .map_err(|e| EngineError::loader_failed(loader.version(), loader.name(), e.to_string()))?;
            working.reindex();
        }
        working.applied.remove(&loader.version());
        *tables = working;

        info!(version = loader.version(), name = loader.name(), "reverted loader");
        Ok(())
    }

    /// Revert the most recently versioned applied loader found in `loaders`.
    ///
    /// Returns the reverted version, or `None` when the ledger is empty. A
    /// ledger entry with no matching loader is a `LoaderFailed` error.
    pub fn revert_latest(tables: &mut ReferenceTables, loaders: &[Box<dyn Loader>]) -> EngineResult<Option<u64>> {
        let Some((&version, entry)) = tables.applied.iter().next_back() else {
            return Ok(None);
        };
        let Some(loader) = loaders.iter().find(|l| l.version() == version) else {
            return Err(EngineError::loader_failed(version, entry.name.clone(), "no loader registered for this version"));
        };
        Self::revert(tables, loader.as_ref())?;
        Ok(Some(version))
    }

    /// Like [`revert`](Self::revert) but refuses corrective loaders.
    pub fn revert_strict(tables: &mut ReferenceTables, loader: &dyn Loader) -> EngineResult<()> {
        if loader.is_corrective() {
            return Err(EngineError::IrreversibleLoader {
                version: loader.version(),
                name: loader.name().to_string(),
            });
        }
        Self::revert(tables, loader)
    }
}

// ============================================================================
// Shared flange-row seeding
// ============================================================================

/// One flange row as tabulated:
/// `(nb, D, b, d4, f, holes, d1, bolt, pcd, mass_kg)`.
pub(crate) type FlangeRow = (u32, f64, f64, f64, f64, u32, f64, &'static str, f64, f64);

pub(crate) fn geometry(row: &FlangeRow) -> FlangeGeometry {
    let (_, d_outer, b, d4, f, num_holes, d1, _, pcd, mass_kg) = *row;
    FlangeGeometry {
        d_outer,
        b,
        d4,
        f,
        num_holes,
        d1,
        pcd,
        mass_kg,
    }
}

/// Return the bolt id for a designation, creating a bare grade 8.8 row if needed.
///
/// The fasteners loader later fills in the full bolt record under the same id.
pub(crate) fn ensure_bolt(tables: &mut ReferenceTables, designation: &str) -> RowId {
    if let Some(id) = tables.bolt_id(designation) {
        return id;
    }
    tables.upsert_bolt(Bolt {
        id: 0,
        designation: designation.to_string(),
        grade: "8.8".to_string(),
        material: "Carbon Steel".to_string(),
        head_style: "Hex".to_string(),
        thread_type: "Coarse".to_string(),
    })
}

/// Where a block of flange rows lands.
pub(crate) struct FlangeBlock<'a> {
    pub standard: &'a str,
    pub designation: &'a str,
    /// `None` for standards whose rows are not split by flange type (BS 10)
    pub flange_type: Option<&'a str>,
}

/// Resolve the block's keys, creating the pressure class if missing.
pub(crate) fn block_ids(
    tables: &mut ReferenceTables,
    block: &FlangeBlock<'_>,
) -> EngineResult<(RowId, RowId, Option<RowId>)> {
    let standard_id = tables.require_standard(block.standard)?;
    let class_id = tables.upsert_pressure_class(standard_id, block.designation);
    let type_id = match block.flange_type {
        Some(code) => Some(
            tables
                .flange_type_id(code)
                .ok_or_else(|| EngineError::reference_not_found("flange_types", code))?,
        ),
        None => None,
    };
    Ok((standard_id, class_id, type_id))
}

/// Insert every row of a block that is not already present.
///
/// Rows whose NB has no outside-diameter entry are skipped with a warning.
/// Returns the number of rows inserted.
pub(crate) fn seed_flange_rows(
    tables: &mut ReferenceTables,
    block: &FlangeBlock<'_>,
    rows: &[FlangeRow],
) -> EngineResult<usize> {
    let (standard_id, class_id, type_id) = block_ids(tables, block)?;

    let mut inserted = 0;
    for row in rows {
        let Some(nod_id) = tables.nominal_od_id(row.0) else {
            warn!(
                nb = row.0,
                standard = block.standard,
                class = block.designation,
                "no outside diameter for NB; flange row skipped"
            );
            continue;
        };
        let bolt_id = ensure_bolt(tables, row.7);
        let (_, created) =
            tables.insert_flange_dimension_if_absent(nod_id, standard_id, class_id, type_id, geometry(row), Some(bolt_id));
        if created {
            inserted += 1;
        }
    }
    Ok(inserted)
}

/// Remove the rows of a block. Used by `down` scripts.
pub(crate) fn remove_flange_rows(tables: &mut ReferenceTables, block: &FlangeBlock<'_>, rows: &[FlangeRow]) {
    let Some(standard_id) = tables.standard_id(block.standard) else {
        return;
    };
    let Some(class_id) = tables.pressure_class_id(standard_id, block.designation) else {
        return;
    };
    let type_id = block.flange_type.and_then(|code| tables.flange_type_id(code));
    let nod_ids: Vec<RowId> = rows.iter().filter_map(|row| tables.nominal_od_id(row.0)).collect();
    tables.flange_dimensions.retain(|d| {
        !(d.standard_id == standard_id
            && d.pressure_class_id == class_id
            && d.flange_type_id == type_id
            && nod_ids.contains(&d.nominal_outside_diameter_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceDataStore;
    use crate::resolvers::dimensional::flange_weight;

    struct Failing;

    impl Loader for Failing {
        fn version(&self) -> u64 {
            9_000
        }
        fn name(&self) -> &'static str {
            "failing"
        }
        fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
            tables.upsert_standard("HALF WRITTEN");
            Err(EngineError::reference_not_found("standards", "MISSING"))
        }
        fn down(&self, _tables: &mut ReferenceTables) -> EngineResult<()> {
            Ok(())
        }
    }

    fn seeded() -> ReferenceTables {
        let mut tables = ReferenceTables::new();
        LoaderRunner::apply_all(&mut tables, &builtin_loaders()).unwrap();
        tables
    }

    #[test]
    fn test_builtin_versions_are_unique_and_ascending() {
        let versions: Vec<u64> = builtin_loaders().iter().map(|l| l.version()).collect();
        let mut sorted = versions.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_apply_all_records_ledger() {
        let tables = seeded();
        for loader in builtin_loaders() {
            let entry = &tables.applied[&loader.version()];
            assert_eq!(entry.name, loader.name());
        }
    }

    #[test]
    fn test_second_run_is_noop() {
        let mut tables = seeded();
        let before = tables.clone();
        let applied = LoaderRunner::apply_all(&mut tables, &builtin_loaders()).unwrap();
        assert_eq!(applied, 0);
        assert_eq!(tables, before);
    }

    #[test]
    fn test_direct_reapply_of_up_changes_nothing() {
        let mut tables = seeded();
        let counts = tables.row_counts();
        let mut before = tables.clone();
        for loader in builtin_loaders() {
            loader.up(&mut tables).unwrap();
        }
        assert_eq!(tables.row_counts(), counts);
        before.applied = tables.applied.clone();
        assert_eq!(tables, before);
    }

    #[test]
    fn test_failing_loader_leaves_tables_untouched() {
        let mut tables = seeded();
        let before = tables.clone();
        let loaders: Vec<Box<dyn Loader>> = vec![Box::new(Failing)];
        let err = LoaderRunner::apply_all(&mut tables, &loaders).unwrap_err();
        assert_eq!(err.error_code(), "LOADER_FAILED");
        assert_eq!(tables, before);
    }

    #[test]
    fn test_revert_corrective_is_noop_on_rows() {
        let mut tables = seeded();
        let flanges = tables.flange_dimensions.clone();
        LoaderRunner::revert(&mut tables, &corrections::Bs4504Correction).unwrap();
        assert_eq!(tables.flange_dimensions, flanges);
        assert!(!tables.is_applied(corrections::Bs4504Correction.version()));
    }

    #[test]
    fn test_revert_strict_rejects_corrective() {
        let mut tables = seeded();
        let err = LoaderRunner::revert_strict(&mut tables, &corrections::Sabs1123Correction).unwrap_err();
        assert_eq!(err.error_code(), "IRREVERSIBLE_LOADER");
        assert!(tables.is_applied(corrections::Sabs1123Correction.version()));
    }

    #[test]
    fn test_revert_then_reapply_gasket_loader() {
        let mut tables = seeded();
        let gaskets = tables.gasket_weights.clone();
        let loaders = builtin_loaders();
        while tables.is_applied(gaskets::GasketWeights.version()) {
            LoaderRunner::revert_latest(&mut tables, &loaders).unwrap();
        }
        assert!(tables.gasket_weights.is_empty());
        assert!(tables.is_applied(fasteners::Fasteners.version()));

        let applied = LoaderRunner::apply_all(&mut tables, &loaders).unwrap();
        assert_eq!(applied, 5);
        assert_eq!(tables.gasket_weights, gaskets);
    }

    #[test]
    fn test_revert_refuses_while_later_loader_applied() {
        let mut tables = seeded();
        let before = tables.clone();
        let err = LoaderRunner::revert(&mut tables, &flange_dimensions::FlangeDimensions).unwrap_err();
        assert_eq!(err.error_code(), "REVERT_OUT_OF_ORDER");
        assert_eq!(
            err,
            EngineError::RevertOutOfOrder {
                version: 200,
                name: flange_dimensions::FlangeDimensions.name().to_string(),
                later_version: 800,
            }
        );
        assert_eq!(tables, before);
    }

    #[test]
    fn test_full_rollback_and_reseed_keeps_corrections() {
        let mut tables = seeded();
        let flanges = tables.flange_dimensions.clone();
        let loaders = builtin_loaders();

        let mut reverted = Vec::new();
        while let Some(version) = LoaderRunner::revert_latest(&mut tables, &loaders).unwrap() {
            reverted.push(version);
        }
        assert_eq!(reverted, vec![800, 700, 600, 500, 400, 300, 200, 100]);
        assert!(tables.applied.is_empty());
        assert!(tables.flange_dimensions.len() < flanges.len());

        LoaderRunner::apply_all(&mut tables, &loaders).unwrap();
        let store = ReferenceDataStore::from_tables(&tables);
        assert_eq!(flange_weight(&store, 300, "PN16", Some("BS 4504"), "/2"), 70.0);
        assert_eq!(tables.flange_dimensions.len(), flanges.len());
    }

    #[test]
    fn test_revert_latest_on_empty_ledger() {
        let mut tables = ReferenceTables::new();
        assert_eq!(LoaderRunner::revert_latest(&mut tables, &builtin_loaders()).unwrap(), None);
    }

    #[test]
    fn test_revert_latest_needs_registered_loader() {
        let mut tables = seeded();
        let err = LoaderRunner::revert_latest(&mut tables, &[]).unwrap_err();
        assert_eq!(err.error_code(), "LOADER_FAILED");
        assert!(tables.is_applied(800));
    }
}
