//! Seeding, snapshot persistence and exact lookups over the reference data.

use piping_core::file_io::{load_snapshot_with_lock_check, save_snapshot, FileLock, Snapshot};
use piping_core::reference::loaders::{builtin_loaders, Loader, LoaderRunner};
use piping_core::reference::{ReferenceDataStore, ReferenceSource, ReferenceTables, SeededSource, SnapshotSource};
use piping_core::resolvers::dimensional::flange_weight;
use piping_core::{Engine, EngineConfig};
use tempfile::tempdir;

fn seeded_tables() -> ReferenceTables {
    SeededSource::new().fetch_tables().unwrap()
}

#[test]
fn test_every_seeded_flange_resolves_to_its_own_mass() {
    let store = ReferenceDataStore::from_tables(&seeded_tables());
    assert!(!store.flange_records().is_empty());

    for record in store.flange_records() {
        let mass = flange_weight(
            &store,
            record.nominal_bore_mm,
            &record.pressure_class,
            Some(&record.standard),
            record.flange_type.as_deref().unwrap_or(""),
        );
        assert_eq!(
            mass, record.mass_kg,
            "{} NB {} {} {:?}",
            record.standard, record.nominal_bore_mm, record.pressure_class, record.flange_type
        );
    }
}

#[test]
fn test_reseeding_changes_nothing() {
    let mut once = ReferenceTables::new();
    let loaders = builtin_loaders();
    for loader in &loaders {
        loader.up(&mut once).unwrap();
    }

    let mut twice = once.clone();
    for loader in &loaders {
        loader.up(&mut twice).unwrap();
    }
    assert_eq!(twice.row_counts(), once.row_counts());
    assert_eq!(twice, once);

    // Through the runner the second pass is skipped entirely
    let mut tables = seeded_tables();
    let before = tables.clone();
    assert_eq!(LoaderRunner::apply_all(&mut tables, &loaders).unwrap(), 0);
    assert_eq!(tables, before);
}

#[test]
fn test_snapshot_round_trip_drives_engine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reference.json");

    let snapshot = Snapshot::new(seeded_tables());
    {
        let _lock = FileLock::acquire(&path, "estimator@example.com").unwrap();
        save_snapshot(&snapshot, &path).unwrap();
    }

    let (loaded, lock) = load_snapshot_with_lock_check(&path).unwrap();
    assert!(lock.is_none());
    assert_eq!(loaded.meta.snapshot_id, snapshot.meta.snapshot_id);

    let engine = Engine::from_source(&SnapshotSource::new(&path), EngineConfig::default()).unwrap();
    assert_eq!(engine.flange_weight(300, "PN16", Some("BS 4504"), "/2"), 70.0);
    assert_eq!(
        engine.store().row_counts(),
        ReferenceDataStore::from_tables(&snapshot.tables).row_counts()
    );
}

#[test]
fn test_snapshot_held_by_another_user_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reference.json");
    save_snapshot(&Snapshot::new(seeded_tables()), &path).unwrap();

    let _lock = FileLock::acquire(&path, "someone@example.com").unwrap();
    let (_, lock) = load_snapshot_with_lock_check(&path).unwrap();
    assert_eq!(lock.map(|l| l.user_id), Some("someone@example.com".to_string()));
}

#[test]
fn test_revert_below_a_correction_is_refused() {
    let mut tables = seeded_tables();
    let loaders = builtin_loaders();
    let flanges = loaders.iter().find(|l| l.name() == "flange_dimensions").unwrap();

    let err = LoaderRunner::revert(&mut tables, flanges.as_ref()).unwrap_err();
    assert_eq!(err.error_code(), "REVERT_OUT_OF_ORDER");
    let store = ReferenceDataStore::from_tables(&tables);
    assert_eq!(flange_weight(&store, 300, "PN16", Some("BS 4504"), "/2"), 70.0);
}

#[test]
fn test_rollback_past_flange_rows_then_reapply_restores_corrections() {
    let mut tables = seeded_tables();
    let loaders = builtin_loaders();

    while tables.applied.keys().next_back().is_some_and(|&v| v >= 200) {
        LoaderRunner::revert_latest(&mut tables, &loaders).unwrap();
    }
    assert_eq!(tables.applied.keys().copied().collect::<Vec<_>>(), vec![100]);

    assert_eq!(LoaderRunner::apply_all(&mut tables, &loaders).unwrap(), 7);
    let store = ReferenceDataStore::from_tables(&tables);
    assert_eq!(flange_weight(&store, 300, "PN16", Some("BS 4504"), "/2"), 70.0);
    assert_eq!(store.row_counts(), ReferenceDataStore::from_tables(&seeded_tables()).row_counts());
}

#[test]
fn test_ledger_survives_snapshot_for_later_revert() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reference.json");
    save_snapshot(&Snapshot::new(seeded_tables()), &path).unwrap();

    let mut tables = SnapshotSource::new(&path).fetch_tables().unwrap();
    let reverted = LoaderRunner::revert_latest(&mut tables, &builtin_loaders()).unwrap();
    assert_eq!(reverted, Some(800));
    assert_eq!(LoaderRunner::apply_all(&mut tables, &builtin_loaders()).unwrap(), 1);
}
