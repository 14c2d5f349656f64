//! # File I/O Module
//!
//! Reference-data snapshots and engine configuration on disk:
//! - **Atomic saves**: write to `.tmp`, sync, then rename over the target
//! - **File locking**: an OS advisory lock plus a `.lock` file naming the holder,
//!   for snapshots kept on shared drives
//! - **Version validation**: snapshot schema versions are checked with semver
//!
//! ## File Format
//!
//! A snapshot is pretty-printed JSON: `{"meta": {...}, "tables": {...}}`.
//! The lock file sits next to it with `.lock` appended to the extension.
//!
//! ## Example
//!
//! ```rust,no_run
//! use piping_core::file_io::{load_snapshot, save_snapshot, FileLock, Snapshot};
//! use piping_core::reference::source::{ReferenceSource, SeededSource};
//! use std::path::Path;
//!
//! let tables = SeededSource::new().fetch_tables()?;
//! let path = Path::new("reference.json");
//!
//! let lock = FileLock::acquire(path, "estimator@annix.co.za")?;
//! save_snapshot(&Snapshot::new(tables), path)?;
//! drop(lock);
//!
//! let snapshot = load_snapshot(path)?;
//! println!("{} flange rows", snapshot.tables.flange_dimensions.len());
//! # Ok::<(), piping_core::errors::EngineError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use semver::Version;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::reference::tables::ReferenceTables;

/// Current snapshot schema version
pub const SCHEMA_VERSION: &str = "0.1.0";

// ============================================================================
// Snapshot format
// ============================================================================

/// Snapshot header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub schema_version: String,
    /// Identifies the reference data a quotation was priced against
    pub snapshot_id: Uuid,
    pub created: DateTime<Utc>,
}

/// A complete, versioned copy of the reference tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub tables: ReferenceTables,
}

impl Snapshot {
    pub fn new(tables: ReferenceTables) -> Self {
        Snapshot {
            meta: SnapshotMeta {
                schema_version: SCHEMA_VERSION.to_string(),
                snapshot_id: Uuid::new_v4(),
                created: Utc::now(),
            },
            tables,
        }
    }
}

// ============================================================================
// Locking
// ============================================================================

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

/// Lock guard; the lock file is removed and the OS lock released on drop.
pub struct FileLock {
    target_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a snapshot file.
    ///
    /// Fails with [`EngineError::FileLocked`] while another live process
    /// holds it. Locks older than 24 hours, or held by a dead process on this
    /// machine, are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> EngineResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = FileLock::check(path) {
            return Err(EngineError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| EngineError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            EngineError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(EngineError::serialization)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| EngineError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| EngineError::file_error("sync lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(FileLock {
            target_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Returns the holder if the file is currently locked.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path).ok().filter(|info| !is_lock_stale(info))
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> EngineResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(EngineError::serialization)
}

fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().as_deref() == Some(info.machine.as_str()) {
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }
    (Utc::now() - info.locked_at).num_hours() > 24
}

fn read_to_string(path: &Path, operation: &str) -> EngineResult<String> {
    let mut file =
        File::open(path).map_err(|e| EngineError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| EngineError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

// ============================================================================
// Save / load
// ============================================================================

/// Write JSON to `path` via a synced `.tmp` sibling and an atomic rename.
fn write_atomic(json: &str, path: &Path) -> EngineResult<()> {
    let tmp_path = path.with_extension("tmp");

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| EngineError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| EngineError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| EngineError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EngineError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Save a snapshot with atomic write semantics.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> EngineResult<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(EngineError::serialization)?;
    write_atomic(&json, path)
}

/// Load a snapshot and validate its schema version.
pub fn load_snapshot(path: &Path) -> EngineResult<Snapshot> {
    let contents = read_to_string(path, "open")?;
    let snapshot: Snapshot = serde_json::from_str(&contents).map_err(|e| EngineError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;
    validate_version(&snapshot.meta.schema_version)?;
    Ok(snapshot)
}

/// Load a snapshot, also reporting who holds its lock (if anyone).
pub fn load_snapshot_with_lock_check(path: &Path) -> EngineResult<(Snapshot, Option<LockInfo>)> {
    let snapshot = load_snapshot(path)?;
    Ok((snapshot, FileLock::check(path)))
}

/// Load engine configuration from a JSON file. Missing fields take defaults.
pub fn load_config(path: &Path) -> EngineResult<EngineConfig> {
    let contents = read_to_string(path, "open config")?;
    serde_json::from_str(&contents).map_err(|e| EngineError::SerializationError {
        reason: format!("Invalid config in {}: {}", path.display(), e),
    })
}

/// Save engine configuration atomically.
pub fn save_config(config: &EngineConfig, path: &Path) -> EngineResult<()> {
    let json = serde_json::to_string_pretty(config).map_err(EngineError::serialization)?;
    write_atomic(&json, path)
}

/// Major versions must match; within 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> EngineResult<()> {
    let mismatch = || EngineError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let file = Version::parse(file_version).map_err(|_| mismatch())?;
    let current = Version::parse(SCHEMA_VERSION).map_err(|_| mismatch())?;

    if file.major != current.major {
        return Err(mismatch());
    }
    if current.major == 0 && file.minor > current.minor {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_tables() -> ReferenceTables {
        let mut tables = ReferenceTables::new();
        let std = tables.upsert_standard("BS 4504");
        tables.upsert_pressure_class(std, "PN16");
        tables.upsert_nominal_od(300, 323.9);
        tables
    }

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/data/reference.json"));
        assert_eq!(lock_path, Path::new("/data/reference.json.lock"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reference.json");

        let snapshot = Snapshot::new(sample_tables());
        save_snapshot(&snapshot, &path).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.meta.snapshot_id, snapshot.meta.snapshot_id);
        assert_eq!(loaded.tables, snapshot.tables);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reference.json");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "estimator@example.com").unwrap();
        assert_eq!(lock.info.user_id, "estimator@example.com");
        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("not-a-version").is_err());
    }

    #[test]
    fn test_config_roundtrip_and_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.json");

        fs::write(&path, r#"{"retaining_ring": {"min_thickness_mm": 12.0}}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.retaining_ring.min_thickness_mm, 12.0);
        assert_eq!(config.retaining_ring.od_multiplier, 1.15);

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.json");
        let mut snapshot = Snapshot::new(ReferenceTables::new());
        snapshot.meta.schema_version = "0.9.0".to_string();
        save_snapshot(&snapshot, &path).unwrap();

        let err = load_snapshot(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }
}
