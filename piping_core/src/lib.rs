//! # piping_core - Piping Component Resolution Engine
//!
//! `piping_core` turns an RFQ line item (nominal bore, pressure class,
//! standard, flange type, material text) into the engineering numbers a
//! quotation needs: flange and blank masses, bolt-nut-washer sets, gasket
//! masses, retaining-ring masses, P-T ratings and thermoplastic pipe sizing
//! and cost.
//!
//! ## Design Philosophy
//!
//! - **Build once**: reference tables are loaded and indexed into one
//!   immutable [`ReferenceDataStore`], shared via `Arc`
//! - **Never stuck**: every resolver has a documented fallback, so missing
//!   data never surfaces as an error
//! - **JSON-First**: public data types implement Serialize/Deserialize
//! - **Remote optional**: an [`Engine`] may ask a catalog service first and
//!   fall back to local data
//!
//! ## Quick Start
//!
//! ```rust
//! use piping_core::Engine;
//!
//! let engine = Engine::builtin();
//! let mass = engine.flange_weight(300, "PN16", Some("BS 4504"), "/2");
//! let bolting = engine.bnw_set_info(300, "PN16");
//! println!("{} kg flange, {} x {}", mass, bolting.num_holes, bolting.bolt_size);
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - Facade wiring store, config and remote catalog
//! - [`reference`] - Reference tables, loaders and the indexed store
//! - [`resolvers`] - Flange, fastener, gasket and material lookups
//! - [`estimator`] - Parametric masses for uncatalogued parts
//! - [`thermoplastic`] - HDPE / PVC-U sizing and costing
//! - [`fallback`] - Remote-first resolution and the HTTP catalog
//! - [`config`] - Engine configuration
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - Snapshot and config files with atomic saves and locking

pub mod config;
pub mod engine;
pub mod errors;
pub mod estimator;
pub mod fallback;
pub mod file_io;
pub mod reference;
pub mod resolvers;
pub mod thermoplastic;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use config::EngineConfig;
pub use engine::Engine;
pub use errors::{EngineError, EngineResult};
pub use file_io::{load_snapshot, save_snapshot, FileLock, Snapshot};
pub use reference::{builtin_store, try_builtin_store, ReferenceDataStore};
