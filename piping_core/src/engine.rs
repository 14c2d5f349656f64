//! # Engine
//!
//! Single entry point for an RFQ line item. Holds the shared reference store,
//! the engine configuration and an optional remote catalog, and exposes every
//! lookup with primitive arguments.
//!
//! Lookups that a catalog service can answer go remote-first through
//! [`resolve_with_fallback`]; the rest are answered locally. No lookup fails
//! for missing data.
//!
//! ## Example
//!
//! ```rust
//! use piping_core::engine::Engine;
//! use piping_core::thermoplastic::PolyethyleneGrade;
//!
//! let engine = Engine::builtin();
//! assert_eq!(engine.flange_weight(300, "PN16", Some("BS 4504"), "/2"), 70.0);
//! assert_eq!(engine.bnw_set_info(500, "PN16").bolt_size, "M16x65");
//! assert_eq!(engine.pt_rating_material_group("A335 P22 Pipe"), "Low Alloy Steel F22 (Group 1.10)");
//! assert_eq!(engine.wall_thickness(110.0, 11.0), 10.0);
//! assert_eq!(engine.recommended_sdr(9.0, PolyethyleneGrade::Pe100), 17.0);
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::errors::EngineResult;
use crate::estimator::{retaining_ring, RetainingRing};
use crate::fallback::{resolve_with_fallback, HttpRemoteCatalog, RemoteCatalog, RemoteQuery};
use crate::reference::{builtin_store, try_builtin_store};
use crate::reference::entities::{BoltingMaterialGroup, ThermoplasticMaterial};
use crate::reference::source::ReferenceSource;
use crate::reference::store::ReferenceDataStore;
use crate::resolvers::dimensional::{self, FlangeWeight};
use crate::resolvers::fasteners::{self, BnwSetInfo};
use crate::resolvers::material;
use crate::thermoplastic::{
    self, FittingCostInput, FittingCostResult, GradeSdrCompatibility, JoiningMethod, JointCostBreakdown, PipeCostInput,
    PipeCostResult, PipeDimensions, PolyethyleneGrade, SdrPressureCheck, ServiceCheck, ServiceConditions,
    TemperaturePressureCheck, ThermoplasticCalculator, WeldedPipeCostInput, WeldedPipeCostResult,
};

/// Store, configuration and optional remote catalog for one process.
pub struct Engine {
    store: Arc<ReferenceDataStore>,
    config: EngineConfig,
    remote: Option<Box<dyn RemoteCatalog>>,
}

impl Engine {
    /// Engine over the built-in store with default configuration and no remote.
    ///
    /// # Panics
    ///
    /// Panics if the built-in loaders fail; see [`try_builtin`](Self::try_builtin).
    pub fn builtin() -> Self {
        Self::with_store(builtin_store())
    }

    /// Fallible form of [`builtin`](Self::builtin).
    pub fn try_builtin() -> EngineResult<Self> {
        Ok(Self::with_store(try_builtin_store()?))
    }

    pub fn with_store(store: Arc<ReferenceDataStore>) -> Self {
        Engine {
            store,
            config: EngineConfig::default(),
            remote: None,
        }
    }

    /// Build a store from `source` and wire the remote named in `config`, if any.
    pub fn from_source(source: &dyn ReferenceSource, config: EngineConfig) -> EngineResult<Self> {
        let store = Arc::new(ReferenceDataStore::from_source(source)?);
        Self::from_config(store, config)
    }

    /// Wire `config` around an existing store, creating the HTTP catalog when
    /// `config.remote.base_url` is set.
    pub fn from_config(store: Arc<ReferenceDataStore>, config: EngineConfig) -> EngineResult<Self> {
        let remote = HttpRemoteCatalog::from_config(&config.remote)?;
        if let Some(catalog) = &remote {
            info!(base_url = catalog.base_url(), "remote catalog enabled");
        }
        Ok(Engine {
            store,
            config,
            remote: remote.map(|c| Box::new(c) as Box<dyn RemoteCatalog>),
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteCatalog>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn store(&self) -> &ReferenceDataStore {
        &self.store
    }

    pub fn shared_store(&self) -> Arc<ReferenceDataStore> {
        Arc::clone(&self.store)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn remote(&self) -> Option<&dyn RemoteCatalog> {
        self.remote.as_deref()
    }

    // ========================================================================
    // Flanges
    // ========================================================================

    /// Flange mass in kg.
    pub fn flange_weight(
        &self,
        nominal_bore_mm: u32,
        pressure_class: &str,
        standard_code: Option<&str>,
        flange_type_code: &str,
    ) -> f64 {
        let query = RemoteQuery::FlangeWeight {
            nominal_bore_mm,
            pressure_class: pressure_class.to_string(),
            standard: standard_code.map(str::to_string),
            flange_type: flange_type_code.to_string(),
        };
        resolve_with_fallback(self.remote(), &query, || {
            dimensional::flange_weight(&self.store, nominal_bore_mm, pressure_class, standard_code, flange_type_code)
        })
    }

    /// Local flange mass with the tier that produced it.
    pub fn resolve_flange_weight(
        &self,
        nominal_bore_mm: u32,
        pressure_class: &str,
        standard_code: Option<&str>,
        flange_type_code: &str,
    ) -> FlangeWeight {
        dimensional::resolve_flange_weight(&self.store, nominal_bore_mm, pressure_class, standard_code, flange_type_code)
    }

    pub fn blank_flange_weight(&self, nominal_bore_mm: u32, pressure_class: &str) -> f64 {
        let query = RemoteQuery::BlankFlangeWeight {
            nominal_bore_mm,
            pressure_class: pressure_class.to_string(),
        };
        resolve_with_fallback(self.remote(), &query, || {
            dimensional::blank_flange_weight(&self.store, nominal_bore_mm, pressure_class)
        })
    }

    pub fn sans_blank_flange_weight(&self, nominal_bore_mm: u32, table_designation: &str) -> f64 {
        let query = RemoteQuery::SansBlankFlangeWeight {
            nominal_bore_mm,
            table_designation: table_designation.to_string(),
        };
        resolve_with_fallback(self.remote(), &query, || {
            dimensional::sans_blank_flange_weight(&self.store, nominal_bore_mm, table_designation)
        })
    }

    pub fn bolt_holes_per_flange(&self, nominal_bore_mm: u32, pressure_class: &str) -> u32 {
        dimensional::bolt_holes_per_flange(&self.store, nominal_bore_mm, pressure_class)
    }

    // ========================================================================
    // Fasteners, Gaskets, Rings
    // ========================================================================

    pub fn bnw_set_info(&self, nominal_bore_mm: u32, pressure_class: &str) -> BnwSetInfo {
        let query = RemoteQuery::BnwSetInfo {
            nominal_bore_mm,
            pressure_class: pressure_class.to_string(),
        };
        resolve_with_fallback(self.remote(), &query, || {
            fasteners::bnw_set_info(&self.store, &self.config.bnw_default, nominal_bore_mm, pressure_class)
        })
    }

    pub fn gasket_weight(&self, gasket_type: &str, nominal_bore_mm: u32) -> f64 {
        let query = RemoteQuery::GasketWeight {
            gasket_type: gasket_type.to_string(),
            nominal_bore_mm,
        };
        resolve_with_fallback(self.remote(), &query, || {
            fasteners::gasket_weight(&self.store, gasket_type, nominal_bore_mm)
        })
    }

    pub fn bolting_materials(&self, material_group: &str) -> Option<&BoltingMaterialGroup> {
        fasteners::bolting_materials(&self.store, material_group)
    }

    pub fn retaining_ring_weight(&self, nominal_bore_mm: u32, pipe_od_mm: Option<f64>) -> f64 {
        let query = RemoteQuery::RetainingRingWeight {
            nominal_bore_mm,
            pipe_od_mm,
        };
        resolve_with_fallback(self.remote(), &query, || {
            self.retaining_ring(nominal_bore_mm, pipe_od_mm).weight_kg
        })
    }

    /// Full local ring geometry.
    pub fn retaining_ring(&self, nominal_bore_mm: u32, pipe_od_mm: Option<f64>) -> RetainingRing {
        retaining_ring(&self.store, &self.config.retaining_ring, nominal_bore_mm, pipe_od_mm)
    }

    // ========================================================================
    // Materials and P-T
    // ========================================================================

    pub fn pt_rating_material_group(&self, spec_text: &str) -> &'static str {
        material::pt_rating_material_group(spec_text)
    }

    /// Allowable pressure in bar; `None` when the class, group or
    /// temperature is not catalogued.
    pub fn pt_rating(
        &self,
        standard_code: &str,
        designation: &str,
        material_group: &str,
        temperature_celsius: i32,
    ) -> Option<f64> {
        let query = RemoteQuery::PtRating {
            standard: standard_code.to_string(),
            designation: designation.to_string(),
            material_group: material_group.to_string(),
            temperature_celsius,
        };
        resolve_with_fallback(self.remote(), &query, || {
            material::pt_rating_for(&self.store, standard_code, designation, material_group, temperature_celsius)
        })
    }

    // ========================================================================
    // Thermoplastics
    // ========================================================================

    fn thermoplastics(&self) -> ThermoplasticCalculator<'_> {
        ThermoplasticCalculator::new(&self.store, &self.config.thermoplastic)
    }

    /// Catalogued wall for this OD and SDR, else `OD / SDR` to 2 dp.
    pub fn wall_thickness(&self, outer_diameter_mm: f64, sdr: f64) -> f64 {
        self.thermoplastics()
            .wall_thickness_for_outer_diameter(outer_diameter_mm, sdr)
            .0
    }

    /// PE pressure rating in bar with the configured design coefficient.
    pub fn pressure_rating(&self, sdr: f64, grade: PolyethyleneGrade) -> f64 {
        thermoplastic::pressure_rating(sdr, grade, self.config.thermoplastic.design_coefficient)
    }

    pub fn recommended_sdr(&self, target_bar: f64, grade: PolyethyleneGrade) -> f64 {
        self.thermoplastics().recommended_sdr(target_bar, grade)
    }

    pub fn pipe_dimensions(&self, material: ThermoplasticMaterial, nominal_bore_mm: u32, sdr: f64) -> PipeDimensions {
        self.thermoplastics().pipe_dimensions(material, nominal_bore_mm, sdr)
    }

    pub fn pipe_cost(&self, input: &PipeCostInput) -> EngineResult<PipeCostResult> {
        self.thermoplastics().pipe_cost(input)
    }

    pub fn fitting_cost(&self, input: &FittingCostInput) -> EngineResult<FittingCostResult> {
        self.thermoplastics().fitting_cost(input)
    }

    pub fn check_sdr_for_pressure(&self, sdr: f64, grade: PolyethyleneGrade, required_bar: f64) -> SdrPressureCheck {
        self.thermoplastics().check_sdr_for_pressure(sdr, grade, required_bar)
    }

    pub fn check_grade_sdr_compatibility(&self, grade: PolyethyleneGrade, sdr: f64) -> GradeSdrCompatibility {
        self.thermoplastics().check_grade_sdr_compatibility(grade, sdr)
    }

    /// PE rating for `sdr` derated to `temperature_c` and compared with `required_bar`.
    pub fn check_temperature_and_pressure(
        &self,
        sdr: f64,
        grade: PolyethyleneGrade,
        temperature_c: f64,
        required_bar: f64,
    ) -> TemperaturePressureCheck {
        self.thermoplastics()
            .check_temperature_and_pressure(sdr, grade, temperature_c, required_bar)
    }

    pub fn check_service(&self, conditions: &ServiceConditions) -> ServiceCheck {
        self.thermoplastics().check_service(conditions)
    }

    pub fn joint_cost(&self, method: JoiningMethod, nominal_bore_mm: u32) -> JointCostBreakdown {
        self.thermoplastics().joint_cost(method, nominal_bore_mm)
    }

    pub fn welded_pipe_cost(&self, input: &WeldedPipeCostInput) -> EngineResult<WeldedPipeCostResult> {
        self.thermoplastics().welded_pipe_cost(input)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::builtin()
    }
}
