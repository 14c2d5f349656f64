//! # Thermoplastic Pipe Calculator
//!
//! Wall thickness, mass and pressure rating for HDPE (ISO 4427) and PVC-U
//! (ISO 1452) pipe, plus supply costing for pipe runs and fittings.
//!
//! ## Formulas
//!
//! - Wall: `e = OD / SDR` when the dimension table has no row
//! - Bore: `ID = OD - 2e`
//! - Mass: `(π/4)(OD² - ID²) × 10⁻⁶ × ρ` kg/m
//! - PE rating: `PN = 20 × MRS / ((SDR - 1) × C)` bar, with MRS in MPa
//!
//! PVC-U ratings come straight from the PN↔SDR series rather than the
//! formula.
//!
//! Service checks for PE (temperature derating, SDR against a required
//! pressure, grade availability) live in [`validation`]; fused-joint and
//! machine-hire costing in [`joining`].
//!
//! ## Example
//!
//! ```rust
//! use piping_core::thermoplastic::{pressure_rating, recommended_sdr, wall_thickness, PolyethyleneGrade};
//!
//! assert_eq!(wall_thickness(110.0, 11.0), 10.0);
//! assert_eq!(pressure_rating(11.0, PolyethyleneGrade::Pe100, 1.25), 16.0);
//! assert_eq!(recommended_sdr(9.0, PolyethyleneGrade::Pe100, 1.25, 11.0), 17.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ThermoplasticConfig;
use crate::errors::{EngineError, EngineResult};
use crate::reference::entities::ThermoplasticMaterial;
use crate::reference::store::ReferenceDataStore;
use crate::units::{round_to, Bar, Megapascals};

pub mod joining;
pub mod validation;

pub use joining::{JoiningMethod, JointCostBreakdown, WeldedPipeCostInput, WeldedPipeCostResult};
pub use validation::{GradeSdrCompatibility, SdrPressureCheck, ServiceCheck, ServiceConditions, TemperaturePressureCheck};

// ============================================================================
// Grades and Series
// ============================================================================

/// Polyethylene compound classified by minimum required strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolyethyleneGrade {
    #[serde(rename = "PE80")]
    Pe80,
    #[default]
    #[serde(rename = "PE100")]
    Pe100,
}

impl PolyethyleneGrade {
    pub const ALL: [PolyethyleneGrade; 2] = [PolyethyleneGrade::Pe80, PolyethyleneGrade::Pe100];

    /// Minimum required strength at 20 °C / 50 years
    pub fn mrs(&self) -> Megapascals {
        match self {
            PolyethyleneGrade::Pe80 => Megapascals(8.0),
            PolyethyleneGrade::Pe100 => Megapascals(10.0),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PolyethyleneGrade::Pe80 => "PE80",
            PolyethyleneGrade::Pe100 => "PE100",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().replace(' ', "").as_str() {
            "PE80" => Some(PolyethyleneGrade::Pe80),
            "PE100" => Some(PolyethyleneGrade::Pe100),
            _ => None,
        }
    }
}

impl std::fmt::Display for PolyethyleneGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Standard dimension ratios offered for pressure pipe, thickest wall first.
pub const SDR_SERIES: [f64; 9] = [7.4, 9.0, 11.0, 13.6, 17.0, 21.0, 26.0, 33.0, 41.0];

/// PVC-U nominal pressure (bar) ↔ SDR.
const PVC_PN_SDR: [(f64, f64); 7] = [
    (6.0, 41.0),
    (8.0, 33.0),
    (10.0, 26.0),
    (12.5, 21.0),
    (16.0, 17.0),
    (20.0, 13.6),
    (25.0, 11.0),
];

fn same(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ============================================================================
// Pure Formulas
// ============================================================================

/// Wall thickness in mm from OD and SDR, 2 dp.
pub fn wall_thickness(outer_diameter_mm: f64, sdr: f64) -> f64 {
    if sdr <= 0.0 {
        return 0.0;
    }
    round_to(outer_diameter_mm / sdr, 2)
}

pub fn inner_diameter(outer_diameter_mm: f64, wall_thickness_mm: f64) -> f64 {
    round_to(outer_diameter_mm - 2.0 * wall_thickness_mm, 2)
}

/// Mass per metre of a pipe wall, 3 dp.
pub fn pipe_weight_per_meter(outer_diameter_mm: f64, inner_diameter_mm: f64, density_kg_m3: f64) -> f64 {
    let area_mm2 = std::f64::consts::FRAC_PI_4 * (outer_diameter_mm.powi(2) - inner_diameter_mm.powi(2));
    round_to(area_mm2 * 1e-6 * density_kg_m3, 3)
}

/// Rated pressure in bar for a PE pipe, 1 dp.
pub fn pressure_rating(sdr: f64, grade: PolyethyleneGrade, design_coefficient: f64) -> f64 {
    if sdr <= 1.0 || design_coefficient <= 0.0 {
        return 0.0;
    }
    let rating: Bar = Megapascals(2.0 * grade.mrs().0 / ((sdr - 1.0) * design_coefficient)).into();
    round_to(rating.0, 1)
}

/// Thinnest standard wall whose rating meets `target_bar`.
///
/// Candidates are scanned from the highest SDR down; when even the thickest
/// wall falls short, `default_sdr` is returned.
pub fn recommended_sdr(target_bar: f64, grade: PolyethyleneGrade, design_coefficient: f64, default_sdr: f64) -> f64 {
    SDR_SERIES
        .iter()
        .rev()
        .copied()
        .find(|&sdr| pressure_rating(sdr, grade, design_coefficient) >= target_bar)
        .unwrap_or(default_sdr)
}

pub fn pvc_sdr_for_pn(pn_bar: f64) -> Option<f64> {
    PVC_PN_SDR.iter().find(|(pn, _)| same(*pn, pn_bar)).map(|(_, sdr)| *sdr)
}

pub fn pvc_pn_for_sdr(sdr: f64) -> Option<f64> {
    PVC_PN_SDR.iter().find(|(_, s)| same(*s, sdr)).map(|(pn, _)| *pn)
}

// ============================================================================
// Joint Counting
// ============================================================================

/// Pipe sections and joints needed to cover a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointCount {
    pub pipe_lengths_needed: u32,
    pub standard_length_m: f64,
    /// Butt welds (HDPE) or cement joints (PVC-U) between sections
    pub joint_count: u32,
    /// Off-cut left from the last section, 2 dp
    pub waste_m: f64,
    /// Off-cut as a share of the supplied length, 1 dp
    pub waste_pct: f64,
}

/// Count sections and joints for `total_length_m` of pipe.
///
/// A non-positive run (or section length) needs nothing.
pub fn calculate_joint_count(total_length_m: f64, standard_length_m: f64) -> JointCount {
    if total_length_m <= 0.0 || standard_length_m <= 0.0 {
        return JointCount {
            pipe_lengths_needed: 0,
            standard_length_m,
            joint_count: 0,
            waste_m: 0.0,
            waste_pct: 0.0,
        };
    }

    let lengths = (total_length_m / standard_length_m).ceil() as u32;
    let supplied = lengths as f64 * standard_length_m;
    let waste = supplied - total_length_m;

    JointCount {
        pipe_lengths_needed: lengths,
        standard_length_m,
        joint_count: lengths.saturating_sub(1),
        waste_m: round_to(waste, 2),
        waste_pct: round_to(waste / supplied * 100.0, 1),
    }
}

// ============================================================================
// Dimensions
// ============================================================================

/// Where a pipe's wall thickness came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionSource {
    /// Catalogued row in the dimension table
    Table,
    /// `OD / SDR`
    Formula,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeDimensions {
    pub material: ThermoplasticMaterial,
    pub sdr: f64,
    pub outer_diameter_mm: f64,
    pub wall_thickness_mm: f64,
    pub inner_diameter_mm: f64,
    pub weight_per_meter_kg: f64,
    /// 0 when no rating is known (PVC-U outside the PN series)
    pub pressure_rating_bar: f64,
    pub source: DimensionSource,
}

// ============================================================================
// Costing Inputs and Results
// ============================================================================

/// Supply cost request for a straight run of pipe.
///
/// ## JSON Example
///
/// ```json
/// {
///   "material": "HDPE",
///   "nominal_bore_mm": 110,
///   "sdr": 11.0,
///   "length_m": 30.0,
///   "price_per_kg": 2.0,
///   "joint_price": 50.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeCostInput {
    pub material: ThermoplasticMaterial,
    /// Nominal size; for HDPE and PVC-U this is the outside diameter
    pub nominal_bore_mm: u32,
    pub sdr: f64,
    pub length_m: f64,
    pub price_per_kg: f64,
    /// Price of one butt weld or cement joint
    pub joint_price: f64,
}

impl PipeCostInput {
    pub fn validate(&self) -> EngineResult<()> {
        if self.nominal_bore_mm == 0 {
            return Err(EngineError::invalid_input(
                "nominal_bore_mm",
                "0",
                "Nominal size must be positive",
            ));
        }
        if self.sdr <= 1.0 {
            return Err(EngineError::invalid_input(
                "sdr",
                self.sdr.to_string(),
                "SDR must be greater than 1",
            ));
        }
        if self.length_m < 0.0 {
            return Err(EngineError::invalid_input(
                "length_m",
                self.length_m.to_string(),
                "Length cannot be negative",
            ));
        }
        if self.price_per_kg < 0.0 || self.joint_price < 0.0 {
            return Err(EngineError::invalid_input(
                "price",
                format!("{} / {}", self.price_per_kg, self.joint_price),
                "Prices cannot be negative",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeCostResult {
    pub dimensions: PipeDimensions,
    pub total_weight_kg: f64,
    pub material_cost: f64,
    pub joints: JointCount,
    pub joint_cost: f64,
    pub total_cost: f64,
}

/// Supply cost request for a single fitting.
///
/// ## JSON Example
///
/// ```json
/// {
///   "material": "HDPE",
///   "fitting_code": "segmented_90_elbow_3",
///   "nominal_bore_mm": 160,
///   "price_per_kg": 40.0,
///   "per_joint_price": 150.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittingCostInput {
    pub material: ThermoplasticMaterial,
    pub fitting_code: String,
    pub nominal_bore_mm: u32,
    pub price_per_kg: f64,
    pub per_joint_price: f64,
}

impl FittingCostInput {
    pub fn validate(&self) -> EngineResult<()> {
        if self.nominal_bore_mm == 0 {
            return Err(EngineError::invalid_input(
                "nominal_bore_mm",
                "0",
                "Nominal size must be positive",
            ));
        }
        if self.price_per_kg < 0.0 || self.per_joint_price < 0.0 {
            return Err(EngineError::invalid_input(
                "price",
                format!("{} / {}", self.price_per_kg, self.per_joint_price),
                "Prices cannot be negative",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittingCostResult {
    pub fitting_code: String,
    pub weight_kg: f64,
    /// True when no catalogued weight exists and the pipe-equivalent estimate was used
    pub weight_estimated: bool,
    pub material_cost: f64,
    pub joins: u32,
    pub join_cost: f64,
    pub total_cost: f64,
}

// ============================================================================
// Calculator
// ============================================================================

/// Table-backed thermoplastic calculator.
pub struct ThermoplasticCalculator<'a> {
    store: &'a ReferenceDataStore,
    config: &'a ThermoplasticConfig,
}

impl<'a> ThermoplasticCalculator<'a> {
    pub fn new(store: &'a ReferenceDataStore, config: &'a ThermoplasticConfig) -> Self {
        ThermoplasticCalculator { store, config }
    }

    pub fn density(&self, material: ThermoplasticMaterial) -> f64 {
        match material {
            ThermoplasticMaterial::Hdpe => self.config.hdpe_density_kg_m3,
            ThermoplasticMaterial::PvcU => self.config.pvc_density_kg_m3,
        }
    }

    /// Dimensions from the table when catalogued, else from `OD / SDR`.
    ///
    /// Mass per metre always uses the configured density.
    pub fn pipe_dimensions(&self, material: ThermoplasticMaterial, nominal_bore_mm: u32, sdr: f64) -> PipeDimensions {
        let density = self.density(material);

        if let Some(row) = self.store.thermoplastic(material, nominal_bore_mm, sdr) {
            return PipeDimensions {
                material,
                sdr: row.sdr,
                outer_diameter_mm: row.outer_diameter_mm,
                wall_thickness_mm: row.wall_thickness_mm,
                inner_diameter_mm: row.inner_diameter_mm,
                weight_per_meter_kg: pipe_weight_per_meter(row.outer_diameter_mm, row.inner_diameter_mm, density),
                pressure_rating_bar: row.pressure_rating_bar,
                source: DimensionSource::Table,
            };
        }

        let outer = nominal_bore_mm as f64;
        let wall = wall_thickness(outer, sdr);
        let inner = inner_diameter(outer, wall);
        let rating = match material {
            ThermoplasticMaterial::Hdpe => pressure_rating(sdr, PolyethyleneGrade::default(), self.config.design_coefficient),
            ThermoplasticMaterial::PvcU => pvc_pn_for_sdr(sdr).unwrap_or_default(),
        };
        PipeDimensions {
            material,
            sdr,
            outer_diameter_mm: outer,
            wall_thickness_mm: wall,
            inner_diameter_mm: inner,
            weight_per_meter_kg: pipe_weight_per_meter(outer, inner, density),
            pressure_rating_bar: rating,
            source: DimensionSource::Formula,
        }
    }

    pub fn wall_thickness(&self, material: ThermoplasticMaterial, nominal_bore_mm: u32, sdr: f64) -> f64 {
        self.pipe_dimensions(material, nominal_bore_mm, sdr).wall_thickness_mm
    }

    /// Wall for a pipe known only by OD and SDR.
    ///
    /// The HDPE table is tried first, then PVC-U, then `OD / SDR`. Catalogued
    /// walls are the standard's minimum and can sit above the plain ratio.
    pub fn wall_thickness_for_outer_diameter(&self, outer_diameter_mm: f64, sdr: f64) -> (f64, DimensionSource) {
        [ThermoplasticMaterial::Hdpe, ThermoplasticMaterial::PvcU]
            .into_iter()
            .find_map(|material| self.store.thermoplastic_by_outer_diameter(material, outer_diameter_mm, sdr))
            .map(|row| (row.wall_thickness_mm, DimensionSource::Table))
            .unwrap_or_else(|| (wall_thickness(outer_diameter_mm, sdr), DimensionSource::Formula))
    }

    pub fn recommended_sdr(&self, target_bar: f64, grade: PolyethyleneGrade) -> f64 {
        recommended_sdr(target_bar, grade, self.config.design_coefficient, self.config.default_sdr)
    }

    /// Material plus joint cost for a run supplied in standard lengths.
    pub fn pipe_cost(&self, input: &PipeCostInput) -> EngineResult<PipeCostResult> {
        input.validate()?;

        let dimensions = self.pipe_dimensions(input.material, input.nominal_bore_mm, input.sdr);
        let total_weight = round_to(dimensions.weight_per_meter_kg * input.length_m, 2);
        let material_cost = round_to(total_weight * input.price_per_kg, 2);
        let joints = calculate_joint_count(input.length_m, self.config.standard_length_m);
        let joint_cost = round_to(joints.joint_count as f64 * input.joint_price, 2);

        Ok(PipeCostResult {
            dimensions,
            total_weight_kg: total_weight,
            material_cost,
            joints,
            joint_cost,
            total_cost: round_to(material_cost + joint_cost, 2),
        })
    }

    /// Material plus join cost for one fitting.
    ///
    /// Molded HDPE fittings carry no joins, fabricated ones their internal
    /// welds, PVC-U its cement joints. An uncatalogued fitting or size is
    /// weighed as one OD-length of pipe at the default SDR.
    pub fn fitting_cost(&self, input: &FittingCostInput) -> EngineResult<FittingCostResult> {
        input.validate()?;

        let fitting = self.store.fitting_type(input.material, &input.fitting_code);
        let catalogued = fitting.and_then(|f| self.store.fitting_weight(f.id, input.nominal_bore_mm));
        let (weight, estimated) = match catalogued {
            Some(weight) => (weight, false),
            None => (self.equivalent_pipe_weight(input.material, input.nominal_bore_mm), true),
        };
        let joins = fitting.map(|f| f.billable_joins()).unwrap_or(0);

        let material_cost = round_to(weight * input.price_per_kg, 2);
        let join_cost = round_to(joins as f64 * input.per_joint_price, 2);

        Ok(FittingCostResult {
            fitting_code: input.fitting_code.clone(),
            weight_kg: weight,
            weight_estimated: estimated,
            material_cost,
            joins,
            join_cost,
            total_cost: round_to(material_cost + join_cost, 2),
        })
    }

    fn equivalent_pipe_weight(&self, material: ThermoplasticMaterial, nominal_bore_mm: u32) -> f64 {
        let dims = self.pipe_dimensions(material, nominal_bore_mm, self.config.default_sdr);
        round_to(dims.weight_per_meter_kg * dims.outer_diameter_mm / 1000.0, 3)
    }
}
