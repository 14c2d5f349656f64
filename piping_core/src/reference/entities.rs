//! Reference Data Rows
//!
//! Row types for every canonical table. Rows carry sequential surrogate ids
//! assigned by [`ReferenceTables`](super::tables::ReferenceTables); natural
//! keys are documented on each type and enforced by the upsert methods.

use serde::{Deserialize, Serialize};

/// Surrogate row identifier, assigned per table in insertion order.
pub type RowId = u32;

/// Flange type codes that denote a blind (blank) flange.
pub const BLIND_TYPE_CODES: [&str; 3] = ["/8", "8", "BL"];

// ============================================================================
// Flange Catalog
// ============================================================================

/// A governing flange standard. Natural key: `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standard {
    pub id: RowId,
    pub code: String,
}

/// A pressure class within a standard. Natural key: `(standard_id, designation)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureClass {
    pub id: RowId,
    pub standard_id: RowId,
    /// Standard-specific designation: `"150"`, `"PN16"`, `"1000/3"`, `"T/D"`
    pub designation: String,
}

/// Shared flange type catalog entry. Natural key: `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlangeType {
    pub id: RowId,
    /// `/1` .. `/8`
    pub code: String,
    pub name: String,
    /// Standard whose type catalog this entry belongs to
    pub standard_reference: String,
}

impl FlangeType {
    pub fn is_blind(&self) -> bool {
        BLIND_TYPE_CODES.contains(&self.code.as_str())
    }
}

/// Canonical NB key with its reference outside diameter. Natural key: `nominal_diameter_mm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominalOutsideDiameter {
    pub id: RowId,
    pub nominal_diameter_mm: u32,
    pub outside_diameter_mm: f64,
}

/// The central fact table.
///
/// Natural key: `(nominal_outside_diameter_id, standard_id, pressure_class_id, flange_type_id)`.
/// `flange_type_id` is `None` for standards that do not subtype by flange type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlangeDimension {
    pub id: RowId,
    pub nominal_outside_diameter_id: RowId,
    pub standard_id: RowId,
    pub pressure_class_id: RowId,
    pub flange_type_id: Option<RowId>,
    /// Flange outside diameter (D), mm
    pub d_outer: f64,
    /// Flange thickness, mm
    pub b: f64,
    /// Raised face diameter, mm
    pub d4: f64,
    /// Raised face height, mm
    pub f: f64,
    pub num_holes: u32,
    /// Bolt hole diameter, mm
    pub d1: f64,
    pub bolt_id: Option<RowId>,
    /// Pitch circle diameter, mm
    pub pcd: f64,
    pub mass_kg: f64,
}

/// Geometry and mass supplied to loaders, before keys are resolved to ids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlangeGeometry {
    pub d_outer: f64,
    pub b: f64,
    pub d4: f64,
    pub f: f64,
    pub num_holes: u32,
    pub d1: f64,
    pub pcd: f64,
    pub mass_kg: f64,
}

// ============================================================================
// Fasteners
// ============================================================================

/// Natural key: `designation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bolt {
    pub id: RowId,
    /// Thread designation, e.g. `"M16"`
    pub designation: String,
    pub grade: String,
    pub material: String,
    pub head_style: String,
    pub thread_type: String,
}

/// Natural key: `(bolt_id, length_mm)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltMass {
    pub id: RowId,
    pub bolt_id: RowId,
    pub length_mm: u32,
    pub mass_kg: f64,
}

/// Natural key: `(bolt_id, grade, nut_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutMass {
    pub id: RowId,
    pub bolt_id: RowId,
    pub mass_kg: f64,
    pub grade: String,
    pub nut_type: String,
}

/// Natural key: `(designation, specification)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Washer {
    pub id: RowId,
    pub designation: String,
    pub specification: String,
    pub inner_diameter_mm: f64,
    pub outer_diameter_mm: f64,
    pub thickness_mm: f64,
    pub mass_kg: f64,
    pub material: String,
}

/// Bolting specs per material group. Natural key: `material_group`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltingMaterialGroup {
    pub material_group: String,
    pub stud_spec: String,
    pub machine_bolt_spec: String,
    pub nut_spec: String,
    pub washer_spec: String,
}

/// One bolt-nut-washer set per hole. Natural key: `(pressure_class_key, nominal_bore_mm)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BnwSet {
    /// Banded pressure-class key (`PN16`, `Class 300`, ...)
    pub pressure_class_key: String,
    pub nominal_bore_mm: u32,
    /// e.g. `"M20x90"`
    pub bolt_size: String,
    /// Bolt + nut + washer mass for one hole
    pub weight_per_hole_kg: f64,
    pub holes_per_flange: u32,
}

/// Bolt holes per flange for a banded pressure class.
/// Natural key: `(pressure_class_key, nominal_bore_mm)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltHoleCount {
    pub pressure_class_key: String,
    pub nominal_bore_mm: u32,
    pub holes: u32,
}

/// Blank flange mass by banded pressure class. Natural key: `(pressure_class_key, nominal_bore_mm)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlankFlangeWeight {
    pub pressure_class_key: String,
    pub nominal_bore_mm: u32,
    pub mass_kg: f64,
}

// ============================================================================
// Gaskets
// ============================================================================

/// Gasket construction inferred from a free-text gasket code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GasketKind {
    SpiralWound,
    RingTypeJoint,
    Ptfe,
    Graphite,
    /// Compressed asbestos-free fibre
    Caf,
    Rubber,
}

impl GasketKind {
    pub const ALL: [GasketKind; 6] = [
        GasketKind::SpiralWound,
        GasketKind::RingTypeJoint,
        GasketKind::Ptfe,
        GasketKind::Graphite,
        GasketKind::Caf,
        GasketKind::Rubber,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            GasketKind::SpiralWound => "Spiral Wound",
            GasketKind::RingTypeJoint => "Ring Type Joint",
            GasketKind::Ptfe => "PTFE",
            GasketKind::Graphite => "Graphite",
            GasketKind::Caf => "Compressed Asbestos-Free",
            GasketKind::Rubber => "Rubber",
        }
    }
}

impl std::fmt::Display for GasketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Gasket mass per construction for one NB. Natural key: `nominal_bore_mm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasketWeight {
    pub nominal_bore_mm: u32,
    pub spiral_wound: f64,
    pub rtj: f64,
    pub ptfe: f64,
    pub graphite: f64,
    pub caf: f64,
    pub rubber: f64,
}

impl GasketWeight {
    pub fn mass_for(&self, kind: GasketKind) -> f64 {
        match kind {
            GasketKind::SpiralWound => self.spiral_wound,
            GasketKind::RingTypeJoint => self.rtj,
            GasketKind::Ptfe => self.ptfe,
            GasketKind::Graphite => self.graphite,
            GasketKind::Caf => self.caf,
            GasketKind::Rubber => self.rubber,
        }
    }
}

// ============================================================================
// Pressure-Temperature Ratings
// ============================================================================

/// Natural key: `(pressure_class_id, material_group, temperature_celsius)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtRating {
    pub id: RowId,
    pub pressure_class_id: RowId,
    pub material_group: String,
    pub temperature_celsius: i32,
    pub max_pressure_bar: f64,
}

// ============================================================================
// Thermoplastics
// ============================================================================

/// Thermoplastic pipe material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThermoplasticMaterial {
    #[serde(rename = "HDPE")]
    Hdpe,
    #[serde(rename = "PVC-U")]
    PvcU,
}

impl ThermoplasticMaterial {
    pub const ALL: [ThermoplasticMaterial; 2] = [ThermoplasticMaterial::Hdpe, ThermoplasticMaterial::PvcU];

    /// Parse a material code, case-insensitive (`"hdpe"`, `"PE100"`, `"PVC"`, `"uPVC"`).
    pub fn from_code(code: &str) -> Option<Self> {
        let upper = code.trim().to_uppercase();
        if upper.starts_with("HDPE") || upper.starts_with("PE") {
            Some(ThermoplasticMaterial::Hdpe)
        } else if upper.contains("PVC") {
            Some(ThermoplasticMaterial::PvcU)
        } else {
            None
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ThermoplasticMaterial::Hdpe => "HDPE",
            ThermoplasticMaterial::PvcU => "PVC-U",
        }
    }
}

impl std::fmt::Display for ThermoplasticMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Tabulated pipe dimension. Natural key: `(material, nominal_bore_mm, sdr)`.
///
/// For both HDPE and PVC-U the nominal size is the outside diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermoplasticSpecification {
    pub material: ThermoplasticMaterial,
    pub nominal_bore_mm: u32,
    pub sdr: f64,
    pub outer_diameter_mm: f64,
    pub wall_thickness_mm: f64,
    pub inner_diameter_mm: f64,
    pub weight_per_meter_kg: f64,
    pub pressure_rating_bar: f64,
    pub material_grade: String,
}

/// Natural key: `(material, code)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittingType {
    pub id: RowId,
    pub material: ThermoplasticMaterial,
    pub code: String,
    pub name: String,
    /// Butt-fusion welds inside a fabricated fitting
    pub num_welds: u32,
    /// Solvent-cement joints (PVC-U)
    pub num_joints: u32,
    pub is_molded: bool,
    pub is_fabricated: bool,
    pub category: String,
}

impl FittingType {
    /// Number of priced joins: zero for molded HDPE, the weld count for
    /// fabricated HDPE, the cement joint count for PVC-U.
    pub fn billable_joins(&self) -> u32 {
        match self.material {
            ThermoplasticMaterial::Hdpe if self.is_molded => 0,
            ThermoplasticMaterial::Hdpe => self.num_welds,
            ThermoplasticMaterial::PvcU => self.num_joints,
        }
    }
}

/// Natural key: `(fitting_type_id, nominal_bore_mm)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittingWeight {
    pub id: RowId,
    pub fitting_type_id: RowId,
    pub nominal_bore_mm: u32,
    pub weight_kg: f64,
}

/// Key form of an SDR value: tenths, so 13.6 and 7.4 stay exact.
pub fn sdr_key(sdr: f64) -> u32 {
    (sdr * 10.0).round() as u32
}

/// Key form of a diameter in mm, in tenths.
pub fn diameter_key(diameter_mm: f64) -> u32 {
    (diameter_mm * 10.0).round() as u32
}
