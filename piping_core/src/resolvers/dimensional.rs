//! # Dimensional Resolver
//!
//! Flange mass and geometry by nominal bore, pressure class, standard and
//! flange type, with tiered relaxation so a quote line always gets a number.
//!
//! ## Resolution Tiers
//!
//! | Tier | Key |
//! |------|-----|
//! | 1 | `(nb, standard, class, type)` |
//! | 2 | `(nb, class, type)`, any standard |
//! | 3 | `(nb, class)`, any standard and type |
//! | 4 | size band: <100 → 5 kg, <200 → 12, <400 → 40, <600 → 80, else 150 |
//!
//! Each tier tries the class as spelled first, then its equivalence key, so
//! `"PN16"` also finds BS 4504 `"16/3"` and SABS 1123 `"1600/3"` rows.
//! Among several candidates the lowest row id wins.
//!
//! ## Example
//!
//! ```rust
//! use piping_core::reference::builtin_store;
//! use piping_core::resolvers::dimensional::flange_weight;
//!
//! let store = builtin_store();
//! assert_eq!(flange_weight(&store, 300, "PN16", Some("BS 4504"), "/2"), 70.0);
//! // Nothing catalogued at 275 NB
//! assert_eq!(flange_weight(&store, 275, "PN16", None, "/2"), 40.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::reference::entities::FlangeType;
use crate::reference::keys::{leading_integer, normalize_pressure_class};
use crate::reference::store::{FlangeRecord, ReferenceDataStore};

/// Which tier produced a flange mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlangeWeightTier {
    Exact,
    AnyStandard,
    AnyType,
    SizeBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlangeWeight {
    pub mass_kg: f64,
    pub tier: FlangeWeightTier,
}

/// Banded default mass by NB. Non-decreasing in NB.
pub fn size_band_flange_weight(nominal_bore_mm: u32) -> f64 {
    match nominal_bore_mm {
        0..=99 => 5.0,
        100..=199 => 12.0,
        200..=399 => 40.0,
        400..=599 => 80.0,
        _ => 150.0,
    }
}

fn find_record<'a>(
    store: &'a ReferenceDataStore,
    nominal_bore_mm: u32,
    pressure_class: &str,
    standard_code: Option<&str>,
    flange_type_code: &str,
) -> Option<(&'a FlangeRecord, FlangeWeightTier)> {
    standard_code
        .and_then(|standard| store.flange_exact(nominal_bore_mm, standard, pressure_class, flange_type_code))
        .map(|r| (r, FlangeWeightTier::Exact))
        .or_else(|| {
            store
                .flange_any_standard(nominal_bore_mm, pressure_class, flange_type_code)
                .map(|r| (r, FlangeWeightTier::AnyStandard))
        })
        .or_else(|| {
            store
                .flange_any_type(nominal_bore_mm, pressure_class)
                .map(|r| (r, FlangeWeightTier::AnyType))
        })
}

/// Flange mass together with the tier that supplied it.
pub fn resolve_flange_weight(
    store: &ReferenceDataStore,
    nominal_bore_mm: u32,
    pressure_class: &str,
    standard_code: Option<&str>,
    flange_type_code: &str,
) -> FlangeWeight {
    match find_record(store, nominal_bore_mm, pressure_class, standard_code, flange_type_code) {
        Some((record, tier)) => FlangeWeight {
            mass_kg: record.mass_kg,
            tier,
        },
        None => {
            trace!(nb = nominal_bore_mm, class = pressure_class, "no flange row, using size band");
            FlangeWeight {
                mass_kg: size_band_flange_weight(nominal_bore_mm),
                tier: FlangeWeightTier::SizeBand,
            }
        }
    }
}

/// Flange mass in kg. Never fails; see the module docs for the tiers.
pub fn flange_weight(
    store: &ReferenceDataStore,
    nominal_bore_mm: u32,
    pressure_class: &str,
    standard_code: Option<&str>,
    flange_type_code: &str,
) -> f64 {
    resolve_flange_weight(store, nominal_bore_mm, pressure_class, standard_code, flange_type_code).mass_kg
}

/// Full flange geometry via tiers 1–3.
pub fn flange_dimension(
    store: &ReferenceDataStore,
    nominal_bore_mm: u32,
    pressure_class: &str,
    standard_code: Option<&str>,
    flange_type_code: &str,
) -> Option<FlangeRecord> {
    find_record(store, nominal_bore_mm, pressure_class, standard_code, flange_type_code).map(|(r, _)| r.clone())
}

// ============================================================================
// Blank Flanges
// ============================================================================

/// Blank-weight table key. Class 300 sits with PN40 and class 150 with PN25;
/// anything unrecognised is PN16.
fn blank_weight_key(pressure_class: &str) -> &'static str {
    let compact: String = pressure_class
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if compact.contains("PN40") || compact.contains("CLASS300") {
        "PN40"
    } else if compact.contains("PN25") || compact.contains("CLASS150") {
        "PN25"
    } else if compact.contains("PN10") {
        "PN10"
    } else {
        "PN16"
    }
}

/// Blank (blind) flange mass in kg.
///
/// A catalogued blind-type row wins, then the banded blank-weight table,
/// then `nb × 0.15`.
pub fn blank_flange_weight(store: &ReferenceDataStore, nominal_bore_mm: u32, pressure_class: &str) -> f64 {
    if let Some(record) = store.blind_flange(nominal_bore_mm, pressure_class) {
        return record.mass_kg;
    }
    store
        .blank_flange_weight(blank_weight_key(pressure_class), nominal_bore_mm)
        .unwrap_or(nominal_bore_mm as f64 * 0.15)
}

const SABS_RATINGS_KPA: [u32; 5] = [600, 1000, 1600, 2500, 4000];

/// PN-equivalent blank class for a SABS 1123 table designation.
///
/// The leading kPa figure is snapped to the nearest catalogued rating
/// (ties go to the lower one); unparseable text is PN16.
pub fn sans_blank_class(table_designation: &str) -> &'static str {
    let Some(kpa) = leading_integer(table_designation) else {
        return "PN16";
    };
    let nearest = SABS_RATINGS_KPA
        .iter()
        .copied()
        .min_by_key(|rating| rating.abs_diff(kpa))
        .unwrap_or(1600);
    match nearest {
        0..=1000 => "PN10",
        1001..=1600 => "PN16",
        1601..=2500 => "PN25",
        _ => "PN40",
    }
}

/// Blank flange mass for a SABS 1123 table designation such as `"1000/3"`.
pub fn sans_blank_flange_weight(store: &ReferenceDataStore, nominal_bore_mm: u32, table_designation: &str) -> f64 {
    blank_flange_weight(store, nominal_bore_mm, sans_blank_class(table_designation))
}

/// Coating areas of one blank flange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlankFlangeSurfaceArea {
    /// One face plus the rim
    pub external_m2: f64,
    /// Wetted face
    pub internal_m2: f64,
}

/// Typical blank flange OD (mm) by NB.
const BLANK_FLANGE_OD: [(u32, f64); 18] = [
    (50, 165.0),
    (65, 185.0),
    (80, 200.0),
    (100, 220.0),
    (125, 250.0),
    (150, 285.0),
    (200, 340.0),
    (250, 395.0),
    (300, 445.0),
    (350, 505.0),
    (400, 565.0),
    (450, 615.0),
    (500, 670.0),
    (600, 780.0),
    (700, 885.0),
    (750, 940.0),
    (800, 1015.0),
    (900, 1115.0),
];

/// Surface area for coating a blank flange.
///
/// Uncatalogued sizes use `OD = 1.7 × nb`; thickness is `max(20, 0.08 × nb)` mm.
pub fn blank_flange_surface_area(nominal_bore_mm: u32) -> BlankFlangeSurfaceArea {
    let nb = nominal_bore_mm as f64;
    let od_mm = BLANK_FLANGE_OD
        .iter()
        .find(|(size, _)| *size == nominal_bore_mm)
        .map(|(_, od)| *od)
        .unwrap_or(nb * 1.7);
    let thickness_mm = (nb * 0.08).max(20.0);

    let face = std::f64::consts::PI * (od_mm / 2000.0).powi(2);
    let rim = std::f64::consts::PI * (od_mm / 1000.0) * (thickness_mm / 1000.0);
    BlankFlangeSurfaceArea {
        external_m2: face + rim,
        internal_m2: face,
    }
}

// ============================================================================
// Catalog Lookups
// ============================================================================

/// Standards that present another standard's flange type catalog.
const TYPE_CATALOG_ALIASES: [(&str, &str); 5] = [
    ("SABS 1123", "ASME B16.47"),
    ("BS 4504", "ASME B16.47"),
    ("BS 10", "ASME B16.47"),
    ("ASME B16.47A", "ASME B16.47"),
    ("ASME B16.47B", "ASME B16.47"),
];

/// Type catalog a standard's flanges are typed against.
pub fn catalog_standard_for(standard_code: &str) -> &str {
    let code = standard_code.trim();
    TYPE_CATALOG_ALIASES
        .iter()
        .find(|(alias, _)| *alias == code)
        .map(|(_, catalog)| *catalog)
        .unwrap_or(code)
}

/// Flange types offered for a standard, in catalog order.
pub fn flange_types_for_standard<'a>(store: &'a ReferenceDataStore, standard_code: &str) -> Vec<&'a FlangeType> {
    let catalog = catalog_standard_for(standard_code);
    store
        .flange_types()
        .iter()
        .filter(|t| t.standard_reference == catalog)
        .collect()
}

/// Bolt holes per flange; 8 when the class or size is not tabulated.
pub fn bolt_holes_per_flange(store: &ReferenceDataStore, nominal_bore_mm: u32, pressure_class: &str) -> u32 {
    store
        .bolt_holes(&normalize_pressure_class(pressure_class), nominal_bore_mm)
        .unwrap_or(8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::builtin_store;

    #[test]
    fn test_size_bands() {
        assert_eq!(size_band_flange_weight(15), 5.0);
        assert_eq!(size_band_flange_weight(99), 5.0);
        assert_eq!(size_band_flange_weight(100), 12.0);
        assert_eq!(size_band_flange_weight(399), 40.0);
        assert_eq!(size_band_flange_weight(500), 80.0);
        assert_eq!(size_band_flange_weight(600), 150.0);
    }

    #[test]
    fn test_corrected_bs4504_weld_neck() {
        let store = builtin_store();
        let hit = resolve_flange_weight(&store, 300, "PN16", Some("BS 4504"), "/2");
        assert_eq!(hit.mass_kg, 70.0);
        assert_eq!(hit.tier, FlangeWeightTier::Exact);
    }

    #[test]
    fn test_tiers_relax_in_order() {
        let store = builtin_store();
        // Unknown standard drops to any-standard
        let relaxed = resolve_flange_weight(&store, 300, "PN16", Some("DIN 2633"), "/2");
        assert_eq!(relaxed.tier, FlangeWeightTier::AnyStandard);
        assert_eq!(relaxed.mass_kg, 70.0);

        // No /5 rows at all, so any type
        let any_type = resolve_flange_weight(&store, 300, "PN16", Some("BS 4504"), "/5");
        assert_eq!(any_type.tier, FlangeWeightTier::AnyType);

        let banded = resolve_flange_weight(&store, 275, "PN16", Some("BS 4504"), "/2");
        assert_eq!(banded.tier, FlangeWeightTier::SizeBand);
        assert_eq!(banded.mass_kg, 40.0);
    }

    #[test]
    fn test_sabs_designation_hits_exact() {
        let store = builtin_store();
        assert_eq!(flange_weight(&store, 300, "1600/2", Some("SABS 1123"), "/2"), 48.0);
    }

    #[test]
    fn test_flange_dimension_carries_geometry() {
        let store = builtin_store();
        let record = flange_dimension(&store, 300, "PN16", Some("BS 4504"), "/2").unwrap();
        assert_eq!(record.standard, "BS 4504");
        assert!(record.num_holes > 0);
        assert!(record.pcd > 0.0);
        assert!(flange_dimension(&store, 275, "PN16", None, "/2").is_none());
    }

    #[test]
    fn test_blank_weight_key() {
        assert_eq!(blank_weight_key("Class 300"), "PN40");
        assert_eq!(blank_weight_key("class150"), "PN25");
        assert_eq!(blank_weight_key("PN 10"), "PN10");
        assert_eq!(blank_weight_key("T/D"), "PN16");
    }

    #[test]
    fn test_blank_flange_fallbacks() {
        let store = builtin_store();
        // Banded blank table
        assert_eq!(blank_flange_weight(&store, 150, "PN25"), 17.6);
        // Nothing for 1200 NB
        assert_eq!(blank_flange_weight(&store, 1200, "PN25"), 180.0);
    }

    #[test]
    fn test_sans_blank_class() {
        assert_eq!(sans_blank_class("600kPa/8"), "PN10");
        assert_eq!(sans_blank_class("1000/3"), "PN10");
        assert_eq!(sans_blank_class("1500/3"), "PN16");
        assert_eq!(sans_blank_class("2500/8"), "PN25");
        assert_eq!(sans_blank_class("6400/8"), "PN40");
        assert_eq!(sans_blank_class("kPa"), "PN16");
        assert_eq!(sans_blank_class(""), "PN16");
    }

    #[test]
    fn test_sans_blank_matches_blank_for_same_class() {
        let store = builtin_store();
        assert_eq!(
            sans_blank_flange_weight(&store, 200, "2500/8"),
            blank_flange_weight(&store, 200, "PN25")
        );
    }

    #[test]
    fn test_surface_area() {
        let area = blank_flange_surface_area(100);
        let face = std::f64::consts::PI * 0.11f64.powi(2);
        assert!((area.internal_m2 - face).abs() < 1e-12);
        assert!((area.external_m2 - (face + std::f64::consts::PI * 0.22 * 0.02)).abs() < 1e-12);

        // Uncatalogued NB: OD 1.7 x nb, thickness 0.08 x nb
        let big = blank_flange_surface_area(1000);
        assert!((big.internal_m2 - std::f64::consts::PI * 0.85f64.powi(2)).abs() < 1e-9);
    }

    #[test]
    fn test_type_catalog_alias() {
        let store = builtin_store();
        assert_eq!(catalog_standard_for("SABS 1123"), "ASME B16.47");
        assert_eq!(catalog_standard_for("ASME B16.5"), "ASME B16.5");

        let sabs: Vec<&str> = flange_types_for_standard(&store, "SABS 1123").iter().map(|t| t.code.as_str()).collect();
        assert_eq!(sabs, vec!["/1", "/2", "/3", "/4", "/5", "/6", "/7", "/8"]);
        let asme: Vec<&str> = flange_types_for_standard(&store, "ASME B16.5").iter().map(|t| t.code.as_str()).collect();
        assert_eq!(asme, vec!["WN", "SO", "SW", "TH", "LJ", "BL"]);
    }

    #[test]
    fn test_bolt_holes_default() {
        let store = builtin_store();
        assert_eq!(bolt_holes_per_flange(&store, 200, "PN16"), 12);
        assert_eq!(bolt_holes_per_flange(&store, 200, "T/D"), 8);
        assert_eq!(bolt_holes_per_flange(&store, 275, "PN16"), 8);
    }
}
