//! # Fastener and Gasket Resolver
//!
//! Bolt-nut-washer sets per flange and gasket masses by construction.
//!
//! ## Example
//!
//! ```rust
//! use piping_core::config::BnwDefault;
//! use piping_core::reference::builtin_store;
//! use piping_core::resolvers::fasteners::{bnw_set_info, gasket_weight};
//!
//! let store = builtin_store();
//! let set = bnw_set_info(&store, &BnwDefault::default(), 200, "PN16");
//! assert_eq!(set.bolt_size, "M20x90");
//! assert_eq!(set.num_holes, 12);
//!
//! assert!(gasket_weight(&store, "SW-CS/304", 150) > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::BnwDefault;
use crate::reference::entities::{BoltingMaterialGroup, GasketKind};
use crate::reference::keys::normalize_pressure_class;
use crate::reference::store::ReferenceDataStore;
use crate::units::round_to;

/// Bolting for one flange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BnwSetInfo {
    /// e.g. `"M20x90"`
    pub bolt_size: String,
    /// Bolt + nut + washer for one hole
    pub weight_per_hole_kg: f64,
    pub num_holes: u32,
}

impl BnwSetInfo {
    /// Bolting mass for a mating flange pair: every hole, both flanges.
    pub fn mass_for_flange_pair(&self) -> f64 {
        round_to(self.weight_per_hole_kg * self.num_holes as f64 * 2.0, 3)
    }

    /// Split `"M20x90"` into `("M20", 90)`.
    pub fn bolt_parts(&self) -> Option<(&str, u32)> {
        parse_bolt_size(&self.bolt_size)
    }
}

/// Split a bolt size like `"M20x90"` into thread designation and length.
pub fn parse_bolt_size(bolt_size: &str) -> Option<(&str, u32)> {
    let (thread, length) = bolt_size.trim().split_once(['x', 'X'])?;
    Some((thread, length.parse().ok()?))
}

/// BNW set for `(nb, pressure class)`.
///
/// The class is banded with [`normalize_pressure_class`] before lookup. A
/// miss returns the configured default set.
pub fn bnw_set_info(store: &ReferenceDataStore, default: &BnwDefault, nominal_bore_mm: u32, pressure_class: &str) -> BnwSetInfo {
    let key = normalize_pressure_class(pressure_class);
    match store.bnw_set(&key, nominal_bore_mm) {
        Some(set) => BnwSetInfo {
            bolt_size: set.bolt_size.clone(),
            weight_per_hole_kg: set.weight_per_hole_kg,
            num_holes: set.holes_per_flange,
        },
        None => BnwSetInfo {
            bolt_size: default.bolt_size.clone(),
            weight_per_hole_kg: default.weight_per_hole_kg,
            num_holes: default.num_holes,
        },
    }
}

/// Bolt + nut + washer mass for one hole, from the part tables.
///
/// `nut_grade` of `None` takes whichever nut is catalogued for the thread.
/// Returns `None` if any of the three parts is missing.
pub fn computed_bnw_weight_per_hole(
    store: &ReferenceDataStore,
    bolt_designation: &str,
    length_mm: u32,
    nut_grade: Option<&str>,
) -> Option<f64> {
    let bolt = store.bolt(bolt_designation.trim())?;
    let bolt_mass = store.bolt_mass(bolt.id, length_mm)?;
    let nut_mass = store.nut_mass(bolt.id, nut_grade)?;
    let washer = store.washer(&bolt.designation)?;
    Some(round_to(bolt_mass + nut_mass + washer.mass_kg, 3))
}

/// Stud, bolt, nut and washer specifications for a P-T material group.
pub fn bolting_materials<'a>(store: &'a ReferenceDataStore, material_group: &str) -> Option<&'a BoltingMaterialGroup> {
    store.bolting_material(material_group.trim())
}

// ============================================================================
// Gaskets
// ============================================================================

struct GasketRule {
    prefixes: &'static [&'static str],
    fragments: &'static [&'static str],
    kind: GasketKind,
}

impl GasketRule {
    fn matches(&self, text: &str) -> bool {
        self.prefixes.iter().any(|p| text.starts_with(p)) || self.fragments.iter().any(|f| text.contains(f))
    }
}

/// First matching rule wins; matching is case-sensitive.
const GASKET_RULES: [GasketRule; 6] = [
    GasketRule {
        prefixes: &["SW-"],
        fragments: &["Spiral"],
        kind: GasketKind::SpiralWound,
    },
    GasketRule {
        prefixes: &["RTJ-"],
        fragments: &[],
        kind: GasketKind::RingTypeJoint,
    },
    GasketRule {
        prefixes: &["PTFE-"],
        fragments: &["PTFE"],
        kind: GasketKind::Ptfe,
    },
    GasketRule {
        prefixes: &["Graphite-"],
        fragments: &["Graphite"],
        kind: GasketKind::Graphite,
    },
    GasketRule {
        prefixes: &["CAF-"],
        fragments: &[],
        kind: GasketKind::Caf,
    },
    GasketRule {
        prefixes: &["Rubber-"],
        fragments: &["EPDM", "NBR"],
        kind: GasketKind::Rubber,
    },
];

/// Gasket construction from a gasket code. Unrecognised codes are spiral wound.
pub fn gasket_kind(gasket_type: &str) -> GasketKind {
    GASKET_RULES
        .iter()
        .find(|rule| rule.matches(gasket_type))
        .map(|rule| rule.kind)
        .unwrap_or(GasketKind::SpiralWound)
}

/// Gasket mass in kg.
///
/// Uses the largest catalogued NB not above `nominal_bore_mm` (the smallest
/// row for anything below it). An empty table gives 0.
pub fn gasket_weight(store: &ReferenceDataStore, gasket_type: &str, nominal_bore_mm: u32) -> f64 {
    let rows = store.gasket_weights();
    let Some(first) = rows.first() else {
        return 0.0;
    };
    let row = rows
        .iter()
        .take_while(|r| r.nominal_bore_mm <= nominal_bore_mm)
        .last()
        .unwrap_or(first);
    row.mass_for(gasket_kind(gasket_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::builtin_store;
    use crate::reference::tables::ReferenceTables;

    #[test]
    fn test_bnw_hit() {
        let store = builtin_store();
        let set = bnw_set_info(&store, &BnwDefault::default(), 200, "1600/3");
        assert_eq!(set.bolt_size, "M20x90");
        assert_eq!(set.weight_per_hole_kg, 0.28);
        assert_eq!(set.num_holes, 12);
        assert_eq!(set.mass_for_flange_pair(), 6.72);
        assert_eq!(set.bolt_parts(), Some(("M20", 90)));
    }

    #[test]
    fn test_bnw_miss_uses_default() {
        let store = builtin_store();
        let set = bnw_set_info(&store, &BnwDefault::default(), 500, "PN16");
        assert_eq!(set.bolt_size, "M16x65");
        assert_eq!(set.weight_per_hole_kg, 0.18);
        assert_eq!(set.num_holes, 8);

        let custom = BnwDefault {
            num_holes: 4,
            ..BnwDefault::default()
        };
        assert_eq!(bnw_set_info(&store, &custom, 275, "PN16").num_holes, 4);
    }

    #[test]
    fn test_parse_bolt_size() {
        assert_eq!(parse_bolt_size("M24x110"), Some(("M24", 110)));
        assert_eq!(parse_bolt_size("M24X110"), Some(("M24", 110)));
        assert_eq!(parse_bolt_size("M24"), None);
        assert_eq!(parse_bolt_size("M24xlong"), None);
    }

    #[test]
    fn test_computed_weight_per_hole() {
        let store = builtin_store();
        // bolt 0.154 + nut 0.034 + washer 0.0113
        assert_eq!(computed_bnw_weight_per_hole(&store, "M16", 75, None), Some(0.199));
        assert_eq!(computed_bnw_weight_per_hole(&store, "M16", 75, Some("8")), Some(0.199));
        assert_eq!(computed_bnw_weight_per_hole(&store, "M16", 75, Some("10")), None);
        assert_eq!(computed_bnw_weight_per_hole(&store, "M16", 77, None), None);
        assert_eq!(computed_bnw_weight_per_hole(&store, "M64", 200, None), None);
    }

    #[test]
    fn test_bolting_materials() {
        let store = builtin_store();
        let group = bolting_materials(&store, "Stainless Steel 316 (Group 2.2)").unwrap();
        assert_eq!(group.stud_spec, "ASTM A193 B8M Cl.2");
        assert!(bolting_materials(&store, "Unobtainium").is_none());
    }

    #[test]
    fn test_gasket_kind_rule_order() {
        assert_eq!(gasket_kind("SW-CS/316"), GasketKind::SpiralWound);
        assert_eq!(gasket_kind("Spiral Wound 316"), GasketKind::SpiralWound);
        assert_eq!(gasket_kind("RTJ-R45"), GasketKind::RingTypeJoint);
        assert_eq!(gasket_kind("Expanded PTFE sheet"), GasketKind::Ptfe);
        assert_eq!(gasket_kind("Graphite-Tanged"), GasketKind::Graphite);
        assert_eq!(gasket_kind("CAF-3mm"), GasketKind::Caf);
        assert_eq!(gasket_kind("EPDM full face"), GasketKind::Rubber);
        // PTFE rule sits above the rubber rule
        assert_eq!(gasket_kind("Rubber-PTFE lined"), GasketKind::Ptfe);
        assert_eq!(gasket_kind("rtj-r45"), GasketKind::SpiralWound);
        assert_eq!(gasket_kind(""), GasketKind::SpiralWound);
    }

    #[test]
    fn test_gasket_nearest_lower_bucket() {
        let store = builtin_store();
        let at_50 = gasket_weight(&store, "SW-", 50);
        let at_60 = gasket_weight(&store, "SW-", 60);
        assert_eq!(at_50, 0.07);
        assert_eq!(at_60, at_50);
        // Below the smallest size
        assert_eq!(gasket_weight(&store, "RTJ-", 10), 0.045);
        assert_eq!(gasket_weight(&store, "Rubber-", 15), 0.003);
    }

    #[test]
    fn test_gasket_empty_table() {
        let store = ReferenceDataStore::from_tables(&ReferenceTables::new());
        assert_eq!(gasket_weight(&store, "SW-", 100), 0.0);
    }
}
