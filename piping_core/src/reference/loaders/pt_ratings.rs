//! Pressure-temperature rating loader.
//!
//! - ASME B16.5: tabulated curves for material groups 1.1 and 2.1.
//! - ASME B16.47 A/B: native group 1.1 curves for classes 150/300/600/900.
//!   Other classes are cross-mapped to B16.5 at query time.
//! - BS 4504: nominal PN times a per-material derating factor.
//! - SABS 1123: nominal kPa/100 with a carbon-steel derating, computed once
//!   per rating and copied to every flange-type variant of that rating.
//!
//! `down` removes only the BS 4504 curves. The other parts upsert over
//! whatever was there before and cannot be told apart from earlier data.

use std::collections::BTreeMap;

use super::Loader;
use crate::errors::EngineResult;
use crate::reference::entities::RowId;
use crate::reference::keys::{leading_integer, pressure_class_key};
use crate::reference::tables::ReferenceTables;
use crate::units::round_to;

pub const CARBON_STEEL: &str = "Carbon Steel";
pub const GROUP_1_1: &str = "Carbon Steel A105 (Group 1.1)";
pub const GROUP_2_1: &str = "Stainless Steel 304 (Group 2.1)";
pub const GROUP_2_2: &str = "Stainless Steel 316 (Group 2.2)";

// ============================================================================
// ASME B16.5
// ============================================================================

const B16_5_TEMPS: [i32; 17] = [-29, 38, 50, 100, 150, 200, 250, 300, 325, 350, 375, 400, 425, 450, 475, 500, 538];

/// `(material group, class, bar at each of B16_5_TEMPS)`; shorter rows stop early.
const B16_5_CURVES: [(&str, &str, &[f64]); 5] = [
    (
        GROUP_1_1,
        "150",
        &[19.6, 19.6, 19.2, 17.7, 15.8, 13.8, 12.1, 10.2, 9.3, 8.4, 7.4, 6.5, 5.5, 4.6, 3.7, 2.8, 1.4],
    ),
    (
        GROUP_1_1,
        "300",
        &[51.1, 51.1, 50.1, 46.6, 45.1, 43.8, 41.9, 39.8, 38.7, 37.6, 36.4, 34.7, 28.8, 23.0, 17.4, 11.8, 5.9],
    ),
    (
        GROUP_1_1,
        "600",
        &[102.1, 102.1, 100.2, 93.2, 90.2, 87.6, 83.9, 79.6, 77.4, 75.1, 72.7, 69.4],
    ),
    (
        GROUP_2_1,
        "150",
        &[19.0, 19.0, 18.4, 15.7, 14.2, 13.2, 12.1, 10.2, 9.3, 8.4, 7.4, 6.5, 5.5, 4.6, 3.7, 2.8, 1.4],
    ),
    (
        GROUP_2_1,
        "300",
        &[49.6, 49.6, 48.1, 40.9, 37.0, 34.5, 32.5, 30.9, 30.2, 29.6, 29.0, 28.4, 28.0, 27.4, 26.9, 26.5, 25.2],
    ),
];

// ============================================================================
// ASME B16.47
// ============================================================================

const B16_47_TEMPS: [i32; 12] = [-29, 38, 93, 149, 204, 260, 316, 343, 371, 399, 427, 454];

const B16_47_CURVES: [(&str, [f64; 12]); 4] = [
    ("150", [19.6, 19.6, 18.0, 15.8, 13.8, 12.1, 10.2, 8.8, 7.4, 6.1, 4.9, 3.9]),
    ("300", [51.1, 51.1, 47.6, 45.1, 42.1, 37.2, 32.7, 28.1, 23.8, 19.6, 15.7, 12.4]),
    ("600", [102.1, 102.1, 95.1, 90.2, 84.1, 74.5, 65.5, 56.2, 47.6, 39.3, 31.4, 24.8]),
    ("900", [153.2, 153.2, 142.7, 135.4, 126.2, 111.7, 98.2, 84.3, 71.4, 58.9, 47.1, 37.2]),
];

// ============================================================================
// BS 4504 and SABS 1123 derating
// ============================================================================

const BS4504_CARBON: [(i32, f64); 10] = [
    (-29, 1.0),
    (20, 1.0),
    (50, 1.0),
    (100, 0.92),
    (150, 0.95),
    (200, 0.91),
    (250, 0.83),
    (300, 0.76),
    (350, 0.71),
    (400, 0.64),
];

const BS4504_SS304: [(i32, f64); 12] = [
    (-29, 1.0),
    (20, 1.0),
    (50, 1.0),
    (100, 1.0),
    (150, 0.97),
    (200, 0.93),
    (250, 0.88),
    (300, 0.84),
    (350, 0.8),
    (400, 0.76),
    (450, 0.69),
    (500, 0.6),
];

const BS4504_SS316: [(i32, f64); 12] = [
    (-29, 1.0),
    (20, 1.0),
    (50, 1.0),
    (100, 1.0),
    (150, 0.98),
    (200, 0.94),
    (250, 0.9),
    (300, 0.86),
    (350, 0.82),
    (400, 0.78),
    (450, 0.72),
    (500, 0.64),
];

const SABS_CARBON: [(i32, f64); 6] = [(-10, 1.0), (20, 1.0), (50, 1.0), (100, 1.0), (150, 0.93), (200, 0.85)];

/// Nominal bar for a BS 4504 designation (`"PN16"`, `"16/4"`).
fn bs4504_nominal_bar(designation: &str) -> Option<f64> {
    pressure_class_key(designation)
        .strip_prefix("PN")
        .and_then(|pn| pn.parse::<f64>().ok())
}

fn derate(tables: &mut ReferenceTables, class_id: RowId, group: &str, nominal_bar: f64, factors: &[(i32, f64)]) {
    for &(temp, factor) in factors {
        tables.upsert_pt_rating(class_id, group, temp, round_to(nominal_bar * factor, 1));
    }
}

fn classes_of(tables: &ReferenceTables, standard: &str) -> Vec<(RowId, String)> {
    let Some(standard_id) = tables.standard_id(standard) else {
        return Vec::new();
    };
    let mut classes: Vec<(RowId, String)> = tables
        .pressure_classes
        .iter()
        .filter(|pc| pc.standard_id == standard_id)
        .map(|pc| (pc.id, pc.designation.clone()))
        .collect();
    classes.sort_by_key(|(id, _)| *id);
    classes
}

pub struct PtRatings;

impl PtRatings {
    fn seed_b16_5(tables: &mut ReferenceTables) -> EngineResult<()> {
        let standard_id = tables.require_standard("ASME B16.5")?;
        for (group, designation, pressures) in B16_5_CURVES {
            let class_id = tables.upsert_pressure_class(standard_id, designation);
            for (temp, bar) in B16_5_TEMPS.iter().zip(pressures.iter()) {
                tables.upsert_pt_rating(class_id, group, *temp, *bar);
            }
        }
        Ok(())
    }

    fn seed_b16_47(tables: &mut ReferenceTables) -> EngineResult<()> {
        for standard in ["ASME B16.47A", "ASME B16.47B"] {
            let standard_id = tables.require_standard(standard)?;
            for (designation, pressures) in B16_47_CURVES {
                let class_id = tables.upsert_pressure_class(standard_id, designation);
                for (temp, bar) in B16_47_TEMPS.iter().zip(pressures.iter()) {
                    tables.upsert_pt_rating(class_id, GROUP_1_1, *temp, *bar);
                }
            }
        }
        Ok(())
    }

    fn seed_bs4504(tables: &mut ReferenceTables) {
        for (class_id, designation) in classes_of(tables, "BS 4504") {
            let Some(nominal) = bs4504_nominal_bar(&designation) else {
                continue;
            };
            derate(tables, class_id, CARBON_STEEL, nominal, &BS4504_CARBON);
            derate(tables, class_id, GROUP_1_1, nominal, &BS4504_CARBON);
            derate(tables, class_id, GROUP_2_1, nominal, &BS4504_SS304);
            derate(tables, class_id, GROUP_2_2, nominal, &BS4504_SS316);
        }
    }

    fn seed_sabs1123(tables: &mut ReferenceTables) {
        let mut by_rating: BTreeMap<u32, Vec<RowId>> = BTreeMap::new();
        for (class_id, designation) in classes_of(tables, "SABS 1123") {
            if let Some(kpa) = leading_integer(&designation) {
                by_rating.entry(kpa).or_default().push(class_id);
            }
        }

        for (kpa, class_ids) in by_rating {
            let Some((&source, variants)) = class_ids.split_first() else {
                continue;
            };
            let nominal = kpa as f64 / 100.0;
            derate(tables, source, CARBON_STEEL, nominal, &SABS_CARBON);
            derate(tables, source, GROUP_1_1, nominal, &SABS_CARBON);

            let curve: Vec<(String, i32, f64)> = tables
                .pt_ratings
                .iter()
                .filter(|r| r.pressure_class_id == source)
                .map(|r| (r.material_group.clone(), r.temperature_celsius, r.max_pressure_bar))
                .collect();
            for &variant in variants {
                for (group, temp, bar) in &curve {
                    tables.upsert_pt_rating(variant, group, *temp, *bar);
                }
            }
        }
    }
}

impl Loader for PtRatings {
    fn version(&self) -> u64 {
        500
    }

    fn name(&self) -> &'static str {
        "pt_ratings"
    }

    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        Self::seed_b16_5(tables)?;
        Self::seed_b16_47(tables)?;
        Self::seed_bs4504(tables);
        Self::seed_sabs1123(tables);
        Ok(())
    }

    fn down(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        let bs_classes: Vec<RowId> = classes_of(tables, "BS 4504").into_iter().map(|(id, _)| id).collect();
        tables.pt_ratings.retain(|r| !bs_classes.contains(&r.pressure_class_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::loaders::base_catalog::BaseCatalog;

    fn loaded() -> ReferenceTables {
        let mut tables = ReferenceTables::new();
        BaseCatalog.up(&mut tables).unwrap();
        PtRatings.up(&mut tables).unwrap();
        tables
    }

    fn rating(tables: &ReferenceTables, standard: &str, designation: &str, group: &str, temp: i32) -> Option<f64> {
        let standard_id = tables.standard_id(standard)?;
        let class_id = tables.pressure_class_id(standard_id, designation)?;
        tables
            .pt_ratings
            .iter()
            .find(|r| r.pressure_class_id == class_id && r.material_group == group && r.temperature_celsius == temp)
            .map(|r| r.max_pressure_bar)
    }

    #[test]
    fn test_b16_5_curve_values() {
        let tables = loaded();
        assert_eq!(rating(&tables, "ASME B16.5", "150", GROUP_1_1, 38), Some(19.6));
        assert_eq!(rating(&tables, "ASME B16.5", "300", GROUP_1_1, 538), Some(5.9));
        assert_eq!(rating(&tables, "ASME B16.5", "600", GROUP_1_1, 400), Some(69.4));
        assert_eq!(rating(&tables, "ASME B16.5", "600", GROUP_1_1, 425), None);
    }

    #[test]
    fn test_bs4504_derating() {
        let tables = loaded();
        assert_eq!(rating(&tables, "BS 4504", "PN16", GROUP_1_1, 20), Some(16.0));
        // 16 × 0.76
        assert_eq!(rating(&tables, "BS 4504", "PN16", GROUP_1_1, 300), Some(12.2));
        // 40 × 0.69
        assert_eq!(rating(&tables, "BS 4504", "PN40", GROUP_2_1, 450), Some(27.6));
    }

    #[test]
    fn test_sabs_variants_share_curve() {
        let tables = loaded();
        let slip_on = rating(&tables, "SABS 1123", "1600/3", GROUP_1_1, 150);
        assert_eq!(slip_on, Some(14.9));
        assert_eq!(rating(&tables, "SABS 1123", "1600/8", GROUP_1_1, 150), slip_on);
        assert_eq!(rating(&tables, "SABS 1123", "600/2", CARBON_STEEL, 200), Some(5.1));
    }

    #[test]
    fn test_b16_47_native_classes_only() {
        let tables = loaded();
        assert_eq!(rating(&tables, "ASME B16.47A", "900", GROUP_1_1, 454), Some(37.2));
        assert_eq!(rating(&tables, "ASME B16.47B", "75", GROUP_1_1, 38), None);
    }

    #[test]
    fn test_down_removes_bs4504_only() {
        let mut tables = loaded();
        PtRatings.down(&mut tables).unwrap();
        assert_eq!(rating(&tables, "BS 4504", "PN16", GROUP_1_1, 20), None);
        assert_eq!(rating(&tables, "ASME B16.5", "150", GROUP_1_1, 38), Some(19.6));
    }
}
