//! Base catalog: standards, pressure classes, flange types and the NB→OD table.

use super::Loader;
use crate::errors::EngineResult;
use crate::reference::tables::ReferenceTables;

pub const STANDARDS: [&str; 6] = [
    "ASME B16.5",
    "ASME B16.47A",
    "ASME B16.47B",
    "BS 4504",
    "BS 10",
    "SABS 1123",
];

/// SABS 1123 ratings in kPa; designations are `"{kPa}/{type}"`.
pub const SABS_1123_RATINGS_KPA: [u32; 5] = [600, 1000, 1600, 2500, 4000];

const SABS_1123_TYPE_SUFFIXES: [&str; 4] = ["1", "2", "3", "8"];

const PRESSURE_CLASSES: &[(&str, &[&str])] = &[
    ("ASME B16.5", &["150", "300", "400", "600", "900", "1500", "2500"]),
    ("ASME B16.47A", &["150", "300", "400", "600", "900"]),
    ("ASME B16.47B", &["75", "150", "300", "400", "600", "900"]),
    ("BS 4504", &["PN6", "PN10", "PN16", "PN25", "PN40", "PN64"]),
    ("BS 10", &["T/D", "T/E", "T/F", "T/H"]),
];

/// `(code, name, catalog)`. The numbered codes are the shared catalog that
/// BS, SABS and B16.47 flanges are typed against.
pub const FLANGE_TYPES: [(&str, &str, &str); 14] = [
    ("/1", "Plate", "ASME B16.47"),
    ("/2", "Weld Neck", "ASME B16.47"),
    ("/3", "Slip-On (Hubbed)", "ASME B16.47"),
    ("/4", "Threaded", "ASME B16.47"),
    ("/5", "Lapped", "ASME B16.47"),
    ("/6", "Plate Loose", "ASME B16.47"),
    ("/7", "Integral", "ASME B16.47"),
    ("/8", "Blind", "ASME B16.47"),
    ("WN", "Weld Neck", "ASME B16.5"),
    ("SO", "Slip-On", "ASME B16.5"),
    ("SW", "Socket Weld", "ASME B16.5"),
    ("TH", "Threaded", "ASME B16.5"),
    ("LJ", "Lap Joint", "ASME B16.5"),
    ("BL", "Blind", "ASME B16.5"),
];

/// Nominal bore (mm) → pipe outside diameter (mm).
pub const NB_TO_OD: [(u32, f64); 27] = [
    (15, 21.3),
    (20, 26.7),
    (25, 33.4),
    (32, 42.2),
    (40, 48.3),
    (50, 60.3),
    (65, 73.0),
    (80, 88.9),
    (100, 114.3),
    (125, 139.7),
    (150, 168.3),
    (200, 219.1),
    (250, 273.0),
    (300, 323.9),
    (350, 355.6),
    (400, 406.4),
    (450, 457.2),
    (500, 508.0),
    (600, 609.6),
    (650, 660.4),
    (700, 711.2),
    (750, 762.0),
    (800, 812.8),
    (900, 914.4),
    (1000, 1016.0),
    (1050, 1066.8),
    (1200, 1219.2),
];

fn sabs_designations() -> impl Iterator<Item = String> {
    SABS_1123_RATINGS_KPA.iter().flat_map(|kpa| {
        SABS_1123_TYPE_SUFFIXES
            .iter()
            .map(move |suffix| format!("{}/{}", kpa, suffix))
    })
}

pub struct BaseCatalog;

impl Loader for BaseCatalog {
    fn version(&self) -> u64 {
        100
    }

    fn name(&self) -> &'static str {
        "base_catalog"
    }

    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        for code in STANDARDS {
            tables.upsert_standard(code);
        }
        for (standard, designations) in PRESSURE_CLASSES {
            let standard_id = tables.require_standard(standard)?;
            for designation in designations.iter() {
                tables.upsert_pressure_class(standard_id, designation);
            }
        }
        let sabs = tables.require_standard("SABS 1123")?;
        for designation in sabs_designations() {
            tables.upsert_pressure_class(sabs, &designation);
        }
        for (code, name, catalog) in FLANGE_TYPES {
            tables.upsert_flange_type(code, name, catalog);
        }
        for (nb, od) in NB_TO_OD {
            tables.upsert_nominal_od(nb, od);
        }
        Ok(())
    }

    fn down(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        let standard_ids: Vec<_> = STANDARDS.iter().filter_map(|code| tables.standard_id(code)).collect();
        tables.pressure_classes.retain(|pc| !standard_ids.contains(&pc.standard_id));
        tables.standards.retain(|s| !STANDARDS.contains(&s.code.as_str()));
        tables
            .flange_types
            .retain(|t| !FLANGE_TYPES.iter().any(|(code, _, _)| *code == t.code));
        tables
            .nominal_outside_diameters
            .retain(|n| !NB_TO_OD.iter().any(|(nb, _)| *nb == n.nominal_diameter_mm));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_catalog_counts() {
        let mut tables = ReferenceTables::new();
        BaseCatalog.up(&mut tables).unwrap();
        assert_eq!(tables.standards.len(), STANDARDS.len());
        assert_eq!(tables.flange_types.len(), FLANGE_TYPES.len());
        assert_eq!(tables.nominal_outside_diameters.len(), NB_TO_OD.len());

        let sabs = tables.standard_id("SABS 1123").unwrap();
        assert!(tables.pressure_class_id(sabs, "1600/3").is_some());
        assert!(tables.pressure_class_id(sabs, "4000/8").is_some());
    }

    #[test]
    fn test_base_catalog_down_clears_rows() {
        let mut tables = ReferenceTables::new();
        BaseCatalog.up(&mut tables).unwrap();
        BaseCatalog.down(&mut tables).unwrap();
        assert!(tables.standards.is_empty());
        assert!(tables.pressure_classes.is_empty());
        assert!(tables.flange_types.is_empty());
        assert!(tables.nominal_outside_diameters.is_empty());
    }
}
