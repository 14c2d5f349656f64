//! Corrective loaders.
//!
//! These overwrite flange rows seeded by earlier loaders with verified
//! values. Rows that were never seeded are left alone; the previous values
//! are not kept, so `down` is a no-op.

use tracing::{debug, warn};

use super::{block_ids, ensure_bolt, FlangeBlock, Loader};
use crate::errors::EngineResult;
use crate::reference::entities::FlangeGeometry;
use crate::reference::tables::ReferenceTables;

type SabsCorrection = (u32, &'static str, u32, f64, f64, u32, f64, &'static str, f64, f64);

/// `(nb, type, kPa, D, b, holes, d1, bolt, pcd, mass_kg)`.
const SABS_1123_CORRECTIONS: [SabsCorrection; 80] = [
    (300, "/3", 600, 440.0, 18.0, 12, 22.0, "M20", 395.0, 12.0),
    (300, "/2", 600, 440.0, 26.0, 12, 22.0, "M20", 395.0, 18.0),
    (300, "/8", 600, 440.0, 24.0, 12, 22.0, "M20", 395.0, 24.0),
    (300, "/3", 1000, 445.0, 20.0, 12, 22.0, "M20", 400.0, 18.0),
    (300, "/2", 1000, 445.0, 32.0, 12, 22.0, "M20", 400.0, 32.0),
    (300, "/8", 1000, 445.0, 28.0, 12, 22.0, "M20", 400.0, 36.0),
    (300, "/3", 1600, 460.0, 25.0, 12, 26.0, "M24", 410.0, 28.0),
    (300, "/2", 1600, 460.0, 40.0, 12, 26.0, "M24", 410.0, 48.0),
    (300, "/8", 1600, 460.0, 36.0, 12, 26.0, "M24", 410.0, 48.0),
    (300, "/3", 2500, 485.0, 38.0, 16, 30.0, "M27", 430.0, 45.0),
    (300, "/2", 2500, 485.0, 56.0, 16, 30.0, "M27", 430.0, 72.0),
    (300, "/8", 2500, 485.0, 52.0, 16, 30.0, "M27", 430.0, 72.0),
    (300, "/3", 4000, 515.0, 45.0, 16, 33.0, "M30", 450.0, 62.0),
    (300, "/2", 4000, 515.0, 70.0, 16, 33.0, "M30", 450.0, 100.0),
    (300, "/8", 4000, 515.0, 65.0, 16, 33.0, "M30", 450.0, 100.0),
    (350, "/3", 600, 490.0, 20.0, 12, 22.0, "M20", 445.0, 15.0),
    (350, "/2", 600, 490.0, 28.0, 12, 22.0, "M20", 445.0, 22.0),
    (350, "/8", 600, 490.0, 26.0, 12, 22.0, "M20", 445.0, 33.0),
    (350, "/3", 1000, 505.0, 22.0, 16, 22.0, "M20", 460.0, 26.0),
    (350, "/2", 1000, 505.0, 36.0, 16, 22.0, "M20", 460.0, 45.0),
    (350, "/8", 1000, 505.0, 32.0, 16, 22.0, "M20", 460.0, 48.0),
    (350, "/3", 1600, 520.0, 28.0, 16, 26.0, "M24", 470.0, 38.0),
    (350, "/2", 1600, 520.0, 46.0, 16, 26.0, "M24", 470.0, 65.0),
    (350, "/8", 1600, 520.0, 42.0, 16, 26.0, "M24", 470.0, 65.0),
    (350, "/3", 2500, 555.0, 42.0, 16, 33.0, "M30", 490.0, 60.0),
    (350, "/2", 2500, 555.0, 64.0, 16, 33.0, "M30", 490.0, 95.0),
    (350, "/8", 2500, 555.0, 58.0, 16, 33.0, "M30", 490.0, 100.0),
    (400, "/3", 600, 540.0, 20.0, 16, 22.0, "M20", 495.0, 17.0),
    (400, "/2", 600, 540.0, 30.0, 16, 22.0, "M20", 495.0, 28.0),
    (400, "/8", 600, 540.0, 28.0, 16, 22.0, "M20", 495.0, 43.0),
    (400, "/3", 1000, 565.0, 25.0, 16, 26.0, "M24", 515.0, 38.0),
    (400, "/2", 1000, 565.0, 40.0, 16, 26.0, "M24", 515.0, 65.0),
    (400, "/8", 1000, 565.0, 36.0, 16, 26.0, "M24", 515.0, 62.0),
    (400, "/3", 1600, 580.0, 32.0, 16, 26.0, "M24", 525.0, 55.0),
    (400, "/2", 1600, 580.0, 52.0, 16, 26.0, "M24", 525.0, 95.0),
    (400, "/8", 1600, 580.0, 48.0, 16, 26.0, "M24", 525.0, 85.0),
    (400, "/3", 2500, 620.0, 48.0, 16, 36.0, "M33", 550.0, 85.0),
    (400, "/2", 2500, 620.0, 72.0, 16, 36.0, "M33", 550.0, 135.0),
    (400, "/8", 2500, 620.0, 68.0, 16, 36.0, "M33", 550.0, 135.0),
    (450, "/3", 600, 595.0, 22.0, 16, 22.0, "M20", 550.0, 22.0),
    (450, "/2", 600, 595.0, 32.0, 16, 22.0, "M20", 550.0, 35.0),
    (450, "/8", 600, 595.0, 30.0, 16, 22.0, "M20", 550.0, 54.0),
    (450, "/3", 1000, 615.0, 28.0, 20, 26.0, "M24", 565.0, 50.0),
    (450, "/2", 1000, 615.0, 44.0, 20, 26.0, "M24", 565.0, 85.0),
    (450, "/8", 1000, 615.0, 40.0, 20, 26.0, "M24", 565.0, 78.0),
    (450, "/3", 1600, 640.0, 34.0, 20, 26.0, "M24", 585.0, 72.0),
    (450, "/2", 1600, 640.0, 56.0, 20, 26.0, "M24", 585.0, 120.0),
    (450, "/8", 1600, 640.0, 52.0, 20, 26.0, "M24", 585.0, 108.0),
    (450, "/3", 2500, 670.0, 50.0, 20, 36.0, "M33", 600.0, 110.0),
    (450, "/2", 2500, 670.0, 78.0, 20, 36.0, "M33", 600.0, 175.0),
    (450, "/8", 2500, 670.0, 72.0, 20, 36.0, "M33", 600.0, 175.0),
    (500, "/3", 600, 645.0, 25.0, 20, 22.0, "M20", 600.0, 24.0),
    (500, "/2", 600, 645.0, 36.0, 20, 22.0, "M20", 600.0, 38.0),
    (500, "/1", 600, 645.0, 22.0, 20, 22.0, "M20", 600.0, 20.0),
    (500, "/8", 600, 645.0, 32.0, 20, 22.0, "M20", 600.0, 52.0),
    (500, "/3", 1000, 670.0, 32.0, 20, 26.0, "M24", 620.0, 42.0),
    (500, "/2", 1000, 670.0, 48.0, 20, 26.0, "M24", 620.0, 68.0),
    (500, "/1", 1000, 670.0, 28.0, 20, 26.0, "M24", 620.0, 36.0),
    (500, "/8", 1000, 670.0, 42.0, 20, 26.0, "M24", 620.0, 72.0),
    (500, "/3", 1600, 715.0, 40.0, 20, 33.0, "M30", 650.0, 72.0),
    (500, "/2", 1600, 715.0, 60.0, 20, 33.0, "M30", 650.0, 115.0),
    (500, "/1", 1600, 715.0, 36.0, 20, 33.0, "M30", 650.0, 62.0),
    (500, "/8", 1600, 715.0, 54.0, 20, 33.0, "M30", 650.0, 100.0),
    (500, "/3", 2500, 730.0, 55.0, 20, 36.0, "M33", 660.0, 105.0),
    (500, "/2", 2500, 730.0, 82.0, 20, 36.0, "M33", 660.0, 165.0),
    (500, "/1", 2500, 730.0, 50.0, 20, 36.0, "M33", 660.0, 90.0),
    (500, "/8", 2500, 730.0, 72.0, 20, 36.0, "M33", 660.0, 145.0),
    (500, "/3", 4000, 755.0, 70.0, 20, 42.0, "M39", 670.0, 145.0),
    (500, "/2", 4000, 755.0, 98.0, 20, 42.0, "M39", 670.0, 210.0),
    (500, "/1", 4000, 755.0, 64.0, 20, 42.0, "M39", 670.0, 125.0),
    (500, "/8", 4000, 755.0, 88.0, 20, 42.0, "M39", 670.0, 195.0),
    (600, "/3", 600, 755.0, 24.0, 20, 26.0, "M24", 705.0, 32.0),
    (600, "/2", 600, 755.0, 38.0, 20, 26.0, "M24", 705.0, 52.0),
    (600, "/8", 600, 755.0, 34.0, 20, 26.0, "M24", 705.0, 85.0),
    (600, "/3", 1000, 780.0, 36.0, 20, 30.0, "M27", 725.0, 75.0),
    (600, "/2", 1000, 780.0, 56.0, 20, 30.0, "M27", 725.0, 125.0),
    (600, "/8", 1000, 780.0, 50.0, 20, 30.0, "M27", 725.0, 135.0),
    (600, "/3", 1600, 840.0, 48.0, 20, 33.0, "M30", 770.0, 120.0),
    (600, "/2", 1600, 840.0, 72.0, 20, 33.0, "M30", 770.0, 195.0),
    (600, "/8", 1600, 840.0, 66.0, 20, 33.0, "M30", 770.0, 195.0),
];

/// 500NB T4000 rows added when absent: `(type, b, mass_kg)`.
const SABS_500NB_T4000: [(&str, f64, f64); 4] = [("/1", 64.0, 125.0), ("/2", 98.0, 210.0), ("/3", 70.0, 145.0), ("/8", 88.0, 195.0)];

/// BS 4504 PN16 weld-neck masses: `(nb, D, b, d4, f, holes, d1, bolt, pcd, mass_kg)`.
const BS4504_PN16_WELD_NECK: [(u32, f64, f64, f64, f64, u32, f64, &str, f64, f64); 3] = [
    (250, 405.0, 26.0, 320.0, 3.0, 12, 26.0, "M24", 355.0, 50.0),
    (300, 460.0, 28.0, 378.0, 4.0, 12, 26.0, "M24", 410.0, 70.0),
    (400, 580.0, 32.0, 490.0, 4.0, 16, 30.0, "M27", 525.0, 100.0),
];

/// Apply one correction. Returns whether a row was found.
fn correct(
    tables: &mut ReferenceTables,
    block: &FlangeBlock<'_>,
    nb: u32,
    geometry: FlangeGeometry,
    bolt: &str,
) -> EngineResult<bool> {
    let Some(nod_id) = tables.nominal_od_id(nb) else {
        warn!(nb, class = block.designation, "no outside diameter for NB; correction skipped");
        return Ok(false);
    };
    let (standard_id, class_id, type_id) = block_ids(tables, block)?;
    let bolt_id = ensure_bolt(tables, bolt);
    let corrected = tables.correct_flange_dimension(nod_id, standard_id, class_id, type_id, geometry, Some(bolt_id));
    if !corrected {
        debug!(nb, standard = block.standard, class = block.designation, "no seeded row to correct");
    }
    Ok(corrected)
}

fn log_irreversible(name: &str) {
    warn!(loader = name, "reverting a correction is not supported; rows keep corrected values");
}

// ============================================================================
// SABS 1123
// ============================================================================

pub struct Sabs1123Correction;

impl Loader for Sabs1123Correction {
    fn version(&self) -> u64 {
        700
    }

    fn name(&self) -> &'static str {
        "sabs_1123_correction"
    }

    fn is_corrective(&self) -> bool {
        true
    }

    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        let mut corrected = 0;
        for (nb, type_code, kpa, d_outer, b, num_holes, d1, bolt, pcd, mass_kg) in SABS_1123_CORRECTIONS {
            let designation = format!("{}{}", kpa, type_code);
            let block = FlangeBlock {
                standard: "SABS 1123",
                designation: &designation,
                flange_type: Some(type_code),
            };
            let geometry = FlangeGeometry {
                d_outer,
                b,
                d4: 0.0,
                f: 0.0,
                num_holes,
                d1,
                pcd,
                mass_kg,
            };
            if correct(tables, &block, nb, geometry, bolt)? {
                corrected += 1;
            }
        }

        let mut inserted = 0;
        if let Some(nod_id) = tables.nominal_od_id(500) {
            for (type_code, b, mass_kg) in SABS_500NB_T4000 {
                let designation = format!("4000{}", type_code);
                let block = FlangeBlock {
                    standard: "SABS 1123",
                    designation: &designation,
                    flange_type: Some(type_code),
                };
                let (standard_id, class_id, type_id) = block_ids(tables, &block)?;
                let bolt_id = ensure_bolt(tables, "M39");
                let geometry = FlangeGeometry {
                    d_outer: 755.0,
                    b,
                    d4: 525.0,
                    f: 4.0,
                    num_holes: 20,
                    d1: 42.0,
                    pcd: 670.0,
                    mass_kg,
                };
                let (_, created) =
                    tables.insert_flange_dimension_if_absent(nod_id, standard_id, class_id, type_id, geometry, Some(bolt_id));
                if created {
                    inserted += 1;
                }
            }
        }

        debug!(corrected, inserted, "SABS 1123 corrections applied");
        Ok(())
    }

    fn down(&self, _tables: &mut ReferenceTables) -> EngineResult<()> {
        log_irreversible(self.name());
        Ok(())
    }
}

// ============================================================================
// BS 4504
// ============================================================================

pub struct Bs4504Correction;

impl Loader for Bs4504Correction {
    fn version(&self) -> u64 {
        800
    }

    fn name(&self) -> &'static str {
        "bs_4504_correction"
    }

    fn is_corrective(&self) -> bool {
        true
    }

    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        let block = FlangeBlock {
            standard: "BS 4504",
            designation: "PN16",
            flange_type: Some("/2"),
        };
        for row in &BS4504_PN16_WELD_NECK {
            correct(tables, &block, row.0, super::geometry(row), row.7)?;
        }
        Ok(())
    }

    fn down(&self, _tables: &mut ReferenceTables) -> EngineResult<()> {
        log_irreversible(self.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::loaders::base_catalog::BaseCatalog;
    use crate::reference::loaders::flange_dimensions::FlangeDimensions;

    fn seeded() -> ReferenceTables {
        let mut tables = ReferenceTables::new();
        BaseCatalog.up(&mut tables).unwrap();
        FlangeDimensions.up(&mut tables).unwrap();
        tables
    }

    fn mass(tables: &ReferenceTables, standard: &str, designation: &str, type_code: &str, nb: u32) -> Option<f64> {
        let standard_id = tables.standard_id(standard)?;
        let class_id = tables.pressure_class_id(standard_id, designation)?;
        let type_id = tables.flange_type_id(type_code);
        let nod_id = tables.nominal_od_id(nb)?;
        tables
            .flange_dimension(nod_id, standard_id, class_id, type_id)
            .map(|d| d.mass_kg)
    }

    #[test]
    fn test_bs4504_300nb_weld_neck_corrected() {
        let mut tables = seeded();
        assert_eq!(mass(&tables, "BS 4504", "PN16", "/2", 300), Some(24.5));
        Bs4504Correction.up(&mut tables).unwrap();
        assert_eq!(mass(&tables, "BS 4504", "PN16", "/2", 300), Some(70.0));
    }

    #[test]
    fn test_sabs_corrections_overwrite_seeded_rows() {
        let mut tables = seeded();
        let before = tables.flange_dimensions.len();
        Sabs1123Correction.up(&mut tables).unwrap();

        assert_eq!(mass(&tables, "SABS 1123", "1600/2", "/2", 300), Some(48.0));
        assert_eq!(mass(&tables, "SABS 1123", "600/3", "/3", 300), Some(12.0));
        assert_eq!(mass(&tables, "SABS 1123", "1600/8", "/8", 500), Some(100.0));
        // 500NB T4000 is not seeded, so all four types are inserted
        assert_eq!(mass(&tables, "SABS 1123", "4000/2", "/2", 500), Some(210.0));
        assert_eq!(mass(&tables, "SABS 1123", "4000/1", "/1", 500), Some(125.0));
        assert_eq!(tables.flange_dimensions.len(), before + 4);
    }

    #[test]
    fn test_correction_keeps_raised_face() {
        let mut tables = seeded();
        Sabs1123Correction.up(&mut tables).unwrap();
        let sabs = tables.standard_id("SABS 1123").unwrap();
        let class_id = tables.pressure_class_id(sabs, "1600/2").unwrap();
        let row = tables
            .flange_dimensions
            .iter()
            .find(|d| d.pressure_class_id == class_id && d.d_outer == 460.0)
            .unwrap();
        assert_eq!(row.b, 40.0);
        assert_eq!(row.d4, 378.0);
    }

    #[test]
    fn test_corrections_are_idempotent() {
        let mut tables = seeded();
        Sabs1123Correction.up(&mut tables).unwrap();
        Bs4504Correction.up(&mut tables).unwrap();
        let once = tables.clone();
        Sabs1123Correction.up(&mut tables).unwrap();
        Bs4504Correction.up(&mut tables).unwrap();
        assert_eq!(tables, once);
    }
}
