//! Flange dimension loader.
//!
//! Geometry and unit masses for ASME B16.5, ASME B16.47 Series A/B,
//! BS 4504, BS 10 and SABS 1123 flanges. Some SABS 1123 and BS 4504 rows
//! are seeded with values later fixed by the correction loaders.

use tracing::debug;

use super::{remove_flange_rows, seed_flange_rows, FlangeBlock, FlangeRow, Loader};
use crate::errors::EngineResult;
use crate::reference::tables::ReferenceTables;

/// Geometry without mass: `(nb, D, b, d4, f, holes, d1, bolt, pcd)`.
type Geometry = (u32, f64, f64, f64, f64, u32, f64, &'static str, f64);

fn with_masses(geometry: &[Geometry], masses: &[(u32, f64)]) -> Vec<FlangeRow> {
    masses
        .iter()
        .filter_map(|&(nb, mass)| {
            geometry
                .iter()
                .find(|g| g.0 == nb)
                .map(|&(nb, d, b, d4, f, holes, d1, bolt, pcd)| (nb, d, b, d4, f, holes, d1, bolt, pcd, mass))
        })
        .collect()
}

// ============================================================================
// ASME B16.5
// ============================================================================

const B16_5_CLASS_150: [Geometry; 7] = [
    (50, 152.4, 19.1, 91.9, 1.6, 4, 19.1, "M16", 120.7),
    (80, 190.5, 23.9, 127.0, 1.6, 4, 19.1, "M16", 152.4),
    (100, 228.6, 23.9, 157.2, 1.6, 8, 19.1, "M16", 190.5),
    (150, 279.4, 25.4, 215.9, 1.6, 8, 22.4, "M20", 241.3),
    (200, 342.9, 28.4, 269.7, 1.6, 8, 22.4, "M20", 298.5),
    (250, 406.4, 30.2, 323.8, 1.6, 12, 25.4, "M24", 362.0),
    (300, 482.6, 31.8, 381.0, 1.6, 12, 25.4, "M24", 431.8),
];

const B16_5_CLASS_300: [Geometry; 7] = [
    (50, 165.1, 22.4, 91.9, 1.6, 8, 19.1, "M16", 127.0),
    (80, 209.6, 28.4, 127.0, 1.6, 8, 22.4, "M20", 168.1),
    (100, 254.0, 31.8, 157.2, 1.6, 8, 22.4, "M20", 200.2),
    (150, 317.5, 36.6, 215.9, 1.6, 12, 22.4, "M20", 269.7),
    (200, 381.0, 41.1, 269.7, 1.6, 12, 25.4, "M24", 330.2),
    (250, 444.5, 47.8, 323.8, 1.6, 16, 28.4, "M27", 387.4),
    (300, 520.7, 50.8, 381.0, 1.6, 16, 31.8, "M30", 450.8),
];

// ============================================================================
// ASME B16.47
// ============================================================================

const B16_47A_CLASS_150: [FlangeRow; 3] = [
    (650, 870.0, 66.7, 749.3, 1.6, 24, 35.1, "M30", 806.4, 150.0),
    (750, 984.3, 69.9, 863.6, 1.6, 28, 35.1, "M30", 914.4, 185.0),
    (900, 1168.4, 79.4, 1003.3, 1.6, 32, 38.1, "M33", 1085.9, 265.0),
];

const B16_47B_CLASS_150: [FlangeRow; 3] = [
    (650, 785.9, 41.3, 711.2, 1.6, 36, 22.4, "M20", 744.5, 75.0),
    (750, 898.7, 44.5, 812.8, 1.6, 44, 22.4, "M20", 855.7, 95.0),
    (900, 1060.5, 52.4, 965.2, 1.6, 44, 26.9, "M24", 1016.0, 140.0),
];

// ============================================================================
// BS 4504
// ============================================================================

const BS4504_PN16: [Geometry; 8] = [
    (50, 165.0, 18.0, 102.0, 3.0, 4, 18.0, "M16", 125.0),
    (80, 200.0, 20.0, 138.0, 3.0, 8, 18.0, "M16", 160.0),
    (100, 220.0, 20.0, 158.0, 3.0, 8, 18.0, "M16", 180.0),
    (150, 285.0, 22.0, 212.0, 3.0, 8, 22.0, "M20", 240.0),
    (200, 340.0, 24.0, 268.0, 3.0, 12, 22.0, "M20", 295.0),
    (250, 405.0, 26.0, 320.0, 3.0, 12, 26.0, "M24", 355.0),
    (300, 460.0, 28.0, 378.0, 4.0, 12, 26.0, "M24", 410.0),
    (400, 580.0, 32.0, 490.0, 4.0, 16, 30.0, "M27", 525.0),
];

const BS4504_PN10_WELD_NECK: [FlangeRow; 2] = [
    (200, 340.0, 24.0, 268.0, 3.0, 8, 22.0, "M20", 295.0, 11.5),
    (300, 445.0, 26.0, 370.0, 4.0, 12, 22.0, "M20", 400.0, 20.0),
];

const BS4504_PN25_WELD_NECK: [FlangeRow; 2] = [
    (150, 300.0, 28.0, 218.0, 3.0, 8, 26.0, "M24", 250.0, 10.6),
    (200, 360.0, 30.0, 278.0, 3.0, 12, 26.0, "M24", 310.0, 15.6),
];

/// Threaded PN16 flanges, tabulated under the `"16/4"` designation.
const BS4504_THREADED: [FlangeRow; 11] = [
    (15, 95.0, 16.0, 0.0, 0.0, 4, 14.0, "M12", 65.0, 0.72),
    (20, 105.0, 18.0, 0.0, 0.0, 4, 14.0, "M12", 75.0, 1.04),
    (25, 115.0, 18.0, 0.0, 0.0, 4, 14.0, "M12", 85.0, 1.25),
    (32, 140.0, 18.0, 0.0, 0.0, 4, 18.0, "M16", 100.0, 1.81),
    (40, 150.0, 18.0, 0.0, 0.0, 4, 18.0, "M16", 110.0, 2.06),
    (50, 165.0, 18.0, 0.0, 0.0, 4, 18.0, "M16", 125.0, 2.39),
    (65, 185.0, 18.0, 0.0, 0.0, 4, 18.0, "M16", 145.0, 2.97),
    (80, 200.0, 20.0, 0.0, 0.0, 8, 18.0, "M16", 160.0, 3.78),
    (100, 220.0, 20.0, 0.0, 0.0, 8, 18.0, "M16", 180.0, 4.38),
    (125, 250.0, 22.0, 0.0, 0.0, 8, 18.0, "M16", 210.0, 6.07),
    (150, 285.0, 22.0, 0.0, 0.0, 8, 22.0, "M20", 240.0, 7.24),
];

// ============================================================================
// BS 10 (tables are not split by flange type)
// ============================================================================

const BS10_TABLE_D: [FlangeRow; 5] = [
    (50, 152.4, 12.7, 0.0, 0.0, 4, 17.5, "M16", 114.3, 1.6),
    (100, 215.9, 12.7, 0.0, 0.0, 4, 17.5, "M16", 177.8, 2.7),
    (150, 279.4, 12.7, 0.0, 0.0, 8, 17.5, "M16", 235.0, 4.3),
    (200, 336.6, 15.9, 0.0, 0.0, 8, 17.5, "M16", 292.1, 7.0),
    (300, 457.2, 19.1, 0.0, 0.0, 12, 20.6, "M20", 406.4, 14.1),
];

const BS10_TABLE_E: [FlangeRow; 5] = [
    (50, 152.4, 12.7, 0.0, 0.0, 4, 17.5, "M16", 114.3, 1.8),
    (100, 215.9, 15.9, 0.0, 0.0, 4, 17.5, "M16", 177.8, 3.6),
    (150, 279.4, 15.9, 0.0, 0.0, 8, 20.6, "M20", 235.0, 5.5),
    (200, 336.6, 19.1, 0.0, 0.0, 8, 20.6, "M20", 292.1, 8.8),
    (300, 457.2, 22.2, 0.0, 0.0, 12, 23.8, "M24", 406.4, 18.5),
];

// ============================================================================
// SABS 1123 (designation "{kPa}/{type}")
// ============================================================================

const SABS_1000_SLIP_ON: [FlangeRow; 4] = [
    (100, 220.0, 16.0, 158.0, 3.0, 8, 18.0, "M16", 180.0, 3.2),
    (150, 285.0, 18.0, 212.0, 3.0, 8, 22.0, "M20", 240.0, 5.0),
    (200, 340.0, 20.0, 268.0, 3.0, 8, 22.0, "M20", 295.0, 7.4),
    (300, 445.0, 22.0, 370.0, 4.0, 12, 22.0, "M20", 400.0, 12.5),
];

const SABS_1600_SLIP_ON: [FlangeRow; 4] = [
    (100, 220.0, 18.0, 158.0, 3.0, 8, 18.0, "M16", 180.0, 3.6),
    (150, 285.0, 20.0, 212.0, 3.0, 8, 22.0, "M20", 240.0, 5.7),
    (200, 340.0, 22.0, 268.0, 3.0, 12, 22.0, "M20", 295.0, 8.4),
    (300, 460.0, 28.0, 378.0, 4.0, 12, 26.0, "M24", 410.0, 16.0),
];

const SABS_600_SLIP_ON: [FlangeRow; 1] = [(300, 440.0, 16.0, 370.0, 4.0, 12, 22.0, "M20", 395.0, 9.0)];

const SABS_1000_WELD_NECK: [FlangeRow; 1] = [(300, 445.0, 28.0, 370.0, 4.0, 12, 22.0, "M20", 400.0, 26.0)];

const SABS_1600_WELD_NECK: [FlangeRow; 3] = [
    (300, 460.0, 36.0, 378.0, 4.0, 12, 26.0, "M24", 410.0, 40.0),
    (400, 580.0, 48.0, 490.0, 4.0, 16, 26.0, "M24", 525.0, 88.0),
    (500, 710.0, 56.0, 610.0, 4.0, 20, 33.0, "M30", 650.0, 105.0),
];

const SABS_1600_BLIND: [FlangeRow; 2] = [
    (300, 460.0, 32.0, 378.0, 4.0, 12, 26.0, "M24", 410.0, 45.0),
    (500, 710.0, 50.0, 610.0, 4.0, 20, 33.0, "M30", 650.0, 92.0),
];

const SABS_2500_WELD_NECK: [FlangeRow; 1] = [(300, 480.0, 50.0, 378.0, 4.0, 16, 30.0, "M27", 430.0, 60.0)];

const SABS_4000_WELD_NECK: [FlangeRow; 1] = [(300, 510.0, 64.0, 378.0, 4.0, 16, 33.0, "M30", 450.0, 88.0)];

fn block(standard: &'static str, designation: &'static str, flange_type: Option<&'static str>) -> FlangeBlock<'static> {
    FlangeBlock {
        standard,
        designation,
        flange_type,
    }
}

/// Every block this loader owns, paired with its rows.
fn blocks() -> Vec<(FlangeBlock<'static>, Vec<FlangeRow>)> {
    let b16_5_150 = [
        ("WN", [(50, 2.7), (80, 5.0), (100, 7.0), (150, 11.0), (200, 18.0), (250, 25.0), (300, 37.0)]),
        ("SO", [(50, 2.3), (80, 4.0), (100, 5.9), (150, 8.6), (200, 13.6), (250, 19.5), (300, 29.0)]),
        ("BL", [(50, 2.3), (80, 4.5), (100, 7.7), (150, 11.3), (200, 20.0), (250, 28.0), (300, 43.0)]),
    ];

    let mut out: Vec<(FlangeBlock<'static>, Vec<FlangeRow>)> = b16_5_150
        .into_iter()
        .map(|(code, masses)| (block("ASME B16.5", "150", Some(code)), with_masses(&B16_5_CLASS_150, &masses)))
        .collect();

    out.push((
        block("ASME B16.5", "300", Some("WN")),
        with_masses(
            &B16_5_CLASS_300,
            &[(50, 3.6), (80, 6.4), (100, 10.9), (150, 19.5), (200, 29.5), (250, 43.0), (300, 64.0)],
        ),
    ));

    out.push((block("ASME B16.47A", "150", Some("/2")), B16_47A_CLASS_150.to_vec()));
    out.push((block("ASME B16.47B", "150", Some("/2")), B16_47B_CLASS_150.to_vec()));

    out.push((
        block("BS 4504", "PN16", Some("/2")),
        with_masses(
            &BS4504_PN16,
            &[(50, 2.5), (80, 3.9), (100, 4.8), (150, 8.2), (200, 12.0), (250, 17.5), (300, 24.5), (400, 35.0)],
        ),
    ));
    out.push((
        block("BS 4504", "PN16", Some("/3")),
        with_masses(&BS4504_PN16, &[(50, 2.0), (100, 3.6), (150, 5.6), (200, 8.5), (300, 16.3)]),
    ));
    out.push((
        block("BS 4504", "PN16", Some("/8")),
        with_masses(&BS4504_PN16, &[(50, 2.9), (100, 5.9), (150, 11.1), (200, 17.0), (300, 35.0)]),
    ));
    out.push((block("BS 4504", "PN10", Some("/2")), BS4504_PN10_WELD_NECK.to_vec()));
    out.push((block("BS 4504", "PN25", Some("/2")), BS4504_PN25_WELD_NECK.to_vec()));
    out.push((block("BS 4504", "16/4", Some("/4")), BS4504_THREADED.to_vec()));

    out.push((block("BS 10", "T/D", None), BS10_TABLE_D.to_vec()));
    out.push((block("BS 10", "T/E", None), BS10_TABLE_E.to_vec()));

    out.push((block("SABS 1123", "600/3", Some("/3")), SABS_600_SLIP_ON.to_vec()));
    out.push((block("SABS 1123", "1000/3", Some("/3")), SABS_1000_SLIP_ON.to_vec()));
    out.push((block("SABS 1123", "1600/3", Some("/3")), SABS_1600_SLIP_ON.to_vec()));
    out.push((block("SABS 1123", "1000/2", Some("/2")), SABS_1000_WELD_NECK.to_vec()));
    out.push((block("SABS 1123", "1600/2", Some("/2")), SABS_1600_WELD_NECK.to_vec()));
    out.push((block("SABS 1123", "1600/8", Some("/8")), SABS_1600_BLIND.to_vec()));
    out.push((block("SABS 1123", "2500/2", Some("/2")), SABS_2500_WELD_NECK.to_vec()));
    out.push((block("SABS 1123", "4000/2", Some("/2")), SABS_4000_WELD_NECK.to_vec()));

    out
}

pub struct FlangeDimensions;

impl Loader for FlangeDimensions {
    fn version(&self) -> u64 {
        200
    }

    fn name(&self) -> &'static str {
        "flange_dimensions"
    }

    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        for (block, rows) in blocks() {
            let inserted = seed_flange_rows(tables, &block, &rows)?;
            debug!(
                standard = block.standard,
                class = block.designation,
                inserted,
                "seeded flange rows"
            );
        }
        Ok(())
    }

    fn down(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        for (block, rows) in blocks() {
            remove_flange_rows(tables, &block, &rows);
        }
        Ok(())
    }
}
