//! Gasket mass loader: one row per catalogued NB, one column per construction.

use super::Loader;
use crate::errors::EngineResult;
use crate::reference::entities::GasketWeight;
use crate::reference::tables::ReferenceTables;

/// `(nb, spiral wound, RTJ, PTFE, graphite, CAF, rubber)` in kg.
const GASKET_WEIGHTS: [(u32, f64, f64, f64, f64, f64, f64); 24] = [
    (15, 0.025, 0.045, 0.003, 0.002, 0.004, 0.003),
    (20, 0.03, 0.055, 0.004, 0.003, 0.005, 0.004),
    (25, 0.035, 0.065, 0.005, 0.004, 0.007, 0.005),
    (32, 0.045, 0.08, 0.007, 0.005, 0.009, 0.006),
    (40, 0.055, 0.095, 0.009, 0.007, 0.012, 0.008),
    (50, 0.07, 0.12, 0.013, 0.01, 0.017, 0.011),
    (65, 0.09, 0.15, 0.018, 0.014, 0.023, 0.015),
    (80, 0.11, 0.18, 0.024, 0.018, 0.031, 0.02),
    (100, 0.15, 0.25, 0.035, 0.027, 0.045, 0.03),
    (125, 0.2, 0.32, 0.05, 0.038, 0.064, 0.042),
    (150, 0.26, 0.4, 0.068, 0.052, 0.087, 0.057),
    (200, 0.4, 0.6, 0.11, 0.085, 0.14, 0.092),
    (250, 0.55, 0.85, 0.165, 0.127, 0.21, 0.138),
    (300, 0.72, 1.1, 0.22, 0.17, 0.285, 0.187),
    (350, 0.9, 1.4, 0.29, 0.225, 0.375, 0.245),
    (400, 1.1, 1.7, 0.37, 0.285, 0.475, 0.31),
    (450, 1.35, 2.0, 0.46, 0.355, 0.59, 0.385),
    (500, 1.6, 2.4, 0.56, 0.43, 0.72, 0.47),
    (600, 2.2, 3.3, 0.78, 0.6, 1.0, 0.655),
    (700, 2.9, 4.3, 1.05, 0.81, 1.35, 0.88),
    (800, 3.7, 5.5, 1.35, 1.04, 1.73, 1.13),
    (900, 4.6, 6.9, 1.7, 1.31, 2.18, 1.42),
    (1000, 5.6, 8.4, 2.1, 1.62, 2.7, 1.76),
    (1200, 7.9, 11.8, 3.0, 2.31, 3.85, 2.51),
];

pub struct GasketWeights;

impl Loader for GasketWeights {
    fn version(&self) -> u64 {
        400
    }

    fn name(&self) -> &'static str {
        "gasket_weights"
    }

    fn up(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        for (nominal_bore_mm, spiral_wound, rtj, ptfe, graphite, caf, rubber) in GASKET_WEIGHTS {
            tables.upsert_gasket_weight(GasketWeight {
                nominal_bore_mm,
                spiral_wound,
                rtj,
                ptfe,
                graphite,
                caf,
                rubber,
            });
        }
        Ok(())
    }

    fn down(&self, tables: &mut ReferenceTables) -> EngineResult<()> {
        tables
            .gasket_weights
            .retain(|g| !GASKET_WEIGHTS.iter().any(|row| row.0 == g.nominal_bore_mm));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_ascending_and_unique() {
        assert!(GASKET_WEIGHTS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_rtj_heaviest_per_size() {
        for row in GASKET_WEIGHTS {
            assert!(row.2 >= row.1, "NB {}", row.0);
        }
    }

    #[test]
    fn test_up_then_down() {
        let mut tables = ReferenceTables::new();
        GasketWeights.up(&mut tables).unwrap();
        assert_eq!(tables.gasket_weights.len(), GASKET_WEIGHTS.len());
        GasketWeights.down(&mut tables).unwrap();
        assert!(tables.gasket_weights.is_empty());
    }
}
