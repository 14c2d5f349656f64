//! # Parametric Mass Estimator
//!
//! Closed-form masses for components with no catalogue row. The only part
//! estimated today is the loose retaining ring behind a rotating flange:
//! a flat annulus sized off the pipe OD.
//!
//! ## Formula
//!
//! ```text
//! m = π/4 × (OD² - ID²) × t × ρ      (metres, kg/m³)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use piping_core::config::RetainingRingConfig;
//! use piping_core::estimator::retaining_ring;
//! use piping_core::reference::builtin_store;
//!
//! let ring = retaining_ring(&builtin_store(), &RetainingRingConfig::default(), 200, None);
//! assert_eq!(ring.ring_id_mm, 219.1);
//! assert_eq!(ring.thickness_mm, 16.0);
//! assert!(ring.weight_kg > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::RetainingRingConfig;
use crate::reference::store::ReferenceDataStore;
use crate::units::{round_to, CubicMetres, KgPerCubicMetre, Metres, Millimetres};

/// Mass of a flat annulus in kg, 2 dp. Dimensions in mm.
///
/// Returns 0 when `outer_diameter_mm <= inner_diameter_mm`.
pub fn annular_mass_kg(inner_diameter_mm: f64, outer_diameter_mm: f64, thickness_mm: f64, density_kg_m3: f64) -> f64 {
    if outer_diameter_mm <= inner_diameter_mm {
        return 0.0;
    }
    let od: Metres = Millimetres(outer_diameter_mm).into();
    let id: Metres = Millimetres(inner_diameter_mm).into();
    let t: Metres = Millimetres(thickness_mm).into();
    let volume = CubicMetres(std::f64::consts::FRAC_PI_4 * (od.0.powi(2) - id.0.powi(2)) * t.0);
    round_to((volume * KgPerCubicMetre(density_kg_m3)).0, 2)
}

/// Sized retaining ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetainingRing {
    pub pipe_od_mm: f64,
    pub ring_od_mm: f64,
    /// Bore of the ring, equal to the pipe OD
    pub ring_id_mm: f64,
    pub thickness_mm: f64,
    pub weight_kg: f64,
}

/// Size a retaining ring for `nb`.
///
/// Pipe OD comes from `pipe_od_override`, then the NB→OD table, then
/// `nb × od_fallback_factor`.
pub fn retaining_ring(
    store: &ReferenceDataStore,
    config: &RetainingRingConfig,
    nominal_bore_mm: u32,
    pipe_od_override: Option<f64>,
) -> RetainingRing {
    let pipe_od = pipe_od_override
        .filter(|od| *od > 0.0)
        .or_else(|| store.outside_diameter(nominal_bore_mm))
        .unwrap_or(nominal_bore_mm as f64 * config.od_fallback_factor);
    ring_for_pipe_od(config, nominal_bore_mm, pipe_od)
}

fn ring_for_pipe_od(config: &RetainingRingConfig, nominal_bore_mm: u32, pipe_od_mm: f64) -> RetainingRing {
    let ring_od = pipe_od_mm * config.od_multiplier;
    let thickness = (nominal_bore_mm as f64 * config.thickness_factor)
        .max(config.min_thickness_mm)
        .min(config.max_thickness_mm);

    RetainingRing {
        pipe_od_mm,
        ring_od_mm: ring_od,
        ring_id_mm: pipe_od_mm,
        thickness_mm: thickness,
        weight_kg: annular_mass_kg(pipe_od_mm, ring_od, thickness, config.density_kg_m3),
    }
}

/// Retaining ring mass in kg.
pub fn retaining_ring_weight(
    store: &ReferenceDataStore,
    config: &RetainingRingConfig,
    nominal_bore_mm: u32,
    pipe_od_override: Option<f64>,
) -> f64 {
    retaining_ring(store, config, nominal_bore_mm, pipe_od_override).weight_kg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::builtin_store;

    #[test]
    fn test_annular_mass() {
        // 400 OD x 200 ID x 20 thick steel plate ring
        let mass = annular_mass_kg(200.0, 400.0, 20.0, 7850.0);
        assert!((mass - 14.8).abs() < 0.01, "got {}", mass);
    }

    #[test]
    fn test_annular_mass_zero_when_closed() {
        assert_eq!(annular_mass_kg(300.0, 300.0, 20.0, 7850.0), 0.0);
        assert_eq!(annular_mass_kg(310.0, 300.0, 20.0, 7850.0), 0.0);
    }

    #[test]
    fn test_thickness_clamped() {
        let store = builtin_store();
        let config = RetainingRingConfig::default();
        assert_eq!(retaining_ring(&store, &config, 50, None).thickness_mm, 10.0);
        assert_eq!(retaining_ring(&store, &config, 200, None).thickness_mm, 16.0);
        assert_eq!(retaining_ring(&store, &config, 600, None).thickness_mm, 30.0);
    }

    #[test]
    fn test_pipe_od_sources() {
        let store = builtin_store();
        let config = RetainingRingConfig::default();

        assert_eq!(retaining_ring(&store, &config, 300, Some(330.0)).pipe_od_mm, 330.0);
        assert_eq!(retaining_ring(&store, &config, 300, None).pipe_od_mm, 323.9);
        // 275 is not a catalogued NB
        assert!((retaining_ring(&store, &config, 275, None).pipe_od_mm - 302.5).abs() < 1e-9);
    }

    #[test]
    fn test_ring_weight_value() {
        let store = builtin_store();
        let config = RetainingRingConfig::default();
        let ring = retaining_ring(&store, &config, 200, None);
        // OD 251.965, ID 219.1, t 16
        let expected = annular_mass_kg(219.1, 219.1 * 1.15, 16.0, 7850.0);
        assert_eq!(ring.weight_kg, expected);
        assert!((ring.weight_kg - 1.5).abs() < 0.05, "got {}", ring.weight_kg);
    }

    #[test]
    fn test_no_multiplier_means_no_mass() {
        let store = builtin_store();
        let config = RetainingRingConfig {
            od_multiplier: 1.0,
            ..RetainingRingConfig::default()
        };
        assert_eq!(retaining_ring_weight(&store, &config, 200, None), 0.0);
    }
}
