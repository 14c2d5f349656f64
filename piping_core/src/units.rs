//! # Unit Types
//!
//! Lightweight newtype wrappers for the metric units the engine works in.
//! They serialize as bare numbers and exist to keep millimetre/metre and
//! kPa/bar/MPa conversions in one place.
//!
//! The engine is metric throughout:
//! - Length: millimetres (mm) for geometry, metres (m) for volumes and pipe runs
//! - Mass: kilograms (kg)
//! - Pressure: bar for ratings, kPa for SABS 1123 designations, MPa for MRS
//! - Density: kg/m³
//!
//! ## Example
//!
//! ```rust
//! use piping_core::units::{Bar, Kilopascals, Metres, Millimetres};
//!
//! let od: Metres = Millimetres(323.9).into();
//! assert!((od.0 - 0.3239).abs() < 1e-12);
//!
//! let rating: Bar = Kilopascals(1600.0).into();
//! assert_eq!(rating.0, 16.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimetres(pub f64);

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metres(pub f64);

impl From<Millimetres> for Metres {
    fn from(mm: Millimetres) -> Self {
        Metres(mm.0 / 1000.0)
    }
}

impl From<Metres> for Millimetres {
    fn from(m: Metres) -> Self {
        Millimetres(m.0 * 1000.0)
    }
}

impl Add for Millimetres {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Millimetres(self.0 + rhs.0)
    }
}

impl Sub for Millimetres {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Millimetres(self.0 - rhs.0)
    }
}

impl Mul<f64> for Millimetres {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Millimetres(self.0 * rhs)
    }
}

// ============================================================================
// Mass and Density
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

impl Add for Kilograms {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Kilograms(self.0 + rhs.0)
    }
}

impl Mul<f64> for Kilograms {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Kilograms(self.0 * rhs)
    }
}

/// Density in kilograms per cubic metre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgPerCubicMetre(pub f64);

/// Volume in cubic metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMetres(pub f64);

impl Mul<KgPerCubicMetre> for CubicMetres {
    type Output = Kilograms;
    fn mul(self, rhs: KgPerCubicMetre) -> Kilograms {
        Kilograms(self.0 * rhs.0)
    }
}

// ============================================================================
// Pressure Units
// ============================================================================

/// Pressure in bar
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bar(pub f64);

/// Pressure in kilopascals (SABS 1123 table designations)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilopascals(pub f64);

/// Pressure in megapascals (thermoplastic MRS)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megapascals(pub f64);

impl From<Kilopascals> for Bar {
    fn from(kpa: Kilopascals) -> Self {
        Bar(kpa.0 / 100.0)
    }
}

impl From<Bar> for Kilopascals {
    fn from(bar: Bar) -> Self {
        Kilopascals(bar.0 * 100.0)
    }
}

impl From<Megapascals> for Bar {
    fn from(mpa: Megapascals) -> Self {
        Bar(mpa.0 * 10.0)
    }
}

impl From<Bar> for Megapascals {
    fn from(bar: Bar) -> Self {
        Megapascals(bar.0 / 10.0)
    }
}

/// Round to a fixed number of decimal places.
///
/// Every published figure in the engine (masses, walls, ratings) is rounded
/// this way so results match the catalogue presentation.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let m: Metres = Millimetres(1500.0).into();
        assert_eq!(m.0, 1.5);
        let mm: Millimetres = Metres(0.11).into();
        assert!((mm.0 - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_conversions() {
        let bar: Bar = Kilopascals(4000.0).into();
        assert_eq!(bar.0, 40.0);
        let bar: Bar = Megapascals(1.0).into();
        assert_eq!(bar.0, 10.0);
        let kpa: Kilopascals = Bar(16.0).into();
        assert_eq!(kpa.0, 1600.0);
    }

    #[test]
    fn test_volume_times_density() {
        let mass = CubicMetres(0.002) * KgPerCubicMetre(7850.0);
        assert!((mass.0 - 15.7).abs() < 1e-9);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(10.004, 2), 10.0);
        assert_eq!(round_to(16.04, 1), 16.0);
        assert_eq!(round_to(2.345, 1), 2.3);
    }
}
