//! # Engine Configuration
//!
//! Tunable constants for the estimator, fastener defaults, thermoplastic
//! pricing and the optional remote catalog. Every field has a default, so an
//! empty JSON object (`{}`) is a valid configuration file.
//!
//! ## Example
//!
//! ```rust
//! use piping_core::config::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(r#"{"retaining_ring": {"od_multiplier": 1.2}}"#).unwrap();
//! assert_eq!(config.retaining_ring.od_multiplier, 1.2);
//! assert_eq!(config.retaining_ring.density_kg_m3, 7850.0);
//! ```

use serde::{Deserialize, Serialize};

/// Top-level configuration consumed by [`crate::engine::Engine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub retaining_ring: RetainingRingConfig,
    pub bnw_default: BnwDefault,
    pub thermoplastic: ThermoplasticConfig,
    pub remote: RemoteConfig,
}

/// Geometry constants for the retaining-ring estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetainingRingConfig {
    /// Ring OD as a multiple of the pipe OD
    pub od_multiplier: f64,
    /// Ring thickness per mm of nominal bore, before clamping
    pub thickness_factor: f64,
    pub min_thickness_mm: f64,
    pub max_thickness_mm: f64,
    /// Carbon steel
    pub density_kg_m3: f64,
    /// Pipe OD estimate per mm of NB when the NB→OD table has no row
    pub od_fallback_factor: f64,
}

impl Default for RetainingRingConfig {
    fn default() -> Self {
        RetainingRingConfig {
            od_multiplier: 1.15,
            thickness_factor: 0.08,
            min_thickness_mm: 10.0,
            max_thickness_mm: 30.0,
            density_kg_m3: 7850.0,
            od_fallback_factor: 1.1,
        }
    }
}

/// BNW set returned when no `(nb, pressure class)` row exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BnwDefault {
    pub bolt_size: String,
    pub weight_per_hole_kg: f64,
    pub num_holes: u32,
}

impl Default for BnwDefault {
    fn default() -> Self {
        BnwDefault {
            bolt_size: "M16x65".to_string(),
            weight_per_hole_kg: 0.18,
            num_holes: 8,
        }
    }
}

/// Densities and installation constants for HDPE and PVC-U.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermoplasticConfig {
    pub hdpe_density_kg_m3: f64,
    pub pvc_density_kg_m3: f64,
    /// Length of one supplied pipe section, used to count joints in a run
    pub standard_length_m: f64,
    /// Design coefficient C in the ISO 4427 rating formula
    pub design_coefficient: f64,
    /// SDR returned when no candidate reaches the target pressure
    pub default_sdr: f64,
    /// Rating surplus (percent of the requirement) above which a thinner
    /// standard wall is suggested
    pub economical_margin_pct: f64,
    /// Replaces the size-banded butt-fusion labour rate when set
    pub butt_fusion_labor_rate_per_hour: Option<f64>,
    pub electrofusion_labor_rate_per_hour: f64,
}

impl Default for ThermoplasticConfig {
    fn default() -> Self {
        ThermoplasticConfig {
            hdpe_density_kg_m3: 955.0,
            pvc_density_kg_m3: 1400.0,
            standard_length_m: 12.0,
            design_coefficient: 1.25,
            default_sdr: 11.0,
            economical_margin_pct: 50.0,
            butt_fusion_labor_rate_per_hour: None,
            electrofusion_labor_rate_per_hour: 350.0,
        }
    }
}

/// Remote catalog endpoint. Disabled when `base_url` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: None,
            timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"bnw_default": {"num_holes": 4}, "remote": {"base_url": "http://catalog"}}"#)
                .unwrap();
        assert_eq!(config.bnw_default.num_holes, 4);
        assert_eq!(config.bnw_default.bolt_size, "M16x65");
        assert_eq!(config.remote.base_url.as_deref(), Some("http://catalog"));
        assert_eq!(config.remote.timeout_secs, 5);
    }

    #[test]
    fn test_joining_rates_from_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"thermoplastic": {"butt_fusion_labor_rate_per_hour": 600.0, "economical_margin_pct": 80.0}}"#,
        )
        .unwrap();
        assert_eq!(config.thermoplastic.butt_fusion_labor_rate_per_hour, Some(600.0));
        assert_eq!(config.thermoplastic.economical_margin_pct, 80.0);
        assert_eq!(config.thermoplastic.electrofusion_labor_rate_per_hour, 350.0);
        assert_eq!(config.thermoplastic.design_coefficient, 1.25);
    }
}
