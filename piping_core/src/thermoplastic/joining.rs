//! # HDPE Joint Costing
//!
//! Site cost of one fused joint between HDPE sections, and the welded cost
//! of a pipe run.
//!
//! - **Butt fusion**: labour for the heat-soak cycle plus machine setup,
//!   banded by size, and the trimmer/cleaning consumables. No fitting.
//! - **Electrofusion**: a coupler from [`ELECTROFUSION_COUPLERS`], labour for
//!   its fusion time plus 5 min preparation, and consumables.
//!
//! Butt-fusion jobs also need a machine on hire; [`machine_rental_cost`]
//! prices it by day with a weekly cap.

use serde::{Deserialize, Serialize};

use super::{calculate_joint_count, JointCount, PipeDimensions, ThermoplasticCalculator};
use crate::errors::{EngineError, EngineResult};
use crate::reference::entities::ThermoplasticMaterial;
use crate::units::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoiningMethod {
    #[default]
    ButtFusion,
    Electrofusion,
}

impl JoiningMethod {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "butt_fusion" | "butt" => Some(JoiningMethod::ButtFusion),
            "electrofusion" | "ef" => Some(JoiningMethod::Electrofusion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointCostBreakdown {
    pub method: JoiningMethod,
    pub labor_cost: f64,
    pub consumables_cost: f64,
    /// Coupler price; zero for butt fusion
    pub fitting_cost: f64,
    pub total_per_joint: f64,
}

// ============================================================================
// Butt Fusion
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ButtFusionBand {
    /// Largest DN in the band; the last band is open-ended
    pub max_dn_mm: u32,
    pub labor_rate_per_hour: f64,
    pub cycle_time_min: f64,
    pub setup_time_min: f64,
    pub consumables_per_joint: f64,
}

pub static BUTT_FUSION_BANDS: [ButtFusionBand; 3] = [
    ButtFusionBand { max_dn_mm: 160, labor_rate_per_hour: 350.0, cycle_time_min: 25.0, setup_time_min: 10.0, consumables_per_joint: 15.0 },
    ButtFusionBand { max_dn_mm: 315, labor_rate_per_hour: 450.0, cycle_time_min: 45.0, setup_time_min: 15.0, consumables_per_joint: 35.0 },
    ButtFusionBand { max_dn_mm: u32::MAX, labor_rate_per_hour: 550.0, cycle_time_min: 75.0, setup_time_min: 20.0, consumables_per_joint: 65.0 },
];

pub fn butt_fusion_band(dn_mm: u32) -> &'static ButtFusionBand {
    let last = &BUTT_FUSION_BANDS[BUTT_FUSION_BANDS.len() - 1];
    BUTT_FUSION_BANDS.iter().find(|b| dn_mm <= b.max_dn_mm).unwrap_or(last)
}

/// One butt weld; `labor_rate_per_hour` replaces the band's rate when given.
pub fn butt_fusion_joint_cost(dn_mm: u32, labor_rate_per_hour: Option<f64>) -> JointCostBreakdown {
    let band = butt_fusion_band(dn_mm);
    let rate = labor_rate_per_hour.unwrap_or(band.labor_rate_per_hour);
    let labor = round_to((band.cycle_time_min + band.setup_time_min) / 60.0 * rate, 2);

    JointCostBreakdown {
        method: JoiningMethod::ButtFusion,
        labor_cost: labor,
        consumables_cost: band.consumables_per_joint,
        fitting_cost: 0.0,
        total_per_joint: round_to(labor + band.consumables_per_joint, 2),
    }
}

// ============================================================================
// Electrofusion
// ============================================================================

const ELECTROFUSION_PREP_MIN: f64 = 5.0;
const ELECTROFUSION_CONSUMABLES: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElectrofusionCoupler {
    pub dn_mm: u32,
    pub price: f64,
    pub fusion_time_min: f64,
}

const fn coupler(dn_mm: u32, price: f64, fusion_time_min: f64) -> ElectrofusionCoupler {
    ElectrofusionCoupler { dn_mm, price, fusion_time_min }
}

/// Coupler list, ascending DN.
pub static ELECTROFUSION_COUPLERS: [ElectrofusionCoupler; 24] = [
    coupler(20, 45.0, 2.0),
    coupler(25, 52.0, 2.0),
    coupler(32, 65.0, 3.0),
    coupler(40, 85.0, 3.0),
    coupler(50, 110.0, 4.0),
    coupler(63, 145.0, 5.0),
    coupler(75, 185.0, 6.0),
    coupler(90, 235.0, 7.0),
    coupler(110, 320.0, 8.0),
    coupler(125, 395.0, 9.0),
    coupler(140, 475.0, 10.0),
    coupler(160, 580.0, 12.0),
    coupler(180, 720.0, 14.0),
    coupler(200, 880.0, 16.0),
    coupler(225, 1100.0, 18.0),
    coupler(250, 1350.0, 20.0),
    coupler(280, 1680.0, 24.0),
    coupler(315, 2100.0, 28.0),
    coupler(355, 2650.0, 32.0),
    coupler(400, 3350.0, 38.0),
    coupler(450, 4200.0, 44.0),
    coupler(500, 5250.0, 52.0),
    coupler(560, 6580.0, 60.0),
    coupler(630, 8350.0, 70.0),
];

/// Coupler for `dn_mm`, else the next size up, else the largest listed.
pub fn electrofusion_coupler(dn_mm: u32) -> &'static ElectrofusionCoupler {
    let largest = &ELECTROFUSION_COUPLERS[ELECTROFUSION_COUPLERS.len() - 1];
    ELECTROFUSION_COUPLERS.iter().find(|c| c.dn_mm >= dn_mm).unwrap_or(largest)
}

pub fn electrofusion_joint_cost(dn_mm: u32, labor_rate_per_hour: f64) -> JointCostBreakdown {
    let coupler = electrofusion_coupler(dn_mm);
    let labor = round_to((coupler.fusion_time_min + ELECTROFUSION_PREP_MIN) / 60.0 * labor_rate_per_hour, 2);

    JointCostBreakdown {
        method: JoiningMethod::Electrofusion,
        labor_cost: labor,
        consumables_cost: ELECTROFUSION_CONSUMABLES,
        fitting_cost: coupler.price,
        total_per_joint: round_to(labor + ELECTROFUSION_CONSUMABLES + coupler.price, 2),
    }
}

// ============================================================================
// Machine Hire
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionMachine {
    pub size_range: &'static str,
    pub min_dn_mm: u32,
    pub max_dn_mm: u32,
    pub daily_rate: f64,
    pub weekly_rate: f64,
    pub monthly_rate: f64,
    pub operator_required: bool,
}

/// Hire fleet, smallest machine first. Ranges overlap; the first fit is taken.
pub static FUSION_MACHINES: [FusionMachine; 5] = [
    FusionMachine { size_range: "63-160mm", min_dn_mm: 63, max_dn_mm: 160, daily_rate: 1500.0, weekly_rate: 6000.0, monthly_rate: 18000.0, operator_required: false },
    FusionMachine { size_range: "90-315mm", min_dn_mm: 90, max_dn_mm: 315, daily_rate: 2500.0, weekly_rate: 10000.0, monthly_rate: 30000.0, operator_required: false },
    FusionMachine { size_range: "160-500mm", min_dn_mm: 160, max_dn_mm: 500, daily_rate: 4500.0, weekly_rate: 18000.0, monthly_rate: 54000.0, operator_required: true },
    FusionMachine { size_range: "315-630mm", min_dn_mm: 315, max_dn_mm: 630, daily_rate: 7500.0, weekly_rate: 30000.0, monthly_rate: 90000.0, operator_required: true },
    FusionMachine { size_range: "500-1200mm", min_dn_mm: 500, max_dn_mm: 1200, daily_rate: 12000.0, weekly_rate: 48000.0, monthly_rate: 144000.0, operator_required: true },
];

pub const DEFAULT_JOINTS_PER_DAY: u32 = 8;

pub fn fusion_machine_for_size(dn_mm: u32) -> Option<&'static FusionMachine> {
    FUSION_MACHINES.iter().find(|m| (m.min_dn_mm..=m.max_dn_mm).contains(&dn_mm))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MachineRental {
    pub machine: Option<&'static FusionMachine>,
    pub days: u32,
    pub cost: f64,
}

/// Hire for `joint_count` welds at `joints_per_day`.
///
/// Up to a week is billed daily but never above the weekly rate; beyond
/// that whole weeks plus the remaining days, again capped at a week.
pub fn machine_rental_cost(dn_mm: u32, joint_count: u32, joints_per_day: u32) -> MachineRental {
    let machine = match fusion_machine_for_size(dn_mm) {
        Some(m) if joint_count > 0 && joints_per_day > 0 => m,
        _ => return MachineRental { machine: None, days: 0, cost: 0.0 },
    };

    let days = joint_count.div_ceil(joints_per_day);
    let cost = if days <= 7 {
        (days as f64 * machine.daily_rate).min(machine.weekly_rate)
    } else {
        let weeks = (days / 7) as f64;
        let extra = (days % 7) as f64;
        weeks * machine.weekly_rate + (extra * machine.daily_rate).min(machine.weekly_rate)
    };

    MachineRental { machine: Some(machine), days, cost: round_to(cost, 2) }
}

// ============================================================================
// Welded Pipe Run
// ============================================================================

/// Supply and site-joining cost for a run of HDPE pipe.
///
/// ## JSON Example
///
/// ```json
/// {
///   "nominal_bore_mm": 110,
///   "sdr": 11.0,
///   "length_m": 30.0,
///   "price_per_kg": 2.0,
///   "method": "butt_fusion"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeldedPipeCostInput {
    pub nominal_bore_mm: u32,
    pub sdr: f64,
    pub length_m: f64,
    pub price_per_kg: f64,
    #[serde(default)]
    pub method: JoiningMethod,
}

impl WeldedPipeCostInput {
    pub fn validate(&self) -> EngineResult<()> {
        if self.nominal_bore_mm == 0 {
            return Err(EngineError::invalid_input("nominal_bore_mm", "0", "Nominal size must be positive"));
        }
        if self.sdr <= 1.0 {
            return Err(EngineError::invalid_input("sdr", self.sdr.to_string(), "SDR must be greater than 1"));
        }
        if self.length_m < 0.0 {
            return Err(EngineError::invalid_input(
                "length_m",
                self.length_m.to_string(),
                "Length cannot be negative",
            ));
        }
        if self.price_per_kg < 0.0 {
            return Err(EngineError::invalid_input(
                "price_per_kg",
                self.price_per_kg.to_string(),
                "Price cannot be negative",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeldedPipeCostResult {
    pub dimensions: PipeDimensions,
    pub total_weight_kg: f64,
    pub material_cost: f64,
    pub joints: JointCount,
    pub cost_per_joint: JointCostBreakdown,
    pub joint_cost: f64,
    /// Quoted alongside, not included in `total_cost`
    pub machine_rental: MachineRental,
    pub total_cost: f64,
}

impl ThermoplasticCalculator<'_> {
    /// Per-joint cost using the configured labour rates.
    pub fn joint_cost(&self, method: JoiningMethod, dn_mm: u32) -> JointCostBreakdown {
        match method {
            JoiningMethod::ButtFusion => butt_fusion_joint_cost(dn_mm, self.config.butt_fusion_labor_rate_per_hour),
            JoiningMethod::Electrofusion => electrofusion_joint_cost(dn_mm, self.config.electrofusion_labor_rate_per_hour),
        }
    }

    /// Material, fused joints and (for butt fusion) machine hire for an HDPE run.
    pub fn welded_pipe_cost(&self, input: &WeldedPipeCostInput) -> EngineResult<WeldedPipeCostResult> {
        input.validate()?;

        let dimensions = self.pipe_dimensions(ThermoplasticMaterial::Hdpe, input.nominal_bore_mm, input.sdr);
        let total_weight = round_to(dimensions.weight_per_meter_kg * input.length_m, 2);
        let material_cost = round_to(total_weight * input.price_per_kg, 2);
        let joints = calculate_joint_count(input.length_m, self.config.standard_length_m);
        let cost_per_joint = self.joint_cost(input.method, input.nominal_bore_mm);
        let joint_cost = round_to(joints.joint_count as f64 * cost_per_joint.total_per_joint, 2);
        let machine_rental = match input.method {
            JoiningMethod::ButtFusion => {
                machine_rental_cost(input.nominal_bore_mm, joints.joint_count, DEFAULT_JOINTS_PER_DAY)
            }
            JoiningMethod::Electrofusion => machine_rental_cost(input.nominal_bore_mm, 0, DEFAULT_JOINTS_PER_DAY),
        };

        Ok(WeldedPipeCostResult {
            dimensions,
            total_weight_kg: total_weight,
            material_cost,
            joints,
            cost_per_joint,
            joint_cost,
            machine_rental,
            total_cost: round_to(material_cost + joint_cost, 2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThermoplasticConfig;
    use crate::reference::builtin_store;

    #[test]
    fn test_butt_fusion_banded_by_size() {
        let small = butt_fusion_joint_cost(110, None);
        assert_eq!(small.labor_cost, 204.17);
        assert_eq!(small.consumables_cost, 15.0);
        assert_eq!(small.fitting_cost, 0.0);
        assert_eq!(small.total_per_joint, 219.17);

        let large = butt_fusion_joint_cost(400, None);
        assert_eq!(large.labor_cost, 870.83);
        assert_eq!(large.total_per_joint, 935.83);

        // 160 is the top of the small band
        assert_eq!(butt_fusion_band(160).cycle_time_min, 25.0);
        assert_eq!(butt_fusion_band(200).cycle_time_min, 45.0);
    }

    #[test]
    fn test_butt_fusion_rate_override() {
        // 35 min at 600/h
        assert_eq!(butt_fusion_joint_cost(110, Some(600.0)).labor_cost, 350.0);
    }

    #[test]
    fn test_electrofusion_joint() {
        let joint = electrofusion_joint_cost(110, 350.0);
        assert_eq!(joint.labor_cost, 75.83);
        assert_eq!(joint.consumables_cost, 10.0);
        assert_eq!(joint.fitting_cost, 320.0);
        assert_eq!(joint.total_per_joint, 405.83);
    }

    #[test]
    fn test_coupler_lookup_rounds_up() {
        assert_eq!(electrofusion_coupler(110).dn_mm, 110);
        assert_eq!(electrofusion_coupler(100).dn_mm, 110);
        assert_eq!(electrofusion_coupler(10).dn_mm, 20);
        assert_eq!(electrofusion_coupler(800).dn_mm, 630);
    }

    #[test]
    fn test_machine_rental_daily_weekly() {
        let one_day = machine_rental_cost(110, 2, 8);
        assert_eq!(one_day.days, 1);
        assert_eq!(one_day.cost, 1500.0);
        assert_eq!(one_day.machine.map(|m| m.size_range), Some("63-160mm"));

        // 5 days at 1500 would be 7500; the week caps it
        let capped = machine_rental_cost(110, 40, 8);
        assert_eq!(capped.days, 5);
        assert_eq!(capped.cost, 6000.0);

        // 9 days: one week plus two days
        let long = machine_rental_cost(110, 72, 8);
        assert_eq!(long.days, 9);
        assert_eq!(long.cost, 9000.0);

        assert_eq!(machine_rental_cost(110, 0, 8).cost, 0.0);
        assert!(machine_rental_cost(40, 5, 8).machine.is_none());
    }

    #[test]
    fn test_joining_method_codes() {
        assert_eq!(JoiningMethod::from_code("Butt Fusion"), Some(JoiningMethod::ButtFusion));
        assert_eq!(JoiningMethod::from_code("electrofusion"), Some(JoiningMethod::Electrofusion));
        assert_eq!(JoiningMethod::from_code("socket"), None);
    }

    #[test]
    fn test_calculator_joint_cost_uses_config_rates() {
        let store = builtin_store();
        let cfg = ThermoplasticConfig { electrofusion_labor_rate_per_hour: 600.0, ..Default::default() };
        let calc = ThermoplasticCalculator::new(&store, &cfg);

        assert_eq!(calc.joint_cost(JoiningMethod::ButtFusion, 110).total_per_joint, 219.17);
        // 13 min at 600/h
        assert_eq!(calc.joint_cost(JoiningMethod::Electrofusion, 110).labor_cost, 130.0);
    }

    #[test]
    fn test_welded_pipe_cost() {
        let store = builtin_store();
        let cfg = ThermoplasticConfig::default();
        let calc = ThermoplasticCalculator::new(&store, &cfg);

        let butt = calc
            .welded_pipe_cost(&WeldedPipeCostInput {
                nominal_bore_mm: 110,
                sdr: 11.0,
                length_m: 30.0,
                price_per_kg: 2.0,
                method: JoiningMethod::ButtFusion,
            })
            .unwrap();
        assert_eq!(butt.material_cost, 180.0);
        assert_eq!(butt.joints.joint_count, 2);
        assert_eq!(butt.joint_cost, 438.34);
        assert_eq!(butt.total_cost, 618.34);
        assert_eq!(butt.machine_rental.cost, 1500.0);

        let ef: WeldedPipeCostInput =
            serde_json::from_str(r#"{"nominal_bore_mm":110,"sdr":11.0,"length_m":30.0,"price_per_kg":2.0,"method":"electrofusion"}"#)
                .unwrap();
        let ef = calc.welded_pipe_cost(&ef).unwrap();
        assert_eq!(ef.joint_cost, 811.66);
        assert!(ef.machine_rental.machine.is_none());
    }

    #[test]
    fn test_welded_pipe_cost_rejects_bad_sdr() {
        let store = builtin_store();
        let cfg = ThermoplasticConfig::default();
        let calc = ThermoplasticCalculator::new(&store, &cfg);
        let err = calc
            .welded_pipe_cost(&WeldedPipeCostInput {
                nominal_bore_mm: 110,
                sdr: 1.0,
                length_m: 30.0,
                price_per_kg: 2.0,
                method: JoiningMethod::default(),
            })
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
