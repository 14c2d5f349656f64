//! # PE Service Checks
//!
//! Whether a PE pipe is fit for its duty: the pressure rating derated for
//! operating temperature, the SDR checked against a required pressure with
//! an economical alternative when the margin is generous, and whether the
//! grade is offered at that SDR at all.
//!
//! Ratings are quoted at 20 °C. Above that the allowable pressure falls off
//! by the factors in [`TEMPERATURE_DERATING`], linearly between rows.

use serde::{Deserialize, Serialize};

use super::{pressure_rating, same, PolyethyleneGrade, ThermoplasticCalculator, SDR_SERIES};
use crate::units::round_to;

// ============================================================================
// Limits and Tables
// ============================================================================

/// PE turns brittle below this.
pub const MIN_OPERATING_TEMP_C: f64 = -40.0;

/// Highest temperature for continuous pressure service.
pub const MAX_CONTINUOUS_TEMP_C: f64 = 60.0;

/// `(°C, factor)` applied to the 20 °C rating.
pub const TEMPERATURE_DERATING: [(f64, f64); 5] = [(20.0, 1.0), (30.0, 0.87), (40.0, 0.74), (50.0, 0.62), (60.0, 0.5)];

/// Nominal pressure class (bar) per SDR as marked on pipe: `(sdr, PE80, PE100)`.
///
/// PE80 is not made in SDR 33 or 41.
const PN_CLASSES: [(f64, Option<f64>, f64); 9] = [
    (7.4, Some(20.0), 25.0),
    (9.0, Some(16.0), 20.0),
    (11.0, Some(12.5), 16.0),
    (13.6, Some(10.0), 12.5),
    (17.0, Some(8.0), 10.0),
    (21.0, Some(6.0), 8.0),
    (26.0, Some(5.0), 6.0),
    (33.0, None, 5.0),
    (41.0, None, 4.0),
];

/// A product or installation standard covering PE pipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeStandard {
    pub code: &'static str,
    pub title: &'static str,
    pub grades: &'static [PolyethyleneGrade],
    pub min_dn_mm: u32,
    pub max_dn_mm: u32,
}

const BOTH_GRADES: &[PolyethyleneGrade] = &[PolyethyleneGrade::Pe80, PolyethyleneGrade::Pe100];
const PE100_ONLY: &[PolyethyleneGrade] = &[PolyethyleneGrade::Pe100];

pub const PE_STANDARDS: [PeStandard; 9] = [
    PeStandard { code: "ASTM D3350", title: "PE plastics pipe and fittings materials", grades: BOTH_GRADES, min_dn_mm: 0, max_dn_mm: 0 },
    PeStandard { code: "ASTM F714", title: "PE plastic pipe (DR-PR) based on outside diameter", grades: BOTH_GRADES, min_dn_mm: 90, max_dn_mm: 1600 },
    PeStandard { code: "ASTM D3035", title: "PE plastic pipe (DR-PR) based on controlled outside diameter", grades: BOTH_GRADES, min_dn_mm: 20, max_dn_mm: 630 },
    PeStandard { code: "AWWA C906", title: "PE pressure pipe and fittings, 4 in. through 65 in.", grades: PE100_ONLY, min_dn_mm: 100, max_dn_mm: 1600 },
    PeStandard { code: "AWWA C901", title: "PE pressure pipe and tubing, 3/4 in. through 3 in.", grades: PE100_ONLY, min_dn_mm: 20, max_dn_mm: 90 },
    PeStandard { code: "ISO 4427", title: "Polyethylene pipes and fittings for water supply", grades: BOTH_GRADES, min_dn_mm: 16, max_dn_mm: 2500 },
    PeStandard { code: "EN 12201", title: "Polyethylene systems for water supply and drainage under pressure", grades: BOTH_GRADES, min_dn_mm: 16, max_dn_mm: 2500 },
    PeStandard { code: "ISO 4437", title: "Polyethylene pipes and fittings for gaseous fuels", grades: BOTH_GRADES, min_dn_mm: 16, max_dn_mm: 630 },
    PeStandard { code: "PPI TR-4", title: "Hydrostatic design basis listings for thermoplastic piping materials", grades: BOTH_GRADES, min_dn_mm: 0, max_dn_mm: 0 },
];

impl PeStandard {
    /// Material standards (no size range) cover every size.
    pub fn covers_size(&self, dn_mm: u32) -> bool {
        self.max_dn_mm == 0 || (self.min_dn_mm..=self.max_dn_mm).contains(&dn_mm)
    }
}

/// Standards listing `grade`, optionally narrowed to those covering `dn_mm`.
pub fn applicable_standards(grade: PolyethyleneGrade, dn_mm: Option<u32>) -> Vec<&'static str> {
    PE_STANDARDS
        .iter()
        .filter(|s| s.grades.contains(&grade))
        .filter(|s| dn_mm.map_or(true, |dn| s.covers_size(dn)))
        .map(|s| s.code)
        .collect()
}

// ============================================================================
// Pure Formulas
// ============================================================================

/// Share of the 20 °C rating allowed at `temperature_c`, 3 dp.
///
/// Flat at 1.0 up to 20 °C and at 0.5 from 60 °C.
pub fn derating_factor(temperature_c: f64) -> f64 {
    let (first_temp, first_factor) = TEMPERATURE_DERATING[0];
    if temperature_c <= first_temp {
        return first_factor;
    }
    for pair in TEMPERATURE_DERATING.windows(2) {
        let ((t0, f0), (t1, f1)) = (pair[0], pair[1]);
        if temperature_c <= t1 {
            return round_to(f0 + (f1 - f0) * (temperature_c - t0) / (t1 - t0), 3);
        }
    }
    TEMPERATURE_DERATING[TEMPERATURE_DERATING.len() - 1].1
}

/// Allowable pressure at temperature, 1 dp.
pub fn derated_pressure(base_rating_bar: f64, temperature_c: f64) -> f64 {
    round_to(base_rating_bar * derating_factor(temperature_c), 1)
}

/// Marked PN class for `grade` at `sdr`; `None` off the series or where the grade is not made.
pub fn pn_class(sdr: f64, grade: PolyethyleneGrade) -> Option<f64> {
    PN_CLASSES
        .iter()
        .find(|(s, _, _)| same(*s, sdr))
        .and_then(|(_, pe80, pe100)| match grade {
            PolyethyleneGrade::Pe80 => *pe80,
            PolyethyleneGrade::Pe100 => Some(*pe100),
        })
}

// ============================================================================
// Temperature and Pressure
// ============================================================================

/// Something that rules the pipe out of service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperatureIssue {
    BelowMinimum { limit_c: f64 },
    AboveMaximum { limit_c: f64 },
    RatingShortfall { derated_bar: f64, required_bar: f64 },
}

impl std::fmt::Display for TemperatureIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureIssue::BelowMinimum { limit_c } => {
                write!(f, "below the minimum operating temperature of {limit_c} °C; PE becomes brittle")
            }
            TemperatureIssue::AboveMaximum { limit_c } => {
                write!(f, "above the maximum continuous temperature of {limit_c} °C")
            }
            TemperatureIssue::RatingShortfall { derated_bar, required_bar } => {
                write!(f, "derated rating {derated_bar} bar is below the required {required_bar} bar")
            }
        }
    }
}

/// Acceptable, but worth a second look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperatureWarning {
    /// Above 40 °C with less than 80 % of the rating left
    HeavyDerating { factor: f64 },
    /// Under 1 bar of headroom after derating
    NarrowMargin { margin_bar: f64 },
}

impl std::fmt::Display for TemperatureWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureWarning::HeavyDerating { factor } => {
                write!(f, "heavy derating: only {:.0}% of the 20 °C rating remains", factor * 100.0)
            }
            TemperatureWarning::NarrowMargin { margin_bar } => {
                write!(f, "only {margin_bar} bar of margin after derating")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePressureCheck {
    pub temperature_c: f64,
    pub base_rating_bar: f64,
    pub derating_factor: f64,
    pub derated_rating_bar: f64,
    pub required_bar: f64,
    pub issues: Vec<TemperatureIssue>,
    pub warnings: Vec<TemperatureWarning>,
}

impl TemperaturePressureCheck {
    pub fn passes(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a 20 °C rating against a required pressure at operating temperature.
pub fn check_temperature_and_pressure(temperature_c: f64, base_rating_bar: f64, required_bar: f64) -> TemperaturePressureCheck {
    let factor = derating_factor(temperature_c);
    let derated = round_to(base_rating_bar * factor, 1);
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if temperature_c < MIN_OPERATING_TEMP_C {
        issues.push(TemperatureIssue::BelowMinimum { limit_c: MIN_OPERATING_TEMP_C });
    }
    if temperature_c > MAX_CONTINUOUS_TEMP_C {
        issues.push(TemperatureIssue::AboveMaximum { limit_c: MAX_CONTINUOUS_TEMP_C });
    }
    if derated < required_bar {
        issues.push(TemperatureIssue::RatingShortfall { derated_bar: derated, required_bar });
    }

    if temperature_c > 40.0 && factor < 0.8 {
        warnings.push(TemperatureWarning::HeavyDerating { factor });
    } else if temperature_c > 20.0 && derated >= required_bar && derated - required_bar < 1.0 {
        warnings.push(TemperatureWarning::NarrowMargin { margin_bar: round_to(derated - required_bar, 1) });
    }

    TemperaturePressureCheck {
        temperature_c,
        base_rating_bar,
        derating_factor: factor,
        derated_rating_bar: derated,
        required_bar,
        issues,
        warnings,
    }
}

// ============================================================================
// SDR Against Required Pressure
// ============================================================================

/// What to do about the chosen SDR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SdrAdvice {
    Adequate,
    /// Rated below the requirement; the thinnest wall that meets it
    UseThickerWall { sdr: f64 },
    /// Rated below the requirement and no standard SDR meets it
    NoStandardSdr,
    /// Margin above the economical threshold; a thinner wall still meets it
    ThinnerWallSuffices { sdr: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdrPressureCheck {
    pub sdr: f64,
    pub grade: PolyethyleneGrade,
    pub rated_bar: f64,
    pub required_bar: f64,
    /// Rated minus required, 1 dp
    pub margin_bar: f64,
    /// Margin over required, whole percent
    pub margin_pct: f64,
    pub advice: SdrAdvice,
}

impl SdrPressureCheck {
    pub fn passes(&self) -> bool {
        self.rated_bar >= self.required_bar
    }
}

// ============================================================================
// Grade and SDR Compatibility
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityIssue {
    /// SDR outside the standard series
    NonStandardSdr,
    /// Series SDR the grade is not made in
    NotMadeInGrade,
}

impl std::fmt::Display for CompatibilityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompatibilityIssue::NonStandardSdr => write!(f, "SDR is not in the standard series"),
            CompatibilityIssue::NotMadeInGrade => write!(f, "grade is not produced at this SDR; consider PE100"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSdrCompatibility {
    pub grade: PolyethyleneGrade,
    pub sdr: f64,
    pub pn_class: Option<f64>,
    pub issues: Vec<CompatibilityIssue>,
    pub applicable_standards: Vec<&'static str>,
}

impl GradeSdrCompatibility {
    /// A grade not made at a series SDR is a warning, not a rejection.
    pub fn compatible(&self) -> bool {
        !self.issues.contains(&CompatibilityIssue::NonStandardSdr)
    }
}

/// Whether `grade` is offered at `sdr`, and under which standards.
pub fn check_grade_sdr_compatibility(grade: PolyethyleneGrade, sdr: f64) -> GradeSdrCompatibility {
    if !SDR_SERIES.iter().any(|s| same(*s, sdr)) {
        return GradeSdrCompatibility {
            grade,
            sdr,
            pn_class: None,
            issues: vec![CompatibilityIssue::NonStandardSdr],
            applicable_standards: Vec::new(),
        };
    }

    let pn_class = pn_class(sdr, grade);
    let issues = if pn_class.is_none() { vec![CompatibilityIssue::NotMadeInGrade] } else { Vec::new() };

    GradeSdrCompatibility {
        grade,
        sdr,
        pn_class,
        issues,
        applicable_standards: applicable_standards(grade, None),
    }
}

// ============================================================================
// Combined Check
// ============================================================================

/// Duty a PE pipe must serve.
///
/// ## JSON Example
///
/// ```json
/// {
///   "grade": "PE100",
///   "sdr": 11.0,
///   "required_bar": 10.0,
///   "temperature_c": 30.0
/// }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ServiceConditions {
    pub grade: PolyethyleneGrade,
    pub sdr: f64,
    pub required_bar: f64,
    /// 20 °C when omitted
    #[serde(default = "default_temperature")]
    pub temperature_c: f64,
}

fn default_temperature() -> f64 {
    20.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCheck {
    pub pressure: SdrPressureCheck,
    pub compatibility: GradeSdrCompatibility,
    pub temperature: TemperaturePressureCheck,
}

impl ServiceCheck {
    pub fn passes(&self) -> bool {
        self.pressure.passes() && self.compatibility.compatible() && self.temperature.passes()
    }
}

impl ThermoplasticCalculator<'_> {
    /// Rate `sdr` in `grade` and compare with `required_bar`.
    ///
    /// A shortfall names the thinnest standard wall that meets the duty. A
    /// margin above `economical_margin_pct` names the thinnest wall that
    /// still does.
    pub fn check_sdr_for_pressure(&self, sdr: f64, grade: PolyethyleneGrade, required_bar: f64) -> SdrPressureCheck {
        let coefficient = self.config.design_coefficient;
        let rated = pressure_rating(sdr, grade, coefficient);
        let margin = rated - required_bar;
        let margin_pct = if required_bar > 0.0 { round_to(margin / required_bar * 100.0, 0) } else { 0.0 };
        let meets = |s: &f64| pressure_rating(*s, grade, coefficient) >= required_bar;

        let advice = if rated < required_bar {
            match SDR_SERIES.iter().rev().find(|s| meets(s)) {
                Some(&thicker) => SdrAdvice::UseThickerWall { sdr: thicker },
                None => SdrAdvice::NoStandardSdr,
            }
        } else if margin_pct > self.config.economical_margin_pct {
            SDR_SERIES
                .iter()
                .filter(|s| **s > sdr && meets(s))
                .copied()
                .reduce(f64::min)
                .map_or(SdrAdvice::Adequate, |thinner| SdrAdvice::ThinnerWallSuffices { sdr: thinner })
        } else {
            SdrAdvice::Adequate
        };

        SdrPressureCheck {
            sdr,
            grade,
            rated_bar: rated,
            required_bar,
            margin_bar: round_to(margin, 1),
            margin_pct,
            advice,
        }
    }

    pub fn check_grade_sdr_compatibility(&self, grade: PolyethyleneGrade, sdr: f64) -> GradeSdrCompatibility {
        check_grade_sdr_compatibility(grade, sdr)
    }

    /// Derate the formula rating of `sdr` in `grade` to `temperature_c`.
    pub fn check_temperature_and_pressure(
        &self,
        sdr: f64,
        grade: PolyethyleneGrade,
        temperature_c: f64,
        required_bar: f64,
    ) -> TemperaturePressureCheck {
        let base = pressure_rating(sdr, grade, self.config.design_coefficient);
        check_temperature_and_pressure(temperature_c, base, required_bar)
    }

    /// All three checks for one duty.
    pub fn check_service(&self, conditions: &ServiceConditions) -> ServiceCheck {
        let ServiceConditions { grade, sdr, required_bar, temperature_c } = *conditions;
        ServiceCheck {
            pressure: self.check_sdr_for_pressure(sdr, grade, required_bar),
            compatibility: check_grade_sdr_compatibility(grade, sdr),
            temperature: self.check_temperature_and_pressure(sdr, grade, temperature_c, required_bar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThermoplasticConfig;
    use crate::reference::builtin_store;

    #[test]
    fn test_derating_factor_interpolates() {
        assert_eq!(derating_factor(20.0), 1.0);
        assert_eq!(derating_factor(-10.0), 1.0);
        assert_eq!(derating_factor(25.0), 0.935);
        assert_eq!(derating_factor(40.0), 0.74);
        assert_eq!(derating_factor(45.0), 0.68);
        assert_eq!(derating_factor(60.0), 0.5);
        assert_eq!(derating_factor(75.0), 0.5);
    }

    #[test]
    fn test_derated_pressure() {
        assert_eq!(derated_pressure(10.0, 40.0), 7.4);
        assert_eq!(derated_pressure(16.0, 20.0), 16.0);
    }

    #[test]
    fn test_temperature_check_within_limits() {
        let check = check_temperature_and_pressure(25.0, 10.0, 8.0);
        assert!(check.passes());
        assert_eq!(check.derated_rating_bar, 9.4);
        assert!(check.warnings.is_empty());
    }

    #[test]
    fn test_temperature_check_shortfall_at_50c() {
        let check = check_temperature_and_pressure(50.0, 10.0, 8.0);
        assert!(!check.passes());
        assert_eq!(check.derated_rating_bar, 6.2);
        assert_eq!(
            check.issues,
            vec![TemperatureIssue::RatingShortfall { derated_bar: 6.2, required_bar: 8.0 }]
        );
        assert_eq!(check.warnings, vec![TemperatureWarning::HeavyDerating { factor: 0.62 }]);
    }

    #[test]
    fn test_temperature_check_out_of_range() {
        let hot = check_temperature_and_pressure(70.0, 10.0, 4.0);
        assert_eq!(hot.issues, vec![TemperatureIssue::AboveMaximum { limit_c: 60.0 }]);

        let cold = check_temperature_and_pressure(-50.0, 10.0, 8.0);
        assert_eq!(cold.issues, vec![TemperatureIssue::BelowMinimum { limit_c: -40.0 }]);
        assert!(cold.issues[0].to_string().contains("brittle"));
    }

    #[test]
    fn test_temperature_check_narrow_margin() {
        let check = check_temperature_and_pressure(30.0, 10.0, 8.5);
        assert!(check.passes());
        assert_eq!(check.warnings, vec![TemperatureWarning::NarrowMargin { margin_bar: 0.2 }]);
    }

    #[test]
    fn test_pn_class_by_grade() {
        assert_eq!(pn_class(11.0, PolyethyleneGrade::Pe100), Some(16.0));
        assert_eq!(pn_class(13.6, PolyethyleneGrade::Pe100), Some(12.5));
        assert_eq!(pn_class(11.0, PolyethyleneGrade::Pe80), Some(12.5));
        assert_eq!(pn_class(33.0, PolyethyleneGrade::Pe80), None);
        assert_eq!(pn_class(15.0, PolyethyleneGrade::Pe100), None);
    }

    #[test]
    fn test_sdr_check_suggests_economical_wall() {
        let store = builtin_store();
        let cfg = ThermoplasticConfig::default();
        let calc = ThermoplasticCalculator::new(&store, &cfg);

        let check = calc.check_sdr_for_pressure(11.0, PolyethyleneGrade::Pe100, 6.0);
        assert!(check.passes());
        assert_eq!(check.rated_bar, 16.0);
        assert_eq!(check.margin_bar, 10.0);
        assert_eq!(check.margin_pct, 167.0);
        assert_eq!(check.advice, SdrAdvice::ThinnerWallSuffices { sdr: 13.6 });
    }

    #[test]
    fn test_sdr_check_shortfall_names_thicker_wall() {
        let store = builtin_store();
        let cfg = ThermoplasticConfig::default();
        let calc = ThermoplasticCalculator::new(&store, &cfg);

        let check = calc.check_sdr_for_pressure(26.0, PolyethyleneGrade::Pe100, 8.0);
        assert!(!check.passes());
        assert_eq!(check.margin_bar, -1.6);
        assert_eq!(check.advice, SdrAdvice::UseThickerWall { sdr: 21.0 });

        let hopeless = calc.check_sdr_for_pressure(11.0, PolyethyleneGrade::Pe80, 30.0);
        assert_eq!(hopeless.advice, SdrAdvice::NoStandardSdr);
    }

    #[test]
    fn test_sdr_check_modest_margin_is_adequate() {
        let store = builtin_store();
        let cfg = ThermoplasticConfig::default();
        let calc = ThermoplasticCalculator::new(&store, &cfg);

        let check = calc.check_sdr_for_pressure(17.0, PolyethyleneGrade::Pe100, 8.0);
        assert_eq!(check.margin_pct, 25.0);
        assert_eq!(check.advice, SdrAdvice::Adequate);
    }

    #[test]
    fn test_grade_sdr_compatibility() {
        let pe100 = check_grade_sdr_compatibility(PolyethyleneGrade::Pe100, 17.0);
        assert!(pe100.compatible());
        assert!(pe100.issues.is_empty());
        assert_eq!(pe100.pn_class, Some(10.0));
        assert_eq!(pe100.applicable_standards.len(), 9);
        assert!(pe100.applicable_standards.contains(&"AWWA C906"));

        let pe80 = check_grade_sdr_compatibility(PolyethyleneGrade::Pe80, 33.0);
        assert!(pe80.compatible());
        assert_eq!(pe80.issues, vec![CompatibilityIssue::NotMadeInGrade]);
        assert_eq!(pe80.applicable_standards.len(), 7);
        assert!(!pe80.applicable_standards.contains(&"AWWA C906"));

        let odd = check_grade_sdr_compatibility(PolyethyleneGrade::Pe100, 15.0);
        assert!(!odd.compatible());
        assert!(odd.applicable_standards.is_empty());
    }

    #[test]
    fn test_standards_narrowed_by_size() {
        let small = applicable_standards(PolyethyleneGrade::Pe100, Some(63));
        assert!(small.contains(&"AWWA C901"));
        assert!(!small.contains(&"AWWA C906"));
        assert!(!small.contains(&"ASTM F714"));
        assert!(small.contains(&"PPI TR-4"));
    }

    #[test]
    fn test_service_check_combines_all_three() {
        let store = builtin_store();
        let cfg = ThermoplasticConfig::default();
        let calc = ThermoplasticCalculator::new(&store, &cfg);

        let fine = calc.check_service(&ServiceConditions {
            grade: PolyethyleneGrade::Pe100,
            sdr: 11.0,
            required_bar: 10.0,
            temperature_c: 30.0,
        });
        // 16.0 × 0.87 = 13.9
        assert_eq!(fine.temperature.derated_rating_bar, 13.9);
        assert!(fine.passes());

        let hot: ServiceConditions =
            serde_json::from_str(r#"{"grade":"PE100","sdr":17.0,"required_bar":8.0,"temperature_c":45.0}"#).unwrap();
        let check = calc.check_service(&hot);
        assert!(check.pressure.passes());
        assert!(!check.temperature.passes());
        assert!(!check.passes());
    }
}
