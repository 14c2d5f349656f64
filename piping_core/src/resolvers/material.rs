//! # Material Group and P-T Ratings
//!
//! Maps free-text pipe or flange material specifications onto the P-T
//! rating material groups, and reads ratings off the catalogued curves.
//!
//! Mapping is an ordered pattern list. The upper-cased input is scanned
//! top-down and the first contained pattern wins, so every pattern sits
//! above any shorter pattern it contains (`"A335 P91"` above `"A335 P9"`,
//! `"A182 F51"` above `"A182 F5"`, `"TP410S"` above `"TP410"`).
//!
//! ## Example
//!
//! ```rust
//! use piping_core::resolvers::material::pt_rating_material_group;
//!
//! assert_eq!(pt_rating_material_group("ASTM A335 P22 Pipe"), "Low Alloy Steel F22 (Group 1.10)");
//! assert_eq!(pt_rating_material_group("ss pipe"), "Stainless Steel 304 (Group 2.1)");
//! assert_eq!(pt_rating_material_group(""), "Carbon Steel A105 (Group 1.1)");
//! ```

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::reference::entities::RowId;
use crate::reference::store::ReferenceDataStore;
use crate::units::round_to;

pub const DEFAULT_MATERIAL_GROUP: &str = "Carbon Steel A105 (Group 1.1)";
pub const DEFAULT_STAINLESS_GROUP: &str = "Stainless Steel 304 (Group 2.1)";
pub const DEFAULT_ASME_GROUP: &str = "1.1";

/// One row of the ordered mapping list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialGroupMapping {
    pub pattern: &'static str,
    pub material_group: &'static str,
    pub asme_group: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pattern_upper: String,
}

/// `(pattern, P-T material group, ASME group, description)`, in match order.
const MAPPINGS: [(&str, &str, &str, &str); 123] = [
    ("A105", "Carbon Steel A105 (Group 1.1)", "1.1", "Forged carbon steel flanges"),
    ("A106", "Carbon Steel A105 (Group 1.1)", "1.1", "Seamless carbon steel pipe (use A105 for flanges)"),
    ("A53", "Carbon Steel A105 (Group 1.1)", "1.1", "Welded/seamless carbon steel pipe (use A105 for flanges)"),
    ("API 5L", "Carbon Steel A105 (Group 1.1)", "1.1", "Line pipe (use A105 for flanges)"),
    ("SABS 62", "Carbon Steel A105 (Group 1.1)", "1.1", "SA ERW pipe (use A105 for flanges)"),
    ("SABS 719", "Carbon Steel A105 (Group 1.1)", "1.1", "SA large bore ERW pipe (use A105 for flanges)"),
    ("A333 Gr. 3", "Nickel Alloy Steel LF3 (Group 9A)", "9A", "3.5% Nickel low-temp pipe (use A350 LF3 for flanges). P-No. 9A."),
    ("A333 Gr. 4", "Nickel Alloy Steel LF3 (Group 9A)", "9A", "0.75% Nickel low-temp pipe (use A350 LF2 for flanges). P-No. 9A."),
    ("A333 Gr. 7", "Nickel Alloy Steel LF3 (Group 9A)", "9A", "2.5% Nickel low-temp pipe (use A350 LF3 for flanges). P-No. 9A."),
    ("A333 Gr. 5", "9% Nickel Steel (Group 11A)", "11A", "9% Nickel cryogenic pipe. P-No. 11A."),
    ("A333 Gr. 8", "9% Nickel Steel (Group 11A)", "11A", "9% Nickel cryogenic pipe. P-No. 11A."),
    ("A333 Gr. 6", "Carbon Steel A105 (Group 1.1)", "1.1", "Low-temp carbon steel (use A350 LF2 for flanges). P-No. 1."),
    ("A333 Gr. 1", "Carbon Steel A105 (Group 1.1)", "1.1", "Low-temp carbon steel (use A350 LF2 for flanges). P-No. 1."),
    ("A333", "Carbon Steel A105 (Group 1.1)", "1.1", "Low-temp carbon steel (use A350 LF2 for flanges). Specify grade for nickel alloy steels."),
    ("A350 LF3", "Nickel Alloy Steel LF3 (Group 9A)", "9A", "3.5% Nickel forged flanges for A333 Gr 3/7. P-No. 9A."),
    ("A350 LF2", "Carbon Steel A105 (Group 1.1)", "1.1", "Low-temp carbon steel forged flanges. P-No. 1."),
    ("A420 WPL3", "Nickel Alloy Steel LF3 (Group 9A)", "9A", "3.5% Nickel wrought fittings for A333 Gr 3. P-No. 9A."),
    ("A420 WPL6", "Carbon Steel A105 (Group 1.1)", "1.1", "Low-temp carbon steel wrought fittings. P-No. 1."),
    ("A335 P11", "Low Alloy Steel F11 (Group 1.9)", "1.9", "1.25Cr-0.5Mo alloy pipe"),
    ("A335 P12", "Low Alloy Steel F11 (Group 1.9)", "1.9", "1Cr-0.5Mo alloy pipe"),
    ("A335 P22", "Low Alloy Steel F22 (Group 1.10)", "1.10", "2.25Cr-1Mo alloy pipe"),
    ("A335 P5", "Low Alloy Steel F22 (Group 1.10)", "1.10", "5Cr-0.5Mo alloy pipe"),
    ("A335 P91", "Low Alloy Steel F91 (Group 1.14)", "1.14", "9Cr-1Mo-V advanced alloy pipe"),
    ("A335 P9", "Low Alloy Steel F22 (Group 1.10)", "1.10", "9Cr-1Mo alloy pipe"),
    ("TP304", "Stainless Steel 304 (Group 2.1)", "2.1", "Austenitic SS 18Cr-8Ni"),
    ("304L", "Stainless Steel 304 (Group 2.1)", "2.1", "Low carbon austenitic SS"),
    ("SS-304", "Stainless Steel 304 (Group 2.1)", "2.1", "Stainless Steel 304 (code)"),
    ("TP316", "Stainless Steel 316 (Group 2.2)", "2.2", "Austenitic SS 16Cr-12Ni-2Mo"),
    ("316L", "Stainless Steel 316 (Group 2.2)", "2.2", "Low carbon molybdenum SS"),
    ("SS-316", "Stainless Steel 316 (Group 2.2)", "2.2", "Stainless Steel 316 (code)"),
    ("TP321", "Stainless Steel 321 (Group 2.2)", "2.2", "Ti-stabilized austenitic SS"),
    ("TP347", "Stainless Steel 347 (Group 2.2)", "2.2", "Nb-stabilized austenitic SS"),
    ("TP405", "Ferritic Stainless Steel (Group 7.1)", "7.1", "12Cr ferritic stainless steel"),
    ("TP409", "Ferritic Stainless Steel (Group 7.1)", "7.1", "11Cr-Ti ferritic stainless steel"),
    ("TP430", "Ferritic Stainless Steel (Group 7.1)", "7.1", "17Cr ferritic stainless steel"),
    ("TP434", "Ferritic Stainless Steel (Group 7.1)", "7.1", "17Cr-1Mo ferritic stainless steel"),
    ("TP410S", "Martensitic Stainless Steel (Group 6.1)", "6.1", "13Cr low-carbon martensitic stainless steel"),
    ("TP410", "Martensitic Stainless Steel (Group 6.1)", "6.1", "13Cr martensitic stainless steel"),
    ("TP420", "Martensitic Stainless Steel (Group 6.3)", "6.3", "13Cr high-carbon martensitic stainless steel"),
    ("A268", "Ferritic Stainless Steel (Group 7.1)", "7.1", "Ferritic/martensitic stainless steel tubing"),
    ("Ferritic", "Ferritic Stainless Steel (Group 7.1)", "7.1", "Generic ferritic stainless steel"),
    ("Martensitic", "Martensitic Stainless Steel (Group 6.1)", "6.1", "Generic martensitic stainless steel"),
    ("A790 S31803", "Duplex Stainless Steel F51 (Group 3.2)", "3.2", "Duplex 2205 (UNS S31803)"),
    ("A790 S32205", "Duplex Stainless Steel F51 (Group 3.2)", "3.2", "Duplex 2205 (UNS S32205)"),
    ("A790 S32750", "Super Duplex Stainless Steel F55 (Group 3.3)", "3.3", "Super Duplex 2507 (UNS S32750)"),
    ("A790", "Duplex Stainless Steel F51 (Group 3.2)", "3.2", "Duplex stainless steel pipe"),
    ("S31803", "Duplex Stainless Steel F51 (Group 3.2)", "3.2", "Duplex 2205 (UNS S31803)"),
    ("S32205", "Duplex Stainless Steel F51 (Group 3.2)", "3.2", "Duplex 2205 (UNS S32205)"),
    ("S32750", "Super Duplex Stainless Steel F55 (Group 3.3)", "3.3", "Super Duplex 2507 (UNS S32750)"),
    ("S32707", "Hyper Duplex Stainless Steel (Group 3.4)", "3.4", "Hyper Duplex 27Cr-7Ni-5Mo"),
    ("Hyper Duplex", "Hyper Duplex Stainless Steel (Group 3.4)", "3.4", "Hyper Duplex stainless steel"),
    ("Super Duplex", "Super Duplex Stainless Steel F55 (Group 3.3)", "3.3", "Super Duplex stainless steel"),
    ("Duplex", "Duplex Stainless Steel F51 (Group 3.2)", "3.2", "Generic duplex stainless steel"),
    ("EN 10216", "Carbon Steel A105 (Group 1.1)", "1.1", "European seamless steel tube"),
    ("EN 10217", "Carbon Steel A105 (Group 1.1)", "1.1", "European welded steel tube"),
    ("EN 10255", "Carbon Steel A105 (Group 1.1)", "1.1", "European ERW tube (similar to SABS 62)"),
    ("A358", "Stainless Steel 304 (Group 2.1)", "2.1", "Welded stainless steel pipe"),
    ("A182 F51", "Duplex Stainless Steel F51 (Group 3.2)", "3.2", "Duplex 2205 forged flange"),
    ("A182 F53", "Super Duplex Stainless Steel F55 (Group 3.3)", "3.3", "Super Duplex 2507 forged flange"),
    ("A182 F55", "Super Duplex Stainless Steel F55 (Group 3.3)", "3.3", "Super Duplex Zeron 100 forged flange"),
    ("A182 F5", "Alloy Steel A182 F5 (Group 1.9)", "1.9", "5Cr-0.5Mo forged flange"),
    ("A182 F91", "Alloy Steel A182 F91 (Group 1.14)", "1.14", "9Cr-1Mo-V forged flange"),
    ("A182 F9", "Alloy Steel A182 F9 (Group 1.10)", "1.10", "9Cr-1Mo forged flange"),
    ("A182 F11", "Low Alloy Steel F11 (Group 1.9)", "1.9", "1.25Cr-0.5Mo forged flange"),
    ("A182 F22", "Low Alloy Steel F22 (Group 1.10)", "1.10", "2.25Cr-1Mo forged flange"),
    ("F304", "Stainless Steel 304 (Group 2.1)", "2.1", "304 SS forged flange"),
    ("F316", "Stainless Steel 316 (Group 2.2)", "2.2", "316 SS forged flange"),
    ("Incoloy 800", "Incoloy 800/800H (Group 4.4)", "4.4", "Nickel-iron-chromium alloy"),
    ("Incoloy", "Incoloy 800/800H (Group 4.4)", "4.4", "Generic Incoloy alloy"),
    ("Titanium Gr. 2", "Titanium Grade 2 (Group 5.1)", "5.1", "Commercially pure titanium"),
    ("Titanium", "Titanium Grade 2 (Group 5.1)", "5.1", "Generic titanium (defaults to Gr. 2)"),
    ("Inconel 625", "Inconel 625 (Group 4.1)", "4.1", "Nickel-chromium-molybdenum superalloy"),
    ("Inconel", "Inconel 625 (Group 4.1)", "4.1", "Generic Inconel alloy"),
    ("Hastelloy C-276", "Hastelloy C276 (Group 4.3)", "4.3", "Nickel-molybdenum-chromium superalloy"),
    ("Hastelloy", "Hastelloy C276 (Group 4.3)", "4.3", "Corrosion-resistant nickel alloy"),
    ("Monel 400", "Monel 400 (Group 4.2)", "4.2", "Nickel-copper alloy 67Ni-30Cu"),
    ("Monel", "Monel 400 (Group 4.2)", "4.2", "Nickel-copper alloy"),
    ("Nickel 200", "Nickel 200 (Group 4.5)", "4.5", "Commercially pure nickel"),
    ("Nickel 201", "Nickel 200 (Group 4.5)", "4.5", "Low-carbon nickel"),
    ("Nickel", "Nickel 200 (Group 4.5)", "4.5", "Generic pure nickel"),
    ("Cu-Ni 90-10", "Copper-Nickel 90-10 (Group 4.6)", "4.6", "90% Copper, 10% Nickel marine alloy"),
    ("Cu-Ni 70-30", "Copper-Nickel 70-30 (Group 4.7)", "4.7", "70% Copper, 30% Nickel marine alloy"),
    ("C70600", "Copper-Nickel 90-10 (Group 4.6)", "4.6", "UNS C70600 Cu-Ni 90-10"),
    ("C71500", "Copper-Nickel 70-30 (Group 4.7)", "4.7", "UNS C71500 Cu-Ni 70-30"),
    ("B466", "Copper-Nickel 90-10 (Group 4.6)", "4.6", "Cu-Ni seamless pipe"),
    ("A387", "Low Alloy Steel F22 (Group 1.10)", "1.10", "Chrome-moly pressure vessel plate"),
    ("A420", "Carbon Steel A105 (Group 1.1)", "1.1", "Low-temp wrought fittings"),
    ("A369", "Low Alloy Steel F11 (Group 1.9)", "1.9", "Forged alloy pipe"),
    ("A210", "Carbon Steel A105 (Group 1.1)", "1.1", "Boiler/superheater tubes"),
    ("A214", "Carbon Steel A105 (Group 1.1)", "1.1", "ERW heat exchanger tubes"),
    ("A334", "Carbon Steel A105 (Group 1.1)", "1.1", "Low-temp heat exchanger tubes"),
    ("DIN 2448", "Carbon Steel A105 (Group 1.1)", "1.1", "German seamless carbon steel pipe"),
    ("DIN 2458", "Carbon Steel A105 (Group 1.1)", "1.1", "German welded carbon steel pipe"),
    ("DIN 2391", "Carbon Steel A105 (Group 1.1)", "1.1", "German precision seamless steel tube"),
    ("St35.8", "Carbon Steel A105 (Group 1.1)", "1.1", "DIN carbon steel grade"),
    ("St37.0", "Carbon Steel A105 (Group 1.1)", "1.1", "DIN structural carbon steel grade"),
    ("St45.8", "Carbon Steel A105 (Group 1.1)", "1.1", "DIN high-strength carbon steel grade"),
    ("St52", "Carbon Steel A105 (Group 1.1)", "1.1", "DIN high-strength structural steel grade"),
    ("1.4301", "Stainless Steel 304 (Group 2.1)", "2.1", "EN/DIN 304 equivalent (X5CrNi18-10)"),
    ("1.4306", "Stainless Steel 304 (Group 2.1)", "2.1", "EN/DIN 304L equivalent (X2CrNi19-11)"),
    ("1.4401", "Stainless Steel 316 (Group 2.2)", "2.2", "EN/DIN 316 equivalent (X5CrNiMo17-12-2)"),
    ("1.4404", "Stainless Steel 316 (Group 2.2)", "2.2", "EN/DIN 316L equivalent (X2CrNiMo17-12-2)"),
    ("1.4462", "Duplex Stainless Steel F51 (Group 3.2)", "3.2", "EN/DIN Duplex 2205 equivalent"),
    ("1.4410", "Super Duplex Stainless Steel F55 (Group 3.3)", "3.3", "EN/DIN Super Duplex 2507 equivalent"),
    ("JIS G3454", "Carbon Steel A105 (Group 1.1)", "1.1", "Japanese carbon steel pipe for pressure service"),
    ("JIS G3456", "Carbon Steel A105 (Group 1.1)", "1.1", "Japanese high-temp carbon steel pipe"),
    ("JIS G3459", "Stainless Steel 304 (Group 2.1)", "2.1", "Japanese stainless steel pipe"),
    ("STPG370", "Carbon Steel A105 (Group 1.1)", "1.1", "JIS carbon steel grade (equivalent to A106 Gr B)"),
    ("STPG410", "Carbon Steel A105 (Group 1.1)", "1.1", "JIS high-strength carbon steel grade"),
    ("STPH370", "Carbon Steel A105 (Group 1.1)", "1.1", "JIS high-temp carbon steel grade"),
    ("SUS304", "Stainless Steel 304 (Group 2.1)", "2.1", "JIS 304 stainless steel"),
    ("SUS316", "Stainless Steel 316 (Group 2.2)", "2.2", "JIS 316 stainless steel"),
    ("SUS321", "Stainless Steel 321 (Group 2.2)", "2.2", "JIS 321 stainless steel"),
    ("GB/T 8163", "Carbon Steel A105 (Group 1.1)", "1.1", "Chinese seamless carbon steel pipe"),
    ("GB/T 9711", "Carbon Steel A105 (Group 1.1)", "1.1", "Chinese line pipe (equivalent to API 5L)"),
    ("GB/T 14976", "Stainless Steel 304 (Group 2.1)", "2.1", "Chinese stainless steel pipe"),
    ("20#", "Carbon Steel A105 (Group 1.1)", "1.1", "Chinese carbon steel grade (equivalent to A106 Gr A)"),
    ("45#", "Carbon Steel A105 (Group 1.1)", "1.1", "Chinese medium carbon steel grade"),
    ("Q345", "Carbon Steel A105 (Group 1.1)", "1.1", "Chinese structural steel grade"),
    ("0Cr18Ni9", "Stainless Steel 304 (Group 2.1)", "2.1", "Chinese 304 stainless equivalent"),
    ("0Cr17Ni12Mo2", "Stainless Steel 316 (Group 2.2)", "2.2", "Chinese 316 stainless equivalent"),
    ("Carbon Steel", "Carbon Steel A105 (Group 1.1)", "1.1", "Generic carbon steel"),
    ("Stainless Steel", "Stainless Steel 304 (Group 2.1)", "2.1", "Generic stainless steel (defaults to 304)"),
];

static MATERIAL_GROUP_MAPPINGS: Lazy<Vec<MaterialGroupMapping>> = Lazy::new(|| {
    MAPPINGS
        .iter()
        .map(|&(pattern, material_group, asme_group, description)| MaterialGroupMapping {
            pattern,
            material_group,
            asme_group,
            description,
            pattern_upper: pattern.to_uppercase(),
        })
        .collect()
});

/// The mapping list in match order.
pub fn material_group_mappings() -> &'static [MaterialGroupMapping] {
    &MATERIAL_GROUP_MAPPINGS
}

fn first_mapping(spec_text: &str) -> Option<&'static MaterialGroupMapping> {
    let upper = spec_text.to_uppercase();
    MATERIAL_GROUP_MAPPINGS
        .iter()
        .find(|m| upper.contains(&m.pattern_upper))
}

/// P-T material group for a material specification.
///
/// Unmatched text containing `STAINLESS` or `SS` maps to the 304 group;
/// anything else, including empty input, to carbon steel A105.
pub fn pt_rating_material_group(spec_text: &str) -> &'static str {
    if spec_text.trim().is_empty() {
        return DEFAULT_MATERIAL_GROUP;
    }
    if let Some(mapping) = first_mapping(spec_text) {
        return mapping.material_group;
    }
    let upper = spec_text.to_uppercase();
    if upper.contains("STAINLESS") || upper.contains("SS") {
        DEFAULT_STAINLESS_GROUP
    } else {
        DEFAULT_MATERIAL_GROUP
    }
}

/// ASME B16.5 material group number (`"1.1"`, `"2.2"`, `"9A"`), default `"1.1"`.
pub fn asme_group_number(spec_text: &str) -> &'static str {
    if spec_text.trim().is_empty() {
        return DEFAULT_ASME_GROUP;
    }
    first_mapping(spec_text)
        .map(|m| m.asme_group)
        .unwrap_or(DEFAULT_ASME_GROUP)
}

/// Every distinct material group, in first-seen order.
pub fn available_pt_rating_groups() -> Vec<&'static str> {
    let mut groups: Vec<&'static str> = Vec::new();
    for mapping in MATERIAL_GROUP_MAPPINGS.iter() {
        if !groups.contains(&mapping.material_group) {
            groups.push(mapping.material_group);
        }
    }
    groups
}

// ============================================================================
// P-T Ratings
// ============================================================================

const B16_47_STANDARDS: [&str; 2] = ["ASME B16.47A", "ASME B16.47B"];

/// B16.47 designation → (B16.5 designation, pressure factor).
const B16_47_CROSS_MAP: [(&str, &str, f64); 6] = [
    ("75", "150", 0.5),
    ("150", "150", 1.0),
    ("300", "300", 1.0),
    ("400", "400", 1.0),
    ("600", "600", 1.0),
    ("900", "900", 1.0),
];

/// Rating in bar at exactly `temperature_celsius`, `None` when not catalogued.
pub fn pt_rating(
    store: &ReferenceDataStore,
    pressure_class_id: RowId,
    material_group: &str,
    temperature_celsius: i32,
) -> Option<f64> {
    store.pt_rating(pressure_class_id, material_group, temperature_celsius)
}

/// Rating for a class named by standard and designation.
///
/// B16.47 classes with no curve of their own for `material_group` are read
/// off the matching B16.5 class, scaled by the cross-map factor.
pub fn pt_rating_for(
    store: &ReferenceDataStore,
    standard_code: &str,
    designation: &str,
    material_group: &str,
    temperature_celsius: i32,
) -> Option<f64> {
    let class = store.pressure_class_by_designation(standard_code, designation);
    if let Some(class) = class {
        if store.pt_curve(class.id, material_group).is_some() {
            return store.pt_rating(class.id, material_group, temperature_celsius);
        }
    }

    if !B16_47_STANDARDS.contains(&standard_code.trim()) {
        return None;
    }
    let designation = class.map(|c| c.designation.as_str()).unwrap_or(designation.trim());
    let (_, b16_5_designation, factor) = B16_47_CROSS_MAP.iter().find(|(d, _, _)| *d == designation)?;
    let b16_5 = store.pressure_class_by_designation("ASME B16.5", b16_5_designation)?;
    store
        .pt_rating(b16_5.id, material_group, temperature_celsius)
        .map(|bar| round_to(bar * factor, 1))
}

/// Catalogued temperatures for a curve, ascending. Empty when there is no curve.
pub fn catalogued_temperatures(store: &ReferenceDataStore, pressure_class_id: RowId, material_group: &str) -> Vec<i32> {
    store
        .pt_curve(pressure_class_id, material_group)
        .map(|curve| curve.keys().copied().collect())
        .unwrap_or_default()
}

/// Smallest catalogued temperature at or above `temperature_celsius`.
///
/// Rating at the snapped temperature is never higher than at the requested
/// one on a monotone curve, so callers can use it as a conservative stand-in.
pub fn snap_temperature_up(
    store: &ReferenceDataStore,
    pressure_class_id: RowId,
    material_group: &str,
    temperature_celsius: i32,
) -> Option<i32> {
    store
        .pt_curve(pressure_class_id, material_group)?
        .range(temperature_celsius..)
        .next()
        .map(|(t, _)| *t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::builtin_store;

    #[test]
    fn test_specific_patterns_win() {
        assert_eq!(pt_rating_material_group("A333 Gr. 3 Seamless"), "Nickel Alloy Steel LF3 (Group 9A)");
        assert_eq!(pt_rating_material_group("A333 Gr. 6"), "Carbon Steel A105 (Group 1.1)");
        assert_eq!(pt_rating_material_group("A335 P91"), "Low Alloy Steel F91 (Group 1.14)");
        assert_eq!(pt_rating_material_group("A335 P9"), "Low Alloy Steel F22 (Group 1.10)");
        assert_eq!(pt_rating_material_group("A790 S32750"), "Super Duplex Stainless Steel F55 (Group 3.3)");
    }

    #[test]
    fn test_order_beats_later_generic_pattern() {
        // "Carbon Steel" is near the bottom, so the F22 pattern is seen first
        assert_eq!(
            pt_rating_material_group("A182 F22 forged, Carbon Steel bolting"),
            "Low Alloy Steel F22 (Group 1.10)"
        );
        assert_eq!(pt_rating_material_group("A335 P22 Pipe"), "Low Alloy Steel F22 (Group 1.10)");
    }

    #[test]
    fn test_no_pattern_shadowed_by_earlier_substring() {
        let mappings = material_group_mappings();
        for (i, later) in mappings.iter().enumerate() {
            for earlier in &mappings[..i] {
                assert!(
                    !later.pattern_upper.contains(&earlier.pattern_upper),
                    "{:?} is unreachable behind {:?}",
                    later.pattern,
                    earlier.pattern
                );
            }
        }
    }

    #[test]
    fn test_prefix_sharing_grades() {
        assert_eq!(pt_rating_material_group("ASTM A182 F91"), "Alloy Steel A182 F91 (Group 1.14)");
        assert_eq!(pt_rating_material_group("ASTM A182 F9"), "Alloy Steel A182 F9 (Group 1.10)");
        assert_eq!(pt_rating_material_group("A182 F51 forged"), "Duplex Stainless Steel F51 (Group 3.2)");
        assert_eq!(pt_rating_material_group("A182 F55"), "Super Duplex Stainless Steel F55 (Group 3.3)");
        assert_eq!(pt_rating_material_group("A182 F5"), "Alloy Steel A182 F5 (Group 1.9)");
        assert_eq!(pt_rating_material_group("A268 TP410S"), "Martensitic Stainless Steel (Group 6.1)");
        assert_eq!(pt_rating_material_group("Hyper Duplex S32707"), "Hyper Duplex Stainless Steel (Group 3.4)");
        assert_eq!(asme_group_number("A182 F91"), "1.14");
        assert_eq!(asme_group_number("A182 F53"), "3.3");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(pt_rating_material_group("Some stainless thing"), DEFAULT_STAINLESS_GROUP);
        assert_eq!(pt_rating_material_group("BRASS"), DEFAULT_STAINLESS_GROUP);
        assert_eq!(pt_rating_material_group("cast iron"), DEFAULT_MATERIAL_GROUP);
        assert_eq!(pt_rating_material_group("   "), DEFAULT_MATERIAL_GROUP);
    }

    #[test]
    fn test_asme_group_number() {
        assert_eq!(asme_group_number("SUS316"), "2.2");
        assert_eq!(asme_group_number("A333 Gr. 8"), "11A");
        assert_eq!(asme_group_number("unknown"), "1.1");
        assert_eq!(asme_group_number(""), "1.1");
    }

    #[test]
    fn test_available_groups_unique_in_order() {
        let groups = available_pt_rating_groups();
        assert_eq!(groups[0], "Carbon Steel A105 (Group 1.1)");
        assert_eq!(groups[1], "Nickel Alloy Steel LF3 (Group 9A)");
        let mut deduped = groups.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), groups.len());
    }

    #[test]
    fn test_exact_temperature_only() {
        let store = builtin_store();
        let class = store.pressure_class_by_designation("ASME B16.5", "150").unwrap().id;
        assert_eq!(pt_rating(&store, class, DEFAULT_MATERIAL_GROUP, 200), Some(13.8));
        assert_eq!(pt_rating(&store, class, DEFAULT_MATERIAL_GROUP, 210), None);
    }

    #[test]
    fn test_snap_up() {
        let store = builtin_store();
        let class = store.pressure_class_by_designation("ASME B16.5", "150").unwrap().id;
        assert_eq!(snap_temperature_up(&store, class, DEFAULT_MATERIAL_GROUP, 210), Some(250));
        assert_eq!(snap_temperature_up(&store, class, DEFAULT_MATERIAL_GROUP, 200), Some(200));
        assert_eq!(snap_temperature_up(&store, class, DEFAULT_MATERIAL_GROUP, 600), None);

        let temps = catalogued_temperatures(&store, class, DEFAULT_MATERIAL_GROUP);
        assert_eq!(temps.first(), Some(&-29));
        assert_eq!(temps.last(), Some(&538));
        assert!(catalogued_temperatures(&store, class, "Unobtainium").is_empty());
    }

    #[test]
    fn test_b16_47_native_and_cross_mapped() {
        let store = builtin_store();
        // Native B16.47 curve
        assert_eq!(pt_rating_for(&store, "ASME B16.47A", "150", DEFAULT_MATERIAL_GROUP, 93), Some(18.0));
        // Class 75 reads B16.5 class 150 at half pressure
        assert_eq!(pt_rating_for(&store, "ASME B16.47B", "75", DEFAULT_MATERIAL_GROUP, 38), Some(9.8));
        // Stainless has no native B16.47 curve
        assert_eq!(pt_rating_for(&store, "ASME B16.47A", "300", DEFAULT_STAINLESS_GROUP, 100), Some(40.9));
        // B16.5 has no class 400 curve either
        assert_eq!(pt_rating_for(&store, "ASME B16.47A", "400", DEFAULT_MATERIAL_GROUP, 38), None);
    }

    #[test]
    fn test_rating_for_other_standards() {
        let store = builtin_store();
        assert_eq!(pt_rating_for(&store, "BS 4504", "PN16", "Carbon Steel", 300), Some(12.2));
        assert_eq!(pt_rating_for(&store, "BS 4504", "PN16", "Carbon Steel", 310), None);
        assert_eq!(pt_rating_for(&store, "BS 10", "T/D", DEFAULT_MATERIAL_GROUP, 20), None);
    }
}
