//! Pressure-Class Keys
//!
//! Designations arrive in several spellings: ASME `"150"` / `"Class 150"`,
//! EN/BS `"PN16"` / `"PN 16"`, BS 4504 `"16/3"`, SABS 1123 `"1600/3"`
//! (kPa over flange type), BS 10 `"T/D"`. Two keys are derived from them:
//!
//! - [`pressure_class_key`] is an equivalence key. It never changes the
//!   rating, so `"1600/3"`, `"16/4"` and `"PN 16"` all become `PN16` while
//!   `"Class 900"` stays `CLASS900`.
//! - [`normalize_pressure_class`] bands a designation onto the small key set
//!   the BNW, bolt-hole and blank-weight tables are keyed by.

/// Designation numbers at or above this are kPa (SABS 1123), below are bar.
const KPA_THRESHOLD: u32 = 200;

/// Parse the leading run of ASCII digits, ignoring leading whitespace.
pub fn leading_integer(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

fn compact_upper(designation: &str) -> String {
    designation
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Split `"NNN/xx"` into its numeric prefix, if the designation has that shape.
fn slash_rating(compact: &str) -> Option<u32> {
    let (prefix, suffix) = compact.split_once('/')?;
    if prefix.is_empty() || suffix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

fn pn_from_kpa(kpa: u32) -> String {
    if kpa % 100 == 0 {
        format!("PN{}", kpa / 100)
    } else {
        format!("PN{}", kpa as f64 / 100.0)
    }
}

/// Rating-preserving equivalence key for a pressure-class designation.
///
/// ```rust
/// use piping_core::reference::keys::pressure_class_key;
///
/// assert_eq!(pressure_class_key("1600/3"), "PN16");
/// assert_eq!(pressure_class_key("16/4"), "PN16");
/// assert_eq!(pressure_class_key("pn 16"), "PN16");
/// assert_eq!(pressure_class_key("Class 300"), "CLASS300");
/// assert_eq!(pressure_class_key("300"), "CLASS300");
/// assert_eq!(pressure_class_key("T/D"), "T/D");
/// ```
pub fn pressure_class_key(designation: &str) -> String {
    let compact = compact_upper(designation);

    if let Some(value) = slash_rating(&compact) {
        return if value >= KPA_THRESHOLD {
            pn_from_kpa(value)
        } else {
            format!("PN{}", value)
        };
    }
    if let Some(rest) = compact.strip_prefix("PN") {
        if let Ok(value) = rest.parse::<f64>() {
            return format!("PN{}", value);
        }
    }
    if let Some(rest) = compact.strip_prefix("CLASS") {
        if let Ok(value) = rest.parse::<u32>() {
            return format!("CLASS{}", value);
        }
    }
    if let Ok(value) = compact.parse::<u32>() {
        return format!("CLASS{}", value);
    }
    compact
}

fn band_pn(value: f64) -> &'static str {
    if value <= 10.0 {
        "PN10"
    } else if value <= 16.0 {
        "PN16"
    } else if value <= 25.0 {
        "PN25"
    } else if value <= 40.0 {
        "PN40"
    } else {
        "PN64"
    }
}

fn band_class(value: u32) -> &'static str {
    if value <= 150 {
        "Class 150"
    } else if value <= 300 {
        "Class 300"
    } else {
        "Class 600"
    }
}

/// Band a designation onto {PN10, PN16, PN25, PN40, PN64, Class 150, Class 300, Class 600}.
///
/// Empty input becomes `PN16`. Anything unrecognised is returned trimmed and
/// unchanged, so it simply misses the keyed tables.
pub fn normalize_pressure_class(designation: &str) -> String {
    let compact = compact_upper(designation);
    if compact.is_empty() {
        return "PN16".to_string();
    }

    if let Some(value) = slash_rating(&compact) {
        let bar = if value >= KPA_THRESHOLD {
            value as f64 / 100.0
        } else {
            value as f64
        };
        return band_pn(bar).to_string();
    }
    if let Some(rest) = compact.strip_prefix("PN") {
        if let Ok(value) = rest.parse::<f64>() {
            return band_pn(value).to_string();
        }
    }
    if let Some(rest) = compact.strip_prefix("CLASS") {
        if let Ok(value) = rest.parse::<u32>() {
            return band_class(value).to_string();
        }
    }
    if let Ok(value) = compact.parse::<u32>() {
        return if value >= 1000 {
            band_pn(value as f64 / 100.0).to_string()
        } else {
            band_class(value).to_string()
        };
    }
    designation.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("600kPa/8"), Some(600));
        assert_eq!(leading_integer(" 1000/3"), Some(1000));
        assert_eq!(leading_integer("kPa"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[test]
    fn test_equivalence_keys_keep_rating() {
        assert_eq!(pressure_class_key("250/3"), "PN2.5");
        assert_eq!(pressure_class_key("4000/2"), "PN40");
        assert_eq!(pressure_class_key("PN2.5"), "PN2.5");
        assert_eq!(pressure_class_key("Class 900"), "CLASS900");
        assert_eq!(pressure_class_key("75"), "CLASS75");
        assert_eq!(pressure_class_key("t/e"), "T/E");
    }

    #[test]
    fn test_normalize_sabs_and_bs4504() {
        assert_eq!(normalize_pressure_class("1000/3"), "PN10");
        assert_eq!(normalize_pressure_class("1600/3"), "PN16");
        assert_eq!(normalize_pressure_class("2500/2"), "PN25");
        assert_eq!(normalize_pressure_class("4000/2"), "PN40");
        assert_eq!(normalize_pressure_class("6400/2"), "PN64");
        assert_eq!(normalize_pressure_class("16/3"), "PN16");
    }

    #[test]
    fn test_normalize_pn_class_and_numeric() {
        assert_eq!(normalize_pressure_class("PN 6"), "PN10");
        assert_eq!(normalize_pressure_class("pn16"), "PN16");
        assert_eq!(normalize_pressure_class("PN100"), "PN64");
        assert_eq!(normalize_pressure_class("Class 300"), "Class 300");
        assert_eq!(normalize_pressure_class("900"), "Class 600");
        assert_eq!(normalize_pressure_class("150"), "Class 150");
        assert_eq!(normalize_pressure_class("2500"), "PN25");
    }

    #[test]
    fn test_normalize_defaults() {
        assert_eq!(normalize_pressure_class(""), "PN16");
        assert_eq!(normalize_pressure_class("  "), "PN16");
        assert_eq!(normalize_pressure_class("T/D"), "T/D");
    }
}
