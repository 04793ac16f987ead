//! Formulation descriptor parser.
//!
//! Turns a free-text pharmacy descriptor ("500 mg Tab", "100 mg/5ml Susp")
//! into a structured [`Formulation`]. Matching is an ordered cascade of
//! compiled patterns; the first shape that matches wins. Descriptors that
//! carry a strength style we cannot dose numerically (percentages, cell
//! counts, radioactive doses, ...) are screened out before any shape is
//! tried. A failed parse is an expected outcome, not an error, so this
//! module returns `Option` and never logs.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::str::FromStr;

use crate::types::{Form, FormLabel, Formulation, Strength, StrengthUnit, Volume, VolumeUnit};

// Pattern fragments shared by the shape rules
const V1: &str = r"(?P<v1>\d+(?:\.\d+)?)";
const V2: &str = r"(?P<v2>\d+(?:\.\d+)?)";
const VOL: &str = r"(?P<vol>\d+(?:\.\d+)?)";
const UNIT: &str = r"(?P<unit>mcg|mg|g|meq|units)";
const VOLUNIT: &str = r"(?P<volunit>ml|l)";
const FORM: &str = r"(?:\s+(?P<form>.*))?";
const PUFF_WORDS: &str = r"(?:puff|actuation|spray|injection)";

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

// ============================================================================
// Normalization
// ============================================================================

static THOUSANDS_SEP: Lazy<Regex> = Lazy::new(|| rx(r"(\d),(\d)"));
static UNIT_SPELLING: Lazy<Regex> = Lazy::new(|| rx(r"(?i)\b(?:unt|unit)\b"));

/// Unify unit spellings and strip thousands separators before matching.
fn normalize(raw: &str) -> String {
    let mut s = raw.to_string();
    while THOUSANDS_SEP.is_match(&s) {
        s = THOUSANDS_SEP.replace_all(&s, "$1$2").into_owned();
    }
    UNIT_SPELLING.replace_all(&s, "units").into_owned()
}

// ============================================================================
// Exclusion Rules
// ============================================================================

struct ExclusionRule {
    pattern: Regex,
    reason: &'static str,
}

fn exclusion(pattern: &str, reason: &'static str) -> ExclusionRule {
    ExclusionRule {
        pattern: rx(pattern),
        reason,
    }
}

/// Strength styles that are never numerically calculable. Checked in order
/// before the shape cascade; any hit is a no-match.
static EXCLUSIONS: Lazy<Vec<ExclusionRule>> = Lazy::new(|| {
    vec![
        exclusion(r"%", "percentage strength"),
        exclusion(r"(?i)\bcells?\b", "cell count strength"),
        exclusion(r"(?i)\bviral\b", "viral particle strength"),
        exclusion(
            r"\d+(?:\.\d+)?-\d+(?:\.\d+)?-\d",
            "three or more strength components",
        ),
        exclusion(r"(?i)\bvar\b", "variable unit count"),
        exclusion(r"(?i)\bmci\b", "radioactive dose"),
        exclusion(r"(?i)\bcm2\b|cm²|\bcm\b", "area based strength"),
        exclusion(r"(?i)\bsq\b", "area unit"),
        exclusion(r"(?i)\bvg\b", "vector genome count"),
        exclusion(r"(?i)\bunits\s*/\s*(?:mcg|mg|g)\b", "inverted unit ratio"),
        exclusion(
            r"(?i)^\s*\d+(?:\.\d+)?\s*(?:ml|l)\b",
            "volume without a strength term",
        ),
        exclusion(r"(?i)/\s*sqcm", "dose per area"),
        exclusion(r"(?i)\bein\b", "non-English unit token"),
        exclusion(r"(?i)\bml\s*/\s*ml\b", "volume per volume"),
        exclusion(r"(?i)\bbau\b", "allergen unit"),
    ]
});

fn find_exclusion(s: &str) -> Option<&'static str> {
    EXCLUSIONS
        .iter()
        .find(|rule| rule.pattern.is_match(s))
        .map(|rule| rule.reason)
}

// ============================================================================
// Shape Rules
// ============================================================================

static COMBO_PUFF: Lazy<Regex> = Lazy::new(|| {
    rx(&format!(
        r"(?i)^{V1}\s*-\s*{V2}\s*{UNIT}\s*/\s*{PUFF_WORDS}\b{FORM}$"
    ))
});
static SIMPLE_PUFF: Lazy<Regex> =
    Lazy::new(|| rx(&format!(r"(?i)^{V1}\s*{UNIT}\s*/\s*{PUFF_WORDS}\b{FORM}$")));
static PREFILLED: Lazy<Regex> =
    Lazy::new(|| rx(&format!(r"(?i)^{V1}\s*{UNIT}\s*/\s*{VOL}\s*ml\b{FORM}$")));
static COMBO_PATCH: Lazy<Regex> =
    Lazy::new(|| rx(&format!(r"(?i)^{V1}\s*-\s*{V2}\s*{UNIT}\s*/\s*hr\b{FORM}$")));
static SIMPLE_PATCH: Lazy<Regex> =
    Lazy::new(|| rx(&format!(r"(?i)^{V1}\s*{UNIT}\s*/\s*hr\b{FORM}$")));
static COMBO_LIQUID: Lazy<Regex> = Lazy::new(|| {
    rx(&format!(
        r"(?i)^{V1}\s*-\s*{V2}\s*{UNIT}\s*/\s*{VOL}\s*{VOLUNIT}\b{FORM}$"
    ))
});
static COMBO_SOLID: Lazy<Regex> =
    Lazy::new(|| rx(&format!(r"(?i)^{V1}\s*-\s*{V2}\s*{UNIT}\b{FORM}$")));
static LIQUID: Lazy<Regex> = Lazy::new(|| {
    rx(&format!(
        r"(?i)^{V1}\s*{UNIT}\s*/\s*{VOL}\s*{VOLUNIT}\b{FORM}$"
    ))
});
static SIMPLE_SOLID: Lazy<Regex> = Lazy::new(|| rx(&format!(r"(?i)^{V1}\s*{UNIT}\b{FORM}$")));

// ============================================================================
// Capture Extraction
// ============================================================================

fn number(caps: &Captures, name: &str) -> Option<f64> {
    caps.name(name)?.as_str().parse().ok()
}

fn strength_from(caps: &Captures) -> Option<Strength> {
    let value = number(caps, "v1")?;
    let unit = StrengthUnit::from_str(caps.name("unit")?.as_str()).ok()?;
    Some(Strength { value, unit })
}

fn volume_from(caps: &Captures) -> Option<Volume> {
    let value = number(caps, "vol")?;
    let unit = match caps.name("volunit").map(|m| m.as_str().to_lowercase()) {
        Some(u) if u == "l" => VolumeUnit::L,
        _ => VolumeUnit::Ml,
    };
    Some(Volume { value, unit })
}

fn form_text(caps: &Captures) -> String {
    caps.name("form")
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn form_plain(caps: &Captures) -> Form {
    let text = form_text(caps);
    let label = FormLabel::from_form_text(&text);
    Form { text, label }
}

/// Liquid shapes always display as mL, whatever the residue says.
fn form_liquid(caps: &Captures) -> Form {
    Form {
        text: form_text(caps),
        label: FormLabel::Ml,
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse a raw formulation descriptor into a structured shape.
///
/// Returns `None` for anything unrecognized or explicitly excluded; this is
/// the normal outcome for creams, percentages, implants and the like, and is
/// never treated as a fault.
pub fn parse_formulation(raw: &str) -> Option<Formulation> {
    let normalized = normalize(raw);
    let s = normalized.trim();
    if s.is_empty() || find_exclusion(s).is_some() {
        return None;
    }
    match_shape(s)
}

/// The fixed-priority shape cascade. First match wins.
fn match_shape(s: &str) -> Option<Formulation> {
    if let Some(c) = COMBO_PUFF.captures(s) {
        return Some(Formulation::ComboPuff {
            strength: strength_from(&c)?,
            secondary: number(&c, "v2")?,
            form: form_plain(&c),
        });
    }
    if let Some(c) = SIMPLE_PUFF.captures(s) {
        return Some(Formulation::SimplePuff {
            strength: strength_from(&c)?,
            form: form_plain(&c),
        });
    }
    // A prefilled syringe reads like a liquid concentration; only the form
    // marker distinguishes it. Without the marker the liquid rules below
    // still get their chance.
    if let Some(c) = PREFILLED.captures(s) {
        let form = form_plain(&c);
        if form.text.to_lowercase().contains("prefilled syringe") {
            return Some(Formulation::Prefilled {
                strength: strength_from(&c)?,
                volume: Volume {
                    value: number(&c, "vol")?,
                    unit: VolumeUnit::Ml,
                },
                form,
            });
        }
    }
    if let Some(c) = COMBO_PATCH.captures(s) {
        return Some(Formulation::ComboPatch {
            strength: strength_from(&c)?,
            secondary: number(&c, "v2")?,
            form: form_plain(&c),
        });
    }
    if let Some(c) = SIMPLE_PATCH.captures(s) {
        return Some(Formulation::SimplePatch {
            strength: strength_from(&c)?,
            form: form_plain(&c),
        });
    }
    if let Some(c) = COMBO_LIQUID.captures(s) {
        return Some(Formulation::ComboLiquid {
            strength: strength_from(&c)?,
            secondary: number(&c, "v2")?,
            per_volume: volume_from(&c)?,
            form: form_liquid(&c),
        });
    }
    if let Some(c) = COMBO_SOLID.captures(s) {
        return Some(Formulation::ComboSolid {
            strength: strength_from(&c)?,
            secondary: number(&c, "v2")?,
            form: form_plain(&c),
        });
    }
    if let Some(c) = LIQUID.captures(s) {
        return Some(Formulation::Liquid {
            strength: strength_from(&c)?,
            per_volume: volume_from(&c)?,
            form: form_liquid(&c),
        });
    }
    if let Some(c) = SIMPLE_SOLID.captures(s) {
        return Some(Formulation::SimpleSolid {
            strength: strength_from(&c)?,
            form: form_plain(&c),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_simple_solid() {
        let f = parse_formulation("500 mg Tab").unwrap();
        assert_eq!(f.strength().value, 500.0);
        assert_eq!(f.strength().unit, StrengthUnit::Mg);
        assert_eq!(f.form().label, FormLabel::Tablet);
        assert_eq!(f.form().text, "Tab");
        assert!(!f.is_combo());
        assert!(matches!(f, Formulation::SimpleSolid { .. }));
    }

    #[test]
    fn test_classifies_liquid_concentration() {
        let f = parse_formulation("100 mg/5ml Susp").unwrap();
        assert!(f.is_liquid());
        assert_eq!(f.strength().value, 100.0);
        let vol = f.per_volume().unwrap();
        assert_eq!(vol.value, 5.0);
        assert_eq!(vol.unit, VolumeUnit::Ml);
        assert_eq!(f.form().label, FormLabel::Ml);
    }

    #[test]
    fn test_classifies_combo_solid() {
        let f = parse_formulation("400-5 mg Tab").unwrap();
        assert!(f.is_combo());
        assert_eq!(f.strength().value, 400.0);
        assert_eq!(f.secondary_strength(), Some(5.0));
        assert_eq!(f.form().label, FormLabel::Tablet);
    }

    #[test]
    fn test_classifies_metered_puff() {
        let f = parse_formulation("10 mg/puff DPI 1 puff").unwrap();
        assert!(f.is_puff());
        assert_eq!(f.strength().value, 10.0);
        assert_eq!(f.form().label, FormLabel::Puff);
        assert_eq!(f.form().text, "DPI 1 puff");
    }

    #[test]
    fn test_classifies_combo_puff() {
        let f = parse_formulation("100-50 mcg/puff DPI 1 puff").unwrap();
        assert!(f.is_puff());
        assert!(f.is_combo());
        assert_eq!(f.strength().unit, StrengthUnit::Mcg);
        assert_eq!(f.secondary_strength(), Some(50.0));
    }

    #[test]
    fn test_classifies_rate_patch() {
        let f = parse_formulation("0.208 mg/hr 168 HR Patch").unwrap();
        assert!(f.is_patch());
        assert_eq!(f.strength().value, 0.208);
        assert_eq!(f.form().text, "168 HR Patch");
        assert_eq!(f.form().label, FormLabel::Patch);
    }

    #[test]
    fn test_classifies_combo_patch() {
        let f = parse_formulation("0.1-0.3 mg/hr Patch").unwrap();
        assert!(f.is_patch());
        assert_eq!(f.secondary_strength(), Some(0.3));
    }

    #[test]
    fn test_classifies_prefilled_syringe() {
        let f = parse_formulation("30 mg/0.3 ml Prefilled Syringe 0.3 ml").unwrap();
        assert!(f.is_prefilled());
        assert_eq!(f.strength().value, 30.0);
        assert_eq!(f.form().label, FormLabel::Syringe);
        match f {
            Formulation::Prefilled { volume, .. } => assert_eq!(volume.value, 0.3),
            other => panic!("expected prefilled, got {other:?}"),
        }
    }

    #[test]
    fn test_prefilled_requires_the_form_marker() {
        // Same numeric pattern without the marker falls through to liquid
        let f = parse_formulation("30 mg/0.3 ml Vial").unwrap();
        assert!(f.is_liquid());
        assert_eq!(f.per_volume().unwrap().value, 0.3);
    }

    #[test]
    fn test_combo_liquid_wins_over_combo_solid() {
        let f = parse_formulation("400-57 mg/5ml Susp").unwrap();
        assert!(f.is_liquid());
        assert!(f.is_combo());
        assert_eq!(f.secondary_strength(), Some(57.0));
        assert_eq!(f.per_volume().unwrap().value, 5.0);
    }

    #[test]
    fn test_liter_denominators_are_accepted() {
        let f = parse_formulation("1 g/1 l Irrigation Soln").unwrap();
        assert!(f.is_liquid());
        assert_eq!(f.per_volume().unwrap().unit, VolumeUnit::L);
    }

    #[test]
    fn test_milliequivalent_solids_parse() {
        let f = parse_formulation("20 mEq Tab").unwrap();
        assert_eq!(f.strength().unit, StrengthUnit::MEq);
        assert_eq!(f.form().label, FormLabel::Tablet);
    }

    #[test]
    fn test_excludes_listed_strength_styles() {
        assert!(parse_formulation("1% Cream").is_none());
        assert!(parse_formulation("5000000 cells/ml Injection").is_none());
        assert!(parse_formulation("10-5-2 mg Tab").is_none());
        assert!(parse_formulation("5 mci/ml Injection").is_none());
    }

    #[test]
    fn test_excludes_odd_unit_tokens() {
        assert!(parse_formulation("1000 units/mg Powder").is_none());
        assert!(parse_formulation("5000000000000 vg/ml Injection").is_none());
        assert!(parse_formulation("10000 BAU/ml Extract").is_none());
        assert!(parse_formulation("0.5 ml/ml Soln").is_none());
        assert!(parse_formulation("var units Tab").is_none());
        assert!(parse_formulation("10 units/sqcm Dressing").is_none());
        assert!(parse_formulation("1 sq-hdm Implant").is_none());
        assert!(parse_formulation("100 ein/ml Vial").is_none());
        assert!(parse_formulation("5 ml Vial").is_none());
        assert!(parse_formulation("14 cm2 System").is_none());
    }

    #[test]
    fn test_normalizes_separators_and_unit_spelling() {
        let f = parse_formulation("1,000 mg Tab").unwrap();
        assert_eq!(f.strength().value, 1000.0);

        let f = parse_formulation("100 unt/5ml Susp").unwrap();
        assert_eq!(f.strength().unit, StrengthUnit::Units);
        assert!(f.is_liquid());

        let f = parse_formulation("5 Unit Tab").unwrap();
        assert_eq!(f.strength().unit, StrengthUnit::Units);
    }

    #[test]
    fn test_unrecognized_descriptors_do_not_match() {
        assert!(parse_formulation("").is_none());
        assert!(parse_formulation("Tab").is_none());
        assert!(parse_formulation("Prefilled Syringe").is_none());
        assert!(parse_formulation("5 mg/dose Inhaler").is_none());
        assert!(parse_formulation("100 units/ml Vial 10 ml").is_none());
    }

    #[test]
    fn test_parse_is_deterministic() {
        for descriptor in ["500 mg Tab", "400-57 mg/5ml Susp", "1% Cream"] {
            assert_eq!(parse_formulation(descriptor), parse_formulation(descriptor));
        }
    }

    #[test]
    fn test_exclusion_reasons_are_reported_in_order() {
        assert_eq!(find_exclusion("1% Cream"), Some("percentage strength"));
        assert_eq!(
            find_exclusion("10-5-2 mg Tab"),
            Some("three or more strength components")
        );
        assert_eq!(find_exclusion("500 mg Tab"), None);
    }
}
