//! Calculability classification.
//!
//! Decides which presentation mode a drug/route gets: the numeric calculator
//! (at least one descriptor parses) or a formulation picker with static
//! administration guidance.

use crate::parser::parse_formulation;

/// True when at least one descriptor in the list parses to a formulation.
pub fn is_calculable<S: AsRef<str>>(descriptors: &[S]) -> bool {
    descriptors
        .iter()
        .any(|d| parse_formulation(d.as_ref()).is_some())
}

/// Guidance text for a non-calculable selection.
///
/// Routed by substring on the selected descriptor; always returns something,
/// including for an absent selection.
pub fn non_calculable_guidance(selected: Option<&str>) -> &'static str {
    let Some(text) = selected else {
        return "Use as directed";
    };
    let t = text.to_lowercase();
    if t.contains("cream") || t.contains("ointment") || t.contains("lotion") || t.contains("gel") {
        "Apply as directed"
    } else if t.contains("patch") && (t.contains("sq") || t.contains("cm")) {
        "Apply patch as directed"
    } else {
        // Shampoos, solutions, implants, vials: nothing more specific to say
        "Use as directed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_parseable_descriptor_makes_a_route_calculable() {
        let descriptors = ["1% Cream", "500 mg Tab"];
        assert!(is_calculable(&descriptors));
    }

    #[test]
    fn test_all_excluded_descriptors_are_not_calculable() {
        let descriptors = ["1% Cream", "2.5% Lotion", "5 mci/ml Injection"];
        assert!(!is_calculable(&descriptors));
        assert!(!is_calculable::<&str>(&[]));
    }

    #[test]
    fn test_topical_preparations_get_apply_guidance() {
        assert_eq!(non_calculable_guidance(Some("1% Cream")), "Apply as directed");
        assert_eq!(
            non_calculable_guidance(Some("0.1% Ointment")),
            "Apply as directed"
        );
        assert_eq!(
            non_calculable_guidance(Some("2.5% Lotion")),
            "Apply as directed"
        );
        assert_eq!(non_calculable_guidance(Some("1% Gel")), "Apply as directed");
    }

    #[test]
    fn test_area_patches_get_patch_guidance() {
        assert_eq!(
            non_calculable_guidance(Some("14 cm2 Patch")),
            "Apply patch as directed"
        );
        assert_eq!(
            non_calculable_guidance(Some("1 sq Patch")),
            "Apply patch as directed"
        );
        // A patch without an area token falls through to the default
        assert_eq!(
            non_calculable_guidance(Some("21 mg/24hr Patch")),
            "Use as directed"
        );
    }

    #[test]
    fn test_everything_else_gets_use_guidance() {
        assert_eq!(
            non_calculable_guidance(Some("2% Shampoo")),
            "Use as directed"
        );
        assert_eq!(
            non_calculable_guidance(Some("Otic Sol")),
            "Use as directed"
        );
        assert_eq!(non_calculable_guidance(Some("Implant")), "Use as directed");
        assert_eq!(non_calculable_guidance(None), "Use as directed");
    }
}
