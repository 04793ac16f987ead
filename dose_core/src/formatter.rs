//! Display formatting for calculated doses.
//!
//! Turns a [`CalculatedDose`] into the string the screen shows next to
//! "Calculated dose:". Countable quantities snap to the nearest integer,
//! half, or quarter when close enough, since those are the increments a
//! tablet or puff can actually be dispensed in; volumes print to two
//! decimals as-is.

use crate::types::CalculatedDose;

/// How close a quantity must be to an integer/half/quarter to display as one.
const SNAP: f64 = 0.025;

/// Format a calculated dose for display.
///
/// Appends the informational note (patch rate ratio) when present, and the
/// secondary-ingredient suffix for combination products.
pub fn format_quantity(calc: &CalculatedDose) -> String {
    let display = display_quantity(calc.quantity, calc.is_liquid);
    let mut out = if calc.is_liquid {
        // Volumes are never pluralized
        format!("{display} {}", calc.label)
    } else if display == "1" {
        format!("{display} {}", calc.label)
    } else {
        format!("{display} {}s", calc.label)
    };
    if let Some(note) = &calc.note {
        out.push(' ');
        out.push_str(note);
    }
    if calc.is_combo {
        if let (Some(amount), Some(unit)) = (calc.secondary_amount, calc.secondary_unit) {
            out.push_str(&format!(
                " (includes {} {} of secondary)",
                format_amount(amount),
                unit
            ));
        }
    }
    out
}

/// The rounding cascade. Liquids go straight to two decimals.
fn display_quantity(quantity: f64, is_liquid: bool) -> String {
    if is_liquid {
        return format_amount(quantity);
    }
    let nearest_int = quantity.round();
    if (quantity - nearest_int).abs() <= SNAP {
        return format_amount(nearest_int);
    }
    let nearest_half = (quantity * 2.0).round() / 2.0;
    if (quantity - nearest_half).abs() <= SNAP {
        return format_amount(nearest_half);
    }
    let nearest_quarter = (quantity * 4.0).round() / 4.0;
    if (quantity - nearest_quarter).abs() <= SNAP {
        return format_amount(nearest_quarter);
    }
    format_amount(quantity)
}

/// Round to two decimals and trim trailing zeros ("10", "1.5", "0.75").
pub fn format_amount(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FormLabel, StrengthUnit};

    fn dose(quantity: f64, label: FormLabel) -> CalculatedDose {
        CalculatedDose {
            quantity,
            label,
            is_liquid: label == FormLabel::Ml,
            is_combo: false,
            secondary_amount: None,
            secondary_unit: None,
            primary_strength: None,
            secondary_strength: None,
            note: None,
        }
    }

    #[test]
    fn test_quantities_near_an_integer_display_as_that_integer() {
        assert_eq!(format_quantity(&dose(3.0, FormLabel::Tablet)), "3 tablets");
        assert_eq!(format_quantity(&dose(2.999, FormLabel::Tablet)), "3 tablets");
        assert_eq!(format_quantity(&dose(1.004, FormLabel::Tablet)), "1 tablet");
    }

    #[test]
    fn test_quantities_snap_to_halves_and_quarters() {
        assert_eq!(format_quantity(&dose(1.48, FormLabel::Tablet)), "1.5 tablets");
        assert_eq!(format_quantity(&dose(0.751, FormLabel::Tablet)), "0.75 tablets");
        assert_eq!(format_quantity(&dose(2.25, FormLabel::Tablet)), "2.25 tablets");
    }

    #[test]
    fn test_quantities_between_fractions_round_to_two_decimals() {
        assert_eq!(format_quantity(&dose(2.33, FormLabel::Tablet)), "2.33 tablets");
        assert_eq!(format_quantity(&dose(0.38, FormLabel::Capsule)), "0.38 capsules");
    }

    #[test]
    fn test_liquids_skip_the_fraction_cascade() {
        assert_eq!(format_quantity(&dose(10.0, FormLabel::Ml)), "10 mL");
        // 1.48 would snap to 1.5 for a countable unit
        assert_eq!(format_quantity(&dose(1.48, FormLabel::Ml)), "1.48 mL");
        assert_eq!(format_quantity(&dose(0.3, FormLabel::Ml)), "0.3 mL");
    }

    #[test]
    fn test_labels_pluralize_with_a_literal_suffix() {
        assert_eq!(format_quantity(&dose(2.0, FormLabel::Syringe)), "2 syringes");
        assert_eq!(format_quantity(&dose(0.5, FormLabel::Tablet)), "0.5 tablets");
        assert_eq!(format_quantity(&dose(1.0, FormLabel::Puff)), "1 puff");
        // The suffix is appended verbatim, with no irregular-plural table
        assert_eq!(format_quantity(&dose(2.0, FormLabel::Patch)), "2 patchs");
    }

    #[test]
    fn test_combo_doses_append_the_secondary_suffix() {
        let calc = CalculatedDose {
            is_combo: true,
            secondary_amount: Some(10.0),
            secondary_unit: Some(StrengthUnit::Mg),
            primary_strength: Some(400.0),
            secondary_strength: Some(5.0),
            ..dose(2.0, FormLabel::Tablet)
        };
        assert_eq!(
            format_quantity(&calc),
            "2 tablets (includes 10 mg of secondary)"
        );
    }

    #[test]
    fn test_notes_sit_between_quantity_and_suffix() {
        let calc = CalculatedDose {
            note: Some("(2x the patch rate)".to_string()),
            ..dose(2.0, FormLabel::Patch)
        };
        assert_eq!(format_quantity(&calc), "2 patchs (2x the patch rate)");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let calc = dose(1.48, FormLabel::Tablet);
        assert_eq!(format_quantity(&calc), format_quantity(&calc));
    }

    #[test]
    fn test_amounts_trim_trailing_zeros() {
        assert_eq!(format_amount(10.0), "10");
        assert_eq!(format_amount(2.5), "2.5");
        assert_eq!(format_amount(0.75), "0.75");
        assert_eq!(format_amount(114.0), "114");
        assert_eq!(format_amount(1.004), "1");
    }
}
