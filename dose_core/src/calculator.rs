//! Dose calculation.
//!
//! Given a clinician's desired dose and a parsed [`Formulation`], computes
//! how many dispensable units deliver that dose. Mass units are normalized
//! to milligrams before any ratio math; mEq and biological units never
//! convert to mass, so a desired dose of one kind against a strength of
//! another is rejected outright rather than silently ratioed.

use serde::{Deserialize, Serialize};

use crate::formatter;
use crate::types::{CalculatedDose, DesiredDose, Formulation, StrengthUnit};

/// Why no dose could be produced.
///
/// These are expected outcomes of ordinary input states, not faults; they
/// are never logged and carry enough detail for the presentation layer to
/// explain itself.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
pub enum NoDose {
    /// Desired amount was zero, negative, or not a number
    #[error("desired amount must be greater than zero")]
    AmountNotPositive,

    /// Desired unit and strength unit differ in dimensional kind
    #[error("cannot express a {strength} strength as {desired}")]
    IncompatibleUnits {
        desired: StrengthUnit,
        strength: StrengthUnit,
    },

    /// Strength (or liquid volume denominator) is zero or negative
    #[error("formulation strength does not support a ratio")]
    DegenerateStrength,
}

/// Compute the quantity of a formulation that delivers the desired dose.
///
/// Combination products are assumed to hold a strict linear ratio between
/// primary and secondary strengths per dispensable unit; the secondary
/// amount is derived from that proportion.
pub fn calculate(
    desired: DesiredDose,
    formulation: &Formulation,
) -> Result<CalculatedDose, NoDose> {
    if desired.amount.is_nan() || desired.amount <= 0.0 {
        return Err(NoDose::AmountNotPositive);
    }

    let strength = formulation.strength();
    if desired.unit.kind() != strength.unit.kind() {
        return Err(NoDose::IncompatibleUnits {
            desired: desired.unit,
            strength: strength.unit,
        });
    }

    let desired_mg = desired.amount * desired.unit.mg_factor();
    let strength_mg = strength.normalized();
    if strength_mg <= 0.0 {
        return Err(NoDose::DegenerateStrength);
    }

    match formulation {
        Formulation::Liquid { per_volume, .. } | Formulation::ComboLiquid { per_volume, .. } => {
            if per_volume.value <= 0.0 {
                return Err(NoDose::DegenerateStrength);
            }
            let ml_needed = desired_mg * (per_volume.value / strength_mg);
            let secondary = formulation
                .secondary_strength()
                .map(|sec| (ml_needed / per_volume.value) * sec);
            Ok(build_dose(formulation, ml_needed, secondary, None))
        }
        Formulation::SimplePatch { .. } | Formulation::ComboPatch { .. } => {
            // Patches deliver at a fixed rate; the quantity is an
            // informational ratio against that rate, never a unit count.
            let ratio = desired_mg / strength_mg;
            let figure = formatter::format_amount(ratio);
            let note = if figure != "1" {
                Some(format!("({figure}x the patch rate)"))
            } else {
                None
            };
            Ok(build_dose(formulation, ratio, None, note))
        }
        _ => {
            // Solids, puffs, and prefilled syringes are all unit counts
            let quantity = desired_mg / strength_mg;
            let secondary = formulation
                .secondary_strength()
                .map(|sec| quantity * sec);
            Ok(build_dose(formulation, quantity, secondary, None))
        }
    }
}

fn build_dose(
    formulation: &Formulation,
    quantity: f64,
    secondary_amount: Option<f64>,
    note: Option<String>,
) -> CalculatedDose {
    let strength = formulation.strength();
    let is_combo = formulation.is_combo();
    CalculatedDose {
        quantity,
        label: formulation.form().label,
        is_liquid: formulation.is_liquid(),
        is_combo,
        secondary_amount,
        secondary_unit: is_combo.then_some(strength.unit),
        primary_strength: is_combo.then_some(strength.value),
        secondary_strength: formulation.secondary_strength(),
        note,
    }
}
