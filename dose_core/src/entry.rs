//! Screen-facing dose entry state.
//!
//! Models the calculator screen's in-progress input and resolves it to a
//! readout on every change. The states a screen must tell apart (nothing
//! selected, selection does not parse, amount not yet entered, amount
//! refused, dose computed) are separate variants rather than one empty
//! marker, so the caller never has to infer which input was missing.

use serde::{Deserialize, Serialize};

use crate::calculator::{calculate, NoDose};
use crate::classifier::non_calculable_guidance;
use crate::formatter::format_quantity;
use crate::parser::parse_formulation;
use crate::types::{CalculatedDose, DesiredDose, Formulation, StrengthUnit};

/// In-progress input on the dose calculator screen
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DoseEntry {
    /// Raw descriptor of the selected formulation, if any
    pub formulation: Option<String>,
    /// Desired amount as entered, if any
    pub amount: Option<f64>,
    /// Unit the desired amount is expressed in
    pub unit: StrengthUnit,
}

impl DoseEntry {
    /// Resolve the current input to a readout. Pure; run on every keystroke.
    pub fn readout(&self) -> DoseReadout {
        let Some(raw) = self.formulation.as_deref() else {
            return DoseReadout::NoSelection;
        };
        let Some(formulation) = parse_formulation(raw) else {
            return DoseReadout::NotCalculable {
                guidance: non_calculable_guidance(Some(raw)),
            };
        };
        let Some(amount) = self.amount else {
            return DoseReadout::AwaitingAmount { formulation };
        };
        match calculate(DesiredDose::new(amount, self.unit), &formulation) {
            Ok(dose) => {
                let display = format_quantity(&dose);
                DoseReadout::Calculated { dose, display }
            }
            Err(reason) => DoseReadout::NotComputable(reason),
        }
    }
}

/// Everything the screen needs to render the calculator state
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DoseReadout {
    /// No formulation chosen yet
    NoSelection,
    /// Selection does not parse; show administration guidance instead
    NotCalculable { guidance: &'static str },
    /// Formulation parsed; waiting for a desired amount
    AwaitingAmount { formulation: Formulation },
    /// Amount present but no dose could be computed
    NotComputable(NoDose),
    /// The computed dose and its display string
    Calculated {
        dose: CalculatedDose,
        display: String,
    },
}

impl DoseReadout {
    /// The formatted dose string, absent in every non-calculated state.
    pub fn display(&self) -> Option<&str> {
        match self {
            DoseReadout::Calculated { display, .. } => Some(display),
            _ => None,
        }
    }
}
