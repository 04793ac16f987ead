//! Order record assembly.
//!
//! The submitted order embeds exactly three dose fields: the desired dose
//! string, the raw formulation descriptor, and the formatted calculated
//! dose. Downstream order screens consume them verbatim; this module only
//! assembles the record and serializes it for the cart hand-off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::DoseReadout;
use crate::error::Result;
use crate::formatter::format_amount;
use crate::types::DesiredDose;

/// A medication order ready to hand to the cart
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DoseOrder {
    pub id: Uuid,
    pub ordered_at: DateTime<Utc>,
    pub drug: String,
    pub route: String,
    /// "{amount} {unit}" when a dose was calculated, else the raw descriptor
    pub dose: String,
    /// Raw selected formulation descriptor, always
    pub formulation: String,
    /// Formatted display string, absent when nothing was calculated
    pub calculated_dose: Option<String>,
}

impl DoseOrder {
    /// Assemble an order from the selection and its current readout.
    pub fn assemble(
        drug: &str,
        route: &str,
        formulation: &str,
        desired: Option<DesiredDose>,
        readout: &DoseReadout,
    ) -> Self {
        let calculated_dose = readout.display().map(str::to_string);
        let dose = match (&calculated_dose, desired) {
            (Some(_), Some(d)) => format!("{} {}", format_amount(d.amount), d.unit),
            _ => formulation.to_string(),
        };
        DoseOrder {
            id: Uuid::new_v4(),
            ordered_at: Utc::now(),
            drug: drug.to_string(),
            route: route.to_string(),
            dose,
            formulation: formulation.to_string(),
            calculated_dose,
        }
    }

    /// JSON representation for the cart hand-off.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::DoseEntry;
    use crate::types::StrengthUnit;

    fn readout_for(formulation: &str, amount: Option<f64>) -> DoseReadout {
        DoseEntry {
            formulation: Some(formulation.to_string()),
            amount,
            unit: StrengthUnit::Mg,
        }
        .readout()
    }

    #[test]
    fn test_calculable_orders_embed_the_desired_dose_string() {
        let readout = readout_for("500 mg Tab", Some(1500.0));
        let desired = DesiredDose::new(1500.0, StrengthUnit::Mg);
        let order = DoseOrder::assemble("amoxicillin", "oral", "500 mg Tab", Some(desired), &readout);
        assert_eq!(order.dose, "1500 mg");
        assert_eq!(order.formulation, "500 mg Tab");
        assert_eq!(order.calculated_dose.as_deref(), Some("3 tablets"));
    }

    #[test]
    fn test_non_calculable_orders_fall_back_to_the_descriptor() {
        let readout = readout_for("1% Cream", None);
        let order = DoseOrder::assemble("hydrocortisone", "topical", "1% Cream", None, &readout);
        assert_eq!(order.dose, "1% Cream");
        assert_eq!(order.formulation, "1% Cream");
        assert!(order.calculated_dose.is_none());
    }

    #[test]
    fn test_orders_serialize_with_all_three_dose_fields() {
        let readout = readout_for("400-5 mg Tab", Some(800.0));
        let desired = DesiredDose::new(800.0, StrengthUnit::Mg);
        let order = DoseOrder::assemble("combo", "oral", "400-5 mg Tab", Some(desired), &readout);
        let json: serde_json::Value = serde_json::from_str(&order.to_json().unwrap()).unwrap();
        assert_eq!(json["dose"], "800 mg");
        assert_eq!(json["formulation"], "400-5 mg Tab");
        assert_eq!(
            json["calculated_dose"],
            "2 tablets (includes 10 mg of secondary)"
        );
        assert!(json["id"].is_string());
    }
}
