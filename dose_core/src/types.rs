//! Core domain types for the dose calculation pipeline.
//!
//! This module defines the fundamental types used throughout the system:
//! - Dose units and their dimensional kinds
//! - Formulation shapes produced by the parser
//! - Clinician input (desired dose) and calculator output (calculated dose)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ============================================================================
// Unit Types
// ============================================================================

/// Unit in which a strength or desired dose is expressed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum StrengthUnit {
    #[serde(rename = "mg")]
    Mg,
    #[serde(rename = "mcg")]
    Mcg,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "mEq")]
    MEq,
    #[serde(rename = "units")]
    Units,
}

/// Dimensional kind of a unit. Ratio math is only meaningful within one kind.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Mass,
    Milliequivalent,
    Biological,
}

impl StrengthUnit {
    /// Dimensional kind of this unit
    pub fn kind(&self) -> UnitKind {
        match self {
            StrengthUnit::Mg | StrengthUnit::Mcg | StrengthUnit::G => UnitKind::Mass,
            StrengthUnit::MEq => UnitKind::Milliequivalent,
            StrengthUnit::Units => UnitKind::Biological,
        }
    }

    /// Factor that converts a value in this unit to the milligram base.
    ///
    /// mEq and biological units have no mass equivalent and pass through
    /// with a factor of 1; callers must first check [`StrengthUnit::kind`]
    /// compatibility before treating two normalized values as a ratio.
    pub fn mg_factor(&self) -> f64 {
        match self {
            StrengthUnit::Mg => 1.0,
            StrengthUnit::Mcg => 0.001,
            StrengthUnit::G => 1000.0,
            StrengthUnit::MEq => 1.0,
            StrengthUnit::Units => 1.0,
        }
    }
}

impl fmt::Display for StrengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrengthUnit::Mg => "mg",
            StrengthUnit::Mcg => "mcg",
            StrengthUnit::G => "g",
            StrengthUnit::MEq => "mEq",
            StrengthUnit::Units => "units",
        };
        f.write_str(s)
    }
}

impl FromStr for StrengthUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mg" => Ok(StrengthUnit::Mg),
            "mcg" => Ok(StrengthUnit::Mcg),
            "g" => Ok(StrengthUnit::G),
            "meq" => Ok(StrengthUnit::MEq),
            "unit" | "units" | "unt" => Ok(StrengthUnit::Units),
            other => Err(Error::Unit(other.to_string())),
        }
    }
}

/// Volume unit of a liquid concentration denominator
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUnit {
    Ml,
    L,
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolumeUnit::Ml => "ml",
            VolumeUnit::L => "l",
        })
    }
}

/// Primary active-ingredient amount per dispensable unit
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Strength {
    pub value: f64,
    pub unit: StrengthUnit,
}

impl Strength {
    /// Value normalized to the milligram base (see [`StrengthUnit::mg_factor`])
    pub fn normalized(&self) -> f64 {
        self.value * self.unit.mg_factor()
    }
}

/// Volume denominator of a liquid concentration or syringe fill
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Volume {
    pub value: f64,
    pub unit: VolumeUnit,
}

// ============================================================================
// Form Label Types
// ============================================================================

/// Display label for one dispensable unit ("tablet", "puff", "mL", ...)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormLabel {
    Tablet,
    Capsule,
    Puff,
    Patch,
    Suppository,
    Packet,
    Lozenge,
    Piece,
    Film,
    Spray,
    Syringe,
    Injection,
    Unit,
    Ml,
}

impl FormLabel {
    /// Derive the label from free-text packaging residue.
    ///
    /// Ordered substring rules; the first match wins. Liquid shapes bypass
    /// this table entirely and always use [`FormLabel::Ml`].
    pub fn from_form_text(form: &str) -> FormLabel {
        let f = form.to_lowercase();
        if f.contains("tab") {
            FormLabel::Tablet
        } else if f.contains("cap") {
            FormLabel::Capsule
        } else if f.contains("puff") {
            FormLabel::Puff
        } else if f.contains("patch") {
            FormLabel::Patch
        } else if f.contains("supp") {
            FormLabel::Suppository
        } else if f.contains("pwdr") || f.contains("powder") {
            FormLabel::Packet
        } else if f.contains("lozenge") {
            FormLabel::Lozenge
        } else if f.contains("gum") {
            FormLabel::Piece
        } else if f.contains("film") {
            FormLabel::Film
        } else if f.contains("spray") {
            FormLabel::Spray
        } else if f.contains("syringe") {
            FormLabel::Syringe
        } else if f.contains("injection") || f.contains("inj") {
            FormLabel::Injection
        } else {
            FormLabel::Unit
        }
    }
}

impl fmt::Display for FormLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormLabel::Tablet => "tablet",
            FormLabel::Capsule => "capsule",
            FormLabel::Puff => "puff",
            FormLabel::Patch => "patch",
            FormLabel::Suppository => "suppository",
            FormLabel::Packet => "packet",
            FormLabel::Lozenge => "lozenge",
            FormLabel::Piece => "piece",
            FormLabel::Film => "film",
            FormLabel::Spray => "spray",
            FormLabel::Syringe => "syringe",
            FormLabel::Injection => "injection",
            FormLabel::Unit => "unit",
            FormLabel::Ml => "mL",
        };
        f.write_str(s)
    }
}

/// Packaging residue from a parsed descriptor, kept verbatim plus its label
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Form {
    pub text: String,
    pub label: FormLabel,
}

// ============================================================================
// Formulation Shape Types
// ============================================================================

/// A parsed formulation descriptor.
///
/// Each variant is one shape of the descriptor grammar; combination products
/// (two active ingredients in a fixed packaging ratio) are separate variants
/// so the secondary strength exists exactly when the shape is a combo.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Formulation {
    /// Plain solid ("500 mg Tab")
    SimpleSolid { strength: Strength, form: Form },
    /// Fixed-ratio combination solid ("400-5 mg Tab")
    ComboSolid {
        strength: Strength,
        secondary: f64,
        form: Form,
    },
    /// Liquid concentration ("100 mg/5ml Susp")
    Liquid {
        strength: Strength,
        per_volume: Volume,
        form: Form,
    },
    /// Combination liquid concentration ("400-57 mg/5ml Susp")
    ComboLiquid {
        strength: Strength,
        secondary: f64,
        per_volume: Volume,
        form: Form,
    },
    /// Metered inhalation or spray ("10 mg/puff DPI 1 puff")
    SimplePuff { strength: Strength, form: Form },
    /// Combination metered inhalation ("100-50 mcg/puff DPI 1 puff")
    ComboPuff {
        strength: Strength,
        secondary: f64,
        form: Form,
    },
    /// Transdermal rate patch ("0.208 mg/hr 168 HR Patch")
    SimplePatch { strength: Strength, form: Form },
    /// Combination rate patch
    ComboPatch {
        strength: Strength,
        secondary: f64,
        form: Form,
    },
    /// Prefilled syringe, dosed as a unit count ("30 mg/0.3 ml Prefilled Syringe 0.3 ml")
    Prefilled {
        strength: Strength,
        volume: Volume,
        form: Form,
    },
}

impl Formulation {
    /// Primary active-ingredient strength
    pub fn strength(&self) -> Strength {
        match self {
            Formulation::SimpleSolid { strength, .. }
            | Formulation::ComboSolid { strength, .. }
            | Formulation::Liquid { strength, .. }
            | Formulation::ComboLiquid { strength, .. }
            | Formulation::SimplePuff { strength, .. }
            | Formulation::ComboPuff { strength, .. }
            | Formulation::SimplePatch { strength, .. }
            | Formulation::ComboPatch { strength, .. }
            | Formulation::Prefilled { strength, .. } => *strength,
        }
    }

    /// Secondary strength, present exactly for combination shapes
    pub fn secondary_strength(&self) -> Option<f64> {
        match self {
            Formulation::ComboSolid { secondary, .. }
            | Formulation::ComboLiquid { secondary, .. }
            | Formulation::ComboPuff { secondary, .. }
            | Formulation::ComboPatch { secondary, .. } => Some(*secondary),
            _ => None,
        }
    }

    /// Volume denominator for liquid concentrations
    pub fn per_volume(&self) -> Option<Volume> {
        match self {
            Formulation::Liquid { per_volume, .. }
            | Formulation::ComboLiquid { per_volume, .. } => Some(*per_volume),
            _ => None,
        }
    }

    /// Packaging residue text and display label
    pub fn form(&self) -> &Form {
        match self {
            Formulation::SimpleSolid { form, .. }
            | Formulation::ComboSolid { form, .. }
            | Formulation::Liquid { form, .. }
            | Formulation::ComboLiquid { form, .. }
            | Formulation::SimplePuff { form, .. }
            | Formulation::ComboPuff { form, .. }
            | Formulation::SimplePatch { form, .. }
            | Formulation::ComboPatch { form, .. }
            | Formulation::Prefilled { form, .. } => form,
        }
    }

    pub fn is_combo(&self) -> bool {
        matches!(
            self,
            Formulation::ComboSolid { .. }
                | Formulation::ComboLiquid { .. }
                | Formulation::ComboPuff { .. }
                | Formulation::ComboPatch { .. }
        )
    }

    pub fn is_liquid(&self) -> bool {
        matches!(
            self,
            Formulation::Liquid { .. } | Formulation::ComboLiquid { .. }
        )
    }

    pub fn is_puff(&self) -> bool {
        matches!(
            self,
            Formulation::SimplePuff { .. } | Formulation::ComboPuff { .. }
        )
    }

    pub fn is_patch(&self) -> bool {
        matches!(
            self,
            Formulation::SimplePatch { .. } | Formulation::ComboPatch { .. }
        )
    }

    pub fn is_prefilled(&self) -> bool {
        matches!(self, Formulation::Prefilled { .. })
    }

    /// Human-readable shape name for display surfaces
    pub fn shape_name(&self) -> &'static str {
        match self {
            Formulation::SimpleSolid { .. } => "solid",
            Formulation::ComboSolid { .. } => "combo solid",
            Formulation::Liquid { .. } => "liquid concentration",
            Formulation::ComboLiquid { .. } => "combo liquid concentration",
            Formulation::SimplePuff { .. } => "metered puff",
            Formulation::ComboPuff { .. } => "combo metered puff",
            Formulation::SimplePatch { .. } => "rate patch",
            Formulation::ComboPatch { .. } => "combo rate patch",
            Formulation::Prefilled { .. } => "prefilled syringe",
        }
    }
}

// ============================================================================
// Dose Input and Output Types
// ============================================================================

/// Clinician-entered target dose. Transient, never stored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DesiredDose {
    pub amount: f64,
    pub unit: StrengthUnit,
}

impl DesiredDose {
    pub fn new(amount: f64, unit: StrengthUnit) -> Self {
        DesiredDose { amount, unit }
    }
}

/// Result of a dose calculation, ready for formatting
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalculatedDose {
    /// Physical quantity of dispensable units (tablets, mL, puffs, ...)
    pub quantity: f64,
    /// Label for one dispensable unit
    pub label: FormLabel,
    pub is_liquid: bool,
    pub is_combo: bool,
    /// Amount of the secondary ingredient delivered, combos only
    pub secondary_amount: Option<f64>,
    /// Unit the secondary amount is expressed in, combos only
    pub secondary_unit: Option<StrengthUnit>,
    /// Primary strength the quantity was derived from, combos only
    pub primary_strength: Option<f64>,
    pub secondary_strength: Option<f64>,
    /// Informational note, e.g. the patch rate ratio
    pub note: Option<String>,
}
