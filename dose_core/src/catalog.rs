//! Drug catalog: built-in formulary and catalog file loading.
//!
//! A catalog lists drugs, each offering formulation descriptor strings per
//! route of administration. Descriptors are kept verbatim; parsing happens
//! downstream. The built-in catalog is a small demonstration formulary;
//! deployments point `[catalog] path` at their own TOML file.

use crate::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// One orderable drug and its formulation descriptors per route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrugEntry {
    pub name: String,
    /// Route of administration -> descriptors offered on that route.
    pub routes: BTreeMap<String, Vec<String>>,
}

impl DrugEntry {
    /// Case-insensitive route lookup.
    pub fn route(&self, name: &str) -> Option<&[String]> {
        self.routes
            .iter()
            .find(|(route, _)| route.eq_ignore_ascii_case(name))
            .map(|(_, descriptors)| descriptors.as_slice())
    }
}

/// A formulary: the set of drugs orderable through this system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub drugs: Vec<DrugEntry>,
}

/// Cached built-in catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached built-in catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the built-in demonstration catalog
///
/// **Note**: prefer `get_default_catalog()` which returns a cached
/// reference. This function is retained for testing and for callers that
/// need an owned copy to modify.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn drug(name: &str, routes: &[(&str, &[&str])]) -> DrugEntry {
    DrugEntry {
        name: name.into(),
        routes: routes
            .iter()
            .map(|(route, descriptors)| {
                (
                    (*route).into(),
                    descriptors.iter().map(|d| (*d).to_string()).collect(),
                )
            })
            .collect(),
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let drugs = vec![
        // ====================================================================
        // Demonstration formulary
        // ====================================================================
        drug(
            "Acetaminophen",
            &[
                (
                    "oral",
                    &["325 mg Tab", "500 mg Tab", "160 mg/5ml Soln"][..],
                ),
                ("rectal", &["120 mg Supp", "650 mg Supp"][..]),
            ],
        ),
        drug(
            "Albuterol",
            &[(
                "inhalation",
                &["90 mcg/puff HFA 1 puff", "2.5 mg/3ml Neb Soln"][..],
            )],
        ),
        drug(
            "Amoxicillin",
            &[(
                "oral",
                &[
                    "250 mg Cap",
                    "500 mg Cap",
                    "875 mg Tab",
                    "250 mg/5ml Susp",
                    "400 mg/5ml Susp",
                ][..],
            )],
        ),
        drug(
            "Amoxicillin-Clavulanate",
            &[(
                "oral",
                &["500-125 mg Tab", "875-125 mg Tab", "400-57 mg/5ml Susp"][..],
            )],
        ),
        drug(
            "Enoxaparin",
            &[(
                "subcutaneous",
                &[
                    "30 mg/0.3 ml Prefilled Syringe",
                    "40 mg/0.4 ml Prefilled Syringe",
                    "100 mg/1 ml Prefilled Syringe",
                ][..],
            )],
        ),
        drug(
            "Estradiol-Levonorgestrel",
            &[("transdermal", &["0.045-0.015 mg/hr Patch"][..])],
        ),
        drug(
            "Fentanyl",
            &[(
                "transdermal",
                &["25 mcg/hr Patch", "50 mcg/hr Patch", "75 mcg/hr Patch"][..],
            )],
        ),
        drug(
            "Fluticasone-Salmeterol",
            &[(
                "inhalation",
                &["250-50 mcg/puff Diskus", "500-50 mcg/puff Diskus"][..],
            )],
        ),
        drug(
            "Hydrocortisone",
            &[("topical", &["1% Cream", "2.5% Lotion"][..])],
        ),
        drug(
            "Insulin Glargine",
            &[("subcutaneous", &["100 units/ml Vial 10 ml"][..])],
        ),
        drug("Ketoconazole", &[("topical", &["2% Shampoo"][..])]),
        drug(
            "Levothyroxine",
            &[("oral", &["25 mcg Tab", "50 mcg Tab", "100 mcg Tab"][..])],
        ),
        drug(
            "Morphine",
            &[("oral", &["10 mg/5ml Oral Soln", "100 mg/5ml Oral Soln"][..])],
        ),
        drug(
            "Potassium Chloride",
            &[(
                "oral",
                &["10 mEq Tab ER", "20 mEq Tab ER", "20 mEq/15ml Soln"][..],
            )],
        ),
    ];

    Catalog { drugs }
}

impl Catalog {
    /// Case-insensitive drug lookup.
    pub fn find(&self, name: &str) -> Option<&DrugEntry> {
        self.drugs
            .iter()
            .find(|drug| drug.name.eq_ignore_ascii_case(name))
    }

    /// Load a catalog from a TOML file.
    pub fn load_from(path: &Path) -> Result<Catalog> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: Catalog = toml::from_str(&contents)?;
        tracing::debug!("Loaded catalog from {:?}", path);
        Ok(catalog)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.drugs.is_empty() {
            errors.push("Catalog has no drugs".to_string());
        }

        let mut seen = BTreeSet::new();
        for drug in &self.drugs {
            if drug.name.trim().is_empty() {
                errors.push("Drug has empty name".to_string());
                continue;
            }
            if !seen.insert(drug.name.to_lowercase()) {
                errors.push(format!("Duplicate drug name '{}'", drug.name));
            }
            if drug.routes.is_empty() {
                errors.push(format!("Drug '{}' has no routes", drug.name));
            }
            for (route, descriptors) in &drug.routes {
                if route.trim().is_empty() {
                    errors.push(format!(
                        "Drug '{}' has a route with an empty name",
                        drug.name
                    ));
                }
                if descriptors.is_empty() {
                    errors.push(format!(
                        "Drug '{}' route '{}' has no formulations",
                        drug.name, route
                    ));
                }
                for descriptor in descriptors {
                    if descriptor.trim().is_empty() {
                        errors.push(format!(
                            "Drug '{}' route '{}' has a blank formulation descriptor",
                            drug.name, route
                        ));
                    }
                }
            }
        }

        errors
    }
}
