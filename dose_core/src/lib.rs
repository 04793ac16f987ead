#![forbid(unsafe_code)]

//! Core domain model and business logic for the dosecalc system.
//!
//! This crate provides:
//! - Domain types (strengths, formulations, doses)
//! - Formulation descriptor parsing
//! - Calculability classification and guidance text
//! - Dose quantity calculation and display formatting
//! - Catalog management and order record assembly

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod parser;
pub mod classifier;
pub mod calculator;
pub mod formatter;
pub mod entry;
pub mod order;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog, DrugEntry};
pub use config::Config;
pub use parser::parse_formulation;
pub use classifier::{is_calculable, non_calculable_guidance};
pub use calculator::{calculate, NoDose};
pub use formatter::{format_amount, format_quantity};
pub use entry::{DoseEntry, DoseReadout};
pub use order::DoseOrder;
