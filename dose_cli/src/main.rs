use clap::{Parser, Subcommand};
use dose_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dosecalc")]
#[command(about = "Medication dose parsing and calculation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the catalog file
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog drugs, routes, and formulation descriptors (default)
    List {
        /// Show a single drug
        #[arg(long)]
        drug: Option<String>,
    },

    /// Parse one formulation descriptor and show its structure
    Inspect {
        /// Formulation descriptor, e.g. "500 mg Tab"
        formulation: String,
    },

    /// Calculate the dispense quantity for a desired dose
    Calc {
        /// Formulation descriptor, e.g. "500 mg Tab"
        #[arg(long)]
        formulation: String,

        /// Desired dose amount
        #[arg(long)]
        amount: f64,

        /// Desired dose unit (mg, mcg, g, mEq, units); config default when omitted
        #[arg(long)]
        unit: Option<String>,
    },

    /// Assemble an order record for a catalog drug
    Order {
        /// Drug name (case-insensitive)
        #[arg(long)]
        drug: String,

        /// Route of administration
        #[arg(long)]
        route: String,

        /// Formulation descriptor; the route's first descriptor when omitted
        #[arg(long)]
        formulation: Option<String>,

        /// Desired dose amount
        #[arg(long)]
        amount: Option<f64>,

        /// Desired dose unit; config default when omitted
        #[arg(long)]
        unit: Option<String>,

        /// Emit the order record as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    dose_core::logging::init();

    let cli = Cli::parse();

    // Determine catalog source: flag, then config, then built-in
    let config = Config::load()?;
    let catalog_path = cli.catalog.as_deref().or(config.catalog.path.as_deref());
    let catalog = load_catalog(catalog_path)?;

    match cli.command {
        Some(Commands::List { drug }) => cmd_list(&catalog, drug.as_deref()),
        Some(Commands::Inspect { formulation }) => cmd_inspect(&formulation),
        Some(Commands::Calc {
            formulation,
            amount,
            unit,
        }) => cmd_calc(
            &formulation,
            amount,
            desired_unit(unit.as_deref(), &config)?,
        ),
        Some(Commands::Order {
            drug,
            route,
            formulation,
            amount,
            unit,
            json,
        }) => cmd_order(
            &catalog,
            &drug,
            &route,
            formulation.as_deref(),
            amount,
            desired_unit(unit.as_deref(), &config)?,
            json,
        ),
        None => {
            // Default to "list" command
            cmd_list(&catalog, None)
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::load_from(path)?,
        None => get_default_catalog().clone(),
    };

    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid catalog".into()));
    }

    Ok(catalog)
}

fn desired_unit(unit: Option<&str>, config: &Config) -> Result<StrengthUnit> {
    match unit {
        Some(raw) => raw.parse(),
        None => Ok(config.input.default_unit),
    }
}

fn cmd_list(catalog: &Catalog, drug: Option<&str>) -> Result<()> {
    let entries: Vec<&DrugEntry> = match drug {
        Some(name) => vec![catalog
            .find(name)
            .ok_or_else(|| Error::Catalog(format!("Unknown drug: {}", name)))?],
        None => catalog.drugs.iter().collect(),
    };

    for entry in entries {
        println!("{}", entry.name);
        for (route, descriptors) in &entry.routes {
            println!("  [{}]", route);
            for descriptor in descriptors {
                match parse_formulation(descriptor) {
                    Some(f) => println!("    {} ({})", descriptor, f.shape_name()),
                    None => println!("    {} (not calculable)", descriptor),
                }
            }
        }
        println!();
    }

    Ok(())
}

fn cmd_inspect(descriptor: &str) -> Result<()> {
    println!("{}", descriptor);

    match parse_formulation(descriptor) {
        Some(f) => {
            println!("  Shape: {}", f.shape_name());
            println!(
                "  Strength: {} {}",
                format_amount(f.strength().value),
                f.strength().unit
            );
            if let Some(secondary) = f.secondary_strength() {
                println!(
                    "  Secondary strength: {} {}",
                    format_amount(secondary),
                    f.strength().unit
                );
            }
            if let Some(vol) = f.per_volume() {
                println!("  Per volume: {} {}", format_amount(vol.value), vol.unit);
            }
            if !f.form().text.is_empty() {
                println!("  Form: {}", f.form().text);
            }
            println!("  Dispensed as: {}", f.form().label);
        }
        None => {
            println!("  Not calculable");
            println!("  → {}", non_calculable_guidance(Some(descriptor)));
        }
    }

    Ok(())
}

fn cmd_calc(descriptor: &str, amount: f64, unit: StrengthUnit) -> Result<()> {
    println!("Formulation: {}", descriptor);

    let Some(formulation) = parse_formulation(descriptor) else {
        println!("Calculated dose: -");
        println!("  → {}", non_calculable_guidance(Some(descriptor)));
        return Ok(());
    };

    println!("Desired dose: {} {}", format_amount(amount), unit);
    match calculate(DesiredDose::new(amount, unit), &formulation) {
        Ok(dose) => println!("Calculated dose: {}", format_quantity(&dose)),
        Err(reason) => {
            println!("Calculated dose: -");
            println!("  → {}", reason);
        }
    }

    Ok(())
}

fn cmd_order(
    catalog: &Catalog,
    drug: &str,
    route: &str,
    formulation: Option<&str>,
    amount: Option<f64>,
    unit: StrengthUnit,
    json: bool,
) -> Result<()> {
    let entry = catalog
        .find(drug)
        .ok_or_else(|| Error::Catalog(format!("Unknown drug: {}", drug)))?;
    let descriptors = entry.route(route).ok_or_else(|| {
        Error::Catalog(format!("Drug '{}' has no route '{}'", entry.name, route))
    })?;

    let descriptor = match formulation {
        Some(wanted) => descriptors
            .iter()
            .find(|offered| offered.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::Catalog(format!(
                    "Formulation '{}' is not offered for {} {}",
                    wanted, entry.name, route
                ))
            })?,
        None => descriptors.first().ok_or_else(|| {
            Error::Catalog(format!(
                "Drug '{}' route '{}' has no formulations",
                entry.name, route
            ))
        })?,
    };

    let dose_entry = DoseEntry {
        formulation: Some(descriptor.clone()),
        amount,
        unit,
    };
    let readout = dose_entry.readout();
    let desired = amount.map(|a| DesiredDose::new(a, unit));
    let order = DoseOrder::assemble(&entry.name, route, descriptor, desired, &readout);

    if json {
        println!("{}", order.to_json()?);
        return Ok(());
    }

    display_order(&order, &readout);
    Ok(())
}

fn display_order(order: &DoseOrder, readout: &DoseReadout) {
    println!("╭─────────────────────────────────────────╮");
    println!("│  MEDICATION ORDER");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {} ({})", order.drug, order.route);
    println!("  Formulation: {}", order.formulation);
    println!("  Dose: {}", order.dose);
    match order.calculated_dose.as_deref() {
        Some(display) => println!("  Calculated dose: {}", display),
        None => println!("  Calculated dose: -"),
    }

    match readout {
        DoseReadout::NotCalculable { guidance } => println!("  → {}", guidance),
        DoseReadout::AwaitingAmount { .. } => println!("  → No desired dose entered"),
        DoseReadout::NotComputable(reason) => println!("  → {}", reason),
        _ => {}
    }

    println!();
}
