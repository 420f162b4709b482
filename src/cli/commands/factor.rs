//! `greenboard factor` command - Emission factors per service type

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::print_delete_outcome;
use crate::cli::helpers::open_ledger;
use crate::cli::output::{effective_format, print_list, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum FactorCommands {
    /// List emission factors
    List,

    /// Create or update the factor for a service type
    Set(SetArgs),

    /// Show the factor a service type resolves to
    Show(ShowArgs),

    /// Delete a factor; packages keep their emissions
    Delete(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Service type label, e.g. "UPS Ground"
    pub service_type: String,

    /// kg CO2e per unit distance
    pub factor: f64,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Service type label
    pub service_type: String,
}

/// Run a factor subcommand
pub fn run(cmd: FactorCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FactorCommands::List => run_list(global),
        FactorCommands::Set(args) => run_set(args, global),
        FactorCommands::Show(args) => run_show(args, global),
        FactorCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let factors = ledger.list_factors()?;
    print_list(
        &factors,
        &["SERVICE TYPE", "FACTOR"],
        |f| vec![f.service_type.clone(), f.emission_factor.to_string()],
        global.format,
    )
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let previous = ledger.lookup_factor(&args.service_type)?;
    ledger.set_factor(&args.service_type, args.factor)?;
    match previous {
        Some(old) => println!(
            "{} Updated {} {} {} {}",
            style("✓").green(),
            style(args.service_type.trim()).yellow(),
            old,
            style("→").dim(),
            style(args.factor).cyan()
        ),
        None => println!(
            "{} Added {} = {}",
            style("✓").green(),
            style(args.service_type.trim()).yellow(),
            style(args.factor).cyan()
        ),
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let resolved = ledger.resolve_factor(Some(&args.service_type))?;

    match effective_format(global.format, false) {
        OutputFormat::Auto => {
            println!(
                "{}: {}",
                style("Service Type").bold(),
                style(&resolved.service_type).yellow()
            );
            println!("{}: {}", style("Factor").bold(), resolved.emission_factor);
            if !resolved.service_type.eq_ignore_ascii_case(args.service_type.trim()) {
                println!(
                    "{}",
                    style(format!(
                        "'{}' is not on file; packages would use the fallback factor",
                        args.service_type.trim()
                    ))
                    .dim()
                );
            }
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(&resolved, global.format),
        format => print_list(
            std::slice::from_ref(&resolved),
            &["SERVICE TYPE", "FACTOR"],
            |f| vec![f.service_type.clone(), f.emission_factor.to_string()],
            format,
        ),
    }
}

fn run_delete(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let outcome = ledger.delete_factor(&args.service_type)?;
    println!(
        "{} Deleted factor {}",
        style("✓").green(),
        style(args.service_type.trim()).yellow()
    );
    print_delete_outcome(&outcome);
    Ok(())
}
