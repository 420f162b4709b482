//! `greenboard package` command - Package ledger

use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::commands::print_delete_outcome;
use crate::cli::helpers::{
    format_kg, format_timestamp, open_ledger, or_dash, parse_date, parse_person_id,
    parse_timestamp, resolve_carrier, truncate_str,
};
use crate::cli::output::{effective_format, print_list, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::emissions::EmissionsBreakdown;
use crate::core::identity::{PackageId, PersonId};
use crate::core::ledger::{Ledger, Page};
use crate::entities::{NewPackage, Package, PackageSearch, PackageStatus, Transaction};

#[derive(Subcommand, Debug)]
pub enum PackageCommands {
    /// List packages page by page
    List(ListArgs),

    /// Record a package and snapshot its emissions
    New(NewArgs),

    /// Show a package with its emissions breakdown and history
    Show(IdArgs),

    /// Search packages, most recently shipped first
    Search(SearchArgs),

    /// Show the current status of a package
    Status(IdArgs),

    /// Change or clear the recipient
    SetRecipient(SetRecipientArgs),

    /// Change the carrier; omit to file under "Other"
    SetCarrier(SetCarrierArgs),

    /// Delete a package that has no events
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, short = 'p', default_value = "1")]
    pub page: usize,

    /// Rows per page (defaults to configured page_size)
    #[arg(long)]
    pub per_page: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Carrier tracking number
    #[arg(long, short = 't')]
    pub tracking: String,

    /// Carrier ID or name (defaults to "Other")
    #[arg(long, short = 'c')]
    pub carrier: Option<String>,

    /// Recipient's person ID
    #[arg(long, short = 'r', value_parser = parse_person_id)]
    pub recipient: Option<PersonId>,

    /// Service type label (unknown labels use the "Other" factor)
    #[arg(long, short = 's')]
    pub service: Option<String>,

    /// Ship date or timestamp
    #[arg(long, value_parser = parse_timestamp)]
    pub shipped: Option<NaiveDateTime>,

    /// Distance traveled
    #[arg(long, short = 'd', default_value = "0")]
    pub distance: f64,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Package ID
    pub id: PackageId,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Tracking number substring
    #[arg(long, short = 't')]
    pub tracking: Option<String>,

    /// Carrier name substring
    #[arg(long, short = 'c')]
    pub carrier: Option<String>,

    /// Service type substring
    #[arg(long, short = 's')]
    pub service: Option<String>,

    /// Minimum emissions in kg
    #[arg(long)]
    pub min: Option<f64>,

    /// Maximum emissions in kg
    #[arg(long)]
    pub max: Option<f64>,

    /// First ship date (inclusive)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last ship date (inclusive)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct SetRecipientArgs {
    /// Package ID
    pub id: PackageId,

    /// Recipient's person ID; omit to clear
    #[arg(value_parser = parse_person_id)]
    pub recipient: Option<PersonId>,
}

#[derive(clap::Args, Debug)]
pub struct SetCarrierArgs {
    /// Package ID
    pub id: PackageId,

    /// Carrier ID or name; omit for "Other"
    pub carrier: Option<String>,
}

/// Full package record for structured output
#[derive(Serialize)]
struct PackageDetail<'a> {
    #[serde(flatten)]
    package: &'a Package,
    carrier_name: Option<String>,
    status: PackageStatus,
    emissions: EmissionsBreakdown,
    transactions: Vec<Transaction>,
}

/// Run a package subcommand
pub fn run(cmd: PackageCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PackageCommands::List(args) => run_list(args, global),
        PackageCommands::New(args) => run_new(args, global),
        PackageCommands::Show(args) => run_show(args, global),
        PackageCommands::Search(args) => run_search(args, global),
        PackageCommands::Status(args) => run_status(args, global),
        PackageCommands::SetRecipient(args) => run_set_recipient(args, global),
        PackageCommands::SetCarrier(args) => run_set_carrier(args, global),
        PackageCommands::Delete(args) => run_delete(args, global),
    }
}

fn print_packages(packages: &[Package], global: &GlobalOpts) -> Result<()> {
    print_list(
        packages,
        &["ID", "TRACKING", "CARRIER", "SERVICE", "SHIPPED", "RECIPIENT", "DIST", "KG CO2E"],
        |p| {
            vec![
                p.package_id.to_string(),
                truncate_str(&p.tracking_number, 24),
                or_dash(p.carrier_id),
                or_dash(p.service_type.as_ref()),
                or_dash(p.date_shipped.map(|d| d.date())),
                or_dash(p.recipient_id.as_ref()),
                p.distance_traveled.to_string(),
                format_kg(p.total_emissions_kg),
            ]
        },
        global.format,
    )
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = crate::cli::helpers::config(global);
    let ledger = Ledger::from_config(&config)?;
    let page = Page::new(args.page, args.per_page.unwrap_or(config.page_size));
    let packages = ledger.list_packages(page)?;

    if packages.is_empty() && effective_format(global.format, false) == OutputFormat::Auto {
        println!("No packages on page {}.", page.number);
        return Ok(());
    }
    print_packages(&packages, global)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let carrier_id = args
        .carrier
        .as_deref()
        .map(|c| resolve_carrier(&ledger, c))
        .transpose()?;

    let id = ledger.create_package(NewPackage {
        carrier_id,
        recipient_id: args.recipient,
        tracking_number: args.tracking,
        service_type: args.service,
        date_shipped: args.shipped,
        distance_traveled: args.distance,
    })?;
    let package = ledger.get_package(id)?;

    println!(
        "{} Created package {} ({} kg CO2e via {})",
        style("✓").green(),
        style(id).cyan(),
        style(format_kg(package.total_emissions_kg)).green(),
        or_dash(package.service_type.as_ref())
    );
    Ok(())
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let package = ledger.get_package(args.id)?;
    let carrier_name = match package.carrier_id {
        Some(id) => Some(ledger.get_carrier(id)?.carrier_name),
        None => None,
    };
    let transactions = ledger.transactions_for(args.id)?;
    let status = crate::entities::transaction::current_status(&transactions);
    let emissions = ledger.emissions_breakdown(args.id)?;

    match effective_format(global.format, false) {
        OutputFormat::Json | OutputFormat::Yaml => {
            let detail = PackageDetail {
                package: &package,
                carrier_name,
                status,
                emissions,
                transactions,
            };
            print_serialized(&detail, global.format)
        }
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(package.package_id).cyan());
            println!(
                "{}: {}",
                style("Tracking").bold(),
                style(&package.tracking_number).yellow()
            );
            println!("{}: {}", style("Carrier").bold(), or_dash(carrier_name));
            println!("{}: {}", style("Recipient").bold(), or_dash(package.recipient_id.as_ref()));
            println!(
                "{}: {}",
                style("Shipped").bold(),
                or_dash(package.date_shipped.as_ref().map(format_timestamp))
            );
            println!("{}: {}", style("Status").bold(), style(status).cyan());
            println!("{}", style("─".repeat(60)).dim());

            println!();
            println!("{}:", style("Emissions").bold());
            println!(
                "  {} km × {} = {} kg CO2e",
                package.distance_traveled,
                or_dash(emissions.service_type.as_ref()),
                style(format_kg(emissions.stored_emissions_kg)).green()
            );
            match emissions.mode_reference_factor {
                Some(reference) => println!(
                    "  Mode: {} (typically {} kg CO2e/t-km), {:.1} miles",
                    emissions.transport_mode, reference, emissions.distance_miles
                ),
                None => println!(
                    "  Mode: {}, {:.1} miles",
                    emissions.transport_mode, emissions.distance_miles
                ),
            }
            if emissions.drifted {
                if let (Some(factor), Some(recomputed)) =
                    (emissions.current_factor, emissions.recomputed_emissions_kg)
                {
                    println!(
                        "  {} factor is now {}; today this would be {} kg",
                        style("!").yellow(),
                        factor,
                        format_kg(recomputed)
                    );
                }
            }
            println!(
                "  ≈ {:.2} trees for a year, {:.1} car miles",
                emissions.impact.trees_to_offset, emissions.impact.car_miles_equivalent
            );

            if !transactions.is_empty() {
                println!();
                println!("{} ({}):", style("History").bold(), transactions.len());
                for txn in &transactions {
                    let place = [txn.location.as_deref(), txn.locker.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!(
                        "  • {} {:<9} {} {}",
                        style(format_timestamp(&txn.date)).dim(),
                        txn.transaction_type,
                        place,
                        txn.worker_id
                            .as_ref()
                            .map(|w| format!("by {}", w))
                            .unwrap_or_default()
                    );
                }
            }
            Ok(())
        }
    }
}

fn run_search(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let packages = ledger.search_packages(&PackageSearch {
        tracking_number: args.tracking,
        min_emissions: args.min,
        max_emissions: args.max,
        carrier: args.carrier,
        service_type: args.service,
        shipped_from: args.from,
        shipped_to: args.to,
        limit: args.limit,
    })?;

    if packages.is_empty() && effective_format(global.format, false) == OutputFormat::Auto {
        println!("No packages found.");
        return Ok(());
    }
    print_packages(&packages, global)
}

fn run_status(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let status = ledger.package_status(args.id)?;
    match effective_format(global.format, false) {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(&status, global.format),
        _ => {
            println!("{}", status);
            Ok(())
        }
    }
}

fn run_set_recipient(args: SetRecipientArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    ledger.set_recipient(args.id, args.recipient.as_ref())?;
    println!(
        "{} Package {} recipient: {}",
        style("✓").green(),
        style(args.id).cyan(),
        or_dash(args.recipient.as_ref())
    );
    Ok(())
}

fn run_set_carrier(args: SetCarrierArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let carrier = args
        .carrier
        .as_deref()
        .map(|c| resolve_carrier(&ledger, c))
        .transpose()?;
    ledger.set_carrier(args.id, carrier)?;
    let name = ledger
        .get_package(args.id)?
        .carrier_id
        .map(|id| ledger.get_carrier(id))
        .transpose()?
        .map(|c| c.carrier_name);
    println!(
        "{} Package {} carrier: {}",
        style("✓").green(),
        style(args.id).cyan(),
        or_dash(name)
    );
    Ok(())
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let outcome = ledger.delete_package(args.id)?;
    println!(
        "{} Deleted package {}",
        style("✓").green(),
        style(args.id).cyan()
    );
    print_delete_outcome(&outcome);
    Ok(())
}
