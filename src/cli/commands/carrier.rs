//! `greenboard carrier` command - Carrier registry

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_ledger, resolve_carrier};
use crate::cli::output::print_list;
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum CarrierCommands {
    /// List carriers
    List,

    /// Register a carrier
    New(NewArgs),

    /// Rename a carrier
    Rename(RenameArgs),

    /// Delete a carrier no package references
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Carrier name (unique, case-insensitive)
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    /// Carrier ID or name
    pub carrier: String,

    /// New name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Carrier ID or name
    pub carrier: String,
}

/// Run a carrier subcommand
pub fn run(cmd: CarrierCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CarrierCommands::List => run_list(global),
        CarrierCommands::New(args) => run_new(args, global),
        CarrierCommands::Rename(args) => run_rename(args, global),
        CarrierCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let carriers = ledger.list_carriers()?;
    print_list(
        &carriers,
        &["ID", "NAME"],
        |c| vec![c.carrier_id.to_string(), c.carrier_name.clone()],
        global.format,
    )
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let id = ledger.create_carrier(&args.name)?;
    println!(
        "{} Created carrier {} {}",
        style("✓").green(),
        style(id).cyan(),
        style(args.name.trim()).yellow()
    );
    Ok(())
}

fn run_rename(args: RenameArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let id = resolve_carrier(&ledger, &args.carrier)?;
    ledger.rename_carrier(id, &args.name)?;
    println!(
        "{} Renamed carrier {} to {}",
        style("✓").green(),
        style(id).cyan(),
        style(args.name.trim()).yellow()
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let id = resolve_carrier(&ledger, &args.carrier)?;
    ledger.delete_carrier(id)?;
    println!("{} Deleted carrier {}", style("✓").green(), style(id).cyan());
    Ok(())
}
