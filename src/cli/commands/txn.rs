//! `greenboard txn` command - Lifecycle events

use chrono::NaiveDateTime;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_timestamp, open_ledger, or_dash, parse_person_id, parse_timestamp};
use crate::cli::output::print_list;
use crate::cli::GlobalOpts;
use crate::core::identity::{PackageId, PersonId, TransactionId};
use crate::entities::{NewTransaction, TransactionType};

#[derive(Subcommand, Debug)]
pub enum TxnCommands {
    /// Append an event to a package's history
    Add(AddArgs),

    /// List a package's events in chronological order
    List(ListArgs),

    /// Delete an event recorded by mistake
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Package ID
    pub package: PackageId,

    /// Event type: stored, routed or delivered
    pub kind: TransactionType,

    /// When it happened (defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub date: Option<NaiveDateTime>,

    /// Locker label
    #[arg(long)]
    pub locker: Option<String>,

    /// Location label
    #[arg(long)]
    pub location: Option<String>,

    /// Worker's person ID
    #[arg(long, short = 'w', value_parser = parse_person_id)]
    pub worker: Option<PersonId>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Package ID
    pub package: PackageId,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Transaction ID
    pub id: TransactionId,
}

/// Run a txn subcommand
pub fn run(cmd: TxnCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TxnCommands::Add(args) => run_add(args, global),
        TxnCommands::List(args) => run_list(args, global),
        TxnCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let id = ledger.append_transaction(NewTransaction {
        package_id: args.package,
        transaction_type: args.kind,
        date,
        locker: args.locker,
        location: args.location,
        worker_id: args.worker,
    })?;
    let status = ledger.package_status(args.package)?;
    println!(
        "{} Recorded {} {} for package {} (now {})",
        style("✓").green(),
        args.kind,
        style(id).cyan(),
        style(args.package).cyan(),
        style(status).yellow()
    );
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let transactions = ledger.transactions_for(args.package)?;
    print_list(
        &transactions,
        &["ID", "DATE", "TYPE", "LOCKER", "LOCATION", "WORKER"],
        |t| {
            vec![
                t.transaction_id.to_string(),
                format_timestamp(&t.date),
                t.transaction_type.to_string(),
                or_dash(t.locker.as_ref()),
                or_dash(t.location.as_ref()),
                or_dash(t.worker_id.as_ref()),
            ]
        },
        global.format,
    )
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let txn = ledger.get_transaction(args.id)?;
    ledger.delete_transaction(args.id)?;
    println!(
        "{} Deleted {} event {} of package {}",
        style("✓").green(),
        txn.transaction_type,
        style(args.id).cyan(),
        style(txn.package_id).cyan()
    );
    Ok(())
}
