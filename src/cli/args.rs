//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    carrier::CarrierCommands, completions::CompletionsArgs, factor::FactorCommands,
    import::ImportArgs, init::InitArgs, package::PackageCommands, person::PersonCommands,
    report::ReportCommands, txn::TxnCommands,
};

#[derive(Parser, Debug)]
#[command(name = "greenboard")]
#[command(author, version, about = "Mailroom package ledger with carbon accounting")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Ledger database file (overrides configuration)
    #[arg(long, global = true, env = "GREENBOARD_DB")]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output formats for listings and details
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table on a terminal, TSV when piped; styled text for single items
    Auto,
    /// Box-drawn table
    Table,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a ledger database and project configuration
    Init(InitArgs),

    /// Manage carriers
    #[command(subcommand)]
    Carrier(CarrierCommands),

    /// Manage emission factors per service type
    #[command(subcommand)]
    Factor(FactorCommands),

    /// Manage persons, supervisors and departments
    #[command(subcommand)]
    Person(PersonCommands),

    /// Record and inspect packages
    #[command(subcommand)]
    Package(PackageCommands),

    /// Record and inspect lifecycle events
    #[command(subcommand)]
    Txn(TxnCommands),

    /// Emissions totals, leaderboards and timelines
    #[command(subcommand)]
    Report(ReportCommands),

    /// Import a mailroom CSV report
    Import(ImportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
