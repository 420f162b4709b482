//! `greenboard import` command - Bulk load a mailroom CSV report

use std::fs::File;
use std::io;
use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_ledger;
use crate::cli::output::{effective_format, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import, or '-' for stdin
    pub file: PathBuf,
}

/// Run the import command
pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;

    let summary = if args.file.as_os_str() == "-" {
        ledger.import_report(io::stdin().lock())?
    } else {
        let file = File::open(&args.file)
            .into_diagnostic()
            .map_err(|e| e.wrap_err(format!("cannot open {}", args.file.display())))?;
        ledger.import_report(io::BufReader::new(file))?
    };

    match effective_format(global.format, false) {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(&summary, global.format),
        _ => {
            println!(
                "{} Imported {} row(s)",
                style("✓").green(),
                style(summary.rows).cyan()
            );
            println!(
                "   {} package(s), {} event(s), {} new carrier(s), {} new person(s)",
                summary.packages,
                summary.transactions,
                summary.carriers_created,
                summary.persons_created
            );
            Ok(())
        }
    }
}
