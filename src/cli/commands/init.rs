//! `greenboard init` command - Create the ledger database

use std::fs;
use std::path::Path;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers;
use crate::cli::GlobalOpts;
use crate::core::config::{CONFIG_FILE, PROJECT_DIR};
use crate::core::ledger::{Ledger, LedgerOptions};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Also load the common carriers and service-type emission factors
    #[arg(long)]
    pub fixtures: bool,
}

/// Run the init command
pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let config = helpers::config(global);
    let existed = config.database.exists();

    let mut ledger = Ledger::open(&config.database, &LedgerOptions::from(&config))?;

    let config_path = Path::new(PROJECT_DIR).join(CONFIG_FILE);
    if !config_path.exists() {
        fs::create_dir_all(PROJECT_DIR).into_diagnostic()?;
        let yaml = config.to_yaml().into_diagnostic()?;
        fs::write(&config_path, yaml).into_diagnostic()?;
        println!(
            "{} Wrote configuration {}",
            style("✓").green(),
            style(config_path.display()).dim()
        );
    }

    if existed {
        println!(
            "{} Ledger already exists at {}",
            style("!").yellow(),
            style(config.database.display()).cyan()
        );
    } else {
        println!(
            "{} Initialized ledger at {}",
            style("✓").green(),
            style(config.database.display()).cyan()
        );
    }

    if args.fixtures {
        let inserted = ledger.seed_fixtures()?;
        println!(
            "{} Loaded fixtures ({} new row(s))",
            style("✓").green(),
            style(inserted).cyan()
        );
    }

    Ok(())
}
