use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use greenboard::cli::commands;
use greenboard::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // Logs go to stderr so piped output stays clean
    let filter = match cli.global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let global = &cli.global;
    match cli.command {
        Commands::Init(args) => commands::init::run(args, global),
        Commands::Carrier(cmd) => commands::carrier::run(cmd, global),
        Commands::Factor(cmd) => commands::factor::run(cmd, global),
        Commands::Person(cmd) => commands::person::run(cmd, global),
        Commands::Package(cmd) => commands::package::run(cmd, global),
        Commands::Txn(cmd) => commands::txn::run(cmd, global),
        Commands::Report(cmd) => commands::report::run(cmd, global),
        Commands::Import(args) => commands::import::run(args, global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
