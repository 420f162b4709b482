//! Output formatting utilities

use std::io::{self, IsTerminal};

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
///
/// Listings default to a table on a terminal and TSV when piped; single
/// items default to `Auto`, which callers render as styled text.
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto if is_list => {
            if io::stdout().is_terminal() {
                OutputFormat::Table
            } else {
                OutputFormat::Tsv
            }
        }
        other => other,
    }
}

/// Print a value as JSON or YAML
pub fn print_serialized<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Print a listing in the requested format
///
/// Structured formats serialize `items` directly; tabular formats use
/// `headers` and the cells produced by `row`.
pub fn print_list<T, F>(items: &[T], headers: &[&str], row: F, format: OutputFormat) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> Vec<String>,
{
    let format = effective_format(format, true);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(items, format),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            writer.write_record(headers).into_diagnostic()?;
            for item in items {
                writer.write_record(row(item)).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
            Ok(())
        }
        OutputFormat::Tsv => {
            println!("{}", headers.join("\t"));
            for item in items {
                let cells: Vec<String> = row(item).into_iter().map(|c| c.replace('\t', " ")).collect();
                println!("{}", cells.join("\t"));
            }
            Ok(())
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let mut builder = Builder::default();
            builder.push_record(headers.iter().map(|h| h.to_string()));
            for item in items {
                builder.push_record(row(item));
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            println!("{}", table);
            Ok(())
        }
    }
}
