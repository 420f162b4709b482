//! CLI command implementations

pub mod carrier;
pub mod completions;
pub mod factor;
pub mod import;
pub mod init;
pub mod package;
pub mod person;
pub mod report;
pub mod txn;

use console::style;

use crate::core::ledger::{DeleteOutcome, OnDelete};

/// Print what a delete did to dependent rows
pub(crate) fn print_delete_outcome(outcome: &DeleteOutcome) {
    for effect in &outcome.effects {
        let verb = match effect.on_delete {
            OnDelete::Cascade => "deleted",
            OnDelete::SetNull => "cleared",
            OnDelete::Restrict => continue,
        };
        println!(
            "   {} {} {} row(s) in {}",
            style("→").dim(),
            verb,
            style(effect.rows).cyan(),
            effect.relation
        );
    }
}
