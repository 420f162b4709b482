//! `greenboard report` command - Emissions aggregations

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{format_kg, open_ledger, or_dash, parse_date, parse_person_id};
use crate::cli::output::{effective_format, print_list, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::emissions::EnvironmentalImpact;
use crate::core::identity::PersonId;
use crate::core::ledger::{DateRange, Interval, TimelineScope};

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Total emissions of packages addressed to a person
    Person(PersonArgs),

    /// Total emissions of packages addressed to a department
    Department(DepartmentArgs),

    /// Total emissions of packages shipped in a date range (inclusive)
    Range(RangeArgs),

    /// Students ranked by emissions
    Students(StudentsArgs),

    /// Departments ranked by their students' emissions
    Majors,

    /// Emissions over time
    Timeline(TimelineArgs),

    /// Packages per current status
    Status,
}

#[derive(clap::Args, Debug)]
pub struct PersonArgs {
    /// Person ID
    #[arg(value_parser = parse_person_id)]
    pub id: PersonId,
}

#[derive(clap::Args, Debug)]
pub struct DepartmentArgs {
    /// Department name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct RangeArgs {
    /// First ship date
    #[arg(value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last ship date
    #[arg(value_parser = parse_date)]
    pub end: NaiveDate,
}

#[derive(clap::Args, Debug)]
pub struct StudentsArgs {
    /// Only students of this department or major
    #[arg(long)]
    pub major: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct TimelineArgs {
    /// One person's packages
    #[arg(long, value_parser = parse_person_id, conflicts_with_all = ["department", "students"])]
    pub person: Option<PersonId>,

    /// Students of one department
    #[arg(long, conflicts_with = "students")]
    pub department: Option<String>,

    /// Only packages addressed to students
    #[arg(long)]
    pub students: bool,

    /// Bucket size: day, week, month or year
    #[arg(long, short = 'i', default_value = "month")]
    pub interval: Interval,

    /// First ship date (inclusive)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last ship date (inclusive)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

/// One emissions total for structured output
#[derive(Serialize)]
struct Total {
    scope: String,
    total_emissions_kg: f64,
    impact: EnvironmentalImpact,
}

/// Run a report subcommand
pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Person(args) => {
            let ledger = open_ledger(global)?;
            let total = ledger.total_emissions_by_person(&args.id)?;
            print_total(format!("person {}", args.id), total, global)
        }
        ReportCommands::Department(args) => {
            let ledger = open_ledger(global)?;
            let total = ledger.total_emissions_by_department(&args.name)?;
            print_total(format!("department {}", args.name.trim()), total, global)
        }
        ReportCommands::Range(args) => {
            let ledger = open_ledger(global)?;
            let total = ledger.total_emissions_by_date_range(args.start, args.end)?;
            print_total(format!("{} to {}", args.start, args.end), total, global)
        }
        ReportCommands::Students(args) => run_students(args, global),
        ReportCommands::Majors => run_majors(global),
        ReportCommands::Timeline(args) => run_timeline(args, global),
        ReportCommands::Status => run_status(global),
    }
}

fn print_total(scope: String, total: f64, global: &GlobalOpts) -> Result<()> {
    let impact = EnvironmentalImpact::of(total);
    match effective_format(global.format, false) {
        OutputFormat::Auto => {
            println!(
                "{}: {} kg CO2e",
                style(&scope).bold(),
                style(format_kg(total)).green()
            );
            println!(
                "   {}",
                style(format!(
                    "≈ {:.2} trees for a year, {:.1} car miles",
                    impact.trees_to_offset, impact.car_miles_equivalent
                ))
                .dim()
            );
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(
            &Total {
                scope,
                total_emissions_kg: total,
                impact,
            },
            global.format,
        ),
        _ => {
            println!("{}", format_kg(total));
            Ok(())
        }
    }
}

fn run_students(args: StudentsArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let mut standings = ledger.student_leaderboard(args.major.as_deref())?;
    if let Some(limit) = args.limit {
        standings.truncate(limit);
    }
    print_list(
        &standings,
        &["RANK", "ID", "NAME", "MAJOR", "KG CO2E"],
        |s| {
            vec![
                s.rank.to_string(),
                s.person_id.to_string(),
                s.name.clone(),
                or_dash(s.department.as_ref()),
                format_kg(s.emissions_kg),
            ]
        },
        global.format,
    )
}

fn run_majors(global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let standings = ledger.major_leaderboard()?;
    print_list(
        &standings,
        &["RANK", "MAJOR", "KG CO2E"],
        |s| {
            vec![
                s.rank.to_string(),
                or_dash(s.department.as_ref()),
                format_kg(s.emissions_kg),
            ]
        },
        global.format,
    )
}

fn run_timeline(args: TimelineArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let scope = match (args.person, args.department) {
        (Some(person), _) => TimelineScope::Person(person),
        (None, Some(department)) => TimelineScope::Department(department),
        (None, None) => TimelineScope::All {
            students_only: args.students,
        },
    };
    let range = DateRange::new(args.from, args.to)?;
    let points = ledger.timeline(&scope, args.interval, range)?;

    if points.is_empty() && effective_format(global.format, false) == OutputFormat::Auto {
        println!("No shipped packages in range.");
        return Ok(());
    }
    print_list(
        &points,
        &["PERIOD", "PACKAGES", "RECIPIENTS", "KG CO2E", "AVG KG", "DISTANCE"],
        |p| {
            vec![
                p.period.to_string(),
                p.package_count.to_string(),
                p.unique_recipients.to_string(),
                format_kg(p.total_emissions_kg),
                format_kg(p.avg_emissions_kg),
                format!("{:.1}", p.total_distance),
            ]
        },
        global.format,
    )
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let summary = ledger.status_summary()?;
    print_list(
        &summary,
        &["STATUS", "PACKAGES"],
        |s| vec![s.status.to_string(), s.packages.to_string()],
        global.format,
    )
}
