//! `greenboard person` command - Person directory

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::commands::print_delete_outcome;
use crate::cli::helpers::{format_kg, open_ledger, or_dash, parse_person_id};
use crate::cli::output::{effective_format, print_list, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::PersonId;
use crate::entities::{NewPerson, Person, PersonFilter};

#[derive(Subcommand, Debug)]
pub enum PersonCommands {
    /// List persons
    List(ListArgs),

    /// Add a person
    New(NewArgs),

    /// Show a person with departments, reports and emissions
    Show(IdArgs),

    /// Set or clear a person's supervisor
    Supervisor(SupervisorArgs),

    /// Affiliate a person with a department or major
    DeptAdd(DeptArgs),

    /// Remove a department affiliation
    DeptRm(DeptArgs),

    /// Remove a person; their packages and events are kept
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only students
    #[arg(long)]
    pub students: bool,

    /// Only mailroom workers
    #[arg(long)]
    pub workers: bool,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// 9-digit person ID
    #[arg(value_parser = parse_person_id)]
    pub id: PersonId,

    #[arg(long)]
    pub first: Option<String>,

    #[arg(long)]
    pub last: Option<String>,

    /// Mark as a student
    #[arg(long)]
    pub student: bool,

    /// Mark as a mailroom worker
    #[arg(long)]
    pub worker: bool,

    /// Mailbox number
    #[arg(long = "box")]
    pub box_number: Option<String>,

    /// Class year (above 4 means graduate)
    #[arg(long)]
    pub class_year: Option<i64>,

    /// Supervisor's person ID
    #[arg(long, value_parser = parse_person_id)]
    pub supervisor: Option<PersonId>,

    /// Department or major (repeatable)
    #[arg(long = "dept")]
    pub departments: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Person ID
    #[arg(value_parser = parse_person_id)]
    pub id: PersonId,
}

#[derive(clap::Args, Debug)]
pub struct SupervisorArgs {
    /// Person ID
    #[arg(value_parser = parse_person_id)]
    pub id: PersonId,

    /// Supervisor's person ID; omit to clear
    #[arg(value_parser = parse_person_id)]
    pub supervisor: Option<PersonId>,
}

#[derive(clap::Args, Debug)]
pub struct DeptArgs {
    /// Person ID
    #[arg(value_parser = parse_person_id)]
    pub id: PersonId,

    /// Department name
    pub department: String,
}

/// Full person record for structured output
#[derive(Serialize)]
struct PersonDetail<'a> {
    #[serde(flatten)]
    person: &'a Person,
    graduate: bool,
    departments: Vec<String>,
    direct_reports: Vec<PersonId>,
    total_emissions_kg: f64,
}

/// Run a person subcommand
pub fn run(cmd: PersonCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PersonCommands::List(args) => run_list(args, global),
        PersonCommands::New(args) => run_new(args, global),
        PersonCommands::Show(args) => run_show(args, global),
        PersonCommands::Supervisor(args) => run_supervisor(args, global),
        PersonCommands::DeptAdd(args) => run_dept_add(args, global),
        PersonCommands::DeptRm(args) => run_dept_rm(args, global),
        PersonCommands::Delete(args) => run_delete(args, global),
    }
}

fn flags(person: &Person) -> String {
    let mut flags = Vec::new();
    if person.is_student {
        flags.push(if person.is_graduate() { "grad" } else { "student" });
    }
    if person.is_mailroom_worker {
        flags.push("worker");
    }
    flags.join(",")
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let persons = ledger.list_persons(PersonFilter {
        students_only: args.students,
        workers_only: args.workers,
    })?;

    if args.count {
        println!("{}", persons.len());
        return Ok(());
    }
    if persons.is_empty() && effective_format(global.format, false) == OutputFormat::Auto {
        println!("No persons found.");
        return Ok(());
    }

    print_list(
        &persons,
        &["ID", "NAME", "ROLE", "BOX", "YEAR", "SUPERVISOR"],
        |p| {
            vec![
                p.wpi_id.to_string(),
                p.display_name(),
                flags(p),
                or_dash(p.box_number.as_ref()),
                or_dash(p.class_year),
                or_dash(p.supervisor_id.as_ref()),
            ]
        },
        global.format,
    )
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    ledger.create_person(
        &args.id,
        NewPerson {
            first_name: args.first,
            last_name: args.last,
            is_student: args.student,
            is_mailroom_worker: args.worker,
            box_number: args.box_number,
            class_year: args.class_year,
            supervisor_id: args.supervisor,
        },
    )?;
    for department in &args.departments {
        ledger.add_department(&args.id, department)?;
    }
    println!(
        "{} Created person {}",
        style("✓").green(),
        style(&args.id).cyan()
    );
    Ok(())
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let ledger = open_ledger(global)?;
    let person = ledger.get_person(&args.id)?;
    let departments = ledger.departments_of(&args.id)?;
    let reports = ledger.direct_reports(&args.id)?;
    let total = ledger.total_emissions_by_person(&args.id)?;

    match effective_format(global.format, false) {
        OutputFormat::Json | OutputFormat::Yaml => {
            let detail = PersonDetail {
                person: &person,
                graduate: person.is_graduate(),
                departments,
                direct_reports: reports.into_iter().map(|p| p.wpi_id).collect(),
                total_emissions_kg: total,
            };
            print_serialized(&detail, global.format)
        }
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&person.wpi_id).cyan());
            println!(
                "{}: {}",
                style("Name").bold(),
                style(person.display_name()).yellow()
            );
            let role = flags(&person);
            if !role.is_empty() {
                println!("{}: {}", style("Role").bold(), role);
            }
            if let Some(ref box_number) = person.box_number {
                println!("{}: {}", style("Box").bold(), box_number);
            }
            if let Some(year) = person.class_year {
                println!("{}: {}", style("Class Year").bold(), year);
            }
            if let Some(ref supervisor) = person.supervisor_id {
                println!("{}: {}", style("Supervisor").bold(), supervisor);
            }
            println!("{}", style("─".repeat(60)).dim());

            if !departments.is_empty() {
                println!("{}: {}", style("Departments").bold(), departments.join(", "));
            }
            if !reports.is_empty() {
                println!();
                println!("{} ({}):", style("Direct Reports").bold(), reports.len());
                for report in &reports {
                    println!("  • {} {}", style(&report.wpi_id).cyan(), report.display_name());
                }
            }
            println!();
            println!(
                "{}: {} kg CO2e",
                style("Total Emissions").bold(),
                style(format_kg(total)).green()
            );
            Ok(())
        }
    }
}

fn run_supervisor(args: SupervisorArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    ledger.set_supervisor(&args.id, args.supervisor.as_ref())?;
    match args.supervisor {
        Some(supervisor) => println!(
            "{} {} now reports to {}",
            style("✓").green(),
            style(&args.id).cyan(),
            style(supervisor).cyan()
        ),
        None => println!(
            "{} Cleared supervisor of {}",
            style("✓").green(),
            style(&args.id).cyan()
        ),
    }
    Ok(())
}

fn run_dept_add(args: DeptArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    ledger.add_department(&args.id, &args.department)?;
    println!(
        "{} Added {} to {}",
        style("✓").green(),
        style(&args.id).cyan(),
        style(args.department.trim()).yellow()
    );
    Ok(())
}

fn run_dept_rm(args: DeptArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    ledger.remove_department(&args.id, &args.department)?;
    println!(
        "{} Removed {} from {}",
        style("✓").green(),
        style(&args.id).cyan(),
        style(args.department.trim()).yellow()
    );
    Ok(())
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ledger = open_ledger(global)?;
    let outcome = ledger.remove_person(&args.id)?;
    println!(
        "{} Removed person {}",
        style("✓").green(),
        style(&args.id).cyan()
    );
    print_delete_outcome(&outcome);
    Ok(())
}
