//! `ect project` command - Project registration and lookup

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{format_datetime, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityKind;
use crate::core::store::StoreError;
use crate::entities::equipment::EquipmentSummary;
use crate::entities::project::Project;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List all projects
    List,

    /// Register a new project
    New(NewArgs),

    /// Show a project and its equipment
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project number (unique, e.g. P-2024-001)
    pub number: Option<String>,

    /// Project name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Client name
    #[arg(long, short = 'c')]
    pub client: Option<String>,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project number
    pub number: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("number", "NUMBER", 16),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("client", "CLIENT", 24),
    ColumnDef::new("created", "CREATED", 18),
];

#[derive(Serialize)]
struct ProjectDetail<'a> {
    #[serde(flatten)]
    project: &'a Project,
    equipment: &'a [EquipmentSummary],
}

/// Run a project subcommand
pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::List => run_list(global),
        ProjectCommands::New(args) => run_new(args, global),
        ProjectCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let projects = session.store.list_projects()?;

    if projects.is_empty() && !matches!(global.format, OutputFormat::Json | OutputFormat::Yaml) {
        if !global.quiet {
            println!("No projects found.");
        }
        return Ok(());
    }

    match session.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&projects).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&projects).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for project in &projects {
                println!("{}", project.number);
            }
        }
        format => {
            let rows = projects.iter().map(|p| {
                TableRow::new(&p.number)
                    .cell("number", CellValue::Id(p.number.clone()))
                    .cell("name", CellValue::Text(p.name.clone()))
                    .cell("client", CellValue::Text(p.client.clone()))
                    .cell("created", CellValue::DateTime(p.created_at))
            });
            TableFormatter::new(COLUMNS, "project")
                .quiet(global.quiet)
                .output(rows, format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;

    let (number, name, client) = if args.interactive || args.number.is_none() {
        use dialoguer::{theme::ColorfulTheme, Input};
        let theme = ColorfulTheme::default();

        let number: String = Input::with_theme(&theme)
            .with_prompt("Project number")
            .with_initial_text(args.number.unwrap_or_default())
            .interact_text()
            .into_diagnostic()?;
        let name: String = Input::with_theme(&theme)
            .with_prompt("Project name")
            .with_initial_text(args.name.unwrap_or_default())
            .interact_text()
            .into_diagnostic()?;
        let client: String = Input::with_theme(&theme)
            .with_prompt("Client")
            .with_initial_text(args.client.unwrap_or_default())
            .interact_text()
            .into_diagnostic()?;
        (number, name, client)
    } else {
        (
            args.number.unwrap_or_default(),
            args.name
                .ok_or_else(|| miette::miette!("Project name is required (use --name or -n)"))?,
            args.client
                .ok_or_else(|| miette::miette!("Client is required (use --client or -c)"))?,
        )
    };

    let id = session.store.create_project(&number, &name, &client)?;

    if global.format == OutputFormat::Id {
        println!("{}", number.trim());
        return Ok(());
    }
    if !global.quiet {
        println!(
            "{} Created project {} (#{})",
            style("✓").green(),
            style(number.trim()).cyan(),
            id
        );
        println!("   {} | {}", style(name.trim()).white(), style(client.trim()).dim());
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session
        .store
        .find_project_by_number(&args.number)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, args.number.trim()))?;
    let equipment = session.store.list_equipment(Some(project.id))?;

    let detail = ProjectDetail {
        project: &project,
        equipment: &equipment,
    };

    match session.format(global, OutputFormat::Yaml) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&detail).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&detail).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => println!("{}", project.number),
        _ => {
            println!("{}", style(project.label()).bold());
            println!("  Client:    {}", project.client);
            println!("  Created:   {}", format_datetime(&project.created_at));
            println!("  Equipment: {}", equipment.len());
            for e in &equipment {
                println!(
                    "    {} {} ({} checklist(s))",
                    style(&e.tag).cyan(),
                    style(&e.family_code).dim(),
                    e.checklist_count
                );
            }
        }
    }
    Ok(())
}
