//! `ect equip` command - Equipment registration within a project

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{format_datetime, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog;
use crate::core::identity::EntityKind;
use crate::core::inspection;
use crate::core::store::StoreError;
use crate::entities::checklist::ChecklistSummary;
use crate::entities::equipment::Equipment;

#[derive(Subcommand, Debug)]
pub enum EquipCommands {
    /// List equipment, optionally for one project
    List(ListArgs),

    /// Register equipment (tag + family) under a project
    New(NewArgs),

    /// Show equipment and its checklist runs
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only equipment of this project number
    #[arg(long, short = 'p')]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project number
    pub project: String,

    /// Equipment tag (unique within the project)
    pub tag: String,

    /// Family code (see `ect family list`)
    #[arg(long, short = 'F')]
    pub family: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project number
    pub project: String,

    /// Equipment tag
    pub tag: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("project", "PROJECT", 16),
    ColumnDef::new("tag", "TAG", 20),
    ColumnDef::new("family", "FAMILY", 28),
    ColumnDef::new("checklists", "CHECKLISTS", 10),
];

#[derive(Serialize)]
struct EquipmentDetail<'a> {
    #[serde(flatten)]
    equipment: &'a Equipment,
    project_number: &'a str,
    family_name: Option<&'static str>,
    checklists: Vec<&'a ChecklistSummary>,
}

/// Run an equipment subcommand
pub fn run(cmd: EquipCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EquipCommands::List(args) => run_list(args, global),
        EquipCommands::New(args) => run_new(args, global),
        EquipCommands::Show(args) => run_show(args, global),
    }
}

fn family_label(code: &str) -> String {
    catalog::family(code)
        .map(|f| f.label())
        .unwrap_or_else(|| code.to_string())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project_id = match &args.project {
        Some(number) => Some(
            session
                .store
                .find_project_by_number(number)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Project, number.trim()))?
                .id,
        ),
        None => None,
    };
    let equipment = session.store.list_equipment(project_id)?;

    match session.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&equipment).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&equipment).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ if equipment.is_empty() => {
            if !global.quiet {
                println!("No equipment found.");
            }
        }
        format => {
            let rows = equipment.iter().map(|e| {
                TableRow::new(e.id)
                    .cell("id", CellValue::Id(e.id.to_string()))
                    .cell("project", CellValue::Text(e.project_number.clone()))
                    .cell("tag", CellValue::Text(e.tag.clone()))
                    .cell("family", CellValue::Text(family_label(&e.family_code)))
                    .cell("checklists", CellValue::Number(e.checklist_count))
            });
            TableFormatter::new(COLUMNS, "equipment")
                .quiet(global.quiet)
                .output(rows, format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let (project, id) =
        inspection::register_equipment(&session.store, &args.project, &args.tag, &args.family)?;

    if global.format == OutputFormat::Id {
        println!("{}", id);
        return Ok(());
    }
    if !global.quiet {
        println!(
            "{} Registered {} in {} (#{})",
            style("✓").green(),
            style(args.tag.trim()).cyan(),
            style(&project.number).cyan(),
            id
        );
        println!("   {}", style(family_label(args.family.trim())).dim());
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project = session
        .store
        .find_project_by_number(&args.project)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, args.project.trim()))?;
    let equipment = session
        .store
        .find_equipment(project.id, &args.tag)?
        .ok_or_else(|| {
            StoreError::not_found(
                EntityKind::Equipment,
                format!("{} in project {}", args.tag.trim(), project.number),
            )
        })?;

    let all = session.store.list_checklists(Some(project.id))?;
    let detail = EquipmentDetail {
        equipment: &equipment,
        project_number: &project.number,
        family_name: catalog::family(&equipment.family_code).map(|f| f.name),
        checklists: all
            .iter()
            .filter(|c| c.equipment_tag == equipment.tag)
            .collect(),
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
        OutputFormat::Id => println!("{}", equipment.id),
        _ => {
            println!(
                "{} {}",
                style(&equipment.tag).bold(),
                style(family_label(&equipment.family_code)).dim()
            );
            println!("  Project:  {}", project.label());
            println!("  Created:  {}", format_datetime(&equipment.created_at));
            println!("  Checklists:");
            for c in &detail.checklists {
                println!(
                    "    #{} {} {}/{} answered, {} action plan(s)",
                    c.id,
                    format_datetime(&c.created_at),
                    c.answered_items,
                    c.total_items,
                    c.action_plans
                );
            }
        }
    }
    Ok(())
}
