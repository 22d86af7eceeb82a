//! `ect checklist` command - Start, answer and finalize inspections

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{format_datetime, truncate_str, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dashboard::ChecklistStats;
use crate::core::identity::{ChecklistId, EntityKind, ProjectId};
use crate::core::inspection::{self, ItemResponse, Submission};
use crate::core::store::StoreError;
use crate::entities::checklist::{Answer, ChecklistItem, ChecklistRow, ChecklistSummary};

#[derive(Subcommand, Debug)]
pub enum ChecklistCommands {
    /// List checklists with progress
    List(ListArgs),

    /// Start a checklist for registered equipment
    New(NewArgs),

    /// Show a checklist's items and results
    Show(ShowArgs),

    /// Answer a single item (saves progress)
    Answer(AnswerArgs),

    /// Answer every remaining item at once
    Finalize(FinalizeArgs),
}

/// Checklist state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateFilter {
    Open,
    Completed,
    All,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only checklists of this project number
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Filter by state
    #[arg(long, short = 's', default_value = "all")]
    pub state: StateFilter,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project number
    pub project: String,

    /// Equipment tag
    pub tag: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Checklist id
    pub id: ChecklistId,
}

#[derive(clap::Args, Debug)]
pub struct AnswerArgs {
    /// Checklist id
    pub id: ChecklistId,

    /// Item position (1-based)
    pub position: i64,

    /// conforming (S), not_applicable (NA) or non_conforming (N)
    pub answer: Answer,

    /// Photo file name
    #[arg(long)]
    pub photo: Option<String>,

    /// Action plan (required for non_conforming)
    #[arg(long = "plan", short = 'a')]
    pub action_plan: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct FinalizeArgs {
    /// Checklist id
    pub id: ChecklistId,

    /// Submission file: YAML (`answers:` list) or CSV (position,answer,photo,action_plan)
    #[arg(long, short = 'F', conflicts_with = "interactive")]
    pub file: Option<PathBuf>,

    /// Prompt for each unanswered item
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("project", "PROJECT", 16),
    ColumnDef::new("tag", "TAG", 20),
    ColumnDef::new("family", "FAMILY", 8),
    ColumnDef::new("progress", "ANSWERED", 10),
    ColumnDef::new("plans", "PLANS", 6),
    ColumnDef::new("created", "CREATED", 18),
];

const ITEM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("position", "#", 4),
    ColumnDef::new("question", "QUESTION", 60),
    ColumnDef::new("answer", "ANSWER", 16),
    ColumnDef::new("photo", "PHOTO", 20),
    ColumnDef::new("plan", "ACTION PLAN", 40),
];

#[derive(Serialize)]
struct ChecklistDetail<'a> {
    #[serde(flatten)]
    summary: &'a ChecklistSummary,
    stats: ChecklistStats,
    items: &'a [ChecklistRow],
}

/// Run a checklist subcommand
pub fn run(cmd: ChecklistCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ChecklistCommands::List(args) => run_list(args, global),
        ChecklistCommands::New(args) => run_new(args, global),
        ChecklistCommands::Show(args) => run_show(args, global),
        ChecklistCommands::Answer(args) => run_answer(args, global),
        ChecklistCommands::Finalize(args) => run_finalize(args, global),
    }
}

fn project_filter(session: &Session, number: Option<&str>) -> Result<Option<ProjectId>> {
    let Some(number) = number else {
        return Ok(None);
    };
    let project = session
        .store
        .find_project_by_number(number)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, number.trim()))?;
    Ok(Some(project.id))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project_id = project_filter(&session, args.project.as_deref())?;

    let checklists: Vec<ChecklistSummary> = session
        .store
        .list_checklists(project_id)?
        .into_iter()
        .filter(|c| match args.state {
            StateFilter::Open => !c.is_completed(),
            StateFilter::Completed => c.is_completed(),
            StateFilter::All => true,
        })
        .collect();

    match session.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&checklists).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&checklists).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ if checklists.is_empty() => {
            if !global.quiet {
                println!("No checklists found.");
            }
        }
        format => {
            let rows = checklists.iter().map(|c| {
                TableRow::new(c.id)
                    .cell("id", CellValue::Id(c.id.to_string()))
                    .cell("project", CellValue::Text(c.project_number.clone()))
                    .cell("tag", CellValue::Text(c.equipment_tag.clone()))
                    .cell("family", CellValue::Text(c.family_code.clone()))
                    .cell("progress", CellValue::Progress(c.answered_items, c.total_items))
                    .cell("plans", CellValue::Number(c.action_plans))
                    .cell("created", CellValue::DateTime(c.created_at))
            });
            TableFormatter::new(COLUMNS, "checklist")
                .quiet(global.quiet)
                .output(rows, format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let started = inspection::start_checklist(&mut session.store, &args.project, &args.tag)?;

    if global.format == OutputFormat::Id {
        println!("{}", started.checklist_id);
        return Ok(());
    }
    if !global.quiet {
        println!(
            "{} Started checklist #{} for {} in {}",
            style("✓").green(),
            style(started.checklist_id).cyan(),
            style(&started.equipment.tag).cyan(),
            style(&started.project.number).cyan()
        );
        println!(
            "   {} | {} question(s)",
            style(started.family.label()).dim(),
            started.item_ids.len()
        );
        println!();
        println!(
            "Answer with {} or {}",
            style(format!("ect checklist finalize {} -i", started.checklist_id)).yellow(),
            style(format!("ect checklist finalize {} --file answers.yaml", started.checklist_id))
                .yellow()
        );
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let summary = session
        .store
        .checklist_summary(args.id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Checklist, args.id))?;
    let rows = session.store.get_full_checklist(args.id)?;
    let stats = ChecklistStats::from_rows(&rows);

    let detail = ChecklistDetail {
        summary: &summary,
        stats,
        items: &rows,
    };

    match session.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&detail).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&detail).into_diagnostic()?;
            print!("{}", yaml);
        }
        format => {
            if format == OutputFormat::Tsv && !global.quiet {
                println!(
                    "{} #{} {} / {} ({})",
                    style("Checklist").bold(),
                    summary.id,
                    style(&summary.project_number).cyan(),
                    style(&summary.equipment_tag).cyan(),
                    format_datetime(&summary.created_at)
                );
                print_stats(&stats);
                println!();
            }
            let items = rows.iter().map(|r| {
                TableRow::new(r.item_id)
                    .cell("position", CellValue::Number(r.position))
                    .cell("question", CellValue::Text(r.question.clone()))
                    .cell("answer", CellValue::Answer(r.answer))
                    .cell(
                        "photo",
                        r.photo.clone().map(CellValue::Text).unwrap_or(CellValue::Empty),
                    )
                    .cell(
                        "plan",
                        r.action_plan
                            .clone()
                            .map(CellValue::Text)
                            .unwrap_or(CellValue::Empty),
                    )
            });
            TableFormatter::new(ITEM_COLUMNS, "item")
                .quiet(true)
                .output(items, format);
        }
    }
    Ok(())
}

fn print_stats(stats: &ChecklistStats) {
    println!(
        "  {} conforming, {} non-conforming ({} n/a, {} unanswered) of {} | {}",
        style(stats.conforming).green(),
        style(stats.non_conforming).red(),
        stats.not_applicable,
        stats.unanswered,
        stats.total_items,
        style(format!("{:.1}% conformance", stats.conformance_percentage)).bold()
    );
}

fn run_answer(args: AnswerArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let response = ItemResponse {
        position: Some(args.position),
        answer: args.answer,
        photo: args.photo,
        action_plan: args.action_plan,
    };
    let item = inspection::record_answer(&mut session.store, args.id, args.position, &response)?;

    if !global.quiet {
        println!(
            "{} Item {} of checklist #{}: {}",
            style("✓").green(),
            item.position,
            args.id,
            style(args.answer.label()).cyan()
        );
        println!("   {}", style(truncate_str(&item.question, 80)).dim());
    }
    Ok(())
}

fn run_finalize(args: FinalizeArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let responses = match &args.file {
        Some(path) => Submission::load(path)?.answers,
        None if args.interactive => {
            let pending: Vec<ChecklistItem> = session
                .store
                .checklist_items(args.id)?
                .into_iter()
                .filter(|i| !i.is_answered())
                .collect();
            prompt_responses(&pending)?
        }
        None => {
            return Err(miette::miette!(
                help = "Pass --file <answers.yaml|answers.csv> or --interactive",
                "No answers given for checklist #{}",
                args.id
            ))
        }
    };

    let stats = inspection::finalize_checklist(&mut session.store, args.id, &responses)?;

    match session.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&stats).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&stats).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            println!(
                "{} Finalized checklist #{}",
                style("✓").green(),
                style(args.id).cyan()
            );
            print_stats(&stats);
        }
    }
    Ok(())
}

/// Ask for answer, photo and (for non-conforming) an action plan per item
fn prompt_responses(items: &[ChecklistItem]) -> Result<Vec<ItemResponse>> {
    use dialoguer::{theme::ColorfulTheme, Input, Select};
    let theme = ColorfulTheme::default();
    let labels: Vec<&str> = Answer::ALL.iter().map(|a| a.label()).collect();

    let mut responses = Vec::with_capacity(items.len());
    for item in items {
        println!();
        println!("{} {}", style(format!("{}.", item.position)).cyan(), item.question);

        let idx = Select::with_theme(&theme)
            .with_prompt("Answer")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        let answer = Answer::ALL[idx];

        let photo: String = Input::with_theme(&theme)
            .with_prompt("Photo file (optional)")
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;

        let action_plan = if answer.requires_action_plan() {
            let plan: String = Input::with_theme(&theme)
                .with_prompt("Action plan")
                .validate_with(|input: &String| -> std::result::Result<(), &str> {
                    if input.trim().is_empty() {
                        Err("An action plan is required for non-conforming items")
                    } else {
                        Ok(())
                    }
                })
                .interact_text()
                .into_diagnostic()?;
            Some(plan)
        } else {
            None
        };

        responses.push(ItemResponse {
            position: Some(item.position),
            answer,
            photo: Some(photo).filter(|p| !p.trim().is_empty()),
            action_plan,
        });
    }
    Ok(responses)
}
