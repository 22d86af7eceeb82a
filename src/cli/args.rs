//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    checklist::ChecklistCommands, completions::CompletionsArgs, dashboard::DashboardArgs,
    equip::EquipCommands, family::FamilyCommands, init::InitArgs, project::ProjectCommands,
    report::ReportCommands,
};

#[derive(Parser)]
#[command(name = "ect")]
#[command(author, version, about = "Equipment Checklist Toolkit")]
#[command(
    long_about = "Record equipment inspection checklists per project, track action plans for non-conforming items, and render conformance reports."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .ect/)
    #[arg(long, global = true, env = "ECT_WORKSPACE")]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ect workspace
    Init(InitArgs),

    /// Project registration and lookup
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Equipment registration (tag + family) within a project
    #[command(subcommand)]
    Equip(EquipCommands),

    /// Equipment families and their question templates
    #[command(subcommand)]
    Family(FamilyCommands),

    /// Start, answer and finalize inspection checklists
    #[command(subcommand)]
    Checklist(ChecklistCommands),

    /// Open/completed checklists and action plans per project
    Dashboard(DashboardArgs),

    /// Generate checklist reports (PDF, Markdown)
    #[command(subcommand)]
    Report(ReportCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
