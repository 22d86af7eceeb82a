//! `ect family` command - Equipment families and question templates

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog;

#[derive(Subcommand, Debug)]
pub enum FamilyCommands {
    /// List known equipment families
    List,

    /// Show the questions asked for a family
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Family code (e.g. 3100)
    pub code: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "CODE", 6),
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("questions", "QUESTIONS", 10),
];

/// Run a family subcommand (no workspace needed)
pub fn run(cmd: FamilyCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FamilyCommands::List => run_list(global),
        FamilyCommands::Show(args) => run_show(args, global),
    }
}

fn auto(global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
    if global.format == OutputFormat::Auto {
        fallback
    } else {
        global.format
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let families = catalog::families();
    match auto(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(families).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&families).into_diagnostic()?;
            print!("{}", yaml);
        }
        format => {
            let rows = families.iter().map(|f| {
                TableRow::new(f.code)
                    .cell("code", CellValue::Id(f.code.to_string()))
                    .cell("name", CellValue::Text(f.name.to_string()))
                    .cell("questions", CellValue::Number(f.len() as i64))
            });
            TableFormatter::new(COLUMNS, "family")
                .quiet(global.quiet)
                .output(rows, format);
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let family = catalog::require_family(&args.code)?;
    match auto(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(family).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(family).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Md => {
            println!("## {}\n", family.label());
            for (i, q) in family.questions.iter().enumerate() {
                println!("{}. {}", i + 1, q);
            }
        }
        OutputFormat::Id => println!("{}", family.code),
        _ => {
            println!("{}", style(family.label()).bold());
            for (i, q) in family.questions.iter().enumerate() {
                println!("  {:>2}. {}", style(i + 1).cyan(), q);
            }
        }
    }
    Ok(())
}
