//! Checklist conformance report

use clap::ValueEnum;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;
use crate::core::identity::ChecklistId;
use crate::report::{render_markdown, render_pdf, report_filename, ReportDocument};

use super::{write_file, write_stdout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Pdf,
    Md,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Md => "md",
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ChecklistReportArgs {
    /// Checklist id
    pub id: ChecklistId,

    /// Report type
    #[arg(long, short = 't', value_enum, default_value = "pdf")]
    pub r#type: ReportFormat,

    /// Output file (default: <report_dir>/relatorio_checklist_<project>_<tag>.<ext>)
    #[arg(long, short = 'o', conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Write the report to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Inspector name printed on the report (default: config `inspector`)
    #[arg(long)]
    pub inspector: Option<String>,
}

pub fn run(args: ChecklistReportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    // Unknown or empty checklists render the single "no data" page
    let rows = session.store.get_full_checklist(args.id)?;
    if rows.is_empty() {
        tracing::warn!(checklist_id = %args.id, "no checklist data; rendering empty report");
    }
    let inspector = args.inspector.clone().or_else(|| session.config.inspector());
    let doc = ReportDocument::build(&rows, inspector.as_deref());

    let bytes = match args.r#type {
        ReportFormat::Pdf => render_pdf(&doc)?,
        ReportFormat::Md => render_markdown(&doc).into_bytes(),
    };

    if args.stdout {
        return write_stdout(&bytes);
    }

    let path = match args.output {
        Some(path) => path,
        None => session
            .config
            .report_dir(&session.workspace)
            .join(report_filename(&rows, args.r#type.extension())),
    };
    write_file(&path, &bytes)?;
    tracing::info!(path = %path.display(), pages = doc.page_count(), "wrote report");

    if !global.quiet {
        println!(
            "{} Report written to {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
        println!(
            "   {} page(s), {} action plan(s)",
            doc.page_count(),
            doc.action_plan_count()
        );
    }
    Ok(())
}
