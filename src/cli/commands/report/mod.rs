//! `ect report` command - Generate checklist reports

mod checklist;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cli::GlobalOpts;

pub use checklist::ChecklistReportArgs;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Conformance report for one checklist (PDF or Markdown)
    Checklist(ChecklistReportArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Checklist(args) => checklist::run(args, global),
    }
}

/// Write report bytes to a file, creating parent directories
pub(crate) fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    let file = File::create(path).into_diagnostic()?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content).into_diagnostic()?;
    writer.flush().into_diagnostic()?;
    Ok(())
}

/// Stream report bytes to stdout
pub(crate) fn write_stdout(content: &[u8]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(content).into_diagnostic()?;
    handle.flush().into_diagnostic()?;
    Ok(())
}
