//! Table formatting utilities for CLI list commands
//!
//! One formatter renders list output for every entity as TSV (styled for the
//! terminal), CSV, Markdown or bare ids.

use chrono::{DateTime, Local, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::checklist::Answer;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Row id (cyan)
    Id(String),
    /// Plain text, truncated to the column width in TSV
    Text(String),
    /// Checklist answer with color coding; None is "unanswered"
    Answer(Option<Answer>),
    /// answered/total with color coding (complete=green, partial=yellow)
    Progress(i64, i64),
    /// Conformance percentage (100=green, >=80=yellow, below=red)
    Percent(f64),
    Number(i64),
    /// DateTime displayed with time, local zone
    DateTime(DateTime<Utc>),
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                format!("{:<width$}", truncate_str(s, width.saturating_sub(2)), width = width)
            }
            CellValue::Answer(answer) => {
                let styled = match answer {
                    Some(Answer::Conforming) => style(Answer::Conforming.as_str()).green(),
                    Some(Answer::NotApplicable) => style(Answer::NotApplicable.as_str()).dim(),
                    Some(Answer::NonConforming) => style(Answer::NonConforming.as_str()).red().bold(),
                    None => style("unanswered").yellow(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Progress(done, total) => {
                let text = format!("{}/{}", done, total);
                let styled = if *total > 0 && done == total {
                    style(text).green()
                } else if *done > 0 {
                    style(text).yellow()
                } else {
                    style(text).dim()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Percent(p) => {
                let text = format!("{:.1}%", p);
                let styled = if *p >= 100.0 {
                    style(text).green()
                } else if *p >= 80.0 {
                    style(text).yellow()
                } else {
                    style(text).red()
                };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                format!("{:<width$}", local.format("%Y-%m-%d %H:%M"), width = width)
            }
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Answer(None) => String::new(),
            CellValue::DateTime(dt) => dt.with_timezone(&Local).format("%Y-%m-%dT%H:%M:%S").to_string(),
            other => escape_csv(&other.raw()),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Empty | CellValue::Answer(None) => "-".to_string(),
            CellValue::Answer(Some(Answer::NonConforming)) => {
                format!("**{}**", Answer::NonConforming.as_str())
            }
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(id) => id.clone(),
            CellValue::Text(s) => s.clone(),
            CellValue::Answer(answer) => answer
                .map(|a| a.as_str().to_string())
                .unwrap_or_else(|| "unanswered".to_string()),
            CellValue::Progress(done, total) => format!("{}/{}", done, total),
            CellValue::Percent(p) => format!("{:.1}", p),
            CellValue::Number(n) => n.to_string(),
            CellValue::DateTime(dt) => dt
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Percent(p) => format!("{:.1}%", p).len(),
            CellValue::DateTime(_) => 16,
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with key, header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in the list formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Drop the trailing "N found" line (quiet mode)
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Output rows in the given format; structured formats fall back to TSV
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();
        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => self.output_md(&rows),
            OutputFormat::Id => {
                for row in &rows {
                    println!("{}", row.id);
                }
            }
            _ => self.output_tsv(&rows),
        }
    }

    /// Width per column: max of header and content, capped at the column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                col.header.len().max(max_content.saturating_add(2)).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = *w),
                })
                .collect();
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        println!("{}", headers.join(","));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(|v| v.format_csv()).unwrap_or_default())
                .collect();
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        println!("| {} |", headers.join(" | "));
        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(|v| v.format_md())
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            println!("| {} |", values.join(" | "));
        }
    }
}
