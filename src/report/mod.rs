//! Checklist report rendering
//!
//! A report is built once from the assembled checklist rows into a
//! [`ReportDocument`]: a list of content blocks plus their paginated layout.
//! The same document renders to PDF bytes or to Markdown.

mod markdown;
mod pdf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::dashboard::ChecklistStats;
use crate::entities::checklist::{Answer, ChecklistRow};

pub use markdown::render_markdown;
pub use pdf::render_pdf;

/// Fixed header printed on every page
pub const REPORT_TITLE: &str = "Equipment Checklist Report";

/// Shown on the single page of a report without rows
pub const EMPTY_NOTICE: &str = "No checklist data found for this report.";

/// Body lines that fit between header and footer on one A4 page
pub(crate) const LINES_PER_PAGE: usize = 40;

/// Characters per body line before wrapping
pub(crate) const WRAP_WIDTH: usize = 92;

#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("failed to render PDF: {0}")]
    #[diagnostic(code(ect::report::pdf))]
    Pdf(String),

    #[error("failed to write report: {0}")]
    #[diagnostic(code(ect::report::io), help("Check that the report directory exists and is writable"))]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// One logical section of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    /// Labelled values (equipment details, results)
    Fields {
        heading: String,
        fields: Vec<(String, String)>,
    },
    /// One checklist question with its outcome
    Item {
        position: i64,
        question: String,
        answer: Option<Answer>,
        photo: Option<String>,
        action_plan: Option<String>,
    },
    Notice { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Heading,
    Text,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

impl Line {
    fn heading(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Heading,
            text: text.into(),
        }
    }

    fn text(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Text,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self {
            kind: LineKind::Blank,
            text: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub lines: Vec<Line>,
}

impl Block {
    /// Wrapped layout lines, ending with a spacer
    fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        match self {
            Block::Fields { heading, fields } => {
                lines.push(Line::heading(heading.clone()));
                for (label, value) in fields {
                    push_wrapped(&mut lines, &format!("{}: {}", label, value));
                }
            }
            Block::Item {
                position,
                question,
                answer,
                photo,
                action_plan,
            } => {
                let heading = format!("{}. {}", position, question);
                for (i, part) in wrap(&heading, WRAP_WIDTH).into_iter().enumerate() {
                    lines.push(if i == 0 {
                        Line::heading(part)
                    } else {
                        Line::heading(format!("   {}", part))
                    });
                }
                let answer = answer.map(|a| a.label()).unwrap_or("Unanswered");
                push_wrapped(&mut lines, &format!("Answer: {}", answer));
                if let Some(photo) = photo {
                    push_wrapped(&mut lines, &format!("Photo: {}", photo));
                }
                if let Some(plan) = action_plan {
                    push_wrapped(&mut lines, &format!("Action plan: {}", plan));
                }
            }
            Block::Notice { text } => push_wrapped(&mut lines, text),
        }
        lines.push(Line::blank());
        lines
    }
}

fn push_wrapped(lines: &mut Vec<Line>, text: &str) {
    lines.extend(wrap(text, WRAP_WIDTH).into_iter().map(Line::text));
}

/// Greedy word wrap; words longer than `width` are split
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let split: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            out.push(split);
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

/// A laid-out checklist report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub blocks: Vec<Block>,
    pub pages: Vec<Page>,
    pub stats: Option<ChecklistStats>,
}

impl ReportDocument {
    /// Build the report for one checklist's rows
    pub fn build(rows: &[ChecklistRow], inspector: Option<&str>) -> Self {
        let Some(first) = rows.first() else {
            let blocks = vec![Block::Notice {
                text: EMPTY_NOTICE.to_string(),
            }];
            let pages = paginate(&blocks);
            return Self {
                title: REPORT_TITLE.to_string(),
                blocks,
                pages,
                stats: None,
            };
        };

        let stats = ChecklistStats::from_rows(rows);

        let mut details = vec![
            ("Project number".to_string(), first.project_number.clone()),
            ("Project name".to_string(), first.project_name.clone()),
            ("Client".to_string(), first.client.clone()),
            ("Equipment tag".to_string(), first.equipment_tag.clone()),
            ("Family".to_string(), family_label(&first.family_code)),
            (
                "Checklist date".to_string(),
                first.checklist_created_at.format("%Y-%m-%d %H:%M").to_string(),
            ),
        ];
        if let Some(name) = inspector.map(str::trim).filter(|n| !n.is_empty()) {
            details.push(("Inspector".to_string(), name.to_string()));
        }

        let plans = rows.iter().filter(|r| r.action_plan.is_some()).count();
        let results = vec![
            ("Total items".to_string(), stats.total_items.to_string()),
            ("Conforming".to_string(), stats.conforming.to_string()),
            ("Non-conforming".to_string(), stats.non_conforming.to_string()),
            ("Not applicable".to_string(), stats.not_applicable.to_string()),
            ("Unanswered".to_string(), stats.unanswered.to_string()),
            ("Action plans".to_string(), plans.to_string()),
            (
                "Conformance".to_string(),
                format!("{:.1}%", stats.conformance_percentage),
            ),
        ];

        let mut blocks = vec![
            Block::Fields {
                heading: "Equipment".to_string(),
                fields: details,
            },
            Block::Fields {
                heading: "Results".to_string(),
                fields: results,
            },
        ];
        blocks.extend(rows.iter().map(|row| Block::Item {
            position: row.position,
            question: row.question.clone(),
            answer: row.answer,
            photo: row.photo.clone(),
            action_plan: row.action_plan.clone(),
        }));

        let pages = paginate(&blocks);
        tracing::debug!(blocks = blocks.len(), pages = pages.len(), "laid out report");

        Self {
            title: REPORT_TITLE.to_string(),
            blocks,
            pages,
            stats: Some(stats),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// "Page n/N" for a 1-based page number
    pub fn footer(&self, page_number: usize) -> String {
        format!("Page {}/{}", page_number, self.page_count())
    }

    pub fn action_plan_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Item { action_plan: Some(_), .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_none()
    }
}

fn family_label(code: &str) -> String {
    crate::core::catalog::family(code)
        .map(|f| f.label())
        .unwrap_or_else(|| code.to_string())
}

/// Flow blocks onto pages; a block that fits on a fresh page is never split
fn paginate(blocks: &[Block]) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = Page::default();

    for block in blocks {
        let lines = block.lines();
        let remaining = LINES_PER_PAGE - current.lines.len();
        if lines.len() > remaining && lines.len() <= LINES_PER_PAGE && !current.lines.is_empty() {
            pages.push(std::mem::take(&mut current));
        }
        for line in lines {
            if current.lines.len() == LINES_PER_PAGE {
                pages.push(std::mem::take(&mut current));
            }
            current.lines.push(line);
        }
    }

    if !current.lines.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// `relatorio_checklist_{project_number}_{tag}.{ext}`
pub fn report_filename(rows: &[ChecklistRow], ext: &str) -> String {
    match rows.first() {
        Some(row) => format!(
            "relatorio_checklist_{}_{}.{}",
            sanitize(&row.project_number),
            sanitize(&row.equipment_tag),
            ext
        ),
        None => format!("relatorio_checklist_empty.{}", ext),
    }
}

fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_whitespace() {
                '_'
            } else {
                c
            }
        })
        .collect()
}
