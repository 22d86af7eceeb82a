//! Checklist entities - inspection runs, their items, and the assembled view

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::core::identity::{ChecklistId, EquipmentId, ItemId};

/// Answer given to a checklist question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// Item meets the specification ("S")
    #[serde(alias = "S", alias = "C", alias = "yes")]
    Conforming,
    /// Item does not apply to this equipment ("NA")
    #[serde(alias = "NA", alias = "n/a")]
    NotApplicable,
    /// Item fails the specification ("N"); requires an action plan
    #[serde(alias = "N", alias = "NC", alias = "no")]
    NonConforming,
}

impl Answer {
    pub const ALL: [Answer; 3] = [
        Answer::Conforming,
        Answer::NotApplicable,
        Answer::NonConforming,
    ];

    /// Stored/wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Conforming => "conforming",
            Answer::NotApplicable => "not_applicable",
            Answer::NonConforming => "non_conforming",
        }
    }

    /// Label for reports and prompts
    pub fn label(&self) -> &'static str {
        match self {
            Answer::Conforming => "Conforming",
            Answer::NotApplicable => "Not applicable",
            Answer::NonConforming => "Non-conforming",
        }
    }

    pub fn requires_action_plan(&self) -> bool {
        matches!(self, Answer::NonConforming)
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "conforming" | "s" | "c" | "yes" => Ok(Answer::Conforming),
            "not_applicable" | "na" | "n/a" => Ok(Answer::NotApplicable),
            "non_conforming" | "n" | "nc" | "no" => Ok(Answer::NonConforming),
            _ => Err(format!(
                "Invalid answer: {}. Use conforming (S), not_applicable (NA), or non_conforming (N)",
                s
            )),
        }
    }
}

impl ToSql for Answer {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Answer {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// One inspection run over a piece of equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: ChecklistId,
    pub equipment_id: EquipmentId,
    pub created_at: DateTime<Utc>,
}

/// A single question within a checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ItemId,
    pub checklist_id: ChecklistId,

    /// 1-based order of the question within the checklist
    pub position: i64,

    pub question: String,

    /// None until the item has been answered
    pub answer: Option<Answer>,

    /// File name of the attached photo (binary is never stored)
    pub photo: Option<String>,
}

impl ChecklistItem {
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Checklist joined with its equipment and project, for browsing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistSummary {
    pub id: ChecklistId,
    pub project_number: String,
    pub project_name: String,
    pub equipment_tag: String,
    pub family_code: String,
    pub created_at: DateTime<Utc>,
    pub total_items: i64,
    pub answered_items: i64,
    pub action_plans: i64,
}

impl ChecklistSummary {
    /// Every item answered (and at least one item exists)
    pub fn is_completed(&self) -> bool {
        self.total_items > 0 && self.answered_items == self.total_items
    }
}

/// One denormalized row of an assembled checklist
///
/// Project and equipment columns repeat on every row; item columns vary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistRow {
    pub checklist_id: ChecklistId,
    pub project_number: String,
    pub project_name: String,
    pub client: String,
    pub equipment_tag: String,
    pub family_code: String,
    pub checklist_created_at: DateTime<Utc>,
    pub item_id: ItemId,
    pub position: i64,
    pub question: String,
    pub answer: Option<Answer>,
    pub photo: Option<String>,
    pub action_plan: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_from_str_accepts_short_codes() {
        assert_eq!("S".parse::<Answer>().unwrap(), Answer::Conforming);
        assert_eq!("NA".parse::<Answer>().unwrap(), Answer::NotApplicable);
        assert_eq!("N".parse::<Answer>().unwrap(), Answer::NonConforming);
        assert_eq!(
            "non-conforming".parse::<Answer>().unwrap(),
            Answer::NonConforming
        );
        assert!("maybe".parse::<Answer>().is_err());
    }

    #[test]
    fn test_answer_serde_roundtrip_and_alias() {
        let yaml = serde_yml::to_string(&Answer::NotApplicable).unwrap();
        assert_eq!(yaml.trim(), "not_applicable");

        let parsed: Answer = serde_yml::from_str("N").unwrap();
        assert_eq!(parsed, Answer::NonConforming);
    }

    #[test]
    fn test_only_non_conforming_requires_plan() {
        assert!(Answer::NonConforming.requires_action_plan());
        assert!(!Answer::Conforming.requires_action_plan());
        assert!(!Answer::NotApplicable.requires_action_plan());
    }

    #[test]
    fn test_summary_completion() {
        let mut summary = ChecklistSummary {
            id: ChecklistId(1),
            project_number: "P".to_string(),
            project_name: "Name".to_string(),
            equipment_tag: "T".to_string(),
            family_code: "3100".to_string(),
            created_at: Utc::now(),
            total_items: 0,
            answered_items: 0,
            action_plans: 0,
        };
        assert!(!summary.is_completed());

        summary.total_items = 3;
        summary.answered_items = 2;
        assert!(!summary.is_completed());

        summary.answered_items = 3;
        assert!(summary.is_completed());
    }
}
