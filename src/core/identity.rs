//! Entity kinds and typed row identifiers
//!
//! Every record in the store is keyed by an auto-incrementing SQLite rowid.
//! The newtypes below keep those integers from being mixed up across tables
//! (a checklist id can never be passed where an item id is expected).

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The record types held by the entity store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Equipment,
    Checklist,
    ChecklistItem,
    ActionPlan,
}

impl EntityKind {
    /// Human-readable name used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Equipment => "equipment",
            EntityKind::Checklist => "checklist",
            EntityKind::ChecklistItem => "checklist item",
            EntityKind::ActionPlan => "action plan",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing a row identifier from user input
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {kind} id '{input}': expected a positive integer")]
pub struct IdParseError {
    pub kind: EntityKind,
    pub input: String,
}

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim().trim_start_matches('#');
                match trimmed.parse::<i64>() {
                    Ok(n) if n > 0 => Ok($name(n)),
                    _ => Err(IdParseError {
                        kind: $kind,
                        input: s.to_string(),
                    }),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }
    };
}

row_id!(
    /// Identifier of a row in `projects`
    ProjectId,
    EntityKind::Project
);
row_id!(
    /// Identifier of a row in `equipment`
    EquipmentId,
    EntityKind::Equipment
);
row_id!(
    /// Identifier of a row in `checklists`
    ChecklistId,
    EntityKind::Checklist
);
row_id!(
    /// Identifier of a row in `checklist_items`
    ItemId,
    EntityKind::ChecklistItem
);
row_id!(
    /// Identifier of a row in `action_plans`
    ActionPlanId,
    EntityKind::ActionPlan
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse() {
        assert_eq!("42".parse::<ChecklistId>().unwrap(), ChecklistId(42));
        assert_eq!("#7".parse::<ChecklistId>().unwrap(), ChecklistId(7));
        assert_eq!(" 3 ".parse::<ItemId>().unwrap(), ItemId(3));
    }

    #[test]
    fn test_id_parse_rejects_non_positive() {
        let err = "0".parse::<ProjectId>().unwrap_err();
        assert_eq!(err.kind, EntityKind::Project);
        assert!("-4".parse::<ProjectId>().is_err());
        assert!("abc".parse::<EquipmentId>().is_err());
    }

    #[test]
    fn test_id_parse_error_names_kind() {
        let err = "x".parse::<ActionPlanId>().unwrap_err();
        assert_eq!(err.to_string(), "invalid action plan id 'x': expected a positive integer");
    }

    #[test]
    fn test_id_serializes_as_integer() {
        let json = serde_json::to_string(&ChecklistId(12)).unwrap();
        assert_eq!(json, "12");
    }
}
