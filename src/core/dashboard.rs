//! Aggregation for the dashboard and checklist results
//!
//! Project-level counters are keyed by project name. A checklist is counted
//! once per bucket query: it is *completed* when it has items and all of
//! them are answered, and *open* otherwise, so the two buckets never overlap.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::core::store::{EntityStore, StoreResult};
use crate::entities::checklist::{Answer, ChecklistItem, ChecklistRow};

/// Conformance statistics for a single checklist
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChecklistStats {
    pub total_items: usize,
    pub conforming: usize,
    /// Every item not marked conforming (includes N/A and unanswered)
    pub non_conforming: usize,
    pub not_applicable: usize,
    pub unanswered: usize,
    /// conforming / total x 100, one decimal; 0.0 for an empty checklist
    pub conformance_percentage: f64,
}

impl ChecklistStats {
    /// Compute statistics over `total_items` questions given their answers
    pub fn compute<I>(total_items: usize, answers: I) -> Self
    where
        I: IntoIterator<Item = Option<Answer>>,
    {
        let mut conforming = 0;
        let mut not_applicable = 0;
        let mut answered = 0;

        for answer in answers {
            match answer {
                Some(Answer::Conforming) => conforming += 1,
                Some(Answer::NotApplicable) => not_applicable += 1,
                Some(Answer::NonConforming) | None => {}
            }
            if answer.is_some() {
                answered += 1;
            }
        }

        let conformance_percentage = if total_items == 0 {
            0.0
        } else {
            round1(conforming as f64 / total_items as f64 * 100.0)
        };

        Self {
            total_items,
            conforming,
            non_conforming: total_items.saturating_sub(conforming),
            not_applicable,
            unanswered: total_items.saturating_sub(answered),
            conformance_percentage,
        }
    }

    pub fn from_items(items: &[ChecklistItem]) -> Self {
        Self::compute(items.len(), items.iter().map(|i| i.answer))
    }

    pub fn from_rows(rows: &[ChecklistRow]) -> Self {
        Self::compute(rows.len(), rows.iter().map(|r| r.answer))
    }

    pub fn is_complete(&self) -> bool {
        self.total_items > 0 && self.unanswered == 0
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Counts shown on the home dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub projects: i64,
    pub equipment: i64,
    pub checklists: i64,
    pub open_per_project: BTreeMap<String, i64>,
    pub completed_per_project: BTreeMap<String, i64>,
    pub action_plans_per_project: BTreeMap<String, i64>,
}

impl Dashboard {
    pub fn collect(store: &EntityStore) -> StoreResult<Self> {
        let conn = store.conn();
        Ok(Self {
            projects: count(conn, "SELECT COUNT(*) FROM projects")?,
            equipment: count(conn, "SELECT COUNT(*) FROM equipment")?,
            checklists: count(conn, "SELECT COUNT(*) FROM checklists")?,
            open_per_project: store.open_per_project()?,
            completed_per_project: store.completed_per_project()?,
            action_plans_per_project: store.action_plans_per_project()?,
        })
    }

    pub fn open_total(&self) -> i64 {
        self.open_per_project.values().sum()
    }

    pub fn completed_total(&self) -> i64 {
        self.completed_per_project.values().sum()
    }

    pub fn action_plan_total(&self) -> i64 {
        self.action_plans_per_project.values().sum()
    }
}

fn count(conn: &Connection, sql: &str) -> StoreResult<i64> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

fn per_project(conn: &Connection, sql: &str) -> StoreResult<BTreeMap<String, i64>> {
    let mut stmt = conn.prepare(sql)?;
    let counts = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
    Ok(counts)
}

impl EntityStore {
    /// Checklists with no items or at least one unanswered item
    pub fn open_per_project(&self) -> StoreResult<BTreeMap<String, i64>> {
        per_project(
            self.conn(),
            r#"SELECT p.name, COUNT(DISTINCT c.id)
               FROM projects p
               JOIN equipment e ON e.project_id = p.id
               JOIN checklists c ON c.equipment_id = e.id
               WHERE NOT EXISTS (SELECT 1 FROM checklist_items ic WHERE ic.checklist_id = c.id)
                  OR EXISTS (SELECT 1 FROM checklist_items ic WHERE ic.checklist_id = c.id AND ic.answer IS NULL)
               GROUP BY p.name"#,
        )
    }

    /// Checklists whose items are all answered
    pub fn completed_per_project(&self) -> StoreResult<BTreeMap<String, i64>> {
        per_project(
            self.conn(),
            r#"SELECT p.name, COUNT(DISTINCT c.id)
               FROM projects p
               JOIN equipment e ON e.project_id = p.id
               JOIN checklists c ON c.equipment_id = e.id
               WHERE EXISTS (SELECT 1 FROM checklist_items ic WHERE ic.checklist_id = c.id)
                 AND NOT EXISTS (SELECT 1 FROM checklist_items ic WHERE ic.checklist_id = c.id AND ic.answer IS NULL)
               GROUP BY p.name"#,
        )
    }

    /// Action plans reached through item, checklist and equipment
    pub fn action_plans_per_project(&self) -> StoreResult<BTreeMap<String, i64>> {
        per_project(
            self.conn(),
            r#"SELECT p.name, COUNT(pa.id)
               FROM projects p
               JOIN equipment e ON e.project_id = p.id
               JOIN checklists c ON c.equipment_id = e.id
               JOIN checklist_items ic ON ic.checklist_id = c.id
               JOIN action_plans pa ON pa.item_id = ic.id
               GROUP BY p.name"#,
        )
    }
}
