//! Joined queries for browsing and report assembly

use rusqlite::{params, OptionalExtension, Row};

use super::{records, timestamp, EntityStore, StoreResult};
use crate::core::identity::{ChecklistId, ProjectId};
use crate::entities::checklist::{ChecklistRow, ChecklistSummary};
use crate::entities::equipment::EquipmentSummary;
use crate::entities::project::Project;

const CHECKLIST_SUMMARY_SELECT: &str = r#"
    SELECT c.id, p.project_number, p.name, e.tag, e.family_code, c.created_at,
           (SELECT COUNT(*) FROM checklist_items ic WHERE ic.checklist_id = c.id),
           (SELECT COUNT(*) FROM checklist_items ic WHERE ic.checklist_id = c.id AND ic.answer IS NOT NULL),
           (SELECT COUNT(*) FROM action_plans pa
              JOIN checklist_items ic ON pa.item_id = ic.id
             WHERE ic.checklist_id = c.id)
    FROM checklists c
    JOIN equipment e ON c.equipment_id = e.id
    JOIN projects p ON e.project_id = p.id
"#;

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<ChecklistSummary> {
    Ok(ChecklistSummary {
        id: row.get(0)?,
        project_number: row.get(1)?,
        project_name: row.get(2)?,
        equipment_tag: row.get(3)?,
        family_code: row.get(4)?,
        created_at: timestamp(row, 5)?,
        total_items: row.get(6)?,
        answered_items: row.get(7)?,
        action_plans: row.get(8)?,
    })
}

impl EntityStore {
    /// Assemble a checklist into denormalized rows, one per item
    ///
    /// Rows follow item insertion order. An unknown checklist, or one with
    /// no items, yields an empty vector.
    pub fn get_full_checklist(&self, checklist_id: ChecklistId) -> StoreResult<Vec<ChecklistRow>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT c.id, p.project_number, p.name, p.client, e.tag, e.family_code, c.created_at,
                      ic.id, ic.position, ic.question, ic.answer, ic.photo,
                      pa.description
               FROM checklists c
               JOIN equipment e ON c.equipment_id = e.id
               JOIN projects p ON e.project_id = p.id
               JOIN checklist_items ic ON ic.checklist_id = c.id
               LEFT JOIN action_plans pa ON pa.item_id = ic.id
               WHERE c.id = ?1
               ORDER BY ic.position, ic.id"#,
        )?;

        let rows = stmt
            .query_map(params![checklist_id], |row| {
                Ok(ChecklistRow {
                    checklist_id: row.get(0)?,
                    project_number: row.get(1)?,
                    project_name: row.get(2)?,
                    client: row.get(3)?,
                    equipment_tag: row.get(4)?,
                    family_code: row.get(5)?,
                    checklist_created_at: timestamp(row, 6)?,
                    item_id: row.get(7)?,
                    position: row.get(8)?,
                    question: row.get(9)?,
                    answer: row.get(10)?,
                    photo: row.get(11)?,
                    action_plan: row.get(12)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(%checklist_id, rows = rows.len(), "assembled checklist");
        Ok(rows)
    }

    /// All projects ordered by project number
    pub fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_number, name, client, created_at FROM projects ORDER BY project_number",
        )?;
        let projects = stmt
            .query_map([], records::project_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    /// Equipment joined with project, optionally restricted to one project
    pub fn list_equipment(&self, project: Option<ProjectId>) -> StoreResult<Vec<EquipmentSummary>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT e.id, p.project_number, p.name, e.tag, e.family_code, e.created_at,
                      (SELECT COUNT(*) FROM checklists c WHERE c.equipment_id = e.id)
               FROM equipment e
               JOIN projects p ON e.project_id = p.id
               WHERE ?1 IS NULL OR e.project_id = ?1
               ORDER BY p.project_number, e.tag"#,
        )?;
        let equipment = stmt
            .query_map(params![project], |row| {
                Ok(EquipmentSummary {
                    id: row.get(0)?,
                    project_number: row.get(1)?,
                    project_name: row.get(2)?,
                    tag: row.get(3)?,
                    family_code: row.get(4)?,
                    created_at: timestamp(row, 5)?,
                    checklist_count: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(equipment)
    }

    /// Checklists with progress counts, newest first
    pub fn list_checklists(&self, project: Option<ProjectId>) -> StoreResult<Vec<ChecklistSummary>> {
        let sql = format!(
            "{} WHERE ?1 IS NULL OR p.id = ?1 ORDER BY c.created_at DESC, c.id DESC",
            CHECKLIST_SUMMARY_SELECT
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let checklists = stmt
            .query_map(params![project], summary_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(checklists)
    }

    pub fn checklist_summary(&self, checklist_id: ChecklistId) -> StoreResult<Option<ChecklistSummary>> {
        let sql = format!("{} WHERE c.id = ?1", CHECKLIST_SUMMARY_SELECT);
        let summary = self
            .conn
            .query_row(&sql, params![checklist_id], summary_from_row)
            .optional()?;
        Ok(summary)
    }
}
