//! Record-level reads and writes
//!
//! Each function takes a plain [`Connection`] so callers can run it on the
//! store's connection or inside a transaction. [`EntityStore`] exposes the
//! same operations as methods for single-statement use.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{timestamp, EntityStore, StoreError, StoreResult};
use crate::core::identity::{ActionPlanId, ChecklistId, EntityKind, EquipmentId, ItemId, ProjectId};
use crate::entities::action_plan::ActionPlan;
use crate::entities::checklist::{Answer, Checklist, ChecklistItem};
use crate::entities::equipment::Equipment;
use crate::entities::project::Project;

/// Text fields are stored trimmed; lookups by number or tag trim as well
fn require_text(field: &str, value: &str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub(super) fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        number: row.get(1)?,
        name: row.get(2)?,
        client: row.get(3)?,
        created_at: timestamp(row, 4)?,
    })
}

fn equipment_from_row(row: &Row<'_>) -> rusqlite::Result<Equipment> {
    Ok(Equipment {
        id: row.get(0)?,
        project_id: row.get(1)?,
        tag: row.get(2)?,
        family_code: row.get(3)?,
        created_at: timestamp(row, 4)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ChecklistItem> {
    Ok(ChecklistItem {
        id: row.get(0)?,
        checklist_id: row.get(1)?,
        position: row.get(2)?,
        question: row.get(3)?,
        answer: row.get(4)?,
        photo: row.get(5)?,
    })
}

// =========================================================================
// Projects
// =========================================================================

pub fn insert_project(
    conn: &Connection,
    number: &str,
    name: &str,
    client: &str,
) -> StoreResult<ProjectId> {
    let number = require_text("project number", number)?;
    let name = require_text("project name", name)?;
    let client = require_text("client", client)?;

    conn.execute(
        "INSERT INTO projects (project_number, name, client) VALUES (?1, ?2, ?3)",
        params![number, name, client],
    )
    .map_err(|e| StoreError::from_write(e, EntityKind::Project, &number, EntityKind::Project, &number))?;

    let id = ProjectId(conn.last_insert_rowid());
    tracing::info!(%id, number = %number, "created project");
    Ok(id)
}

pub fn find_project_by_number(conn: &Connection, number: &str) -> StoreResult<Option<Project>> {
    let project = conn
        .query_row(
            "SELECT id, project_number, name, client, created_at FROM projects WHERE project_number = ?1",
            params![number.trim()],
            project_from_row,
        )
        .optional()?;
    Ok(project)
}

pub fn get_project(conn: &Connection, id: ProjectId) -> StoreResult<Option<Project>> {
    let project = conn
        .query_row(
            "SELECT id, project_number, name, client, created_at FROM projects WHERE id = ?1",
            params![id],
            project_from_row,
        )
        .optional()?;
    Ok(project)
}

// =========================================================================
// Equipment
// =========================================================================

pub fn insert_equipment(
    conn: &Connection,
    project_id: ProjectId,
    tag: &str,
    family_code: &str,
) -> StoreResult<EquipmentId> {
    let tag = require_text("equipment tag", tag)?;
    let family_code = require_text("family code", family_code)?;

    conn.execute(
        "INSERT INTO equipment (project_id, tag, family_code) VALUES (?1, ?2, ?3)",
        params![project_id, tag, family_code],
    )
    .map_err(|e| {
        StoreError::from_write(
            e,
            EntityKind::Equipment,
            format!("{} in project {}", tag, project_id),
            EntityKind::Project,
            project_id,
        )
    })?;

    let id = EquipmentId(conn.last_insert_rowid());
    tracing::info!(%id, %project_id, tag = %tag, family = %family_code, "created equipment");
    Ok(id)
}

pub fn find_equipment(
    conn: &Connection,
    project_id: ProjectId,
    tag: &str,
) -> StoreResult<Option<Equipment>> {
    let equipment = conn
        .query_row(
            "SELECT id, project_id, tag, family_code, created_at FROM equipment WHERE project_id = ?1 AND tag = ?2",
            params![project_id, tag.trim()],
            equipment_from_row,
        )
        .optional()?;
    Ok(equipment)
}

pub fn get_equipment(conn: &Connection, id: EquipmentId) -> StoreResult<Option<Equipment>> {
    let equipment = conn
        .query_row(
            "SELECT id, project_id, tag, family_code, created_at FROM equipment WHERE id = ?1",
            params![id],
            equipment_from_row,
        )
        .optional()?;
    Ok(equipment)
}

// =========================================================================
// Checklists and items
// =========================================================================

pub fn insert_checklist(conn: &Connection, equipment_id: EquipmentId) -> StoreResult<ChecklistId> {
    conn.execute(
        "INSERT INTO checklists (equipment_id) VALUES (?1)",
        params![equipment_id],
    )
    .map_err(|e| {
        StoreError::from_write(
            e,
            EntityKind::Checklist,
            equipment_id,
            EntityKind::Equipment,
            equipment_id,
        )
    })?;

    let id = ChecklistId(conn.last_insert_rowid());
    tracing::info!(%id, %equipment_id, "created checklist");
    Ok(id)
}

pub fn get_checklist(conn: &Connection, id: ChecklistId) -> StoreResult<Option<Checklist>> {
    let checklist = conn
        .query_row(
            "SELECT id, equipment_id, created_at FROM checklists WHERE id = ?1",
            params![id],
            |row| {
                Ok(Checklist {
                    id: row.get(0)?,
                    equipment_id: row.get(1)?,
                    created_at: timestamp(row, 2)?,
                })
            },
        )
        .optional()?;
    Ok(checklist)
}

/// Append a question to a checklist; position follows insertion order
pub fn insert_checklist_item(
    conn: &Connection,
    checklist_id: ChecklistId,
    question: &str,
) -> StoreResult<ItemId> {
    let question = require_text("question", question)?;

    conn.execute(
        r#"INSERT INTO checklist_items (checklist_id, position, question)
           VALUES (?1, (SELECT COALESCE(MAX(position), 0) + 1 FROM checklist_items WHERE checklist_id = ?1), ?2)"#,
        params![checklist_id, question],
    )
    .map_err(|e| {
        StoreError::from_write(
            e,
            EntityKind::ChecklistItem,
            &question,
            EntityKind::Checklist,
            checklist_id,
        )
    })?;

    let id = ItemId(conn.last_insert_rowid());
    tracing::debug!(%id, %checklist_id, "added checklist item");
    Ok(id)
}

pub fn update_checklist_item(
    conn: &Connection,
    item_id: ItemId,
    answer: Answer,
    photo: Option<&str>,
) -> StoreResult<()> {
    let photo = photo.map(str::trim).filter(|p| !p.is_empty());
    let changed = conn.execute(
        "UPDATE checklist_items SET answer = ?1, photo = ?2 WHERE id = ?3",
        params![answer, photo, item_id],
    )?;

    if changed == 0 {
        return Err(StoreError::not_found(EntityKind::ChecklistItem, item_id));
    }
    tracing::debug!(%item_id, %answer, "answered checklist item");
    Ok(())
}

pub fn get_checklist_item(conn: &Connection, item_id: ItemId) -> StoreResult<Option<ChecklistItem>> {
    let item = conn
        .query_row(
            "SELECT id, checklist_id, position, question, answer, photo FROM checklist_items WHERE id = ?1",
            params![item_id],
            item_from_row,
        )
        .optional()?;
    Ok(item)
}

/// Items of a checklist in insertion order
pub fn checklist_items(conn: &Connection, checklist_id: ChecklistId) -> StoreResult<Vec<ChecklistItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, checklist_id, position, question, answer, photo FROM checklist_items WHERE checklist_id = ?1 ORDER BY position, id",
    )?;
    let items = stmt
        .query_map(params![checklist_id], item_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

// =========================================================================
// Action plans
// =========================================================================

/// Record the corrective action for a non-conforming item
pub fn insert_action_plan(
    conn: &Connection,
    item_id: ItemId,
    description: &str,
) -> StoreResult<ActionPlanId> {
    let description = require_text("action plan description", description)?;

    let item = get_checklist_item(conn, item_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::ChecklistItem, item_id))?;
    if item.answer != Some(Answer::NonConforming) {
        return Err(StoreError::Validation(format!(
            "item {} is not marked non_conforming; action plans only apply to non-conforming items",
            item.position
        )));
    }

    conn.execute(
        "INSERT INTO action_plans (item_id, description) VALUES (?1, ?2)",
        params![item_id, description],
    )
    .map_err(|e| {
        StoreError::from_write(
            e,
            EntityKind::ActionPlan,
            format!("for item {}", item_id),
            EntityKind::ChecklistItem,
            item_id,
        )
    })?;

    let id = ActionPlanId(conn.last_insert_rowid());
    tracing::info!(%id, %item_id, "created action plan");
    Ok(id)
}

pub fn action_plan_for_item(conn: &Connection, item_id: ItemId) -> StoreResult<Option<ActionPlan>> {
    let plan = conn
        .query_row(
            "SELECT id, item_id, description, created_at FROM action_plans WHERE item_id = ?1",
            params![item_id],
            |row| {
                Ok(ActionPlan {
                    id: row.get(0)?,
                    item_id: row.get(1)?,
                    description: row.get(2)?,
                    created_at: timestamp(row, 3)?,
                })
            },
        )
        .optional()?;
    Ok(plan)
}

// =========================================================================
// Store-level convenience methods (one immediate write each)
// =========================================================================

impl EntityStore {
    /// Register a project; a repeated number fails with `DuplicateKey`
    pub fn create_project(&self, number: &str, name: &str, client: &str) -> StoreResult<ProjectId> {
        insert_project(&self.conn, number, name, client)
    }

    pub fn find_project_by_number(&self, number: &str) -> StoreResult<Option<Project>> {
        find_project_by_number(&self.conn, number)
    }

    pub fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        get_project(&self.conn, id)
    }

    /// Register equipment; a repeated (project, tag) fails with `DuplicateKey`
    /// whatever family is given
    pub fn create_equipment(
        &self,
        project_id: ProjectId,
        tag: &str,
        family_code: &str,
    ) -> StoreResult<EquipmentId> {
        insert_equipment(&self.conn, project_id, tag, family_code)
    }

    pub fn find_equipment(&self, project_id: ProjectId, tag: &str) -> StoreResult<Option<Equipment>> {
        find_equipment(&self.conn, project_id, tag)
    }

    pub fn get_equipment(&self, id: EquipmentId) -> StoreResult<Option<Equipment>> {
        get_equipment(&self.conn, id)
    }

    pub fn create_checklist(&self, equipment_id: EquipmentId) -> StoreResult<ChecklistId> {
        insert_checklist(&self.conn, equipment_id)
    }

    pub fn get_checklist(&self, id: ChecklistId) -> StoreResult<Option<Checklist>> {
        get_checklist(&self.conn, id)
    }

    pub fn add_checklist_item(&self, checklist_id: ChecklistId, question: &str) -> StoreResult<ItemId> {
        insert_checklist_item(&self.conn, checklist_id, question)
    }

    pub fn update_checklist_item(
        &self,
        item_id: ItemId,
        answer: Answer,
        photo: Option<&str>,
    ) -> StoreResult<()> {
        update_checklist_item(&self.conn, item_id, answer, photo)
    }

    pub fn checklist_items(&self, checklist_id: ChecklistId) -> StoreResult<Vec<ChecklistItem>> {
        checklist_items(&self.conn, checklist_id)
    }

    pub fn create_action_plan(&self, item_id: ItemId, description: &str) -> StoreResult<ActionPlanId> {
        insert_action_plan(&self.conn, item_id, description)
    }

    pub fn action_plan_for_item(&self, item_id: ItemId) -> StoreResult<Option<ActionPlan>> {
        action_plan_for_item(&self.conn, item_id)
    }
}
