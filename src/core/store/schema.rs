//! Database schema initialization

use rusqlite::params;

use super::{EntityStore, StoreResult, SCHEMA_VERSION};

impl EntityStore {
    /// Create all tables on a fresh database
    pub(super) fn init_schema(&mut self) -> StoreResult<()> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_number TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                client TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            -- Tag is unique within a project, not globally
            CREATE TABLE IF NOT EXISTS equipment (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id),
                tag TEXT NOT NULL,
                family_code TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (project_id, tag)
            );
            CREATE INDEX IF NOT EXISTS idx_equipment_project ON equipment(project_id);

            -- Several checklists per equipment are allowed (re-inspection)
            CREATE TABLE IF NOT EXISTS checklists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipment_id INTEGER NOT NULL REFERENCES equipment(id),
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_checklists_equipment ON checklists(equipment_id);

            CREATE TABLE IF NOT EXISTS checklist_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                checklist_id INTEGER NOT NULL REFERENCES checklists(id),
                position INTEGER NOT NULL,
                question TEXT NOT NULL,
                answer TEXT CHECK (answer IN ('conforming', 'not_applicable', 'non_conforming')),
                photo TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_items_checklist ON checklist_items(checklist_id);

            -- At most one plan per item
            CREATE TABLE IF NOT EXISTS action_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id INTEGER NOT NULL UNIQUE REFERENCES checklist_items(id),
                description TEXT NOT NULL CHECK (length(trim(description)) > 0),
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        tracing::info!(version = SCHEMA_VERSION, "initialized database schema");
        Ok(())
    }
}
