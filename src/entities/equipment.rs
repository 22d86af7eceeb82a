//! Equipment entity - a tagged item belonging to a project

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EquipmentId, ProjectId};

/// A piece of equipment, unique by (project, tag)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub project_id: ProjectId,

    /// Plant tag, e.g. "FIT-1212001A"
    pub tag: String,

    /// Family (package) code selecting the question template
    pub family_code: String,

    pub created_at: DateTime<Utc>,
}

/// Equipment joined with its owning project, for browsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentSummary {
    pub id: EquipmentId,
    pub project_number: String,
    pub project_name: String,
    pub tag: String,
    pub family_code: String,
    pub checklist_count: i64,
    pub created_at: DateTime<Utc>,
}
