//! Project entity - the top-level owner of inspected equipment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::ProjectId;

/// A registered project (unique by project number)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    /// Business identifier, e.g. "P-2024-001"
    pub number: String,

    pub name: String,

    pub client: String,

    pub created_at: DateTime<Utc>,
}

impl Project {
    /// One-line label used in listings and prompts
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.number, self.name, self.client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_label() {
        let project = Project {
            id: ProjectId(1),
            number: "P-2024-001".to_string(),
            name: "Pipeline Expansion".to_string(),
            client: "Acme Co".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(project.label(), "P-2024-001 - Pipeline Expansion (Acme Co)");
    }

    #[test]
    fn test_project_json_uses_integer_id() {
        let project = Project {
            id: ProjectId(3),
            number: "P-1".to_string(),
            name: "n".to_string(),
            client: "c".to_string(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["number"], "P-1");
    }
}
