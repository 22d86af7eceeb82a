//! Core module - storage, catalog, inspection workflow and workspace plumbing

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod identity;
pub mod inspection;
pub mod store;
pub mod workspace;

pub use catalog::{CatalogError, Family};
pub use config::Config;
pub use dashboard::{ChecklistStats, Dashboard};
pub use identity::{ActionPlanId, ChecklistId, EntityKind, EquipmentId, IdParseError, ItemId, ProjectId};
pub use inspection::{InspectionError, ItemResponse, StartedChecklist, Submission};
pub use store::{EntityStore, StoreError};
pub use workspace::{Workspace, WorkspaceError};
