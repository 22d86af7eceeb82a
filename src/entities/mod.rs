//! Entity type definitions
//!
//! - [`Project`] - a client job, keyed by its project number
//! - [`Equipment`] - a tagged item of a given family within a project
//! - [`Checklist`] / [`ChecklistItem`] - one inspection run and its questions
//! - [`ActionPlan`] - corrective action recorded for a non-conforming item

pub mod action_plan;
pub mod checklist;
pub mod equipment;
pub mod project;

pub use action_plan::ActionPlan;
pub use checklist::{Answer, Checklist, ChecklistItem, ChecklistRow, ChecklistSummary};
pub use equipment::{Equipment, EquipmentSummary};
pub use project::Project;
