//! CLI command implementations

pub mod checklist;
pub mod completions;
pub mod dashboard;
pub mod equip;
pub mod family;
pub mod init;
pub mod project;
pub mod report;
