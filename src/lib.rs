//! ECT: Equipment Checklist Toolkit
//!
//! Records equipment inspection checklists per project in a local SQLite
//! database, tracks action plans for non-conforming items and renders
//! per-checklist conformance reports.

pub mod cli;
pub mod core;
pub mod entities;
pub mod report;
