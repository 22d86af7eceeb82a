//! Inspection workflow: register equipment, start a checklist, submit answers
//!
//! Multi-row operations here run inside a single store transaction. Every
//! submission is validated before the first write, so a rejected submission
//! leaves the database untouched.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::catalog::{self, CatalogError, Family};
use crate::core::dashboard::ChecklistStats;
use crate::core::identity::{ChecklistId, EntityKind, EquipmentId, ItemId};
use crate::core::store::{records, EntityStore, StoreError};
use crate::entities::checklist::{Answer, ChecklistItem};
use crate::entities::equipment::Equipment;
use crate::entities::project::Project;

#[derive(Debug, Error, Diagnostic)]
pub enum InspectionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error("checklist {checklist_id}: {message}")]
    #[diagnostic(
        code(ect::inspection::validation),
        help("Non-conforming answers need an action plan. Nothing was saved; fix the submission and retry.")
    )]
    ValidationFailure {
        checklist_id: ChecklistId,
        message: String,
    },

    #[error("cannot read submission {}: {message}", path.display())]
    #[diagnostic(
        code(ect::inspection::submission),
        help("Use YAML (`answers:` list) or CSV with columns position,answer,photo,action_plan")
    )]
    Submission { path: PathBuf, message: String },
}

impl InspectionError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            InspectionError::ValidationFailure { .. }
                | InspectionError::Store(StoreError::Validation(_))
        )
    }
}

pub type InspectionResult<T> = std::result::Result<T, InspectionError>;

/// Answer to one question, as submitted by the inspector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse {
    /// 1-based item position; when set, the answer binds to that item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    pub answer: Answer,

    /// Photo file name; the image itself is not stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// Required when `answer` is non_conforming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_plan: Option<String>,
}

impl ItemResponse {
    pub fn new(answer: Answer) -> Self {
        Self {
            position: None,
            answer,
            photo: None,
            action_plan: None,
        }
    }

    pub fn at(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    pub fn with_action_plan(mut self, plan: impl Into<String>) -> Self {
        self.action_plan = Some(plan.into());
        self
    }

    fn plan_text(&self) -> Option<&str> {
        self.action_plan
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A full submission file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    pub answers: Vec<ItemResponse>,
}

impl Submission {
    /// Load a submission from YAML (`.yaml`/`.yml`) or CSV (anything else ending in `.csv`)
    pub fn load(path: &Path) -> InspectionResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Self::load_csv(path),
            _ => Self::load_yaml(path),
        }
    }

    fn submission_error(path: &Path, message: impl ToString) -> InspectionError {
        InspectionError::Submission {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    fn load_yaml(path: &Path) -> InspectionResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Self::submission_error(path, e))?;
        serde_yml::from_str(&content).map_err(|e| Self::submission_error(path, e))
    }

    /// CSV columns: position (optional), answer, photo, action_plan
    fn load_csv(path: &Path) -> InspectionResult<Self> {
        let file = File::open(path).map_err(|e| Self::submission_error(path, e))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers = rdr
            .headers()
            .map_err(|e| Self::submission_error(path, e))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        };
        let answer_col = column("answer")
            .ok_or_else(|| Self::submission_error(path, "missing 'answer' column"))?;
        let position_col = column("position");
        let photo_col = column("photo");
        let plan_col = column("action_plan");

        let mut answers = Vec::new();
        for (row_idx, record) in rdr.records().enumerate() {
            let row_num = row_idx + 2;
            let record = record
                .map_err(|e| Self::submission_error(path, format!("row {}: {}", row_num, e)))?;

            let field = |col: Option<usize>| {
                col.and_then(|c| record.get(c))
                    .map(str::to_string)
                    .filter(|s| !s.is_empty())
            };

            let answer: Answer = record
                .get(answer_col)
                .unwrap_or_default()
                .parse()
                .map_err(|e: String| Self::submission_error(path, format!("row {}: {}", row_num, e)))?;

            let position = field(position_col)
                .map(|p| {
                    p.parse::<i64>().map_err(|_| {
                        Self::submission_error(path, format!("row {}: invalid position '{}'", row_num, p))
                    })
                })
                .transpose()?;

            answers.push(ItemResponse {
                position,
                answer,
                photo: field(photo_col),
                action_plan: field(plan_col),
            });
        }

        Ok(Self { answers })
    }
}

/// Result of starting a checklist run
#[derive(Debug, Clone, Serialize)]
pub struct StartedChecklist {
    pub checklist_id: ChecklistId,
    pub project: Project,
    pub equipment: Equipment,
    pub family: &'static Family,
    pub item_ids: Vec<ItemId>,
}

fn require_project(store: &EntityStore, number: &str) -> InspectionResult<Project> {
    store
        .find_project_by_number(number)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, number.trim()).into())
}

/// Register equipment under a project, checking the family against the catalog
pub fn register_equipment(
    store: &EntityStore,
    project_number: &str,
    tag: &str,
    family_code: &str,
) -> InspectionResult<(Project, EquipmentId)> {
    let family = catalog::require_family(family_code)?;
    let project = require_project(store, project_number)?;
    let id = store.create_equipment(project.id, tag, family.code)?;
    Ok((project, id))
}

/// Start a checklist run for existing equipment
///
/// Creates the checklist and one unanswered item per template question in a
/// single transaction. Equipment may have several runs (re-inspection).
pub fn start_checklist(
    store: &mut EntityStore,
    project_number: &str,
    tag: &str,
) -> InspectionResult<StartedChecklist> {
    let project = require_project(store, project_number)?;
    let equipment = store.find_equipment(project.id, tag)?.ok_or_else(|| {
        StoreError::not_found(
            EntityKind::Equipment,
            format!("{} in project {}", tag.trim(), project.number),
        )
    })?;
    let family = catalog::require_family(&equipment.family_code)?;

    let (checklist_id, item_ids) = store.transaction(|tx| {
        let checklist_id = records::insert_checklist(tx, equipment.id)?;
        let item_ids = family
            .questions
            .iter()
            .map(|q| records::insert_checklist_item(tx, checklist_id, q))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((checklist_id, item_ids))
    })?;

    tracing::info!(
        %checklist_id,
        tag = %equipment.tag,
        family = family.code,
        items = item_ids.len(),
        "started checklist"
    );

    Ok(StartedChecklist {
        checklist_id,
        project,
        equipment,
        family,
        item_ids,
    })
}

fn validation(checklist_id: ChecklistId, message: impl Into<String>) -> InspectionError {
    let message = message.into();
    tracing::warn!(%checklist_id, %message, "rejected checklist submission");
    InspectionError::ValidationFailure {
        checklist_id,
        message,
    }
}

fn check_response(
    checklist_id: ChecklistId,
    item: &ChecklistItem,
    response: &ItemResponse,
) -> InspectionResult<()> {
    if item.is_answered() {
        return Err(validation(
            checklist_id,
            format!("item {} is already answered", item.position),
        ));
    }
    if response.answer.requires_action_plan() && response.plan_text().is_none() {
        return Err(validation(
            checklist_id,
            format!(
                "item {} ('{}') is non_conforming but the action plan is empty",
                item.position, item.question
            ),
        ));
    }
    if !response.answer.requires_action_plan() && response.plan_text().is_some() {
        tracing::warn!(
            %checklist_id,
            position = item.position,
            "ignoring action plan for an item that is not non_conforming"
        );
    }
    Ok(())
}

fn apply_response(
    conn: &rusqlite::Connection,
    item: &ChecklistItem,
    response: &ItemResponse,
) -> Result<(), StoreError> {
    records::update_checklist_item(conn, item.id, response.answer, response.photo.as_deref())?;
    if response.answer.requires_action_plan() {
        if let Some(plan) = response.plan_text() {
            records::insert_action_plan(conn, item.id, plan)?;
        }
    }
    Ok(())
}

fn load_items(store: &EntityStore, checklist_id: ChecklistId) -> InspectionResult<Vec<ChecklistItem>> {
    if store.get_checklist(checklist_id)?.is_none() {
        return Err(StoreError::not_found(EntityKind::Checklist, checklist_id).into());
    }
    Ok(store.checklist_items(checklist_id)?)
}

/// Pair responses with items
///
/// Positioned responses bind to the item at that position; each position may
/// appear once and must name an item of the checklist. Unpositioned responses
/// map in order onto the unanswered items. Mixing both forms is rejected.
fn bind_responses<'a>(
    checklist_id: ChecklistId,
    items: &'a [ChecklistItem],
    pending: &[&'a ChecklistItem],
    responses: &'a [ItemResponse],
) -> InspectionResult<Vec<(&'a ChecklistItem, &'a ItemResponse)>> {
    let positioned = responses.iter().filter(|r| r.position.is_some()).count();
    if positioned == 0 {
        return Ok(pending.iter().copied().zip(responses).collect());
    }
    if positioned != responses.len() {
        return Err(validation(
            checklist_id,
            "either every answer or none must carry a position",
        ));
    }

    let mut seen = std::collections::BTreeSet::new();
    let mut pairs = Vec::with_capacity(responses.len());
    for response in responses {
        let Some(position) = response.position else {
            continue;
        };
        if !seen.insert(position) {
            return Err(validation(
                checklist_id,
                format!("position {} is answered more than once", position),
            ));
        }
        let item = items
            .iter()
            .find(|i| i.position == position)
            .ok_or_else(|| validation(checklist_id, format!("no item at position {}", position)))?;
        pairs.push((item, response));
    }
    Ok(pairs)
}

/// Submit answers for every unanswered item of a checklist
///
/// `responses` bind by position when they carry one; otherwise they map, in
/// order, onto the checklist's unanswered items (all of them for a fresh
/// run). Validation covers the whole submission before any
/// write; the updates and action plans then commit in one transaction.
pub fn finalize_checklist(
    store: &mut EntityStore,
    checklist_id: ChecklistId,
    responses: &[ItemResponse],
) -> InspectionResult<ChecklistStats> {
    let items = load_items(store, checklist_id)?;
    if items.is_empty() {
        return Err(validation(checklist_id, "checklist has no items"));
    }

    let pending: Vec<&ChecklistItem> = items.iter().filter(|i| !i.is_answered()).collect();
    if pending.is_empty() {
        return Err(validation(checklist_id, "checklist is already finalized"));
    }
    if responses.len() != pending.len() {
        return Err(validation(
            checklist_id,
            format!(
                "expected {} answers for the unanswered items, got {}",
                pending.len(),
                responses.len()
            ),
        ));
    }

    let pairs = bind_responses(checklist_id, &items, &pending, responses)?;
    for (item, response) in &pairs {
        check_response(checklist_id, item, response)?;
    }

    let stats = store.transaction(|tx| {
        for (item, response) in &pairs {
            apply_response(tx, item, response)?;
        }
        let items = records::checklist_items(tx, checklist_id)?;
        Ok(ChecklistStats::from_items(&items))
    })?;

    tracing::info!(
        %checklist_id,
        conforming = stats.conforming,
        non_conforming = stats.non_conforming,
        percentage = stats.conformance_percentage,
        "finalized checklist"
    );
    Ok(stats)
}

/// Answer a single item (1-based position), saving progress
pub fn record_answer(
    store: &mut EntityStore,
    checklist_id: ChecklistId,
    position: i64,
    response: &ItemResponse,
) -> InspectionResult<ChecklistItem> {
    let items = load_items(store, checklist_id)?;
    let item = items
        .into_iter()
        .find(|i| i.position == position)
        .ok_or_else(|| validation(checklist_id, format!("no item at position {}", position)))?;

    check_response(checklist_id, &item, response)?;

    store.transaction(|tx| apply_response(tx, &item, response))?;

    let updated = store
        .checklist_items(checklist_id)?
        .into_iter()
        .find(|i| i.id == item.id)
        .ok_or_else(|| StoreError::not_found(EntityKind::ChecklistItem, item.id))?;
    Ok(updated)
}
