use super::*;
use crate::core::identity::{ChecklistId, ItemId, ProjectId};
use crate::entities::checklist::Answer;
use tempfile::tempdir;

fn store_with_project() -> (EntityStore, ProjectId) {
    let store = EntityStore::open_in_memory().unwrap();
    let project_id = store
        .create_project("P-2024-001", "Pipeline Expansion", "Acme Co")
        .unwrap();
    (store, project_id)
}

#[test]
fn test_create_then_find_project() {
    let (store, project_id) = store_with_project();

    let found = store.find_project_by_number("P-2024-001").unwrap().unwrap();
    assert_eq!(found.id, project_id);
    assert_eq!(found.number, "P-2024-001");
    assert_eq!(found.name, "Pipeline Expansion");
    assert_eq!(found.client, "Acme Co");

    let by_id = store.get_project(project_id).unwrap().unwrap();
    assert_eq!(by_id, found);
}

#[test]
fn test_duplicate_project_number() {
    let (store, _) = store_with_project();

    let err = store
        .create_project("P-2024-001", "Other", "Other Client")
        .unwrap_err();
    assert!(err.is_duplicate(), "unexpected error: {err}");
    assert_eq!(store.list_projects().unwrap().len(), 1);
}

#[test]
fn test_find_missing_project_is_none() {
    let store = EntityStore::open_in_memory().unwrap();
    assert!(store.find_project_by_number("nope").unwrap().is_none());
}

#[test]
fn test_blank_project_fields_rejected() {
    let store = EntityStore::open_in_memory().unwrap();
    let err = store.create_project("P-1", "  ", "Client").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn test_duplicate_equipment_regardless_of_family() {
    let (store, project_id) = store_with_project();

    store.create_equipment(project_id, "FIT-1212001A", "3100").unwrap();
    let err = store
        .create_equipment(project_id, "FIT-1212001A", "6600")
        .unwrap_err();
    assert!(err.is_duplicate());

    let equipment = store.find_equipment(project_id, "FIT-1212001A").unwrap().unwrap();
    assert_eq!(equipment.family_code, "3100");
}

#[test]
fn test_same_tag_in_different_projects() {
    let (store, first) = store_with_project();
    let second = store.create_project("P-2024-002", "Second", "Acme Co").unwrap();

    store.create_equipment(first, "PT-001", "6600").unwrap();
    store.create_equipment(second, "PT-001", "6600").unwrap();

    assert_eq!(store.list_equipment(None).unwrap().len(), 2);
    assert_eq!(store.list_equipment(Some(second)).unwrap().len(), 1);
}

#[test]
fn test_equipment_for_unknown_project_is_not_found() {
    let store = EntityStore::open_in_memory().unwrap();
    let err = store.create_equipment(ProjectId(99), "T-1", "1500").unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[test]
fn test_item_ids_returned_in_order() {
    let (store, project_id) = store_with_project();
    let equipment_id = store.create_equipment(project_id, "BV-01", "1500").unwrap();
    let checklist_id = store.create_checklist(equipment_id).unwrap();

    let first = store.add_checklist_item(checklist_id, "Question one").unwrap();
    let second = store.add_checklist_item(checklist_id, "Question two").unwrap();
    assert_ne!(first, second);

    let items = store.checklist_items(checklist_id).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, first);
    assert_eq!(items[0].position, 1);
    assert_eq!(items[1].position, 2);
    assert!(items.iter().all(|i| i.answer.is_none()));
}

#[test]
fn test_update_item_and_action_plan() {
    let (store, project_id) = store_with_project();
    let equipment_id = store.create_equipment(project_id, "BV-01", "1500").unwrap();
    let checklist_id = store.create_checklist(equipment_id).unwrap();
    let item_id = store.add_checklist_item(checklist_id, "Question").unwrap();

    store
        .update_checklist_item(item_id, Answer::NonConforming, Some("valve.jpg"))
        .unwrap();
    let plan_id = store.create_action_plan(item_id, "Replace seat").unwrap();

    let plan = store.action_plan_for_item(item_id).unwrap().unwrap();
    assert_eq!(plan.id, plan_id);
    assert_eq!(plan.description, "Replace seat");

    let err = store.create_action_plan(item_id, "Second plan").unwrap_err();
    assert!(err.is_duplicate());
}

#[test]
fn test_action_plan_requires_non_conforming_answer() {
    let (store, project_id) = store_with_project();
    let equipment_id = store.create_equipment(project_id, "BV-01", "1500").unwrap();
    let checklist_id = store.create_checklist(equipment_id).unwrap();
    let item_id = store.add_checklist_item(checklist_id, "Question").unwrap();

    store
        .update_checklist_item(item_id, Answer::Conforming, None)
        .unwrap();
    let err = store.create_action_plan(item_id, "Not needed").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    store
        .update_checklist_item(item_id, Answer::NonConforming, None)
        .unwrap();
    let err = store.create_action_plan(item_id, "   ").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.action_plan_for_item(item_id).unwrap().is_none());
}

#[test]
fn test_update_unknown_item() {
    let store = EntityStore::open_in_memory().unwrap();
    let err = store
        .update_checklist_item(ItemId(5), Answer::Conforming, None)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_full_checklist_empty_cases() {
    let (store, project_id) = store_with_project();
    let equipment_id = store.create_equipment(project_id, "BV-01", "1500").unwrap();
    let checklist_id = store.create_checklist(equipment_id).unwrap();

    assert!(store.get_full_checklist(checklist_id).unwrap().is_empty());
    assert!(store.get_full_checklist(ChecklistId(404)).unwrap().is_empty());
}

#[test]
fn test_full_checklist_rows() {
    let (store, project_id) = store_with_project();
    let equipment_id = store.create_equipment(project_id, "FIT-1212001A", "3100").unwrap();
    let checklist_id = store.create_checklist(equipment_id).unwrap();
    let a = store.add_checklist_item(checklist_id, "First").unwrap();
    let b = store.add_checklist_item(checklist_id, "Second").unwrap();
    store.add_checklist_item(checklist_id, "Third").unwrap();

    store.update_checklist_item(a, Answer::Conforming, Some("a.png")).unwrap();
    store.update_checklist_item(b, Answer::NonConforming, None).unwrap();
    store.create_action_plan(b, "Recalibrate").unwrap();

    let rows = store.get_full_checklist(checklist_id).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.project_number == "P-2024-001"));
    assert!(rows.iter().all(|r| r.equipment_tag == "FIT-1212001A"));
    assert_eq!(rows[0].question, "First");
    assert_eq!(rows[0].photo.as_deref(), Some("a.png"));
    assert_eq!(rows[1].action_plan.as_deref(), Some("Recalibrate"));
    assert_eq!(rows[2].answer, None);
    assert_eq!(rows[2].action_plan, None);
}

#[test]
fn test_transaction_rolls_back_on_error() {
    let (mut store, project_id) = store_with_project();

    let result: StoreResult<()> = store.transaction(|tx| {
        records::insert_equipment(tx, project_id, "T-1", "1500")?;
        Err(StoreError::Validation("abort".to_string()))
    });
    assert!(result.is_err());
    assert!(store.find_equipment(project_id, "T-1").unwrap().is_none());
}

#[test]
fn test_checklist_summary_counts() {
    let (store, project_id) = store_with_project();
    let equipment_id = store.create_equipment(project_id, "BV-01", "1500").unwrap();
    let checklist_id = store.create_checklist(equipment_id).unwrap();
    let a = store.add_checklist_item(checklist_id, "One").unwrap();
    store.add_checklist_item(checklist_id, "Two").unwrap();
    store.update_checklist_item(a, Answer::NonConforming, None).unwrap();
    store.create_action_plan(a, "Fix").unwrap();

    let summary = store.checklist_summary(checklist_id).unwrap().unwrap();
    assert_eq!(summary.total_items, 2);
    assert_eq!(summary.answered_items, 1);
    assert_eq!(summary.action_plans, 1);
    assert!(!summary.is_completed());
    assert_eq!(store.list_checklists(None).unwrap().len(), 1);
}

#[test]
fn test_reopen_file_store_keeps_data() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nested/checklists.db");

    {
        let store = EntityStore::open(&path).unwrap();
        store.create_project("P-9", "Reopen", "Client").unwrap();
    }

    let store = EntityStore::open(&path).unwrap();
    assert!(store.find_project_by_number("P-9").unwrap().is_some());
}

#[test]
fn test_newer_schema_rejected() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("checklists.db");
    {
        let store = EntityStore::open(&path).unwrap();
        store
            .conn()
            .execute("INSERT INTO schema_version (version) VALUES (99)", [])
            .unwrap();
    }

    let err = EntityStore::open(&path).err().unwrap();
    assert!(matches!(err, StoreError::SchemaVersion { found: 99, .. }));
}

#[test]
fn test_parse_timestamp_formats() {
    let ts = parse_timestamp("2024-05-01 13:45:10").unwrap();
    assert_eq!(ts.to_rfc3339(), "2024-05-01T13:45:10+00:00");

    let ts = parse_timestamp("2024-05-01T13:45:10Z").unwrap();
    assert_eq!(ts.format("%Y-%m-%d").to_string(), "2024-05-01");

    assert!(parse_timestamp("yesterday").is_err());
}

#[test]
fn test_corrupt_timestamp_is_an_error() {
    let store = EntityStore::open_in_memory().unwrap();
    store.create_project("P-1", "Name", "Client").unwrap();
    store
        .conn()
        .execute("UPDATE projects SET created_at = 'not a date'", [])
        .unwrap();

    let err = store.find_project_by_number("P-1").unwrap_err();
    assert!(matches!(err, StoreError::Sqlite(_)));
    assert!(store.list_projects().is_err());
}

#[test]
fn test_keys_are_stored_trimmed() {
    let (store, project_id) = store_with_project();
    let id = store.create_project(" P-1 ", " Name ", "Client").unwrap();

    let project = store.find_project_by_number("P-1").unwrap().unwrap();
    assert_eq!(project.id, id);
    assert_eq!(project.number, "P-1");
    assert_eq!(project.name, "Name");
    assert_eq!(store.find_project_by_number(" P-1 ").unwrap(), Some(project));
    assert!(store.create_project("P-1", "Other", "Client").unwrap_err().is_duplicate());

    store.create_equipment(project_id, " FIT-1 ", "3100").unwrap();
    let equipment = store.find_equipment(project_id, "FIT-1").unwrap().unwrap();
    assert_eq!(equipment.tag, "FIT-1");
}
