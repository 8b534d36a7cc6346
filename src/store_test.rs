#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::audit::AuditAction;
use crate::camera::Point;
use crate::consts::{DUPLICATE_OFFSET, HISTORY_LIMIT};
use crate::doc::{MarkerType, Props};

// =============================================================
// Helpers
// =============================================================

fn store() -> Store {
    let mut project = Project::new("HQ");
    project.floorplans.push(Floorplan::new("Level 1", 2));
    project.floorplans.push(Floorplan::new("Level 2", 1));
    let state = EditorState { projects: vec![project], active_project_id: None, active_floorplan_id: None };
    Store::init(state, "tester", HISTORY_LIMIT)
}

fn placed(device_type: DeviceType, x: f64, y: f64) -> Edit {
    let mut e = Edit::device(device_type, Point::new(x, y), device_type.label());
    e.frame.page_index = Some(0);
    e
}

fn with_data(mut edit: Edit, key: &str, value: serde_json::Value) -> Edit {
    if let Some(data) = edit.kind.data_mut() {
        data.insert(key.into(), value);
    }
    edit
}

fn project(s: &Store) -> &Project {
    s.active_project().unwrap()
}

fn second_floorplan(s: &Store) -> FloorplanId {
    project(s).floorplans[1].id
}

fn patch(value: serde_json::Value) -> Data {
    value.as_object().cloned().unwrap_or_default()
}

// =============================================================
// Snapshots & navigation
// =============================================================

#[test]
fn init_selects_first_project_and_floorplan() {
    let s = store();
    let p = project(&s);
    assert_eq!(s.state().active_project_id, Some(p.id));
    assert_eq!(s.state().active_floorplan_id, Some(p.floorplans[0].id));
}

#[test]
fn init_repairs_dangling_active_ids() {
    let mut state = store().serialize();
    state.active_floorplan_id = Some(uuid::Uuid::new_v4());
    let s = Store::init(state, "tester", HISTORY_LIMIT);
    assert_eq!(s.active_floorplan().unwrap().name, "Level 1");
}

#[test]
fn json_round_trip_is_structurally_identical() {
    let mut s = store();
    s.create_edits(vec![with_data(placed(DeviceType::Camera, 50.0, 50.0), "location", json!("Lobby"))]).unwrap();
    s.create_in_pool(Edit::marker(MarkerType::Note, Point::new(0.0, 0.0), "Spare")).unwrap();

    let json = s.to_json().unwrap();
    let back = Store::from_json(&json, "tester", HISTORY_LIMIT).unwrap();
    assert_eq!(back.serialize(), s.serialize());
}

#[test]
fn malformed_snapshot_is_rejected() {
    assert!(matches!(Store::from_json("{\"projects\": 3}", "t", 10), Err(StoreError::Snapshot(_))));
}

#[test]
fn switching_floorplan_resets_history() {
    let mut s = store();
    s.create_edits(vec![placed(DeviceType::Intercom, 10.0, 10.0)]).unwrap();
    assert!(s.history().can_undo());
    s.select_floorplan(second_floorplan(&s)).unwrap();
    assert!(!s.history().can_undo());
}

#[test]
fn unknown_floorplan_is_rejected() {
    let mut s = store();
    assert!(matches!(
        s.select_floorplan(uuid::Uuid::new_v4()),
        Err(StoreError::Inventory(InventoryError::FloorplanNotFound(_)))
    ));
}

#[test]
fn device_names_are_numbered_per_floorplan() {
    let mut s = store();
    assert_eq!(s.next_device_name(DeviceType::Camera), "Camera 1");
    s.create_edits(vec![placed(DeviceType::Camera, 0.0, 0.0), placed(DeviceType::Camera, 50.0, 0.0)]).unwrap();
    assert_eq!(s.next_device_name(DeviceType::Camera), "Camera 3");
    assert_eq!(s.next_device_name(DeviceType::Elevator), "Elevator 1");
}

// =============================================================
// Inventory invariants
// =============================================================

#[test]
fn place_then_delete_leaves_no_trace() {
    let mut s = store();
    let pooled = s.create_in_pool(Edit::device(DeviceType::Turnstile, Point::new(0.0, 0.0), "Gate")).unwrap();
    let id = pooled.id();
    s.place(id, Placement { page_index: 1, x: 40.0, y: 40.0 }).unwrap();
    assert!(s.active_floorplan().unwrap().placed_edit_ids.contains(&id));

    s.delete(&[id]).unwrap();
    let p = project(&s);
    assert!(p.owner_of(id).is_none());
    assert!(p.floorplans.iter().all(|f| !f.placed_edit_ids.contains(&id)));
    assert!(p.validate().is_ok());
}

#[test]
fn placing_a_missing_edit_changes_nothing() {
    let mut s = store();
    s.create_edits(vec![placed(DeviceType::AccessDoor, 10.0, 10.0)]).unwrap();
    let before = s.serialize();
    let undo_before = s.history().undo_count();
    let missing = uuid::Uuid::new_v4();

    let err = s.place(missing, Placement { page_index: 0, x: 5.0, y: 5.0 }).unwrap_err();
    assert!(matches!(err, StoreError::Inventory(InventoryError::EditNotFound(id)) if id == missing));
    assert_eq!(s.serialize(), before);
    assert_eq!(s.history().undo_count(), undo_before);
}

#[test]
fn move_to_floorplan_keeps_exclusive_ownership() {
    let mut s = store();
    let created = s.create_edits(vec![placed(DeviceType::AccessDoor, 10.0, 10.0)]).unwrap();
    let id = created[0].id();
    let target = second_floorplan(&s);
    s.move_to_floorplan(&[id], target, Some(0)).unwrap();

    let p = project(&s);
    assert_eq!(p.owner_of(id), Some(Owner::Floorplan(target)));
    assert!(!p.floorplans[0].placed_edit_ids.contains(&id));
    assert!(p.floorplans[1].placed_edit_ids.contains(&id));
    assert!(p.validate().is_ok());
}

#[test]
fn failed_operation_leaves_state_untouched() {
    let mut s = store();
    s.create_edits(vec![placed(DeviceType::AccessDoor, 10.0, 10.0)]).unwrap();
    let before = s.serialize();
    let missing = uuid::Uuid::new_v4();
    let id = project(&s).floorplans[0].inventory[0].id();
    // First id moves fine, second fails; the whole operation must be discarded.
    assert!(s.move_to_floorplan(&[id, missing], second_floorplan(&s), None).is_err());
    assert_eq!(s.serialize(), before);
}

// =============================================================
// Undo / redo
// =============================================================

#[test]
fn update_then_undo_restores_inventory_and_redo_reapplies() {
    let mut s = store();
    let created = s.create_edits(vec![placed(DeviceType::Camera, 50.0, 50.0)]).unwrap();
    let pre = project(&s).floorplans.clone();

    let mut moved = created[0].clone();
    moved.frame.x += 30.0;
    assert_eq!(s.update_edits(&[moved]).unwrap(), 1);
    let post = project(&s).floorplans.clone();

    let undone = s.undo().unwrap().unwrap();
    assert_eq!(undone, Replayed { label: "update", count: 1 });
    assert_eq!(project(&s).floorplans, pre);
    s.redo().unwrap();
    assert_eq!(project(&s).floorplans, post);
}

#[test]
fn unchanged_update_records_nothing() {
    let mut s = store();
    let created = s.create_edits(vec![placed(DeviceType::Camera, 50.0, 50.0)]).unwrap();
    let undo_depth = s.history().undo_count();
    assert_eq!(s.update_edits(&created).unwrap(), 0);
    assert_eq!(s.history().undo_count(), undo_depth);
}

#[test]
fn empty_undo_is_noop() {
    let mut s = store();
    assert_eq!(s.undo().unwrap(), None);
    assert_eq!(s.redo().unwrap(), None);
}

#[test]
fn undo_and_redo_are_audited() {
    let mut s = store();
    s.create_edits(vec![placed(DeviceType::Camera, 50.0, 50.0)]).unwrap();
    s.undo().unwrap();
    assert_eq!(project(&s).audit_log[0].action, AuditAction::Undo);
    s.redo().unwrap();
    assert_eq!(project(&s).audit_log[0].action, AuditAction::Redo);
}

#[test]
fn delete_undo_restores_the_edit() {
    let mut s = store();
    let created = s.create_edits(vec![placed(DeviceType::Camera, 50.0, 50.0)]).unwrap();
    let pre = project(&s).floorplans.clone();
    s.delete(&[created[0].id()]).unwrap();
    s.undo().unwrap();
    assert_eq!(project(&s).floorplans, pre);
}

#[test]
fn bring_to_front_and_send_to_back() {
    let mut s = store();
    let created = s
        .create_edits(vec![
            placed(DeviceType::Camera, 0.0, 0.0),
            placed(DeviceType::Camera, 50.0, 0.0),
            placed(DeviceType::Camera, 100.0, 0.0),
        ])
        .unwrap();
    let ids: Vec<EditId> = created.iter().map(Edit::id).collect();
    let owner = s.active_owner().unwrap();

    s.bring_to_front(&[ids[0]]).unwrap();
    assert_eq!(project(&s).ordered_ids(owner), vec![ids[1], ids[2], ids[0]]);
    s.send_to_back(&[ids[2]]).unwrap();
    assert_eq!(project(&s).ordered_ids(owner), vec![ids[2], ids[1], ids[0]]);
    s.undo().unwrap();
    assert_eq!(project(&s).ordered_ids(owner), vec![ids[1], ids[2], ids[0]]);
}

// =============================================================
// Duplicates, copies, attachments
// =============================================================

#[test]
fn duplicate_offsets_renames_and_drops_images() {
    let mut s = store();
    let original = with_data(placed(DeviceType::Camera, 50.0, 50.0), "images", json!([{ "localId": "img-1" }]));
    let created = s.create_edits(vec![original]).unwrap();
    let copies = s.duplicate(&[created[0].id()], DUPLICATE_OFFSET).unwrap();

    let copy = &copies[0];
    assert_ne!(copy.id(), created[0].id());
    assert_eq!(copy.frame.x, created[0].frame.x + 20.0);
    assert_eq!(copy.display_name(), "Camera (Copy)");
    assert!(copy.kind.data().unwrap().get("images").is_none());
    s.undo().unwrap();
    assert!(project(&s).find_edit(copy.id()).is_none());
}

#[test]
fn copy_to_pages_keeps_position_and_label() {
    let mut s = store();
    let created = s.create_edits(vec![placed(DeviceType::Intercom, 50.0, 50.0)]).unwrap();
    let copies = s.copy_to_pages(&[created[0].id()], &[1]).unwrap();
    assert_eq!(copies[0].frame.page_index, Some(1));
    assert_eq!(copies[0].frame.x, created[0].frame.x);
    assert_eq!(copies[0].display_name(), created[0].display_name());
    assert!(matches!(
        s.copy_to_pages(&[created[0].id()], &[5]),
        Err(StoreError::Inventory(InventoryError::PageOutOfRange { .. }))
    ));
}

#[test]
fn delete_reports_only_orphaned_attachments() {
    let mut s = store();
    let a = with_data(placed(DeviceType::Camera, 0.0, 0.0), "images", json!([{ "localId": "shared" }, { "localId": "solo" }]));
    let b = with_data(placed(DeviceType::Camera, 50.0, 0.0), "images", json!([{ "localId": "shared" }]));
    let created = s.create_edits(vec![a, b]).unwrap();
    let orphaned = s.delete(&[created[0].id()]).unwrap();
    assert_eq!(orphaned, vec!["solo".to_string()]);
}

// =============================================================
// Detail & bulk editing
// =============================================================

#[test]
fn bulk_edit_across_device_types_is_rejected_without_audit() {
    let mut s = store();
    let created =
        s.create_edits(vec![placed(DeviceType::AccessDoor, 0.0, 0.0), placed(DeviceType::Camera, 50.0, 0.0)]).unwrap();
    let ids: Vec<EditId> = created.iter().map(Edit::id).collect();
    let audit_len = project(&s).audit_log.len();
    let changed: BTreeSet<String> = ["location".to_string()].into();

    let err = s.bulk_update(&ids, &patch(json!({ "location": "Roof" })), &changed).unwrap_err();
    assert!(matches!(err, StoreError::Inventory(InventoryError::MixedDeviceTypes(_))));
    assert_eq!(project(&s).audit_log.len(), audit_len);
}

#[test]
fn bulk_edit_writes_only_changed_fields() {
    let mut s = store();
    let created = s
        .create_edits(vec![
            with_data(placed(DeviceType::Camera, 0.0, 0.0), "model", json!("X1")),
            with_data(placed(DeviceType::Camera, 50.0, 0.0), "model", json!("X2")),
        ])
        .unwrap();
    let ids: Vec<EditId> = created.iter().map(Edit::id).collect();
    let changed: BTreeSet<String> = ["location".to_string()].into();

    let n = s.bulk_update(&ids, &patch(json!({ "location": "Roof", "model": "ignored" })), &changed).unwrap();
    assert_eq!(n, 2);
    let p = project(&s);
    let a = Props::new(p.find_edit(ids[0]).unwrap().kind.data().unwrap());
    assert_eq!(a.location(), "Roof");
    assert_eq!(p.find_edit(ids[1]).unwrap().kind.data().unwrap()["model"], "X2");
}

#[test]
fn bulk_common_fields_keeps_shared_values() {
    let mut s = store();
    let created = s
        .create_edits(vec![
            with_data(with_data(placed(DeviceType::Camera, 0.0, 0.0), "model", json!("X1")), "location", json!("Roof")),
            with_data(with_data(placed(DeviceType::Camera, 50.0, 0.0), "model", json!("X2")), "location", json!("Roof")),
        ])
        .unwrap();
    let ids: Vec<EditId> = created.iter().map(Edit::id).collect();
    let (device_type, common) = s.bulk_common_fields(&ids).unwrap();
    assert_eq!(device_type, DeviceType::Camera);
    assert_eq!(common["location"], "Roof");
    assert!(!common.contains_key("model"));
}

#[test]
fn detail_patch_null_deletes_key_and_is_undoable() {
    let mut s = store();
    let created = s.create_edits(vec![with_data(placed(DeviceType::Elevator, 0.0, 0.0), "location", json!("A"))]).unwrap();
    let id = created[0].id();

    s.apply_data_patch(id, &patch(json!({ "location": "B" }))).unwrap();
    let latest = &project(&s).audit_log[0];
    assert!(latest.description.contains("\"A\"") && latest.description.contains("\"B\""));

    s.apply_data_patch(id, &patch(json!({ "location": null }))).unwrap();
    assert!(project(&s).find_edit(id).unwrap().kind.data().unwrap().get("location").is_none());

    s.undo().unwrap();
    assert_eq!(Props::new(project(&s).find_edit(id).unwrap().kind.data().unwrap()).location(), "B");
}

#[test]
fn audit_entries_are_most_recent_first() {
    let mut s = store();
    s.create_edits(vec![placed(DeviceType::Camera, 0.0, 0.0)]).unwrap();
    s.create_edits(vec![placed(DeviceType::Intercom, 0.0, 0.0)]).unwrap();
    let log = &project(&s).audit_log;
    assert!(log[0].description.contains("Intercom"));
    assert!(log[1].description.contains("Camera"));
}
