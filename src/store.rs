//! Editor store: the snapshot root plus the command history.
//!
//! DESIGN
//! ======
//! `Store` is constructor-injected into the engine and owns the only mutable
//! copy of the editor state. Every mutating operation runs through
//! [`Store::transact`], which clones the active project, applies the change
//! to the clone, prepends any audit entries, and swaps the clone in only on
//! success. A failed operation therefore never leaves a partial mutation, and
//! the edit snapshots held by commands are never aliased by live state.
//!
//! In-floorplan changes (create, update, delete, reorder) are recorded as
//! [`Command`]s. Cross-scope moves (placing from the pool, moving between
//! floorplans) are audited but not recorded; history is reset whenever the
//! active project or floorplan changes.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audit::{AuditAction, AuditContext, AuditLogEntry, diff_edit};
use crate::command::{Command, History};
use crate::doc::{Data, DeviceType, Edit, EditId};
use crate::inventory::{
    Floorplan, FloorplanId, InventoryError, Owner, Placement, Project, ProjectId, attachment_ids,
    check_bulk_selection,
};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error("no active project")]
    NoActiveProject,
    #[error("no active floorplan")]
    NoActiveFloorplan,
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Serializable root of the editor state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub active_project_id: Option<ProjectId>,
    #[serde(default)]
    pub active_floorplan_id: Option<FloorplanId>,
}

/// What an undo or redo step did, for callers that report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replayed {
    pub label: &'static str,
    pub count: usize,
}

pub struct Store {
    state: EditorState,
    history: History,
    user_id: String,
}

// =============================================================================
// SNAPSHOTS & NAVIGATION
// =============================================================================

impl Store {
    /// Load a snapshot. Active ids pointing nowhere are reset to the first
    /// project / floorplan.
    #[must_use]
    pub fn init(state: EditorState, user_id: impl Into<String>, history_limit: usize) -> Self {
        let mut store = Self { state, history: History::with_limit(history_limit), user_id: user_id.into() };
        store.repair_active();
        tracing::info!(
            projects = store.state.projects.len(),
            active_project = ?store.state.active_project_id,
            active_floorplan = ?store.state.active_floorplan_id,
            "store initialized"
        );
        store
    }

    /// Current state for persistence.
    #[must_use]
    pub fn serialize(&self) -> EditorState {
        self.state.clone()
    }

    /// # Errors
    ///
    /// Returns `Snapshot` if serialization fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }

    /// # Errors
    ///
    /// Returns `Snapshot` if `json` is not a valid editor state.
    pub fn from_json(json: &str, user_id: impl Into<String>, history_limit: usize) -> Result<Self, StoreError> {
        let state: EditorState = serde_json::from_str(json)?;
        Ok(Self::init(state, user_id, history_limit))
    }

    fn repair_active(&mut self) {
        let project_ok = self
            .state
            .active_project_id
            .is_some_and(|id| self.state.projects.iter().any(|p| p.id == id));
        if !project_ok {
            self.state.active_project_id = self.state.projects.first().map(|p| p.id);
            self.state.active_floorplan_id = None;
        }
        let floorplan_ok = match (self.active_project(), self.state.active_floorplan_id) {
            (Some(p), Some(fid)) => p.floorplan(fid).is_some(),
            _ => false,
        };
        if !floorplan_ok {
            self.state.active_floorplan_id = self.active_project().and_then(|p| p.floorplans.first()).map(|f| f.id);
        }
    }

    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn active_project(&self) -> Option<&Project> {
        let id = self.state.active_project_id?;
        self.state.projects.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn active_floorplan(&self) -> Option<&Floorplan> {
        let fid = self.state.active_floorplan_id?;
        self.active_project()?.floorplan(fid)
    }

    /// The active floorplan as an inventory owner.
    ///
    /// # Errors
    ///
    /// `NoActiveFloorplan` when none is selected.
    pub fn active_owner(&self) -> Result<Owner, StoreError> {
        self.state.active_floorplan_id.map(Owner::Floorplan).ok_or(StoreError::NoActiveFloorplan)
    }

    /// Switch projects. Resets history and selects the project's first floorplan.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` for an unknown id.
    pub fn select_project(&mut self, id: ProjectId) -> Result<(), StoreError> {
        let project = self.state.projects.iter().find(|p| p.id == id).ok_or(StoreError::ProjectNotFound(id))?;
        self.state.active_floorplan_id = project.floorplans.first().map(|f| f.id);
        self.state.active_project_id = Some(id);
        self.history.clear();
        tracing::info!(project_id = %id, "active project changed");
        Ok(())
    }

    /// Switch floorplans within the active project. Resets history.
    ///
    /// # Errors
    ///
    /// `NoActiveProject`, or `FloorplanNotFound` for an unknown id.
    pub fn select_floorplan(&mut self, id: FloorplanId) -> Result<(), StoreError> {
        let project = self.active_project().ok_or(StoreError::NoActiveProject)?;
        if project.floorplan(id).is_none() {
            return Err(InventoryError::FloorplanNotFound(id).into());
        }
        self.state.active_floorplan_id = Some(id);
        self.history.clear();
        tracing::info!(floorplan_id = %id, "active floorplan changed");
        Ok(())
    }

    /// Default name for a new device: its type label numbered after the
    /// devices of that type already in the active floorplan.
    #[must_use]
    pub fn next_device_name(&self, device_type: DeviceType) -> String {
        let existing = self.active_floorplan().map_or(0, |f| f.count_devices(device_type));
        format!("{} {}", device_type.label(), existing + 1)
    }

    /// Run `f` against a clone of the active project and swap it in on success.
    /// Audit entries returned by `f` are prepended, most recent first.
    fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut Project, &AuditContext) -> Result<(T, Vec<AuditLogEntry>), StoreError>,
    ) -> Result<T, StoreError> {
        let id = self.state.active_project_id.ok_or(StoreError::NoActiveProject)?;
        let slot = self
            .state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProjectNotFound(id))?;
        let ctx = AuditContext::now(&self.user_id);

        let mut draft = slot.clone();
        let (out, entries) = f(&mut draft, &ctx)?;
        for entry in entries {
            draft.audit_log.insert(0, entry);
        }
        *slot = draft;
        Ok(out)
    }

    fn record(&mut self, command: Command) {
        if command.is_empty() {
            return;
        }
        tracing::debug!(command = command.label(), edits = command.len(), "command recorded");
        self.history.push(command);
    }
}

// =============================================================================
// RECORDED OPERATIONS
// =============================================================================

impl Store {
    /// Add new placed edits to the active floorplan.
    ///
    /// # Errors
    ///
    /// `NoActiveFloorplan`, or the inventory error for a bad page / duplicate id.
    pub fn create_edits(&mut self, edits: Vec<Edit>) -> Result<Vec<Edit>, StoreError> {
        let owner = self.active_owner()?;
        let created = self.transact(|project, ctx| {
            let mut created = Vec::with_capacity(edits.len());
            let mut entries = Vec::new();
            for edit in edits {
                let edit = project.create(owner, edit)?;
                entries.push(ctx.entry(
                    AuditAction::Create,
                    created_description(&edit),
                    Some(json!({ "editId": edit.id(), "kind": edit.kind.kind_label() })),
                ));
                created.push(edit);
            }
            Ok((created, entries))
        })?;
        self.record(Command::CreateEdits { owner, edits: created.clone() });
        Ok(created)
    }

    /// Replace edits by id. Only edits that actually differ are recorded.
    /// Returns the number of edits changed.
    ///
    /// # Errors
    ///
    /// `NoActiveFloorplan`.
    pub fn update_edits(&mut self, edits: &[Edit]) -> Result<usize, StoreError> {
        let owner = self.active_owner()?;
        let pairs = self.transact(|project, ctx| {
            let changed: Vec<Edit> =
                edits.iter().filter(|e| project.find_edit(e.id()).is_some_and(|cur| cur != *e)).cloned().collect();
            let pairs = project.update_edits(&changed);
            let entries = pairs.iter().flat_map(|(b, a)| diff_edit(b, a, ctx)).collect();
            Ok((pairs, entries))
        })?;
        let count = pairs.len();
        self.record_pairs(owner, pairs);
        Ok(count)
    }

    fn record_pairs(&mut self, owner: Owner, pairs: Vec<(Edit, Edit)>) {
        let (previous, current) = pairs.into_iter().unzip();
        self.record(Command::UpdateEdits { owner, previous, current });
    }

    /// Delete edits from wherever they live. Returns the attachment ids no
    /// longer referenced by any remaining edit.
    ///
    /// # Errors
    ///
    /// `NoActiveFloorplan`, or `EmptySelection` when nothing was removed.
    pub fn delete(&mut self, ids: &[EditId]) -> Result<Vec<String>, StoreError> {
        let owner = self.active_owner()?;
        let (removed, orphaned) = self.transact(|project, ctx| {
            let removed = project.delete(ids);
            if removed.is_empty() {
                return Err(InventoryError::EmptySelection.into());
            }
            let still_used: BTreeSet<String> = attachment_ids(
                project.pool.iter().chain(project.floorplans.iter().flat_map(|f| f.inventory.iter())),
            )
            .into_iter()
            .collect();
            let orphaned: Vec<String> = attachment_ids(removed.iter().map(|r| &r.edit))
                .into_iter()
                .filter(|id| !still_used.contains(id))
                .collect();
            let entries = removed
                .iter()
                .map(|r| {
                    ctx.entry(
                        AuditAction::Delete,
                        format!("Deleted {}", r.edit.display_name()),
                        Some(json!({ "editId": r.edit.id() })),
                    )
                })
                .collect();
            Ok(((removed, orphaned), entries))
        })?;
        tracing::info!(deleted = removed.len(), orphaned = orphaned.len(), "edits deleted");
        self.record(Command::DeleteEdits { owner, removed });
        Ok(orphaned)
    }

    /// Replace the active floorplan's draw order.
    ///
    /// # Errors
    ///
    /// `InvalidOrder` unless `order` is a permutation of the current order.
    pub fn reorder(&mut self, order: &[EditId]) -> Result<(), StoreError> {
        let owner = self.active_owner()?;
        let previous_order = self.transact(|project, ctx| {
            let previous = project.reorder(owner, order)?;
            let entry = ctx.entry(AuditAction::Reorder, format!("Reordered {} edits", order.len()), None);
            Ok((previous, vec![entry]))
        })?;
        if previous_order.as_slice() != order {
            self.record(Command::ReorderEdits { owner, previous_order, current_order: order.to_vec() });
        }
        Ok(())
    }

    /// Move `ids` to the top of the active floorplan's draw order.
    ///
    /// # Errors
    ///
    /// As for [`Store::reorder`]; `EmptySelection` if no id is in the floorplan.
    pub fn bring_to_front(&mut self, ids: &[EditId]) -> Result<(), StoreError> {
        self.restack(ids, true)
    }

    /// Move `ids` to the bottom of the active floorplan's draw order.
    ///
    /// # Errors
    ///
    /// As for [`Store::bring_to_front`].
    pub fn send_to_back(&mut self, ids: &[EditId]) -> Result<(), StoreError> {
        self.restack(ids, false)
    }

    fn restack(&mut self, ids: &[EditId], to_front: bool) -> Result<(), StoreError> {
        let owner = self.active_owner()?;
        let project = self.active_project().ok_or(StoreError::NoActiveProject)?;
        let order = project.restacked_order(owner, ids, to_front)?;
        self.reorder(&order)
    }

    /// Duplicate edits next to the originals.
    ///
    /// # Errors
    ///
    /// `EmptySelection` or `EditNotFound`.
    pub fn duplicate(&mut self, ids: &[EditId], offset: f64) -> Result<Vec<Edit>, StoreError> {
        let created = self.transact(|project, ctx| {
            let created = project.duplicate(ids, offset)?;
            let entries = created
                .iter()
                .map(|(_, e)| {
                    ctx.entry(
                        AuditAction::Duplicate,
                        format!("Duplicated as {}", e.display_name()),
                        Some(json!({ "editId": e.id() })),
                    )
                })
                .collect();
            Ok((created, entries))
        })?;
        Ok(self.record_created(created))
    }

    /// Copy edits onto other pages of their floorplan.
    ///
    /// # Errors
    ///
    /// `EmptySelection`, `EditNotFound`, or `PageOutOfRange`.
    pub fn copy_to_pages(&mut self, ids: &[EditId], pages: &[u32]) -> Result<Vec<Edit>, StoreError> {
        let created = self.transact(|project, ctx| {
            let created = project.copy_to_pages(ids, pages)?;
            let entries = created
                .iter()
                .map(|(_, e)| {
                    let page = e.frame.page_index.map_or(0, |p| p + 1);
                    ctx.entry(
                        AuditAction::CopyToPages,
                        format!("Copied {} to page {page}", e.display_name()),
                        Some(json!({ "editId": e.id(), "page": page })),
                    )
                })
                .collect();
            Ok((created, entries))
        })?;
        Ok(self.record_created(created))
    }

    /// Record one `CreateEdits` per owner, in first-seen order.
    fn record_created(&mut self, created: Vec<(Owner, Edit)>) -> Vec<Edit> {
        let mut groups: Vec<(Owner, Vec<Edit>)> = Vec::new();
        for (owner, edit) in &created {
            match groups.iter_mut().find(|(o, _)| o == owner) {
                Some((_, edits)) => edits.push(edit.clone()),
                None => groups.push((*owner, vec![edit.clone()])),
            }
        }
        for (owner, edits) in groups {
            self.record(Command::CreateEdits { owner, edits });
        }
        created.into_iter().map(|(_, e)| e).collect()
    }

    /// Apply a detail-editor patch to one edit's data record.
    ///
    /// # Errors
    ///
    /// `EditNotFound` or `NoDataRecord`.
    pub fn apply_data_patch(&mut self, id: EditId, patch: &Data) -> Result<(), StoreError> {
        let owner = self.active_owner()?;
        let pair = self.transact(|project, ctx| {
            let (before, after) = project.apply_data_patch(id, patch)?;
            let entries = diff_edit(&before, &after, ctx);
            Ok(((before, after), entries))
        })?;
        if pair.0 != pair.1 {
            self.record_pairs(owner, vec![pair]);
        }
        Ok(())
    }

    /// Apply a bulk-edit patch across same-type devices. Only keys in
    /// `changed` are written. Returns the number of edits that changed.
    ///
    /// # Errors
    ///
    /// `MixedDeviceTypes` / `NotADevice` / `EmptySelection`; nothing changes
    /// and no audit entry is written on error.
    pub fn bulk_update(&mut self, ids: &[EditId], patch: &Data, changed: &BTreeSet<String>) -> Result<usize, StoreError> {
        let owner = self.active_owner()?;
        let pairs = self.transact(|project, ctx| {
            let pairs: Vec<(Edit, Edit)> =
                project.bulk_update(ids, patch, changed)?.into_iter().filter(|(b, a)| b != a).collect();
            let entries = pairs.iter().flat_map(|(b, a)| diff_edit(b, a, ctx)).collect();
            Ok((pairs, entries))
        })?;
        let count = pairs.len();
        self.record_pairs(owner, pairs);
        Ok(count)
    }

    /// Shared field values for a bulk-edit form: keys present on every
    /// selected device with one common value.
    ///
    /// # Errors
    ///
    /// As for [`check_bulk_selection`].
    pub fn bulk_common_fields(&self, ids: &[EditId]) -> Result<(DeviceType, Data), StoreError> {
        let project = self.active_project().ok_or(StoreError::NoActiveProject)?;
        let device_type = check_bulk_selection(project, ids)?;
        let mut records = ids.iter().filter_map(|id| project.find_edit(*id)).filter_map(|e| e.kind.data());
        let Some(first) = records.next() else {
            return Err(InventoryError::EmptySelection.into());
        };
        let mut common: BTreeMap<&String, &serde_json::Value> = first.iter().collect();
        for data in records {
            common.retain(|k, v| data.get(*k) == Some(*v));
        }
        let shared = common.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Ok((device_type, shared))
    }
}

// =============================================================================
// UNRECORDED OPERATIONS
// =============================================================================

impl Store {
    /// Add an unplaced edit to the project pool.
    ///
    /// # Errors
    ///
    /// `NoActiveProject` or `DuplicateId`.
    pub fn create_in_pool(&mut self, edit: Edit) -> Result<Edit, StoreError> {
        self.transact(|project, ctx| {
            let edit = project.create(Owner::Pool, edit)?;
            let entry = ctx.entry(
                AuditAction::Create,
                format!("Added {} to the project pool", edit.display_name()),
                Some(json!({ "editId": edit.id() })),
            );
            Ok((edit, vec![entry]))
        })
    }

    /// Place an edit (from the pool or unplaced) on a page of the active floorplan.
    ///
    /// # Errors
    ///
    /// `EditNotFound` or `PageOutOfRange`.
    pub fn place(&mut self, id: EditId, placement: Placement) -> Result<Edit, StoreError> {
        let Owner::Floorplan(target) = self.active_owner()? else {
            return Err(StoreError::NoActiveFloorplan);
        };
        let placed = self.transact(|project, ctx| {
            let (before, after) = project.place(id, target, placement)?;
            let entries = diff_edit(&before, &after, ctx);
            Ok((after, entries))
        });
        if let Err(StoreError::Inventory(InventoryError::EditNotFound(_))) = &placed {
            tracing::warn!(edit_id = %id, "place: edit not found; skipping");
        }
        placed
    }

    /// Move edits into another floorplan of the active project.
    ///
    /// # Errors
    ///
    /// `EmptySelection`, `EditNotFound`, `FloorplanNotFound`, or `PageOutOfRange`.
    pub fn move_to_floorplan(&mut self, ids: &[EditId], target: FloorplanId, page: Option<u32>) -> Result<(), StoreError> {
        self.transact(|project, ctx| {
            let name = project.floorplan(target).map(|f| f.name.clone()).unwrap_or_default();
            let moved = project.move_to_floorplan(ids, target, page)?;
            let entries = moved
                .iter()
                .map(|(_, after)| {
                    ctx.entry(
                        AuditAction::MoveToFloorplan,
                        format!("Moved {} to floorplan {name}", after.display_name()),
                        Some(json!({ "editId": after.id(), "floorplanId": target })),
                    )
                })
                .collect();
            Ok(((), entries))
        })
    }

    /// Add a floorplan to the active project.
    ///
    /// # Errors
    ///
    /// `NoActiveProject`.
    pub fn add_floorplan(&mut self, floorplan: Floorplan) -> Result<FloorplanId, StoreError> {
        let id = floorplan.id;
        self.transact(|project, _| {
            project.floorplans.push(floorplan);
            Ok(((), Vec::new()))
        })?;
        if self.state.active_floorplan_id.is_none() {
            self.state.active_floorplan_id = Some(id);
        }
        Ok(id)
    }

    /// Add a project; it becomes active if none is.
    pub fn add_project(&mut self, project: Project) -> ProjectId {
        let id = project.id;
        self.state.projects.push(project);
        if self.state.active_project_id.is_none() {
            self.state.active_project_id = Some(id);
            self.repair_active();
        }
        id
    }
}

// =============================================================================
// UNDO / REDO
// =============================================================================

impl Store {
    /// Revert the most recent command. `Ok(None)` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// `NoActiveProject`.
    pub fn undo(&mut self) -> Result<Option<Replayed>, StoreError> {
        self.replay(true)
    }

    /// Re-apply the most recently undone command.
    ///
    /// # Errors
    ///
    /// `NoActiveProject`.
    pub fn redo(&mut self) -> Result<Option<Replayed>, StoreError> {
        self.replay(false)
    }

    fn replay(&mut self, undo: bool) -> Result<Option<Replayed>, StoreError> {
        let can = if undo { self.history.can_undo() } else { self.history.can_redo() };
        if !can {
            return Ok(None);
        }
        // Split borrows: the history replays into the transaction's draft.
        let mut history = std::mem::take(&mut self.history);
        let result = self.transact(|project, ctx| {
            let step = if undo { history.undo(project) } else { history.redo(project) };
            let replayed = step.map(|c| Replayed { label: c.label(), count: c.len() });
            let entries = replayed
                .map(|r| {
                    let (action, verb) = if undo { (AuditAction::Undo, "Undid") } else { (AuditAction::Redo, "Redid") };
                    vec![ctx.entry(action, format!("{verb} {} of {} edit(s)", r.label, r.count), None)]
                })
                .unwrap_or_default();
            Ok((replayed, entries))
        });
        self.history = history;
        result
    }
}

fn created_description(edit: &Edit) -> String {
    match edit.frame.page_index {
        Some(page) => format!("Created {} on page {}", edit.display_name(), page + 1),
        None => format!("Created {}", edit.display_name()),
    }
}
