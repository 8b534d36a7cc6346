//! Inventory & placement model: who owns each edit, and where it is placed.
//!
//! DESIGN
//! ======
//! A project owns one unplaced pool plus, per floorplan, an ordered inventory
//! and a `placed_edit_ids` set. Each edit id lives in exactly one inventory at
//! a time; a floorplan's placed set holds an id iff that floorplan owns the
//! edit and the edit's `page_index` is a valid page of it.
//!
//! Moving an edit between inventories always goes through
//! [`Project::transfer_edit`], which removes from the source (inventory and
//! placed set) before inserting into the target, so exclusivity holds by
//! construction. Operations mutate in place; callers that need atomicity
//! (the store) run them against a clone and swap it in on success.

#[cfg(test)]
#[path = "inventory_test.rs"]
mod inventory_test;

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::audit::AuditLogEntry;
use crate::doc::{Data, DeviceType, Edit, EditId, EditKind, Props};

pub type ProjectId = Uuid;
pub type FloorplanId = Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InventoryError {
    #[error("edit not found: {0}")]
    EditNotFound(EditId),
    #[error("edit already exists: {0}")]
    DuplicateId(EditId),
    #[error("floorplan not found: {0}")]
    FloorplanNotFound(FloorplanId),
    #[error("page {page} is out of range (floorplan has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("nothing selected")]
    EmptySelection,
    #[error("bulk edit only applies to devices; {0} is not a device")]
    NotADevice(EditId),
    #[error("bulk edit requires a single device type, got {0:?}")]
    MixedDeviceTypes(Vec<DeviceType>),
    #[error("edit {0} has no data record")]
    NoDataRecord(EditId),
    #[error("new order is not a permutation of the current inventory")]
    InvalidOrder,
    #[error("edit {0} is owned by more than one inventory")]
    SharedOwnership(EditId),
    #[error("placement of edit {0} disagrees with its floorplan's placed set")]
    PlacementMismatch(EditId),
}

/// Which inventory holds an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Pool,
    Floorplan(FloorplanId),
}

/// Page and position assigned when placing an edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page_index: u32,
    pub x: f64,
    pub y: f64,
}

/// One page-bearing document and its inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floorplan {
    pub id: FloorplanId,
    pub name: String,
    pub page_count: u32,
    #[serde(default)]
    pub inventory: Vec<Edit>,
    #[serde(default)]
    pub placed_edit_ids: BTreeSet<EditId>,
}

impl Floorplan {
    #[must_use]
    pub fn new(name: impl Into<String>, page_count: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            page_count,
            inventory: Vec::new(),
            placed_edit_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn is_valid_page(&self, page: u32) -> bool {
        page < self.page_count
    }

    fn check_page(&self, page: u32) -> Result<(), InventoryError> {
        if self.is_valid_page(page) {
            Ok(())
        } else {
            Err(InventoryError::PageOutOfRange { page, page_count: self.page_count })
        }
    }

    /// Whether `edit` should be in the placed set.
    #[must_use]
    pub fn counts_as_placed(&self, edit: &Edit) -> bool {
        edit.frame.page_index.is_some_and(|p| self.is_valid_page(p))
    }

    /// Bring the placed set in line with `edit`'s page assignment.
    pub fn sync_placement(&mut self, edit: &Edit) {
        if self.counts_as_placed(edit) {
            self.placed_edit_ids.insert(edit.id());
        } else {
            self.placed_edit_ids.remove(&edit.id());
        }
    }

    #[must_use]
    pub fn position(&self, id: EditId) -> Option<usize> {
        self.inventory.iter().position(|e| e.id() == id)
    }

    /// Placed edits on `page`, in inventory (draw) order.
    #[must_use]
    pub fn edits_on_page(&self, page: u32) -> Vec<&Edit> {
        self.inventory
            .iter()
            .filter(|e| e.frame.page_index == Some(page) && self.placed_edit_ids.contains(&e.id()))
            .collect()
    }

    /// Number of devices of `device_type` in this floorplan.
    #[must_use]
    pub fn count_devices(&self, device_type: DeviceType) -> usize {
        self.inventory.iter().filter(|e| e.device_type() == Some(device_type)).count()
    }
}

/// A removed edit and where it came from, so removal can be reverted.
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub owner: Owner,
    pub index: usize,
    pub edit: Edit,
    pub was_placed: bool,
}

/// A project: an unplaced pool, its floorplans, and the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub pool: Vec<Edit>,
    #[serde(default)]
    pub floorplans: Vec<Floorplan>,
    #[serde(default)]
    pub audit_log: Vec<AuditLogEntry>,
}

// =============================================================================
// LOOKUP
// =============================================================================

impl Project {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), pool: Vec::new(), floorplans: Vec::new(), audit_log: Vec::new() }
    }

    #[must_use]
    pub fn floorplan(&self, id: FloorplanId) -> Option<&Floorplan> {
        self.floorplans.iter().find(|f| f.id == id)
    }

    pub fn floorplan_mut(&mut self, id: FloorplanId) -> Result<&mut Floorplan, InventoryError> {
        self.floorplans
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(InventoryError::FloorplanNotFound(id))
    }

    /// The inventory list for `owner`.
    pub fn edits(&self, owner: Owner) -> Result<&[Edit], InventoryError> {
        match owner {
            Owner::Pool => Ok(&self.pool),
            Owner::Floorplan(id) => self
                .floorplan(id)
                .map(|f| f.inventory.as_slice())
                .ok_or(InventoryError::FloorplanNotFound(id)),
        }
    }

    fn edits_mut(&mut self, owner: Owner) -> Result<&mut Vec<Edit>, InventoryError> {
        match owner {
            Owner::Pool => Ok(&mut self.pool),
            Owner::Floorplan(id) => Ok(&mut self.floorplan_mut(id)?.inventory),
        }
    }

    /// Which inventory currently holds `id`.
    #[must_use]
    pub fn owner_of(&self, id: EditId) -> Option<Owner> {
        if self.pool.iter().any(|e| e.id() == id) {
            return Some(Owner::Pool);
        }
        self.floorplans
            .iter()
            .find(|f| f.inventory.iter().any(|e| e.id() == id))
            .map(|f| Owner::Floorplan(f.id))
    }

    #[must_use]
    pub fn find_edit(&self, id: EditId) -> Option<&Edit> {
        self.pool
            .iter()
            .chain(self.floorplans.iter().flat_map(|f| f.inventory.iter()))
            .find(|e| e.id() == id)
    }

    fn find_edit_mut(&mut self, id: EditId) -> Option<(Owner, &mut Edit)> {
        if let Some(e) = self.pool.iter_mut().find(|e| e.id() == id) {
            return Some((Owner::Pool, e));
        }
        for f in &mut self.floorplans {
            let owner = Owner::Floorplan(f.id);
            if let Some(e) = f.inventory.iter_mut().find(|e| e.id() == id) {
                return Some((owner, e));
            }
        }
        None
    }

    #[must_use]
    pub fn ordered_ids(&self, owner: Owner) -> Vec<EditId> {
        self.edits(owner).map(|edits| edits.iter().map(Edit::id).collect()).unwrap_or_default()
    }

    fn sync_owner_placement(&mut self, owner: Owner, edit: &Edit) {
        if let Owner::Floorplan(fid) = owner {
            if let Ok(f) = self.floorplan_mut(fid) {
                f.sync_placement(edit);
            }
        }
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

impl Project {
    /// Insert a new edit into `owner`'s inventory.
    ///
    /// Pool edits are forced unplaced. Floorplan edits with a page are placed
    /// when the page is valid and rejected otherwise.
    ///
    /// # Errors
    ///
    /// `DuplicateId` if the id already exists anywhere in the project,
    /// `FloorplanNotFound` / `PageOutOfRange` for bad targets.
    pub fn create(&mut self, owner: Owner, mut edit: Edit) -> Result<Edit, InventoryError> {
        if self.owner_of(edit.id()).is_some() {
            return Err(InventoryError::DuplicateId(edit.id()));
        }
        match owner {
            Owner::Pool => {
                edit.frame.page_index = None;
                self.pool.push(edit.clone());
            }
            Owner::Floorplan(fid) => {
                let f = self.floorplan_mut(fid)?;
                if let Some(page) = edit.frame.page_index {
                    f.check_page(page)?;
                }
                f.inventory.push(edit.clone());
                f.sync_placement(&edit);
            }
        }
        tracing::debug!(edit_id = %edit.id(), ?owner, kind = edit.kind.kind_label(), "edit created");
        Ok(edit)
    }

    /// Move one edit from `from` into floorplan `to`, clearing its old
    /// placement and assigning `placement` (or leaving it unplaced).
    ///
    /// This is the only path by which an edit changes inventories.
    ///
    /// # Errors
    ///
    /// `EditNotFound` if `from` does not hold `id`; target errors as for `create`.
    pub fn transfer_edit(
        &mut self,
        id: EditId,
        from: Owner,
        to: FloorplanId,
        placement: Option<Placement>,
    ) -> Result<Edit, InventoryError> {
        let target = self.floorplan(to).ok_or(InventoryError::FloorplanNotFound(to))?;
        if let Some(p) = placement {
            target.check_page(p.page_index)?;
        }

        let source = self.edits_mut(from)?;
        let index = source
            .iter()
            .position(|e| e.id() == id)
            .ok_or(InventoryError::EditNotFound(id))?;
        let mut edit = source.remove(index);
        if let Owner::Floorplan(fid) = from {
            self.floorplan_mut(fid)?.placed_edit_ids.remove(&id);
        }

        match placement {
            Some(p) => {
                edit.frame.page_index = Some(p.page_index);
                edit.frame.x = p.x;
                edit.frame.y = p.y;
            }
            None => edit.frame.page_index = None,
        }

        let target = self.floorplan_mut(to)?;
        if from == Owner::Floorplan(to) {
            let at = index.min(target.inventory.len());
            target.inventory.insert(at, edit.clone());
        } else {
            target.inventory.push(edit.clone());
        }
        target.sync_placement(&edit);

        tracing::debug!(edit_id = %id, ?from, %to, placed = placement.is_some(), "edit transferred");
        Ok(edit)
    }

    /// Place an edit on a page of floorplan `to`, pulling it out of the pool
    /// (or another floorplan) if needed. Returns `(before, after)`.
    ///
    /// # Errors
    ///
    /// `EditNotFound` if `id` is nowhere in the project.
    pub fn place(&mut self, id: EditId, to: FloorplanId, placement: Placement) -> Result<(Edit, Edit), InventoryError> {
        let from = self.owner_of(id).ok_or(InventoryError::EditNotFound(id))?;
        let before = self.find_edit(id).cloned().ok_or(InventoryError::EditNotFound(id))?;
        let after = self.transfer_edit(id, from, to, Some(placement))?;
        Ok((before, after))
    }

    /// Relocate edits into floorplan `to`, keeping their coordinates. With
    /// `page` they are placed on it, otherwise they arrive unplaced.
    ///
    /// # Errors
    ///
    /// Fails on the first missing id or bad target; the caller discards the
    /// partially modified project in that case.
    pub fn move_to_floorplan(
        &mut self,
        ids: &[EditId],
        to: FloorplanId,
        page: Option<u32>,
    ) -> Result<Vec<(Edit, Edit)>, InventoryError> {
        if ids.is_empty() {
            return Err(InventoryError::EmptySelection);
        }
        let mut moved = Vec::with_capacity(ids.len());
        for &id in ids {
            let from = self.owner_of(id).ok_or(InventoryError::EditNotFound(id))?;
            let before = self.find_edit(id).cloned().ok_or(InventoryError::EditNotFound(id))?;
            let placement = page.map(|page_index| Placement { page_index, x: before.frame.x, y: before.frame.y });
            let after = self.transfer_edit(id, from, to, placement)?;
            moved.push((before, after));
        }
        Ok(moved)
    }

    /// Remove edits from wherever they live. Missing ids are skipped.
    pub fn delete(&mut self, ids: &[EditId]) -> Vec<Removed> {
        let mut removed = Vec::new();
        for &id in ids {
            let Some(owner) = self.owner_of(id) else {
                tracing::warn!(edit_id = %id, "delete: edit not found; skipping");
                continue;
            };
            let Ok(list) = self.edits_mut(owner) else {
                continue;
            };
            let Some(index) = list.iter().position(|e| e.id() == id) else {
                continue;
            };
            let edit = list.remove(index);
            let mut was_placed = false;
            // Scrub every placed set, not just the owner's.
            for f in &mut self.floorplans {
                was_placed |= f.placed_edit_ids.remove(&id) && owner == Owner::Floorplan(f.id);
            }
            tracing::debug!(edit_id = %id, ?owner, "edit deleted");
            removed.push(Removed { owner, index, edit, was_placed });
        }
        removed
    }

    /// Re-insert a removed edit at its recorded index (clamped).
    ///
    /// # Errors
    ///
    /// `DuplicateId` if the id came back some other way in the meantime.
    pub fn restore(&mut self, removed: &Removed) -> Result<(), InventoryError> {
        let id = removed.edit.id();
        if self.owner_of(id).is_some() {
            return Err(InventoryError::DuplicateId(id));
        }
        let list = self.edits_mut(removed.owner)?;
        let at = removed.index.min(list.len());
        list.insert(at, removed.edit.clone());
        self.sync_owner_placement(removed.owner, &removed.edit);
        Ok(())
    }

    /// Clone edits with fresh ids, offset by `offset`, labelled `"<name> (Copy)"`.
    /// Attachments are not carried over. Copies land in the source's inventory.
    ///
    /// # Errors
    ///
    /// `EmptySelection` or `EditNotFound`.
    pub fn duplicate(&mut self, ids: &[EditId], offset: f64) -> Result<Vec<(Owner, Edit)>, InventoryError> {
        if ids.is_empty() {
            return Err(InventoryError::EmptySelection);
        }
        let mut created = Vec::with_capacity(ids.len());
        for &id in ids {
            let owner = self.owner_of(id).ok_or(InventoryError::EditNotFound(id))?;
            let source = self.find_edit(id).ok_or(InventoryError::EditNotFound(id))?;
            let mut copy = clone_edit(source, true);
            copy.frame.x += offset;
            copy.frame.y += offset;
            let copy = self.create(owner, copy)?;
            created.push((owner, copy));
        }
        Ok(created)
    }

    /// Clone edits once per target page of their own floorplan, keeping position.
    ///
    /// # Errors
    ///
    /// `EmptySelection`, `EditNotFound`, or `PageOutOfRange`. Pool edits have no
    /// floorplan to copy within and are rejected as not found.
    pub fn copy_to_pages(&mut self, ids: &[EditId], pages: &[u32]) -> Result<Vec<(Owner, Edit)>, InventoryError> {
        if ids.is_empty() || pages.is_empty() {
            return Err(InventoryError::EmptySelection);
        }
        let mut created = Vec::with_capacity(ids.len() * pages.len());
        for &id in ids {
            let Some(owner @ Owner::Floorplan(fid)) = self.owner_of(id) else {
                return Err(InventoryError::EditNotFound(id));
            };
            let source = self.find_edit(id).cloned().ok_or(InventoryError::EditNotFound(id))?;
            for &page in pages {
                self.floorplan_mut(fid)?.check_page(page)?;
                let mut copy = clone_edit(&source, false);
                copy.frame.page_index = Some(page);
                let copy = self.create(owner, copy)?;
                created.push((owner, copy));
            }
        }
        Ok(created)
    }

    /// Replace `owner`'s order wholesale. Returns the previous order.
    ///
    /// # Errors
    ///
    /// `InvalidOrder` unless `order` is a permutation of the current ids.
    pub fn reorder(&mut self, owner: Owner, order: &[EditId]) -> Result<Vec<EditId>, InventoryError> {
        let list = self.edits_mut(owner)?;
        let previous: Vec<EditId> = list.iter().map(Edit::id).collect();
        let wanted: HashSet<EditId> = order.iter().copied().collect();
        if order.len() != previous.len() || wanted.len() != order.len() || !previous.iter().all(|id| wanted.contains(id)) {
            return Err(InventoryError::InvalidOrder);
        }
        let mut taken = std::mem::take(list);
        for id in order {
            if let Some(pos) = taken.iter().position(|e| e.id() == *id) {
                list.push(taken.swap_remove(pos));
            }
        }
        Ok(previous)
    }

    /// `owner`'s order with `ids` moved to the front (end of draw order) or
    /// the back, keeping their relative order.
    ///
    /// # Errors
    ///
    /// `EmptySelection` if none of `ids` belong to `owner`.
    pub fn restacked_order(&self, owner: Owner, ids: &[EditId], to_front: bool) -> Result<Vec<EditId>, InventoryError> {
        let current = self.ordered_ids(owner);
        let (moving, rest): (Vec<EditId>, Vec<EditId>) = current.into_iter().partition(|id| ids.contains(id));
        if moving.is_empty() {
            return Err(InventoryError::EmptySelection);
        }
        Ok(if to_front { [rest, moving].concat() } else { [moving, rest].concat() })
    }

    /// Replace edits by id wherever they live, keeping inventory position and
    /// re-syncing placement. Missing ids are skipped. Returns `(before, after)` pairs.
    pub fn update_edits(&mut self, edits: &[Edit]) -> Vec<(Edit, Edit)> {
        let mut changed = Vec::with_capacity(edits.len());
        for edit in edits {
            let id = edit.id();
            let Some((owner, slot)) = self.find_edit_mut(id) else {
                tracing::warn!(edit_id = %id, "update: edit not found; skipping");
                continue;
            };
            let mut next = edit.clone();
            if owner == Owner::Pool {
                next.frame.page_index = None;
            }
            let before = std::mem::replace(slot, next.clone());
            self.sync_owner_placement(owner, &next);
            changed.push((before, next));
        }
        changed
    }

    /// Merge a detail-editor patch into one edit's data record. `null` values
    /// delete keys. Returns `(before, after)`.
    ///
    /// # Errors
    ///
    /// `EditNotFound`, or `NoDataRecord` for kinds without a data record.
    pub fn apply_data_patch(&mut self, id: EditId, patch: &Data) -> Result<(Edit, Edit), InventoryError> {
        let (_, slot) = self.find_edit_mut(id).ok_or(InventoryError::EditNotFound(id))?;
        let before = slot.clone();
        let data = slot.kind.data_mut().ok_or(InventoryError::NoDataRecord(id))?;
        merge_data(data, patch, None);
        Ok((before, slot.clone()))
    }

    /// Apply `patch` to every selected device, writing only keys named in
    /// `changed`. All edits must be devices of one device type.
    ///
    /// # Errors
    ///
    /// `EmptySelection`, `EditNotFound`, `NotADevice`, or `MixedDeviceTypes`;
    /// nothing is modified on error.
    pub fn bulk_update(
        &mut self,
        ids: &[EditId],
        patch: &Data,
        changed: &BTreeSet<String>,
    ) -> Result<Vec<(Edit, Edit)>, InventoryError> {
        check_bulk_selection(self, ids)?;
        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            let (_, slot) = self.find_edit_mut(id).ok_or(InventoryError::EditNotFound(id))?;
            let before = slot.clone();
            if let Some(data) = slot.kind.data_mut() {
                merge_data(data, patch, Some(changed));
            }
            results.push((before, slot.clone()));
        }
        Ok(results)
    }

    /// Check the exclusivity and placement invariants.
    ///
    /// # Errors
    ///
    /// The first violation found.
    pub fn validate(&self) -> Result<(), InventoryError> {
        let mut seen = HashSet::new();
        for e in &self.pool {
            if !seen.insert(e.id()) {
                return Err(InventoryError::SharedOwnership(e.id()));
            }
            if e.frame.page_index.is_some() {
                return Err(InventoryError::PlacementMismatch(e.id()));
            }
        }
        for f in &self.floorplans {
            for e in &f.inventory {
                if !seen.insert(e.id()) {
                    return Err(InventoryError::SharedOwnership(e.id()));
                }
                if f.counts_as_placed(e) != f.placed_edit_ids.contains(&e.id()) {
                    return Err(InventoryError::PlacementMismatch(e.id()));
                }
            }
            if let Some(stray) = f.placed_edit_ids.iter().find(|id| f.position(**id).is_none()) {
                return Err(InventoryError::PlacementMismatch(*stray));
            }
        }
        Ok(())
    }
}

/// Verify a bulk-edit selection: non-empty, all devices, one device type.
///
/// # Errors
///
/// As for [`Project::bulk_update`].
pub fn check_bulk_selection(project: &Project, ids: &[EditId]) -> Result<DeviceType, InventoryError> {
    let mut types = BTreeSet::new();
    for &id in ids {
        let edit = project.find_edit(id).ok_or(InventoryError::EditNotFound(id))?;
        let device_type = edit.device_type().ok_or(InventoryError::NotADevice(id))?;
        types.insert(device_type);
    }
    match types.len() {
        0 => Err(InventoryError::EmptySelection),
        1 => types.into_iter().next().ok_or(InventoryError::EmptySelection),
        _ => Err(InventoryError::MixedDeviceTypes(types.into_iter().collect())),
    }
}

fn merge_data(data: &mut Data, patch: &Data, only: Option<&BTreeSet<String>>) {
    for (key, value) in patch {
        if only.is_some_and(|keys| !keys.contains(key)) {
            continue;
        }
        if value.is_null() {
            data.remove(key);
        } else {
            data.insert(key.clone(), value.clone());
        }
    }
}

/// Copy an edit under a fresh id, dropping attachments and optionally
/// appending `" (Copy)"` to its name/label.
#[must_use]
pub fn clone_edit(source: &Edit, rename: bool) -> Edit {
    let mut copy = source.clone();
    copy.frame.id = Uuid::new_v4();
    match &mut copy.kind {
        EditKind::Device(d) => {
            d.data.remove("images");
            if rename {
                let name = match Props::new(&d.data).name() {
                    "" => d.device_type.label().to_string(),
                    n => n.to_string(),
                };
                d.data.insert("name".into(), Value::String(format!("{name} (Copy)")));
            }
        }
        EditKind::Marker(m) => {
            m.data.remove("images");
            if rename {
                let label = match Props::new(&m.data).label() {
                    "" => m.marker_type.label().to_string(),
                    l => l.to_string(),
                };
                m.data.insert("label".into(), Value::String(format!("{label} (Copy)")));
            }
        }
        EditKind::Text(_) | EditKind::Drawing(_) | EditKind::Rectangle(_) | EditKind::Conduit(_) => {}
    }
    copy
}

/// Attachment ids referenced by `edits`.
#[must_use]
pub fn attachment_ids<'a>(edits: impl IntoIterator<Item = &'a Edit>) -> Vec<String> {
    edits
        .into_iter()
        .filter_map(|e| e.kind.data())
        .flat_map(|data| Props::new(data).image_ids().into_iter().map(str::to_string))
        .collect()
}
