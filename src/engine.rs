//! Interaction engine: turns pointer, wheel, and keyboard input into store
//! operations and returns [`Action`]s for the host to process.
//!
//! DESIGN
//! ======
//! `EngineCore` owns the [`Store`] (constructor-injected), the [`Viewport`],
//! the persistent [`UiState`], and the in-flight [`InputState`]. Gestures
//! never touch the store while in progress: drags and drafts live in the
//! input state and are surfaced through [`EngineCore::display_edits`]. On
//! release a gesture commits at most one store operation, so one gesture is
//! one undo step.
//!
//! Rejections (bad selection, invalid page, store errors) surface as
//! [`Action::Notice`] and leave state unchanged.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::BTreeSet;

use serde_json::Value;

use crate::camera::{Point, Viewport};
use crate::config::EditorConfig;
use crate::consts::{NUDGE_STEP, NUDGE_STEP_LARGE};
use crate::doc::{Data, DeviceType, Edit, EditId, EditKind, Rect};
use crate::draw::Draft;
use crate::fov::CameraFov;
use crate::hit::{Hit, HitPart, hit_test, marquee_hits};
use crate::input::{Button, DragOp, InputState, Key, LastClick, Modifiers, Tool, UiState, WheelDelta};
use crate::inventory::FloorplanId;
use crate::manipulate::{resize, rotate, translate};
use crate::store::Store;

/// Detail editor the host should open.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorRequest {
    Device(EditId),
    Marker(EditId),
    Text(EditId),
    /// Bulk form over same-type devices, pre-filled with shared values.
    Bulk { device_type: DeviceType, ids: Vec<EditId>, common: Data },
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SelectionChanged(Vec<EditId>),
    EditsCreated(Vec<EditId>),
    EditsUpdated(Vec<EditId>),
    EditsDeleted(Vec<EditId>),
    OpenEditor(EditorRequest),
    /// User-visible rejection or status message.
    Notice(String),
    /// Attachment ids no longer referenced; purge them from attachment storage.
    PurgeAttachments(Vec<String>),
}

/// A text edit whose editor lost focus to another gesture before the host
/// reported the final text.
#[derive(Debug, Clone)]
pub struct SuspendedText {
    pub id: EditId,
    pub original: Edit,
}

/// Core engine state.
pub struct EngineCore {
    pub store: Store,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    /// Set when a pointer-down or switch interrupts in-place text editing;
    /// the next `commit_text_edit` or `cancel_text_edit` resolves it.
    pub suspended_text: Option<SuspendedText>,
    pub config: EditorConfig,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl EngineCore {
    #[must_use]
    pub fn new(store: Store, config: EditorConfig) -> Self {
        Self {
            store,
            viewport: Viewport::default(),
            ui: UiState::default(),
            input: InputState::default(),
            suspended_text: None,
            config,
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &[EditId] {
        &self.ui.selection
    }

    /// An edit of the active project by id.
    #[must_use]
    pub fn edit(&self, id: EditId) -> Option<&Edit> {
        self.store.active_project()?.find_edit(id)
    }

    /// Placed edits on the current page, in draw order.
    fn page_edits(&self) -> Vec<&Edit> {
        self.store.active_floorplan().map(|f| f.edits_on_page(self.ui.page)).unwrap_or_default()
    }

    fn selected_on_page(&self) -> Vec<Edit> {
        self.page_edits().into_iter().filter(|e| self.ui.is_selected(e.id())).cloned().collect()
    }

    /// Edits to draw on `page` in draw order, with in-flight previews
    /// substituted for their stored versions and any draft appended.
    #[must_use]
    pub fn display_edits(&self, page: u32) -> Vec<Edit> {
        let Some(floorplan) = self.store.active_floorplan() else {
            return Vec::new();
        };
        let previews = self.input.preview_edits();
        let mut out: Vec<Edit> = floorplan
            .edits_on_page(page)
            .into_iter()
            .map(|e| previews.iter().find(|p| p.id() == e.id()).unwrap_or(e).clone())
            .collect();
        if let InputState::Drawing(draft) = &self.input {
            if draft.page == page {
                out.push(draft.preview());
            }
        }
        out
    }

    /// FOV sector paths for cameras on `page`, preview-aware.
    #[must_use]
    pub fn fov_paths(&self, page: u32) -> Vec<(EditId, String)> {
        self.display_edits(page)
            .iter()
            .filter_map(|e| CameraFov::of(e).map(|fov| (e.id(), fov.sector_path(e.frame.center()))))
            .collect()
    }

    /// The live marquee rectangle in document units, if one is being dragged.
    #[must_use]
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.input {
            InputState::MarqueeSelecting { anchor_doc, current_doc, .. } => {
                Some(Rect::from_corners(*anchor_doc, *current_doc))
            }
            _ => None,
        }
    }

    // --- Tool, page & viewport ---

    /// Switch tools, abandoning any uncommitted gesture.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let abandoned = self.abandon_gesture();
        self.ui.tool = tool;
        if abandoned { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    /// View another page of the active floorplan.
    pub fn set_page(&mut self, page: u32) -> Vec<Action> {
        let Some(floorplan) = self.store.active_floorplan() else {
            return notice("No floorplan is open");
        };
        if !floorplan.is_valid_page(page) {
            return notice(format!("Page {} does not exist", page + 1));
        }
        self.abandon_gesture();
        self.ui.page = page;
        self.ui.last_click = None;
        self.ui.selection.clear();
        vec![Action::SelectionChanged(Vec::new()), Action::RenderNeeded]
    }

    /// Open another floorplan of the active project.
    pub fn select_floorplan(&mut self, id: FloorplanId) -> Vec<Action> {
        if let Err(e) = self.store.select_floorplan(id) {
            return notice(e);
        }
        self.abandon_gesture();
        self.suspended_text = None;
        self.ui.page = 0;
        self.ui.last_click = None;
        self.ui.selection.clear();
        vec![Action::SelectionChanged(Vec::new()), Action::RenderNeeded]
    }

    /// Record the container's size and on-screen origin.
    pub fn set_viewport(&mut self, width: f64, height: f64, origin_x: f64, origin_y: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.viewport.set_origin(origin_x, origin_y);
    }

    /// Fit a page of the given size into the container.
    pub fn fit_to_page(&mut self, page_w: f64, page_h: f64) -> Vec<Action> {
        self.viewport.fit_to_page(page_w, page_h, self.viewport_width, self.viewport_height, &self.config.zoom);
        vec![Action::RenderNeeded]
    }

    /// Drop any in-flight gesture. Returns whether there was one.
    ///
    /// An open text edit is suspended rather than dropped so the host's
    /// blur commit still lands.
    fn abandon_gesture(&mut self) -> bool {
        match std::mem::take(&mut self.input) {
            InputState::Idle => false,
            InputState::EditingText { id, original } => {
                self.suspended_text = Some(SuspendedText { id, original });
                true
            }
            _ => true,
        }
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers, time_ms: u64) -> Vec<Action> {
        if matches!(self.input, InputState::EditingText { .. }) {
            self.abandon_gesture();
        }
        match button {
            Button::Middle => {
                self.input = InputState::Panning { last_screen: screen };
                return Vec::new();
            }
            Button::Secondary => return Vec::new(),
            Button::Primary => {}
        }
        if !matches!(self.input, InputState::Idle) {
            return Vec::new();
        }

        let doc = self.viewport.screen_to_doc(screen);
        let hit = hit_test(doc, &self.page_edits(), &self.ui.selection, self.viewport.zoom);
        match hit {
            Some(hit) => self.down_on_edit(hit, screen, doc, modifiers, time_ms),
            None => self.down_on_background(screen, doc, modifiers),
        }
    }

    fn down_on_edit(&mut self, hit: Hit, screen: Point, doc: Point, modifiers: Modifiers, time_ms: u64) -> Vec<Action> {
        let id = hit.edit_id;
        let double = self
            .ui
            .last_click
            .is_some_and(|c| c.id == id && time_ms.saturating_sub(c.time_ms) <= self.config.double_click_ms);
        if double {
            self.ui.last_click = None;
            return self.open_detail_editor(id);
        }
        self.ui.last_click = Some(LastClick { id, time_ms });

        if hit.part == HitPart::Body && (modifiers.shift || modifiers.command()) {
            self.ui.toggle(id);
            return vec![Action::SelectionChanged(self.ui.selection.clone()), Action::RenderNeeded];
        }

        let mut actions = Vec::new();
        let op = match hit.part {
            HitPart::Body => {
                if !self.ui.is_selected(id) {
                    self.ui.selection = vec![id];
                    actions.push(Action::SelectionChanged(self.ui.selection.clone()));
                }
                DragOp::Move
            }
            HitPart::Resize(corner) => DragOp::Resize(corner),
            HitPart::Fov(handle) => DragOp::Fov(handle),
        };
        let originals: Vec<Edit> = match op {
            DragOp::Move => self.selected_on_page(),
            DragOp::Resize(_) | DragOp::Fov(_) => self.edit(id).cloned().into_iter().collect(),
        };
        self.input = InputState::Dragging {
            op,
            start_doc: doc,
            start_screen: screen,
            preview: originals.clone(),
            originals,
            moved: false,
        };
        actions
    }

    fn down_on_background(&mut self, screen: Point, doc: Point, modifiers: Modifiers) -> Vec<Action> {
        self.ui.last_click = None;
        match self.ui.tool {
            Tool::Select => {
                let additive = modifiers.shift || modifiers.command();
                let base_selection = if additive { self.ui.selection.clone() } else { Vec::new() };
                self.input = InputState::MarqueeSelecting { anchor_doc: doc, current_doc: doc, additive, base_selection };
                Vec::new()
            }
            Tool::Shape(shape) => {
                self.input = InputState::Drawing(Draft::begin(shape, self.ui.page, doc, screen));
                vec![Action::RenderNeeded]
            }
            Tool::Device(device_type) => {
                let name = self.store.next_device_name(device_type);
                self.commit_created(Edit::device(device_type, doc, name)).1
            }
            Tool::Marker(marker_type) => self.commit_created(Edit::marker(marker_type, doc, marker_type.label())).1,
            Tool::Text => {
                let (created, mut actions) = self.commit_created(Edit::text(doc));
                if let Some(edit) = created {
                    let id = edit.id();
                    self.input = InputState::EditingText { id, original: edit };
                    actions.push(Action::OpenEditor(EditorRequest::Text(id)));
                }
                actions
            }
        }
    }

    fn open_detail_editor(&mut self, id: EditId) -> Vec<Action> {
        let Some(edit) = self.edit(id).cloned() else {
            return Vec::new();
        };
        self.ui.selection = vec![id];
        let mut actions = vec![Action::SelectionChanged(vec![id])];
        match &edit.kind {
            EditKind::Device(_) => actions.push(Action::OpenEditor(EditorRequest::Device(id))),
            EditKind::Marker(_) => actions.push(Action::OpenEditor(EditorRequest::Marker(id))),
            EditKind::Text(_) => {
                self.input = InputState::EditingText { id, original: edit };
                actions.push(Action::OpenEditor(EditorRequest::Text(id)));
            }
            EditKind::Drawing(_) | EditKind::Rectangle(_) | EditKind::Conduit(_) => {}
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        let doc = self.viewport.screen_to_doc(screen);
        let threshold = self.config.click_threshold_px;
        match &mut self.input {
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen.x - last_screen.x, screen.y - last_screen.y);
                *last_screen = screen;
                self.viewport.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::Dragging { op, start_doc, start_screen, originals, preview, moved } => {
                *moved |= screen.distance_to(*start_screen) >= threshold;
                if !*moved {
                    return Vec::new();
                }
                let (dx, dy) = (doc.x - start_doc.x, doc.y - start_doc.y);
                *preview = originals.iter().map(|o| drag_preview(*op, o, dx, dy, doc)).collect();
                vec![Action::RenderNeeded]
            }
            InputState::Drawing(draft) => {
                draft.extend(doc, screen);
                vec![Action::RenderNeeded]
            }
            InputState::MarqueeSelecting { current_doc, .. } => {
                *current_doc = doc;
                vec![Action::RenderNeeded]
            }
            InputState::Idle | InputState::EditingText { .. } => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let doc = self.viewport.screen_to_doc(screen);
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => Vec::new(),
            editing @ InputState::EditingText { .. } => {
                self.input = editing;
                Vec::new()
            }
            InputState::Dragging { originals, preview, moved, .. } => {
                if !moved || preview == originals {
                    return vec![Action::RenderNeeded];
                }
                self.apply_updates(preview)
            }
            InputState::Drawing(mut draft) => {
                if draft.current != doc {
                    draft.extend(doc, screen);
                }
                match draft.finish(self.config.click_threshold_px) {
                    Some(edit) => self.commit_created(edit).1,
                    None => vec![Action::RenderNeeded],
                }
            }
            InputState::MarqueeSelecting { anchor_doc, additive, base_selection, .. } => {
                self.finish_marquee(Rect::from_corners(anchor_doc, doc), additive, base_selection)
            }
        }
    }

    fn finish_marquee(&mut self, rect: Rect, additive: bool, base_selection: Vec<EditId>) -> Vec<Action> {
        let zoom = self.viewport.zoom;
        let threshold = self.config.click_threshold_px;
        let tiny = rect.width * zoom < threshold && rect.height * zoom < threshold;
        if tiny {
            if additive {
                return vec![Action::RenderNeeded];
            }
            self.ui.selection.clear();
        } else {
            let hits = marquee_hits(&rect, &self.page_edits());
            let mut selection = base_selection;
            for id in hits {
                if !selection.contains(&id) {
                    selection.push(id);
                }
            }
            self.ui.selection = selection;
        }
        vec![Action::SelectionChanged(self.ui.selection.clone()), Action::RenderNeeded]
    }

    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        let steps = if delta.dy < 0.0 {
            1
        } else if delta.dy > 0.0 {
            -1
        } else {
            return Vec::new();
        };
        if self.viewport.zoom_at(screen, steps, &self.config.zoom) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        if matches!(self.input, InputState::EditingText { .. }) {
            return if key.0 == "Escape" { self.cancel_text_edit() } else { Vec::new() };
        }
        if modifiers.command() {
            return match key.0.to_ascii_lowercase().as_str() {
                "z" if modifiers.shift => self.redo(),
                "z" => self.undo(),
                "y" => self.redo(),
                "d" => self.duplicate(),
                _ => Vec::new(),
            };
        }
        let step = if modifiers.shift { NUDGE_STEP_LARGE } else { NUDGE_STEP };
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selection(),
            "Escape" => self.escape(),
            "ArrowLeft" => self.nudge(-step, 0.0),
            "ArrowRight" => self.nudge(step, 0.0),
            "ArrowUp" => self.nudge(0.0, -step),
            "ArrowDown" => self.nudge(0.0, step),
            _ => Vec::new(),
        }
    }

    /// Cancel the gesture in progress, or clear the selection when idle.
    fn escape(&mut self) -> Vec<Action> {
        if self.abandon_gesture() {
            return vec![Action::RenderNeeded];
        }
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        self.ui.selection.clear();
        vec![Action::SelectionChanged(Vec::new()), Action::RenderNeeded]
    }

    // --- Text editing ---

    /// Finish in-place text editing. Commits only if the text changed.
    ///
    /// A suspended edit is resolved before the live one: the host reports
    /// the blur of the old editor after the pointer-down that opened a new one.
    pub fn commit_text_edit(&mut self, text: &str) -> Vec<Action> {
        let SuspendedText { id, original } = match self.suspended_text.take() {
            Some(suspended) => suspended,
            None => match std::mem::take(&mut self.input) {
                InputState::EditingText { id, original } => SuspendedText { id, original },
                other => {
                    self.input = other;
                    return notice("No text is being edited");
                }
            },
        };
        let unchanged = match &original.kind {
            EditKind::Text(before) => before.text == text,
            _ => true,
        };
        if unchanged {
            return vec![Action::RenderNeeded];
        }

        let Some(mut edit) = self.edit(id).cloned() else {
            tracing::warn!(edit_id = %id, "text edit target vanished");
            return Vec::new();
        };
        if let EditKind::Text(t) = &mut edit.kind {
            t.text = text.to_string();
        }
        self.apply_updates(vec![edit])
    }

    pub fn cancel_text_edit(&mut self) -> Vec<Action> {
        if self.suspended_text.take().is_some() {
            return vec![Action::RenderNeeded];
        }
        if matches!(self.input, InputState::EditingText { .. }) {
            self.input = InputState::Idle;
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    // --- Selection commands ---

    /// Move every selected edit by a document-space offset as one step.
    pub fn nudge(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let moved: Vec<Edit> = self
            .selected_on_page()
            .into_iter()
            .map(|mut e| {
                e.frame = translate(&e.frame, dx, dy);
                e
            })
            .collect();
        self.apply_updates(moved)
    }

    /// Rotate every selected edit about its own center as one step.
    pub fn rotate_selection(&mut self, delta: f64) -> Vec<Action> {
        let rotated: Vec<Edit> = self
            .selected_on_page()
            .into_iter()
            .map(|mut e| {
                e.frame = rotate(&e.frame, delta);
                e
            })
            .collect();
        self.apply_updates(rotated)
    }

    /// Apply style-panel fields (colors, stroke, font, alignment) to the
    /// single selected edit.
    pub fn apply_style(&mut self, patch: &Data) -> Vec<Action> {
        let &[id] = self.ui.selection.as_slice() else {
            return notice("Select exactly one item to change its style");
        };
        let Some(edit) = self.edit(id).cloned() else {
            return Vec::new();
        };
        match restyle(&edit, patch) {
            Ok(next) => self.apply_updates(vec![next]),
            Err(e) => notice(format!("Invalid style: {e}")),
        }
    }

    pub fn duplicate(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        let selection = self.ui.selection.clone();
        match self.store.duplicate(&selection, self.config.duplicate_offset) {
            Ok(copies) => {
                let ids: Vec<EditId> = copies.iter().map(Edit::id).collect();
                self.ui.selection.clone_from(&ids);
                vec![Action::EditsCreated(ids.clone()), Action::SelectionChanged(ids), Action::RenderNeeded]
            }
            Err(e) => notice(e),
        }
    }

    pub fn delete_selection(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        self.abandon_gesture();
        let selection = std::mem::take(&mut self.ui.selection);
        match self.store.delete(&selection) {
            Ok(orphaned) => {
                let mut actions = vec![Action::EditsDeleted(selection), Action::SelectionChanged(Vec::new())];
                if !orphaned.is_empty() {
                    actions.push(Action::PurgeAttachments(orphaned));
                }
                actions.push(Action::RenderNeeded);
                actions
            }
            Err(e) => {
                self.ui.selection = selection;
                notice(e)
            }
        }
    }

    pub fn bring_to_front(&mut self) -> Vec<Action> {
        let selection = self.ui.selection.clone();
        match self.store.bring_to_front(&selection) {
            Ok(()) => vec![Action::RenderNeeded],
            Err(e) => notice(e),
        }
    }

    pub fn send_to_back(&mut self) -> Vec<Action> {
        let selection = self.ui.selection.clone();
        match self.store.send_to_back(&selection) {
            Ok(()) => vec![Action::RenderNeeded],
            Err(e) => notice(e),
        }
    }

    // --- Detail & bulk editors ---

    /// Open the bulk editor for the current selection (same-type devices only).
    pub fn open_bulk_edit(&mut self) -> Vec<Action> {
        match self.store.bulk_common_fields(&self.ui.selection) {
            Ok((device_type, common)) => vec![Action::OpenEditor(EditorRequest::Bulk {
                device_type,
                ids: self.ui.selection.clone(),
                common,
            })],
            Err(e) => notice(e),
        }
    }

    /// Apply a bulk-editor submission; only keys in `changed` are written.
    pub fn bulk_edit(&mut self, patch: &Data, changed: &BTreeSet<String>) -> Vec<Action> {
        let selection = self.ui.selection.clone();
        match self.store.bulk_update(&selection, patch, changed) {
            Ok(0) => Vec::new(),
            Ok(_) => vec![Action::EditsUpdated(selection), Action::RenderNeeded],
            Err(e) => notice(e),
        }
    }

    /// Apply a single-edit detail-editor submission.
    pub fn apply_detail_patch(&mut self, id: EditId, patch: &Data) -> Vec<Action> {
        match self.store.apply_data_patch(id, patch) {
            Ok(()) => vec![Action::EditsUpdated(vec![id]), Action::RenderNeeded],
            Err(e) => notice(e),
        }
    }

    // --- History ---

    pub fn undo(&mut self) -> Vec<Action> {
        self.abandon_gesture();
        match self.store.undo() {
            Ok(Some(_)) => self.after_replay(),
            Ok(None) => Vec::new(),
            Err(e) => notice(e),
        }
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.abandon_gesture();
        match self.store.redo() {
            Ok(Some(_)) => self.after_replay(),
            Ok(None) => Vec::new(),
            Err(e) => notice(e),
        }
    }

    fn after_replay(&mut self) -> Vec<Action> {
        let before = self.ui.selection.len();
        let live: Vec<EditId> = self.page_edits().iter().map(|e| e.id()).collect();
        self.ui.selection.retain(|id| live.contains(id));
        let mut actions = Vec::new();
        if self.ui.selection.len() != before {
            actions.push(Action::SelectionChanged(self.ui.selection.clone()));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Commit helpers ---

    /// Create one placed edit on the current page and select it.
    fn commit_created(&mut self, mut edit: Edit) -> (Option<Edit>, Vec<Action>) {
        edit.frame.page_index = Some(self.ui.page);
        match self.store.create_edits(vec![edit]) {
            Ok(created) => {
                let ids: Vec<EditId> = created.iter().map(Edit::id).collect();
                self.ui.selection.clone_from(&ids);
                let actions =
                    vec![Action::EditsCreated(ids.clone()), Action::SelectionChanged(ids), Action::RenderNeeded];
                (created.into_iter().next(), actions)
            }
            Err(e) => (None, notice(e)),
        }
    }

    fn apply_updates(&mut self, edits: Vec<Edit>) -> Vec<Action> {
        if edits.is_empty() {
            return Vec::new();
        }
        let ids: Vec<EditId> = edits.iter().map(Edit::id).collect();
        match self.store.update_edits(&edits) {
            Ok(0) => vec![Action::RenderNeeded],
            Ok(_) => vec![Action::EditsUpdated(ids), Action::RenderNeeded],
            Err(e) => notice(e),
        }
    }
}

fn notice(message: impl std::fmt::Display) -> Vec<Action> {
    tracing::warn!(%message, "operation rejected");
    vec![Action::Notice(message.to_string())]
}

/// The edit `orig` would become with the pointer at `cursor`, having moved
/// `(dx, dy)` document units since pointer-down.
fn drag_preview(op: DragOp, orig: &Edit, dx: f64, dy: f64, cursor: Point) -> Edit {
    let mut edit = orig.clone();
    match op {
        DragOp::Move => edit.frame = translate(&orig.frame, dx, dy),
        DragOp::Resize(corner) => {
            let (lx, ly) = rotate_vector(dx, dy, -orig.frame.rotation);
            edit.frame = resize(&orig.frame, corner, lx, ly, orig.is_square_icon());
        }
        DragOp::Fov(handle) => {
            if let Some(fov) = CameraFov::of(orig) {
                let next = fov.drag(handle, orig.frame.center(), cursor);
                if let Some(data) = edit.kind.data_mut() {
                    next.write_to(data);
                }
            }
        }
    }
    edit
}

fn rotate_vector(dx: f64, dy: f64, degrees: f64) -> (f64, f64) {
    if degrees == 0.0 {
        return (dx, dy);
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    (dx * cos - dy * sin, dx * sin + dy * cos)
}

/// Merge style fields into the kind payload. `kind` and `data` cannot be
/// changed this way.
fn restyle(edit: &Edit, patch: &Data) -> Result<Edit, serde_json::Error> {
    let mut value = serde_json::to_value(&edit.kind)?;
    if let Value::Object(fields) = &mut value {
        for (key, v) in patch {
            if key != "kind" && key != "data" {
                fields.insert(key.clone(), v.clone());
            }
        }
    }
    Ok(Edit::new(edit.frame, serde_json::from_value(value)?))
}
