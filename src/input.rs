//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the active gesture tracked between pointer-down and
//! pointer-up; it carries the originals and the live preview so a gesture can
//! be committed as one command or abandoned without touching the document.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{DeviceType, Edit, EditId, MarkerType};
use crate::draw::{Draft, ShapeTool};
use crate::fov::FovHandle;
use crate::manipulate::Corner;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Click to place a device icon.
    Device(DeviceType),
    /// Click to place a marker icon.
    Marker(MarkerType),
    /// Click to create a text box.
    Text,
    /// Drag out a freehand stroke, rectangle, or conduit.
    Shape(ShapeTool),
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key; treated like ctrl for shortcuts.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key name as reported by the host (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Previous pointer-down on an edit, for double-click detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastClick {
    pub id: EditId,
    pub time_ms: u64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    /// Selected edit ids in selection order.
    pub selection: Vec<EditId>,
    /// Zero-based page of the active floorplan being viewed.
    pub page: u32,
    pub last_click: Option<LastClick>,
}

impl UiState {
    #[must_use]
    pub fn is_selected(&self, id: EditId) -> bool {
        self.selection.contains(&id)
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: EditId) {
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
    }
}

/// What a drag gesture is doing to its edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOp {
    Move,
    Resize(Corner),
    Fov(FovHandle),
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Panning the viewport with the middle button or on empty space.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Moving, resizing, or re-aiming selected edits.
    Dragging {
        op: DragOp,
        /// Document point of the pointer-down.
        start_doc: Point,
        /// Screen point of the pointer-down, for the click threshold.
        start_screen: Point,
        /// Edits as they were at pointer-down.
        originals: Vec<Edit>,
        /// Edits as they would be if released now.
        preview: Vec<Edit>,
        /// Whether the pointer has left the click threshold.
        moved: bool,
    },
    /// Drawing a new shape.
    Drawing(Draft),
    /// Rubber-band selection.
    MarqueeSelecting {
        anchor_doc: Point,
        current_doc: Point,
        /// Shift-marquee adds to `base_selection` instead of replacing it.
        additive: bool,
        base_selection: Vec<EditId>,
    },
    /// A text edit is open for in-place editing.
    EditingText {
        id: EditId,
        original: Edit,
    },
}

impl InputState {
    /// Edits the renderer should draw in place of their stored versions.
    #[must_use]
    pub fn preview_edits(&self) -> Vec<Edit> {
        match self {
            Self::Dragging { preview, .. } => preview.clone(),
            Self::Drawing(draft) => vec![draft.preview()],
            Self::Idle | Self::Panning { .. } | Self::MarqueeSelecting { .. } | Self::EditingText { .. } => Vec::new(),
        }
    }
}
