//! Shared numeric constants for the markup engine.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width/height any edit may have after a resize, in document units.
pub const MIN_EDIT_SIZE: f64 = 10.0;

/// Default side length of a freshly placed device or marker icon.
pub const DEFAULT_ICON_SIZE: f64 = 24.0;

/// Default text box size for the text tool.
pub const DEFAULT_TEXT_WIDTH: f64 = 160.0;
pub const DEFAULT_TEXT_HEIGHT: f64 = 40.0;

// ── Viewport ────────────────────────────────────────────────────

/// Multiplicative zoom change per discrete wheel step.
pub const ZOOM_STEP: f64 = 1.1;

pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 20.0;

/// Share of the viewport a page occupies after fit-to-page.
pub const FIT_MARGIN: f64 = 0.95;

// ── Interaction ─────────────────────────────────────────────────

/// Screen-pixel displacement below which a gesture counts as a click.
pub const CLICK_THRESHOLD_PX: f64 = 5.0;

/// Two pointer-downs on the same edit within this window are a double click.
pub const DOUBLE_CLICK_MS: u64 = 300;

/// Screen-space hit slop in pixels for resize and FOV handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Arrow-key nudge distances in document units.
pub const NUDGE_STEP: f64 = 1.0;
pub const NUDGE_STEP_LARGE: f64 = 10.0;

// ── Inventory ───────────────────────────────────────────────────

/// Offset applied to duplicated edits so the copy is visible.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Maximum number of commands retained on the undo stack.
pub const HISTORY_LIMIT: usize = 100;

// ── Camera field of view ────────────────────────────────────────

pub const DEFAULT_FOV_ANGLE: f64 = 90.0;
pub const DEFAULT_FOV_DISTANCE: f64 = 100.0;
pub const DEFAULT_FOV_ROTATION: f64 = -90.0;

/// Largest cone angle; 360 would collapse the arc's start and end points.
pub const MAX_FOV_ANGLE: f64 = 359.9;
