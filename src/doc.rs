//! Document model: edits, their shared spatial frame, and per-kind payloads.
//!
//! Every annotation on a floorplan is an [`Edit`]: a [`Frame`] (id, page,
//! position, size, rotation) plus an [`EditKind`] payload. The kind is a closed
//! tagged enum so every mutation site can match exhaustively instead of
//! spreading untyped fields around. Device and marker payloads carry an
//! open-ended `data` object whose shape depends on the device type; [`Props`]
//! gives typed access to the common keys.
//!
//! The wire shape is flat camelCase JSON with a `kind` tag, e.g.
//! `{"id": "...", "pageIndex": 0, "x": 10.0, ..., "kind": "device",
//! "deviceType": "camera", "data": {...}}`.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{DEFAULT_ICON_SIZE, DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH};

/// Unique identifier for an edit.
pub type EditId = Uuid;

/// Open-ended per-type record carried by devices and markers.
pub type Data = Map<String, Value>;

// =============================================================================
// GEOMETRY
// =============================================================================

/// Axis-aligned rectangle in document units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Rectangle spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Whether the two rectangles overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }
}

/// Spatial frame shared by every edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Unique identifier for this edit.
    pub id: EditId,
    /// Page this edit is drawn on; `None` while unplaced.
    pub page_index: Option<u32>,
    /// Left edge in document units.
    pub x: f64,
    /// Top edge in document units.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees about the frame center.
    pub rotation: f64,
}

impl Frame {
    /// A new unplaced frame with a fresh id.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id: Uuid::new_v4(), page_index: None, x, y, width, height, rotation: 0.0 }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Axis-aligned bounds, ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect { x: self.x, y: self.y, width: self.width, height: self.height }
    }

    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.page_index.is_some()
    }
}

// =============================================================================
// KIND PAYLOADS
// =============================================================================

/// Physical device categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    AccessDoor,
    Camera,
    Elevator,
    Intercom,
    Turnstile,
    Miscellaneous,
}

impl DeviceType {
    pub const ALL: [DeviceType; 6] = [
        Self::AccessDoor,
        Self::Camera,
        Self::Elevator,
        Self::Intercom,
        Self::Turnstile,
        Self::Miscellaneous,
    ];

    /// Human-readable name used for default labels and audit text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AccessDoor => "Access Door",
            Self::Camera => "Camera",
            Self::Elevator => "Elevator",
            Self::Intercom => "Intercom",
            Self::Turnstile => "Turnstile",
            Self::Miscellaneous => "Miscellaneous",
        }
    }
}

/// Non-device marker categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    Note,
    Warning,
    Question,
    Issue,
    Pin,
    Flag,
    Star,
    Check,
    Cross,
}

impl MarkerType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Warning => "Warning",
            Self::Question => "Question",
            Self::Issue => "Issue",
            Self::Pin => "Pin",
            Self::Flag => "Flag",
            Self::Star => "Star",
            Self::Check => "Check",
            Self::Cross => "Cross",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEdit {
    pub device_type: DeviceType,
    #[serde(default)]
    pub data: Data,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerEdit {
    pub marker_type: MarkerType,
    #[serde(default)]
    pub data: Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Solid,
    Dashed,
    Dotted,
    Cloud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub text: String,
    pub font_size: f64,
    pub color: String,
    pub border: Option<BorderStyle>,
    pub border_color: String,
    pub border_width: f64,
    pub fill: Option<String>,
    pub padding: f64,
    #[serde(default)]
    pub align: HorizontalAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
}

impl Default for TextEdit {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 14.0,
            color: "#1F1A17".into(),
            border: None,
            border_color: "#1F1A17".into(),
            border_width: 1.0,
            fill: None,
            padding: 4.0,
            align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
        }
    }
}

/// Freehand stroke. `points` are offsets from the frame's top-left corner,
/// authored inside a `view_width × view_height` box and scaled to the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingEdit {
    pub points: Vec<Point>,
    pub view_width: f64,
    pub view_height: f64,
    pub stroke_color: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleEdit {
    pub stroke_color: String,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for RectangleEdit {
    fn default() -> Self {
        Self {
            stroke_color: "#D94B4B".into(),
            stroke_width: 2.0,
            stroke_opacity: 1.0,
            fill_color: "#D94B4B".into(),
            fill_opacity: 0.15,
        }
    }
}

/// Straight run along the frame diagonal.
///
/// Without flips the segment runs top-left → bottom-right; `flip_x` mirrors
/// it horizontally and `flip_y` vertically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConduitEdit {
    pub stroke_color: String,
    pub stroke_width: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
}

impl Default for ConduitEdit {
    fn default() -> Self {
        Self { stroke_color: "#2B6CB0".into(), stroke_width: 3.0, flip_x: false, flip_y: false }
    }
}

impl ConduitEdit {
    /// Segment endpoints for the given frame.
    #[must_use]
    pub fn endpoints(&self, frame: &Frame) -> (Point, Point) {
        let (x0, x1) = if self.flip_x { (frame.x + frame.width, frame.x) } else { (frame.x, frame.x + frame.width) };
        let (y0, y1) = if self.flip_y { (frame.y + frame.height, frame.y) } else { (frame.y, frame.y + frame.height) };
        (Point::new(x0, y0), Point::new(x1, y1))
    }
}

/// Kind-specific payload of an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditKind {
    Device(DeviceEdit),
    Marker(MarkerEdit),
    Text(TextEdit),
    Drawing(DrawingEdit),
    Rectangle(RectangleEdit),
    Conduit(ConduitEdit),
}

impl EditKind {
    /// Short kind name used in audit text.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Device(_) => "device",
            Self::Marker(_) => "marker",
            Self::Text(_) => "text",
            Self::Drawing(_) => "drawing",
            Self::Rectangle(_) => "rectangle",
            Self::Conduit(_) => "conduit",
        }
    }

    /// The open-ended data record, for kinds that carry one.
    #[must_use]
    pub fn data(&self) -> Option<&Data> {
        match self {
            Self::Device(d) => Some(&d.data),
            Self::Marker(m) => Some(&m.data),
            Self::Text(_) | Self::Drawing(_) | Self::Rectangle(_) | Self::Conduit(_) => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut Data> {
        match self {
            Self::Device(d) => Some(&mut d.data),
            Self::Marker(m) => Some(&mut m.data),
            Self::Text(_) | Self::Drawing(_) | Self::Rectangle(_) | Self::Conduit(_) => None,
        }
    }
}

// =============================================================================
// EDIT
// =============================================================================

/// One placeable annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    #[serde(flatten)]
    pub frame: Frame,
    #[serde(flatten)]
    pub kind: EditKind,
}

impl Edit {
    #[must_use]
    pub fn new(frame: Frame, kind: EditKind) -> Self {
        Self { frame, kind }
    }

    /// A device icon centred on `center`, with default camera FOV fields when applicable.
    #[must_use]
    pub fn device(device_type: DeviceType, center: Point, name: impl Into<String>) -> Self {
        let half = DEFAULT_ICON_SIZE / 2.0;
        let mut data = Data::new();
        data.insert("name".into(), Value::String(name.into()));
        if device_type == DeviceType::Camera {
            crate::fov::CameraFov::default().write_to(&mut data);
        }
        Self::new(
            Frame::new(center.x - half, center.y - half, DEFAULT_ICON_SIZE, DEFAULT_ICON_SIZE),
            EditKind::Device(DeviceEdit { device_type, data }),
        )
    }

    /// A marker icon centred on `center`.
    #[must_use]
    pub fn marker(marker_type: MarkerType, center: Point, label: impl Into<String>) -> Self {
        let half = DEFAULT_ICON_SIZE / 2.0;
        let mut data = Data::new();
        data.insert("label".into(), Value::String(label.into()));
        Self::new(
            Frame::new(center.x - half, center.y - half, DEFAULT_ICON_SIZE, DEFAULT_ICON_SIZE),
            EditKind::Marker(MarkerEdit { marker_type, data }),
        )
    }

    /// An empty text box with its top-left corner at `origin`.
    #[must_use]
    pub fn text(origin: Point) -> Self {
        Self::new(
            Frame::new(origin.x, origin.y, DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT),
            EditKind::Text(TextEdit::default()),
        )
    }

    #[must_use]
    pub fn id(&self) -> EditId {
        self.frame.id
    }

    /// Devices and markers render as square icons and resize 1:1.
    #[must_use]
    pub fn is_square_icon(&self) -> bool {
        matches!(self.kind, EditKind::Device(_) | EditKind::Marker(_))
    }

    #[must_use]
    pub fn device_type(&self) -> Option<DeviceType> {
        match &self.kind {
            EditKind::Device(d) => Some(d.device_type),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_camera(&self) -> bool {
        self.device_type() == Some(DeviceType::Camera)
    }

    /// Name used in audit descriptions and listings.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.kind {
            EditKind::Device(d) => {
                let name = Props::new(&d.data).name();
                if name.is_empty() { d.device_type.label().to_string() } else { name.to_string() }
            }
            EditKind::Marker(m) => {
                let label = Props::new(&m.data).label();
                if label.is_empty() { m.marker_type.label().to_string() } else { label.to_string() }
            }
            EditKind::Text(t) => {
                let first = t.text.lines().next().unwrap_or("").trim();
                if first.is_empty() {
                    "Text".to_string()
                } else if first.chars().count() > 24 {
                    format!("{}…", first.chars().take(24).collect::<String>())
                } else {
                    first.to_string()
                }
            }
            EditKind::Drawing(_) => "Drawing".to_string(),
            EditKind::Rectangle(_) => "Rectangle".to_string(),
            EditKind::Conduit(_) => "Conduit".to_string(),
        }
    }
}

// =============================================================================
// PROPS
// =============================================================================

/// Typed access to common keys of a device/marker `data` record.
pub struct Props<'a> {
    data: &'a Data,
}

impl<'a> Props<'a> {
    #[must_use]
    pub fn new(data: &'a Data) -> Self {
        Self { data }
    }

    fn str_field(&self, key: &str) -> &'a str {
        self.data.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Device name. Empty string when absent.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.str_field("name")
    }

    /// Marker label. Empty string when absent.
    #[must_use]
    pub fn label(&self) -> &'a str {
        self.str_field("label")
    }

    /// Installation location. Empty string when absent.
    #[must_use]
    pub fn location(&self) -> &'a str {
        self.str_field("location")
    }

    /// Attachment references (`images[].localId`).
    #[must_use]
    pub fn image_ids(&self) -> Vec<&'a str> {
        self.data
            .get("images")
            .and_then(Value::as_array)
            .map(|images| {
                images
                    .iter()
                    .filter_map(|img| img.get("localId").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Numeric field, if present and numeric.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }
}
