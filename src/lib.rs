//! Floorplan markup engine for physical-security device layouts.
//!
//! A project holds a pool of unplaced devices and any number of floorplans
//! (multi-page drawings). Users place cameras, access points, markers, text
//! and shapes onto floorplan pages; this crate owns the document model, the
//! pointer/keyboard state machine that edits it, undo/redo, and the audit
//! trail. Rendering and persistence belong to the host, which wires input
//! into [`engine::EngineCore`] and processes the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Input handling and the testable [`engine::EngineCore`] |
//! | [`store`] | Editor state root, transactional mutations, undo/redo |
//! | [`inventory`] | Projects, floorplans, the device pool and placement |
//! | [`command`] | Reversible commands and the bounded history |
//! | [`audit`] | Audit log entries and field-level change descriptions |
//! | [`doc`] | Edit types and their wire format |
//! | [`camera`] | Viewport pan/zoom and coordinate conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against edits and handles |
//! | [`manipulate`] | Move, resize and rotate geometry |
//! | [`draw`] | Drag-to-draw drafts for freehand, rectangle and conduit |
//! | [`fov`] | Camera field-of-view sectors and handle drags |
//! | [`attachments`] | Attachment blob storage seam |
//! | [`config`] | `SITEMARK_*` environment configuration |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod attachments;
pub mod audit;
pub mod camera;
pub mod command;
pub mod config;
pub mod consts;
pub mod doc;
pub mod draw;
pub mod engine;
pub mod fov;
pub mod hit;
pub mod input;
pub mod inventory;
pub mod manipulate;
pub mod store;
