//! # Slint Diagram Sync
//!
//! Editor state for node/link diagrams with dynamic ports, kept in sync with
//! a diagram widget that does the drawing.
//!
//! The widget (layout, rendering, hit-testing, undo/redo) sits behind the
//! [`DiagramWidget`] trait. This crate owns everything on the other side of
//! that boundary: the authoritative node and link lists, model flags, the
//! selection, and the bookkeeping that stops changes which came *from* the
//! widget from being echoed straight back into it.
//!
//! ## Core Components
//!
//! - [`EditorStore`] - Authoritative state and one entry point per UI intent
//! - [`KeyIndex`] - Key → list position lookup, rebuilt on structural change
//! - [`IncrementalDelta`] - Batched widget changes (JSON compatible)
//! - [`DiagramSurface`] - Mounts a widget, mirrors state into it, drains its changes
//! - [`SlintDiagramWidget`] - Widget model that keeps bound Slint `VecModel`s in step
//! - [`ControlPanel`] - Relink checkbox and add-port buttons
//! - [`DiagramEditorController`] - Shared handle producing Slint-style callbacks
//!
//! ## Key convention
//!
//! Node keys are non-negative and link keys are negative. The widget's key
//! generators uphold this, and [`RecordKind::of_key`] is where it is decoded.

pub mod controller;
pub mod delta;
pub mod key_index;
pub mod panel;
pub mod records;
pub mod settings;
pub mod store;
pub mod surface;
pub mod widget;

pub use controller::DiagramEditorController;
pub use delta::{DeltaError, IncrementalDelta};
pub use key_index::KeyIndex;
pub use panel::{ControlPanel, PanelIntent, PanelOutcome};
pub use records::{
    Key, Keyed, LinkRecord, Location, LocationParseError, ModelData, NodeRecord, PortRecord,
    PortSide, RecordKind,
};
pub use settings::{demo_nodes, EditorSettings};
pub use store::{EditError, EditorStore, SelectedData, SelectedRef, Selection, StoreSnapshot};
pub use surface::{DiagramSurface, DiagramWidget, ListenerId, SelectionListener, SyncOutcome};
pub use widget::{port_rows, LinkItem, NodeItem, PortItem, SlintDiagramWidget, WidgetError};
