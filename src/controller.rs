//! High-level controller for diagram editor applications.
//!
//! [`DiagramEditorController`] ties the store, the surface adapter and the
//! control panel together and hands out closures shaped like Slint
//! callbacks, so a window can be wired up in a few lines.
//!
//! # Example
//!
//! ```ignore
//! use slint_diagram_sync::{port_rows, DiagramEditorController, EditorStore, PortSide, SlintDiagramWidget};
//! use slint::{ModelRc, VecModel};
//! use std::rc::Rc;
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = DiagramEditorController::new(EditorStore::default(), SlintDiagramWidget::new());
//!     ctrl.mount();
//!
//!     // Bind the widget's rows to the window's generated structs
//!     let nodes = Rc::new(VecModel::<NodeData>::default());
//!     ctrl.surface().borrow_mut().widget_mut().bind_node_model(nodes.clone(), |node| {
//!         let ports = |side| port_rows(node.ports(side), |port_id, color| PortData { port_id, color });
//!         NodeData {
//!             key: node.key,
//!             label: node.label.as_str().into(),
//!             x: node.location.x as f32,
//!             y: node.location.y as f32,
//!             left_ports: ports(PortSide::Left),
//!             right_ports: ports(PortSide::Right),
//!             ..Default::default()
//!         }
//!     });
//!     window.set_nodes(ModelRc::from(nodes));
//!
//!     // Control panel
//!     window.on_relink_toggled(ctrl.relink_toggled_callback());
//!     window.on_add_port(ctrl.add_port_callback());
//!     window.on_field_edited(ctrl.field_edited_callback());
//!
//!     // Diagram gestures
//!     window.on_node_moved({
//!         let ctrl = ctrl.clone();
//!         move |key, x, y| {
//!             let moved = ctrl.surface().borrow_mut().widget_mut().move_node(key, x.into(), y.into());
//!             if moved.is_ok() {
//!                 ctrl.pump();
//!             }
//!         }
//!     });
//!
//!     ctrl.render();
//!     window.run().unwrap();
//! }
//! ```

use crate::panel::{ControlPanel, PanelIntent, PanelOutcome};
use crate::records::PortSide;
use crate::store::{EditError, EditorStore};
use crate::surface::{DiagramSurface, DiagramWidget, SyncOutcome};
use slint::SharedString;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

/// Controller that owns the editor state and the widget adapter.
///
/// Clone this controller to share it across callbacks.
pub struct DiagramEditorController<W> {
    store: Rc<RefCell<EditorStore>>,
    surface: Rc<RefCell<DiagramSurface<W>>>,
    panel: ControlPanel,
}

impl<W> Clone for DiagramEditorController<W> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            surface: self.surface.clone(),
            panel: self.panel,
        }
    }
}

impl<W: DiagramWidget + 'static> DiagramEditorController<W> {
    pub fn new(store: EditorStore, widget: W) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
            surface: Rc::new(RefCell::new(DiagramSurface::new(widget))),
            panel: ControlPanel::new(),
        }
    }

    pub fn store(&self) -> Rc<RefCell<EditorStore>> {
        self.store.clone()
    }

    pub fn surface(&self) -> Rc<RefCell<DiagramSurface<W>>> {
        self.surface.clone()
    }

    pub fn panel(&self) -> ControlPanel {
        self.panel
    }

    /// Register the widget's selection listener.
    pub fn mount(&self) {
        self.surface.borrow_mut().mount(&self.store);
    }

    /// Remove the widget's selection listener.
    pub fn unmount(&self) -> bool {
        self.surface.borrow_mut().unmount()
    }

    /// Push store state into the widget unless it already has it.
    pub fn render(&self) -> SyncOutcome {
        let store = self.store.borrow();
        self.surface.borrow_mut().sync(&store)
    }

    /// Apply the widget's pending changes, then render.
    pub fn pump(&self) -> SyncOutcome {
        {
            let mut store = self.store.borrow_mut();
            self.surface.borrow_mut().drain_changes(&mut store);
        }
        self.render()
    }

    /// Dispatch a panel intent and render.
    pub fn dispatch(&self, intent: PanelIntent) -> PanelOutcome {
        let outcome = self.panel.dispatch(intent, &mut self.store.borrow_mut());
        self.render();
        outcome
    }

    /// Apply an inspector edit and render.
    pub fn edit_field(&self, path: &str, value: &str, commit: bool) -> Result<(), EditError> {
        self.store.borrow_mut().apply_field_edit(path, value, commit)?;
        self.render();
        Ok(())
    }

    // === Callback factories ===

    /// Returns a callback for the relink checkbox.
    pub fn relink_toggled_callback(&self) -> impl Fn(bool) {
        let ctrl = self.clone();
        move |checked| {
            ctrl.dispatch(PanelIntent::ToggleRelink(checked));
        }
    }

    /// Returns a callback for the add-port buttons, taking the side tag.
    pub fn add_port_callback(&self) -> impl Fn(SharedString) {
        let ctrl = self.clone();
        move |tag| match PortSide::from_tag(tag.as_str()) {
            Some(side) => {
                ctrl.dispatch(PanelIntent::AddPort(side));
            }
            None => warn!(tag = tag.as_str(), "unknown port side"),
        }
    }

    /// Returns a callback for inspector inputs: `(path, value, is_blur)`.
    pub fn field_edited_callback(&self) -> impl Fn(SharedString, SharedString, bool) {
        let ctrl = self.clone();
        move |path, value, commit| {
            if let Err(err) = ctrl.edit_field(path.as_str(), value.as_str(), commit) {
                warn!(%err, path = path.as_str(), "field edit rejected");
            }
        }
    }
}
