//! Boundary between the editor store and the diagram widget.
//!
//! [`DiagramSurface`] owns a widget implementing [`DiagramWidget`]. It
//! forwards the widget's selection notifications into the store, mirrors
//! store state into the widget, and feeds the widget's own batched changes
//! back into the store.
//!
//! # Example
//!
//! ```
//! use slint_diagram_sync::{DiagramSurface, EditorStore, SlintDiagramWidget, SyncOutcome};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let store = Rc::new(RefCell::new(EditorStore::default()));
//! let mut surface = DiagramSurface::new(SlintDiagramWidget::new());
//! surface.mount(&store);
//!
//! // First render pushes the whole document
//! assert!(matches!(surface.sync(&store.borrow()), SyncOutcome::Pushed { .. }));
//!
//! // A node dragged inside the widget comes back as a delta
//! surface.widget_mut().move_node(2, 40.0, 80.0).unwrap();
//! surface.drain_changes(&mut store.borrow_mut());
//!
//! // ...and the echo back into the widget is skipped
//! assert_eq!(surface.sync(&store.borrow()), SyncOutcome::Skipped);
//! ```

use crate::delta::IncrementalDelta;
use crate::records::{Key, LinkRecord, ModelData, NodeRecord, RecordKind};
use crate::store::{EditorStore, StoreSnapshot};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Receives `(kind, key)` of the newly selected element, or `None`.
pub type SelectionListener = Box<dyn FnMut(Option<(RecordKind, Key)>)>;

/// Handle returned by [`DiagramWidget::add_selection_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The diagram widget as seen from the editor.
///
/// Layout, rendering, hit-testing and undo/redo live behind this trait.
pub trait DiagramWidget {
    /// Replace the widget's node data. Must not be reported back as a change.
    fn replace_nodes(&mut self, nodes: &[NodeRecord]);
    /// Replace the widget's link data. Must not be reported back as a change.
    fn replace_links(&mut self, links: &[LinkRecord]);
    /// Replace the widget's model data. Must not be reported back as a change.
    fn replace_model_data(&mut self, model_data: ModelData);
    /// Register a selection-change listener.
    fn add_selection_listener(&mut self, listener: SelectionListener) -> ListenerId;
    /// Deregister a listener. Returns `false` if it was not registered.
    fn remove_selection_listener(&mut self, id: ListenerId) -> bool;
    /// Take all batched changes committed since the last call, oldest first.
    fn take_changes(&mut self) -> Vec<IncrementalDelta>;
}

/// What a call to [`DiagramSurface::sync`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The widget already holds this state; nothing was pushed.
    Skipped,
    /// State was pushed; flags tell which parts actually changed.
    Pushed {
        nodes: bool,
        links: bool,
        model_data: bool,
    },
}

/// Owns the diagram widget and keeps it in step with an [`EditorStore`].
pub struct DiagramSurface<W> {
    widget: W,
    listener: Option<ListenerId>,
    last_pushed: Option<StoreSnapshot>,
}

impl<W: DiagramWidget> DiagramSurface<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            listener: None,
            last_pushed: None,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn into_widget(mut self) -> W {
        self.unmount();
        self.widget
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// Start forwarding the widget's selection changes to `store`.
    ///
    /// The listener holds only a weak reference; once the store is dropped,
    /// notifications are discarded. Mounting twice keeps the first listener.
    pub fn mount(&mut self, store: &Rc<RefCell<EditorStore>>) {
        if self.listener.is_some() {
            debug!("surface already mounted");
            return;
        }
        let store = Rc::downgrade(store);
        let id = self.widget.add_selection_listener(Box::new(move |target| {
            let Some(store) = store.upgrade() else {
                return;
            };
            match store.try_borrow_mut() {
                Ok(mut store) => store.apply_selection_changed(target),
                Err(_) => warn!(?target, "store busy, selection change dropped"),
            };
        }));
        debug!(listener = id.0, "surface mounted");
        self.listener = Some(id);
    }

    /// Stop forwarding selection changes. Returns `false` if not mounted.
    pub fn unmount(&mut self) -> bool {
        match self.listener.take() {
            Some(id) => {
                let removed = self.widget.remove_selection_listener(id);
                debug!(listener = id.0, removed, "surface unmounted");
                removed
            }
            None => false,
        }
    }

    /// Mirror store state into the widget unless the store says the widget
    /// already has it.
    ///
    /// Lists whose snapshot is unchanged since the last push are not pushed
    /// again.
    pub fn sync(&mut self, store: &EditorStore) -> SyncOutcome {
        if store.skips_diagram_update() {
            return SyncOutcome::Skipped;
        }
        let next = store.snapshot();
        let (nodes, links, model_data) = match &self.last_pushed {
            Some(prev) => (
                !Rc::ptr_eq(&prev.nodes, &next.nodes),
                !Rc::ptr_eq(&prev.links, &next.links),
                prev.model_data != next.model_data,
            ),
            None => (true, true, true),
        };
        if nodes {
            self.widget.replace_nodes(&next.nodes);
        }
        if links {
            self.widget.replace_links(&next.links);
        }
        if model_data {
            self.widget.replace_model_data(next.model_data);
        }
        debug!(nodes, links, model_data, "surface synced");
        self.last_pushed = Some(next);
        SyncOutcome::Pushed {
            nodes,
            links,
            model_data,
        }
    }

    /// Apply every change the widget committed since the last drain.
    ///
    /// Returns the number of deltas applied.
    pub fn drain_changes(&mut self, store: &mut EditorStore) -> usize {
        let changes = self.widget.take_changes();
        for delta in &changes {
            store.apply_incremental_change(delta);
        }
        changes.len()
    }

    /// Forget what was pushed last, forcing the next sync to push everything.
    pub fn invalidate(&mut self) {
        self.last_pushed = None;
    }
}
