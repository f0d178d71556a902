//! Test harness for a full editor session.
//!
//! Wires a [`DiagramEditorController`] to a [`SlintDiagramWidget`] and the
//! test `MainWindow` the way an application would, with callback tracking
//! and helpers that simulate user interactions on the diagram and the
//! control panel.

#![allow(dead_code)]

use super::{init_tracing, CallbackTracker};
use slint::{
    platform::{PointerEventButton, WindowEvent},
    ComponentHandle, LogicalPosition, Model, ModelRc, SharedString, VecModel,
};
use slint_diagram_sync::{
    port_rows, ControlPanel, DiagramEditorController, DiagramWidget, EditorSettings, EditorStore,
    Key, LinkRecord, ModelData, NodeRecord, PanelIntent, PanelOutcome, PortSide, RecordKind,
    SlintDiagramWidget, SyncOutcome, WidgetError,
};
use std::rc::Rc;

// Include the compiled UI from build.rs
slint::include_modules!();

/// Initialize the testing backend once per test thread.
fn init_testing_backend() {
    use std::cell::Cell;
    thread_local! {
        static INITIALIZED: Cell<bool> = const { Cell::new(false) };
    }

    INITIALIZED.with(|init| {
        if !init.get() {
            i_slint_backend_testing::init_no_event_loop();
            init.set(true);
        }
    });
}

fn node_row(node: &NodeRecord) -> NodeData {
    let ports = |side| port_rows(node.ports(side), |port_id, color| PortData { port_id, color });
    NodeData {
        key: node.key,
        label: node.label.as_str().into(),
        color: node.color.as_str().into(),
        x: node.location.x as f32,
        y: node.location.y as f32,
        left_ports: ports(PortSide::Left),
        right_ports: ports(PortSide::Right),
        top_ports: ports(PortSide::Top),
        bottom_ports: ports(PortSide::Bottom),
    }
}

fn link_row(link: &LinkRecord, relinkable: bool) -> LinkData {
    LinkData {
        key: link.key,
        from_key: link.from,
        to_key: link.to,
        from_port: link.from_port.as_deref().unwrap_or_default().into(),
        to_port: link.to_port.as_deref().unwrap_or_default().into(),
        relinkable,
    }
}

/// Mirror the store's panel state into the window.
fn refresh_panel(window: &MainWindow, ctrl: &DiagramEditorController<SlintDiagramWidget>) {
    let store = ctrl.store();
    let store = store.borrow();
    let panel = ctrl.panel();
    window.set_can_relink(panel.relink_checked(&store));
    window.set_inspector_caption(panel.inspector_caption(&store).unwrap_or_default().into());
}

/// Test harness for the port editor.
pub struct EditorHarness {
    pub window: MainWindow,
    pub ctrl: DiagramEditorController<SlintDiagramWidget>,
    pub nodes: Rc<VecModel<NodeData>>,
    pub links: Rc<VecModel<LinkData>>,
    pub tracker: CallbackTracker,
}

impl EditorHarness {
    /// Create a harness over the default four-node document.
    pub fn new() -> Self {
        Self::with_store(EditorStore::default())
    }

    /// Create a harness with custom nodes and links.
    pub fn with_nodes_and_links(nodes: Vec<NodeRecord>, links: Vec<LinkRecord>) -> Self {
        Self::with_store(EditorStore::new(nodes, links, ModelData::default()))
    }

    pub fn with_settings(settings: &EditorSettings) -> Self {
        Self::with_store(EditorStore::from_settings(settings))
    }

    fn with_store(store: EditorStore) -> Self {
        init_tracing();
        init_testing_backend();
        let window = MainWindow::new().unwrap();
        let ctrl = DiagramEditorController::new(store, SlintDiagramWidget::new());
        let tracker = CallbackTracker::new();
        let w = window.as_weak();

        // Bind widget rows to the window's generated row types
        let nodes = Rc::new(VecModel::<NodeData>::default());
        let links = Rc::new(VecModel::<LinkData>::default());
        {
            let surface = ctrl.surface();
            let mut surface = surface.borrow_mut();
            let widget = surface.widget_mut();
            widget.bind_node_model(nodes.clone(), node_row);
            widget.bind_link_model(links.clone(), link_row);
            widget.add_selection_listener(Box::new({
                let tracker = tracker.clone();
                move |target| tracker.selection_changed.borrow_mut().push(target)
            }));
        }
        window.set_nodes(ModelRc::from(nodes.clone()));
        window.set_links(ModelRc::from(links.clone()));
        window.set_instructions(ControlPanel::INSTRUCTIONS.into());

        // Diagram gestures
        let select = |kind: Option<RecordKind>| {
            let ctrl = ctrl.clone();
            let w = w.clone();
            move |key: Key| {
                let target = kind.map(|kind| (kind, key));
                ctrl.surface().borrow_mut().widget_mut().select(target);
                if let Some(w) = w.upgrade() {
                    refresh_panel(&w, &ctrl);
                }
            }
        };
        window.on_node_clicked(select(Some(RecordKind::Node)));
        window.on_link_clicked(select(Some(RecordKind::Link)));
        window.on_background_clicked({
            let clear = select(None);
            move || clear(0)
        });

        // Control panel
        window.on_relink_toggled({
            let toggled = ctrl.relink_toggled_callback();
            let ctrl = ctrl.clone();
            let w = w.clone();
            move |checked| {
                toggled(checked);
                if let Some(w) = w.upgrade() {
                    refresh_panel(&w, &ctrl);
                }
            }
        });
        window.on_add_port(ctrl.add_port_callback());
        window.on_field_edited(ctrl.field_edited_callback());

        ctrl.mount();
        refresh_panel(&window, &ctrl);
        let harness = Self {
            window,
            ctrl,
            nodes,
            links,
            tracker,
        };
        harness.render();
        harness
    }

    // === Rendering ===

    pub fn render(&self) -> SyncOutcome {
        let outcome = self.ctrl.render();
        self.tracker.renders.borrow_mut().push(outcome);
        outcome
    }

    /// Drain widget changes into the store, then render.
    pub fn pump(&self) -> SyncOutcome {
        let outcome = self.ctrl.pump();
        self.tracker.renders.borrow_mut().push(outcome);
        outcome
    }

    // === Diagram interactions ===

    fn with_widget<T>(&self, f: impl FnOnce(&mut SlintDiagramWidget) -> T) -> T {
        let surface = self.ctrl.surface();
        let mut surface = surface.borrow_mut();
        f(surface.widget_mut())
    }

    pub fn click_node(&self, key: Key) {
        self.window.invoke_node_clicked(key);
    }

    pub fn click_link(&self, key: Key) {
        self.window.invoke_link_clicked(key);
    }

    pub fn click_background(&self) {
        self.window.invoke_background_clicked();
    }

    pub fn double_click_background(&self, x: f64, y: f64) -> Result<Key, WidgetError> {
        let key = self.with_widget(|w| w.create_node_at(x, y))?;
        self.pump();
        Ok(key)
    }

    pub fn drag_node(&self, key: Key, x: f64, y: f64) -> Result<(), WidgetError> {
        self.with_widget(|w| w.move_node(key, x, y))?;
        self.pump();
        Ok(())
    }

    pub fn rename_node_inline(&self, key: Key, label: &str) -> Result<(), WidgetError> {
        self.with_widget(|w| w.edit_node_label(key, label))?;
        self.pump();
        Ok(())
    }

    pub fn draw_link(
        &self,
        from: Key,
        from_port: Option<&str>,
        to: Key,
        to_port: Option<&str>,
    ) -> Result<Key, WidgetError> {
        let key = self.with_widget(|w| w.connect(from, from_port, to, to_port))?;
        self.pump();
        Ok(key)
    }

    pub fn redraw_link(&self, key: Key, from: Key, to: Key) -> Result<(), WidgetError> {
        self.with_widget(|w| w.relink(key, from, None, to, None))?;
        self.pump();
        Ok(())
    }

    pub fn delete_node(&self, key: Key) -> Result<(), WidgetError> {
        self.with_widget(|w| w.delete_node(key))?;
        self.pump();
        Ok(())
    }

    pub fn delete_link(&self, key: Key) -> Result<(), WidgetError> {
        self.with_widget(|w| w.delete_link(key))?;
        self.pump();
        Ok(())
    }

    // === Control panel interactions ===

    pub fn press_port_button(&self, tag: &str) {
        self.window.invoke_add_port(SharedString::from(tag));
    }

    pub fn dispatch(&self, intent: PanelIntent) -> PanelOutcome {
        self.ctrl.dispatch(intent)
    }

    pub fn set_relink_checkbox(&self, checked: bool) {
        self.window.invoke_relink_toggled(checked);
    }

    /// Typing into an inspector field (no blur).
    pub fn type_into(&self, path: &str, value: &str) {
        self.window.invoke_field_edited(path.into(), value.into(), false);
    }

    /// Leaving an inspector field (blur commits the edit).
    pub fn blur(&self, path: &str, value: &str) {
        self.window.invoke_field_edited(path.into(), value.into(), true);
    }

    // === Mouse event helpers ===

    /// Process pending timers and animations.
    pub fn pump_events(&self) {
        slint::platform::update_timers_and_animations();
    }

    /// Simulate a complete left click (down + up) at the given position.
    pub fn click_at(&self, x: f32, y: f32) {
        let position = LogicalPosition::new(x, y);
        self.window.window().dispatch_event(WindowEvent::PointerMoved { position });
        self.window.window().dispatch_event(WindowEvent::PointerPressed {
            position,
            button: PointerEventButton::Left,
        });
        self.window.window().dispatch_event(WindowEvent::PointerReleased {
            position,
            button: PointerEventButton::Left,
        });
        self.pump_events();
    }

    /// Click the middle of a node as drawn on the canvas.
    pub fn click_node_on_canvas(&self, key: Key) {
        let node = self.window_node(key).expect("node is not on the canvas");
        self.click_at(node.x + 40.0, node.y + 20.0);
    }

    /// Click one of the add-port buttons on the panel.
    pub fn click_port_button(&self, side: PortSide) {
        let x = match side {
            PortSide::Top => 8.0,
            PortSide::Bottom => 96.0,
            PortSide::Left => 184.0,
            PortSide::Right => 272.0,
        };
        self.click_at(x + 40.0, 480.0 + 60.0 + 12.0);
    }

    /// Click the "Allow Relinking?" checkbox on the panel.
    pub fn click_relink_checkbox(&self) {
        self.click_at(8.0 + 80.0, 480.0 + 28.0 + 12.0);
    }

    // === Queries ===

    pub fn store_node(&self, key: Key) -> Option<NodeRecord> {
        self.ctrl.store().borrow().node(key).cloned()
    }

    pub fn store_link(&self, key: Key) -> Option<LinkRecord> {
        self.ctrl.store().borrow().link(key).cloned()
    }

    pub fn store_node_keys(&self) -> Vec<Key> {
        self.ctrl.store().borrow().nodes().iter().map(|n| n.key).collect()
    }

    pub fn widget_node(&self, key: Key) -> Option<NodeRecord> {
        self.with_widget(|w| w.nodes().iter().find(|n| n.key == key).cloned())
    }

    /// Node row as bound into the window.
    pub fn window_node(&self, key: Key) -> Option<NodeData> {
        let nodes = self.window.get_nodes();
        (0..nodes.row_count())
            .filter_map(|i| nodes.row_data(i))
            .find(|n| n.key == key)
    }

    pub fn widget_node_rows(&self) -> usize {
        self.with_widget(|w| w.node_items().row_count())
    }

    pub fn widget_link_rows(&self) -> usize {
        self.with_widget(|w| w.link_items().row_count())
    }

    pub fn widget_model_data(&self) -> ModelData {
        self.with_widget(|w| w.model_data())
    }

    pub fn selected_key(&self) -> Option<Key> {
        self.ctrl.store().borrow().selected().map(|s| s.key())
    }

    pub fn skips_diagram_update(&self) -> bool {
        self.ctrl.store().borrow().skips_diagram_update()
    }

    pub fn port_counter(&self) -> u64 {
        self.ctrl.store().borrow().port_counter()
    }
}
