//! Level 5: Dynamic Port Tests
//!
//! Tests the add-port buttons: id generation, copy-on-write publishing, and
//! propagation of new ports into the widget's Slint models.

mod common;

use common::harness::EditorHarness;
use slint::Model;
use slint_diagram_sync::{
    EditorSettings, EditorStore, Location, ModelData, NodeRecord, PanelIntent, PanelOutcome,
    PortRecord, PortSide, RecordKind,
};
use std::rc::Rc;

#[test]
fn test_left_then_right_scenario() {
    let mut store = EditorStore::new(
        vec![
            NodeRecord::new(0, "Beta", "orange", Location::default()),
            NodeRecord::new(1, "Beta", "orange", Location::default()),
        ],
        vec![],
        ModelData::default(),
    );
    store.apply_selection_changed(Some((RecordKind::Node, 1)));

    store.apply_add_port(PortSide::Left);
    store.apply_add_port(PortSide::Right);

    let n1 = store.node(1).unwrap();
    assert_eq!(n1.left, vec![PortRecord::new("0")]);
    assert_eq!(n1.right, vec![PortRecord::new("1")]);
    assert_eq!(store.port_counter(), 2);
    let n0 = store.node(0).unwrap();
    assert!(n0.left.is_empty() && n0.right.is_empty() && n0.top.is_empty() && n0.bottom.is_empty());
}

#[test]
fn test_buttons_add_ports_to_selected_node() {
    let harness = EditorHarness::new();
    harness.click_node(2);

    harness.press_port_button("topArray");
    harness.press_port_button("bottom");

    let node = harness.store_node(2).unwrap();
    assert_eq!(node.top, vec![PortRecord::new("0")]);
    assert_eq!(node.bottom, vec![PortRecord::new("1")]);
}

#[test]
fn test_button_without_selection_does_nothing() {
    let harness = EditorHarness::new();
    harness.press_port_button("left");

    assert_eq!(harness.port_counter(), 0);
    assert!(harness.store_node(0).unwrap().left.is_empty());
}

#[test]
fn test_button_with_link_selected_does_nothing() {
    let harness = EditorHarness::new();
    let link = harness.draw_link(0, None, 1, None).unwrap();
    harness.click_link(link);

    assert_eq!(harness.dispatch(PanelIntent::AddPort(PortSide::Left)), PanelOutcome::Ignored);
    assert_eq!(harness.port_counter(), 0);
}

#[test]
fn test_counter_is_shared_across_nodes_and_sides() {
    let harness = EditorHarness::new();
    harness.click_node(0);
    harness.press_port_button("left");
    harness.click_node(3);
    harness.press_port_button("left");
    harness.press_port_button("right");
    harness.click_node(0);
    harness.press_port_button("left");

    let n0 = harness.store_node(0).unwrap();
    let n3 = harness.store_node(3).unwrap();
    assert_eq!(n0.left, vec![PortRecord::new("0"), PortRecord::new("3")]);
    assert_eq!(n3.left, vec![PortRecord::new("1")]);
    assert_eq!(n3.right, vec![PortRecord::new("2")]);
}

#[test]
fn test_counter_starts_from_settings() {
    let settings = EditorSettings::default().with_port_counter(41);
    let harness = EditorHarness::with_settings(&settings);
    harness.click_node(1);
    harness.press_port_button("right");

    assert_eq!(harness.store_node(1).unwrap().right, vec![PortRecord::new("41")]);
}

#[test]
fn test_new_port_reaches_widget_models() {
    let harness = EditorHarness::new();
    harness.click_node(1);
    harness.press_port_button("left");
    harness.press_port_button("left");

    let surface = harness.ctrl.surface();
    let surface = surface.borrow();
    let item = surface.widget().node_items().row_data(1).unwrap();
    let ports = item.ports(PortSide::Left);
    assert_eq!(ports.row_count(), 2);
    assert_eq!(ports.row_data(0).unwrap().port_id.as_str(), "0");
    assert_eq!(ports.row_data(1).unwrap().port_id.as_str(), "1");
}

#[test]
fn test_new_port_reaches_widget_after_drag() {
    let harness = EditorHarness::new();
    harness.click_node(1);
    harness.drag_node(1, 20.0, 30.0).unwrap();
    assert!(harness.skips_diagram_update());

    harness.press_port_button("right");

    let widget_node = harness.widget_node(1).unwrap();
    assert_eq!(widget_node.right, vec![PortRecord::new("0")]);
    assert_eq!(widget_node.location, Location::new(20.0, 30.0));
}

#[test]
fn test_port_add_publishes_new_list() {
    let harness = EditorHarness::new();
    harness.click_node(0);
    let before = harness.ctrl.store().borrow().snapshot();

    harness.press_port_button("top");

    let after = harness.ctrl.store().borrow().snapshot();
    assert!(!Rc::ptr_eq(&before.nodes, &after.nodes));
    assert!(before.nodes[0].top.is_empty());
    assert_eq!(after.nodes[0].top.len(), 1);
}

#[test]
fn test_links_can_attach_to_new_ports() {
    let harness = EditorHarness::new();
    harness.click_node(0);
    harness.press_port_button("right");
    harness.click_node(1);
    harness.press_port_button("left");

    let link = harness.draw_link(0, Some("0"), 1, Some("1")).unwrap();

    let stored = harness.store_link(link).unwrap();
    assert_eq!(stored.from_port.as_deref(), Some("0"));
    assert_eq!(stored.to_port.as_deref(), Some("1"));
}
