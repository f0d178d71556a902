//! Relink checkbox and add-port buttons.

use crate::records::{Key, PortSide};
use crate::store::EditorStore;
use tracing::debug;

/// Something the control panel asks the store to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelIntent {
    ToggleRelink(bool),
    AddPort(PortSide),
}

/// Result of dispatching a [`PanelIntent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelOutcome {
    RelinkSet(bool),
    PortAdded { node: Key, side: PortSide, port_id: String },
    /// The intent had no effect (add-port without a selected node)
    Ignored,
}

/// Stateless view logic for the panel under the diagram.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanel;

impl ControlPanel {
    pub const INSTRUCTIONS: &'static str =
        "Select a node first, then add ports to it with the four buttons below.";

    pub const INSPECTOR_CAPTION: &'static str = "Can Add Port";

    /// Button captions in display order.
    pub const BUTTONS: [(&'static str, PortSide); 4] = [
        ("Top", PortSide::Top),
        ("Bottom", PortSide::Bottom),
        ("Left", PortSide::Left),
        ("Right", PortSide::Right),
    ];

    pub fn new() -> Self {
        Self
    }

    /// Intent for a button tag (`left`, `rightArray`, ...).
    pub fn button_intent(tag: &str) -> Option<PanelIntent> {
        PortSide::from_tag(tag).map(PanelIntent::AddPort)
    }

    pub fn dispatch(&self, intent: PanelIntent, store: &mut EditorStore) -> PanelOutcome {
        debug!(?intent, "panel intent");
        match intent {
            PanelIntent::ToggleRelink(allowed) => {
                store.apply_relink_toggle(allowed);
                PanelOutcome::RelinkSet(allowed)
            }
            PanelIntent::AddPort(side) => {
                let node = store.selection_target().map(|(_, key)| key);
                match (node, store.apply_add_port(side)) {
                    (Some(node), Some(port_id)) => PanelOutcome::PortAdded { node, side, port_id },
                    _ => PanelOutcome::Ignored,
                }
            }
        }
    }

    /// Checkbox state.
    pub fn relink_checked(&self, store: &EditorStore) -> bool {
        store.model_data().can_relink
    }

    /// Caption under the buttons, shown only while something is selected.
    pub fn inspector_caption(&self, store: &EditorStore) -> Option<&'static str> {
        store.selected().map(|_| Self::INSPECTOR_CAPTION)
    }
}
