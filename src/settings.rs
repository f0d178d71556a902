//! Editor configuration.

use crate::records::{Location, NodeRecord};
use serde::{Deserialize, Serialize};

/// Startup configuration for an editing session.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a
/// valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// First port id handed out by the add-port buttons.
    pub initial_port_counter: u64,
    /// Initial state of the relink checkbox.
    pub can_relink: bool,
    /// Label given to nodes created by clicking on empty canvas.
    pub new_node_label: String,
    /// Fill color given to nodes created by clicking on empty canvas.
    pub new_node_color: String,
    /// Start with the four-node demo document instead of an empty one.
    pub seed_demo_nodes: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            initial_port_counter: 0,
            can_relink: true,
            new_node_label: "new node".to_string(),
            new_node_color: "lightblue".to_string(),
            seed_demo_nodes: true,
        }
    }
}

impl EditorSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// An empty document with default flags.
    pub fn empty() -> Self {
        Self {
            seed_demo_nodes: false,
            ..Self::default()
        }
    }

    pub fn with_port_counter(mut self, start: u64) -> Self {
        self.initial_port_counter = start;
        self
    }

    pub fn with_can_relink(mut self, allowed: bool) -> Self {
        self.can_relink = allowed;
        self
    }

    pub fn with_new_node_style(mut self, label: impl Into<String>, color: impl Into<String>) -> Self {
        self.new_node_label = label.into();
        self.new_node_color = color.into();
        self
    }

    /// Nodes the document starts with.
    pub fn initial_nodes(&self) -> Vec<NodeRecord> {
        if self.seed_demo_nodes {
            demo_nodes()
        } else {
            Vec::new()
        }
    }
}

/// Four port-less "Beta" nodes, keys 0 through 3.
pub fn demo_nodes() -> Vec<NodeRecord> {
    (0..4)
        .map(|key| NodeRecord::new(key, "Beta", "orange", Location::new(150.0, 0.0)))
        .collect()
}
