//! Batched change notifications reported by the diagram widget.
//!
//! The JSON shape matches what a JavaScript diagram model emits from its
//! incremental-data export, so such output can be applied verbatim.

use crate::records::{Key, LinkRecord, ModelData, NodeRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Insertions, modifications and removals for nodes and links, plus an
/// optional model-data replacement.
///
/// Inserted keys carry no payload of their own: the record for an inserted
/// key is taken from the modified data of the same delta.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncrementalDelta {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inserted_node_keys: Vec<Key>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modified_node_data: Vec<NodeRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_node_keys: Vec<Key>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inserted_link_keys: Vec<Key>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modified_link_data: Vec<LinkRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_link_keys: Vec<Key>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_data: Option<ModelData>,
}

impl IncrementalDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, DeltaError> {
        serde_json::from_str(json).map_err(DeltaError::Json)
    }

    pub fn to_json(&self) -> Result<String, DeltaError> {
        serde_json::to_string(self).map_err(DeltaError::Json)
    }

    /// True when applying the delta would change nothing.
    pub fn is_empty(&self) -> bool {
        self.inserted_node_keys.is_empty()
            && self.modified_node_data.is_empty()
            && self.removed_node_keys.is_empty()
            && self.inserted_link_keys.is_empty()
            && self.modified_link_data.is_empty()
            && self.removed_link_keys.is_empty()
            && self.model_data.is_none()
    }

    // === Builders ===

    /// Insert a node: records the key and its payload.
    pub fn insert_node(mut self, node: NodeRecord) -> Self {
        self.inserted_node_keys.push(node.key);
        self.modified_node_data.push(node);
        self
    }

    pub fn modify_node(mut self, node: NodeRecord) -> Self {
        self.modified_node_data.push(node);
        self
    }

    pub fn remove_node(mut self, key: Key) -> Self {
        self.removed_node_keys.push(key);
        self
    }

    /// Insert a link: records the key and its payload.
    pub fn insert_link(mut self, link: LinkRecord) -> Self {
        self.inserted_link_keys.push(link.key);
        self.modified_link_data.push(link);
        self
    }

    pub fn modify_link(mut self, link: LinkRecord) -> Self {
        self.modified_link_data.push(link);
        self
    }

    pub fn remove_link(mut self, key: Key) -> Self {
        self.removed_link_keys.push(key);
        self
    }

    pub fn with_model_data(mut self, model_data: ModelData) -> Self {
        self.model_data = Some(model_data);
        self
    }
}

/// Failure to decode or encode a delta.
#[derive(Debug)]
pub enum DeltaError {
    Json(serde_json::Error),
}

impl fmt::Display for DeltaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed incremental delta: {}", err),
        }
    }
}

impl std::error::Error for DeltaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}
