//! The authoritative editor state.
//!
//! [`EditorStore`] owns the node list, link list, model data and selection,
//! and exposes one entry point per UI intent. Record lists are held as
//! shared snapshots (`Rc<Vec<_>>`) and written through [`Rc::make_mut`], so a
//! snapshot handed out before a mutation is never changed by it.
//!
//! # Example
//!
//! ```
//! use slint_diagram_sync::{EditorStore, PortSide, RecordKind};
//!
//! let mut store = EditorStore::default();
//! store.apply_selection_changed(Some((RecordKind::Node, 1)));
//! assert_eq!(store.apply_add_port(PortSide::Left).as_deref(), Some("0"));
//! assert_eq!(store.apply_add_port(PortSide::Right).as_deref(), Some("1"));
//! assert_eq!(store.port_counter(), 2);
//! ```

use crate::delta::IncrementalDelta;
use crate::key_index::KeyIndex;
use crate::records::{
    Key, Keyed, LinkRecord, Location, LocationParseError, ModelData, NodeRecord, PortRecord,
    PortSide, RecordKind,
};
use crate::settings::EditorSettings;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

// ============================================================================
// Selection
// ============================================================================

/// An owned copy of the selected record, used for speculative edits.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectedData {
    Node(NodeRecord),
    Link(LinkRecord),
}

impl SelectedData {
    pub fn key(&self) -> Key {
        match self {
            Self::Node(n) => n.key,
            Self::Link(l) => l.key,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Node(_) => RecordKind::Node,
            Self::Link(_) => RecordKind::Link,
        }
    }

    pub fn as_ref(&self) -> SelectedRef<'_> {
        match self {
            Self::Node(n) => SelectedRef::Node(n),
            Self::Link(l) => SelectedRef::Link(l),
        }
    }

    fn set_field(&mut self, path: &str, value: &str) -> Result<(), EditError> {
        match self {
            Self::Node(node) => match path {
                "text1" | "text" | "label" => node.label = value.to_string(),
                "color" => node.color = value.to_string(),
                "loc" | "location" => {
                    node.location = Location::parse(value).map_err(EditError::InvalidLocation)?
                }
                _ => return Err(EditError::unknown_field(RecordKind::Node, path)),
            },
            Self::Link(link) => {
                let port = (!value.is_empty()).then(|| value.to_string());
                match path {
                    "fromPort" => link.from_port = port,
                    "toPort" => link.to_port = port,
                    _ => return Err(EditError::unknown_field(RecordKind::Link, path)),
                }
            }
        }
        Ok(())
    }
}

/// A borrowed view of the selected record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectedRef<'a> {
    Node(&'a NodeRecord),
    Link(&'a LinkRecord),
}

impl<'a> SelectedRef<'a> {
    pub fn key(&self) -> Key {
        match self {
            Self::Node(n) => n.key,
            Self::Link(l) => l.key,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Node(_) => RecordKind::Node,
            Self::Link(_) => RecordKind::Link,
        }
    }

    pub fn as_node(&self) -> Option<&'a NodeRecord> {
        match *self {
            Self::Node(n) => Some(n),
            Self::Link(_) => None,
        }
    }

    pub fn as_link(&self) -> Option<&'a LinkRecord> {
        match *self {
            Self::Link(l) => Some(l),
            Self::Node(_) => None,
        }
    }

    pub fn to_owned_data(&self) -> SelectedData {
        match *self {
            Self::Node(n) => SelectedData::Node(n.clone()),
            Self::Link(l) => SelectedData::Link(l.clone()),
        }
    }
}

/// Current selection: a key and kind, re-resolved on every read.
///
/// `draft` holds uncommitted field edits; while it is set, reads return it
/// instead of the list record.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    kind: RecordKind,
    key: Key,
    draft: Option<SelectedData>,
}

impl Selection {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Whether the selection carries uncommitted edits.
    pub fn has_draft(&self) -> bool {
        self.draft.is_some()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a field edit was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Nothing is selected (or the selection no longer resolves)
    NoSelection,
    /// The record kind has no field at this path
    UnknownField { kind: RecordKind, path: String },
    /// A location value that is not `"x y"`
    InvalidLocation(LocationParseError),
}

impl EditError {
    fn unknown_field(kind: RecordKind, path: &str) -> Self {
        Self::UnknownField {
            kind,
            path: path.to_string(),
        }
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSelection => write!(f, "No record is selected"),
            Self::UnknownField { kind, path } => write!(f, "A {} has no field {:?}", kind, path),
            Self::InvalidLocation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidLocation(err) => Some(err),
            _ => None,
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Cheap, immutable view of the lists and flags at one point in time.
///
/// This is what the surface adapter pushes into the widget.
#[derive(Clone, Debug)]
pub struct StoreSnapshot {
    pub nodes: Rc<Vec<NodeRecord>>,
    pub links: Rc<Vec<LinkRecord>>,
    pub model_data: ModelData,
    pub skips_diagram_update: bool,
}

// ============================================================================
// EditorStore
// ============================================================================

/// Single authoritative holder of diagram editor state.
#[derive(Clone, Debug)]
pub struct EditorStore {
    nodes: Rc<Vec<NodeRecord>>,
    links: Rc<Vec<LinkRecord>>,
    model_data: ModelData,
    selection: Option<Selection>,
    skips_diagram_update: bool,
    port_counter: u64,
    node_index: KeyIndex,
    link_index: KeyIndex,
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl EditorStore {
    /// Create a store over the given records with the port counter at 0.
    pub fn new(nodes: Vec<NodeRecord>, links: Vec<LinkRecord>, model_data: ModelData) -> Self {
        let node_index = KeyIndex::from_records(&nodes);
        let link_index = KeyIndex::from_records(&links);
        Self {
            nodes: Rc::new(nodes),
            links: Rc::new(links),
            model_data,
            selection: None,
            skips_diagram_update: false,
            port_counter: 0,
            node_index,
            link_index,
        }
    }

    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self::new(
            settings.initial_nodes(),
            Vec::new(),
            ModelData {
                can_relink: settings.can_relink,
            },
        )
        .with_port_counter(settings.initial_port_counter)
    }

    pub fn with_port_counter(mut self, start: u64) -> Self {
        self.port_counter = start;
        self
    }

    // === Accessors ===

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    pub fn model_data(&self) -> ModelData {
        self.model_data
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// `(kind, key)` of the current selection.
    pub fn selection_target(&self) -> Option<(RecordKind, Key)> {
        self.selection.as_ref().map(|s| (s.kind, s.key))
    }

    /// The selected record: the uncommitted draft if there is one, otherwise
    /// the list record resolved through the key index.
    pub fn selected(&self) -> Option<SelectedRef<'_>> {
        let selection = self.selection.as_ref()?;
        match &selection.draft {
            Some(draft) => Some(draft.as_ref()),
            None => self.resolve(selection.kind, selection.key),
        }
    }

    /// Whether the widget already reflects the current state.
    pub fn skips_diagram_update(&self) -> bool {
        self.skips_diagram_update
    }

    /// Next port id to be handed out.
    pub fn port_counter(&self) -> u64 {
        self.port_counter
    }

    pub fn reset_port_counter(&mut self, start: u64) {
        self.port_counter = start;
    }

    pub fn node_index(&self) -> &KeyIndex {
        &self.node_index
    }

    pub fn link_index(&self) -> &KeyIndex {
        &self.link_index
    }

    pub fn node(&self, key: Key) -> Option<&NodeRecord> {
        self.node_index.lookup(key).and_then(|idx| self.nodes.get(idx))
    }

    pub fn link(&self, key: Key) -> Option<&LinkRecord> {
        self.link_index.lookup(key).and_then(|idx| self.links.get(idx))
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
            model_data: self.model_data,
            skips_diagram_update: self.skips_diagram_update,
        }
    }

    fn resolve(&self, kind: RecordKind, key: Key) -> Option<SelectedRef<'_>> {
        match kind {
            RecordKind::Node => self.node(key).map(SelectedRef::Node),
            RecordKind::Link => self.link(key).map(SelectedRef::Link),
        }
    }

    // === Operations ===

    /// Point the selection at `target`, or clear it.
    ///
    /// A key that the index does not track clears the selection.
    pub fn apply_selection_changed(&mut self, target: Option<(RecordKind, Key)>) {
        self.selection = match target {
            Some((kind, key)) if self.resolve(kind, key).is_some() => {
                debug!(%kind, key, "selection changed");
                Some(Selection {
                    kind,
                    key,
                    draft: None,
                })
            }
            Some((kind, key)) => {
                debug!(%kind, key, "selection target not tracked, clearing");
                None
            }
            None => {
                debug!("selection cleared");
                None
            }
        };
    }

    /// Merge a batch of changes reported by the widget.
    ///
    /// Per kind: modifications in place, then insertions, then removals.
    /// Afterwards the widget is known to match, so the next re-sync is skipped.
    pub fn apply_incremental_change(&mut self, delta: &IncrementalDelta) {
        let nodes = merge_records(
            &mut self.nodes,
            &mut self.node_index,
            &delta.modified_node_data,
            &delta.inserted_node_keys,
            &delta.removed_node_keys,
        );
        let links = merge_records(
            &mut self.links,
            &mut self.link_index,
            &delta.modified_link_data,
            &delta.inserted_link_keys,
            &delta.removed_link_keys,
        );

        if let Some(selection) = self.selection.as_mut() {
            let (stats, removed) = match selection.kind {
                RecordKind::Node => (&nodes, &delta.removed_node_keys),
                RecordKind::Link => (&links, &delta.removed_link_keys),
            };
            if removed.contains(&selection.key) {
                debug!(kind = %selection.kind, key = selection.key, "selected record removed");
                self.selection = None;
            } else if stats.modified_keys.contains(&selection.key) {
                selection.draft = None;
            }
        }

        if let Some(model_data) = delta.model_data {
            self.model_data = model_data;
        }
        self.skips_diagram_update = true;

        debug!(
            nodes_modified = nodes.modified_keys.len(),
            nodes_inserted = nodes.inserted,
            nodes_removed = nodes.removed,
            links_modified = links.modified_keys.len(),
            links_inserted = links.inserted,
            links_removed = links.removed,
            model_data = delta.model_data.is_some(),
            "applied incremental change"
        );
    }

    /// Write `value` at `path` on the selected record.
    ///
    /// The edit always lands on the selection's draft. With `commit`, the
    /// draft replaces the record in its owning list (chosen by key sign) and
    /// the widget is scheduled for a re-sync.
    pub fn apply_field_edit(&mut self, path: &str, value: &str, commit: bool) -> Result<(), EditError> {
        let Some(selection) = self.selection.as_ref() else {
            warn!(path, "field edit without a selection");
            return Err(EditError::NoSelection);
        };
        let mut draft = match &selection.draft {
            Some(draft) => draft.clone(),
            None => self
                .resolve(selection.kind, selection.key)
                .ok_or(EditError::NoSelection)?
                .to_owned_data(),
        };
        draft.set_field(path, value)?;
        trace!(key = draft.key(), path, value, commit, "field edit");

        let written = commit && self.write_back(&draft);
        if written {
            self.skips_diagram_update = false;
            debug!(key = draft.key(), path, "field edit committed");
        }
        if let Some(selection) = self.selection.as_mut() {
            selection.draft = if written { None } else { Some(draft) };
        }
        Ok(())
    }

    fn write_back(&mut self, data: &SelectedData) -> bool {
        let key = data.key();
        match (RecordKind::of_key(key), data) {
            (RecordKind::Link, SelectedData::Link(link)) => match self.link_index.lookup(key) {
                Some(idx) => {
                    Rc::make_mut(&mut self.links)[idx] = link.clone();
                    true
                }
                None => false,
            },
            (RecordKind::Node, SelectedData::Node(node)) => match self.node_index.lookup(key) {
                Some(idx) => {
                    Rc::make_mut(&mut self.nodes)[idx] = node.clone();
                    true
                }
                None => false,
            },
            (kind, data) => {
                warn!(key, %kind, actual = %data.kind(), "key sign does not match record kind");
                false
            }
        }
    }

    /// Replace the model data with the checkbox value.
    pub fn apply_relink_toggle(&mut self, allowed: bool) {
        self.model_data = ModelData { can_relink: allowed };
        self.skips_diagram_update = false;
        debug!(allowed, "relink toggled");
    }

    /// Append a fresh port to `side` of the selected node.
    ///
    /// Returns the new port id, or `None` when no node is selected. The id is
    /// the current counter value; the counter advances once per added port,
    /// across all nodes and sides.
    pub fn apply_add_port(&mut self, side: PortSide) -> Option<String> {
        let Some(selection) = self.selection.as_ref() else {
            debug!(%side, "add port ignored, nothing selected");
            return None;
        };
        if selection.kind != RecordKind::Node {
            debug!(%side, key = selection.key, "add port ignored, link selected");
            return None;
        }
        let key = selection.key;
        let idx = self.node_index.lookup(key)?;

        let port_id = self.port_counter.to_string();
        let mut node = self.nodes[idx].clone();
        node.ports_mut(side).push(PortRecord::new(port_id.clone()));
        Rc::make_mut(&mut self.nodes)[idx] = node;

        if let Some(SelectedData::Node(draft)) = self.selection.as_mut().and_then(|s| s.draft.as_mut()) {
            draft.ports_mut(side).push(PortRecord::new(port_id.clone()));
        }

        self.port_counter += 1;
        self.skips_diagram_update = false;
        debug!(key, %side, port_id = %port_id, "port added");
        Some(port_id)
    }
}

/// Per-kind result of merging one delta section.
#[derive(Debug, Default)]
struct MergeStats {
    modified_keys: Vec<Key>,
    inserted: usize,
    removed: usize,
}

fn merge_records<R>(
    list: &mut Rc<Vec<R>>,
    index: &mut KeyIndex,
    modified: &[R],
    inserted: &[Key],
    removed: &[Key],
) -> MergeStats
where
    R: Keyed + Clone,
{
    let mut stats = MergeStats::default();
    let mut payloads: HashMap<Key, &R> = HashMap::with_capacity(modified.len());

    for record in modified {
        let key = record.key();
        payloads.insert(key, record);
        match index.lookup(key) {
            Some(idx) => {
                Rc::make_mut(list)[idx] = record.clone();
                stats.modified_keys.push(key);
            }
            None => trace!(key, "modification for untracked key ignored"),
        }
    }

    for &key in inserted {
        if index.contains(key) {
            continue;
        }
        match payloads.get(&key) {
            Some(&record) => {
                let items = Rc::make_mut(list);
                index.insert(key, items.len());
                items.push(record.clone());
                stats.inserted += 1;
            }
            None => trace!(key, "insertion without payload ignored"),
        }
    }

    if !removed.is_empty() {
        let items = Rc::make_mut(list);
        let before = items.len();
        items.retain(|r| !removed.contains(&r.key()));
        stats.removed = before - items.len();
        index.rebuild(items);
    }

    stats
}
