//! A [`DiagramWidget`] backed by Slint models.
//!
//! [`SlintDiagramWidget`] keeps the widget-side copy of the document and
//! exposes it to a `.slint` front-end through [`VecModel`]s. User gestures
//! (click-create, drag, inline label edit, drawing and re-drawing links,
//! deletion) are applied here first and recorded into a transaction; a
//! committed transaction becomes one [`IncrementalDelta`] that the surface
//! adapter drains into the store.
//!
//! Data pushed in through the [`DiagramWidget`] trait is never reported back.
//!
//! # Example
//!
//! ```
//! use slint_diagram_sync::{DiagramWidget, SlintDiagramWidget};
//! use slint::Model;
//!
//! let mut widget = SlintDiagramWidget::new();
//! let a = widget.create_node_at(0.0, 0.0).unwrap();
//! let b = widget.create_node_at(200.0, 0.0).unwrap();
//! let link = widget.connect(a, None, b, None).unwrap();
//! assert!(link < 0);
//!
//! let changes = widget.take_changes();
//! assert_eq!(changes.len(), 3);
//! assert_eq!(widget.node_items().row_count(), 2);
//! ```

use crate::delta::IncrementalDelta;
use crate::records::{Key, LinkRecord, Location, ModelData, NodeRecord, PortRecord, PortSide, RecordKind};
use crate::settings::EditorSettings;
use crate::surface::{DiagramWidget, ListenerId, SelectionListener};
use slint::{Model, ModelRc, SharedString, VecModel};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

// ============================================================================
// Slint-facing rows
// ============================================================================

/// One port as bound by the front-end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortItem {
    pub port_id: SharedString,
    pub color: SharedString,
}

/// The widget's own node row. A `.slint` window binds its generated struct
/// instead, through [`SlintDiagramWidget::bind_node_model`].
#[derive(Clone, Default)]
pub struct NodeItem {
    pub key: i32,
    pub label: SharedString,
    pub color: SharedString,
    pub x: f32,
    pub y: f32,
    pub left_ports: ModelRc<PortItem>,
    pub right_ports: ModelRc<PortItem>,
    pub top_ports: ModelRc<PortItem>,
    pub bottom_ports: ModelRc<PortItem>,
}

impl NodeItem {
    fn from_record(node: &NodeRecord) -> Self {
        let ports = |side| port_rows(node.ports(side), |port_id, color| PortItem { port_id, color });
        Self {
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

    pub fn ports(&self, side: PortSide) -> &ModelRc<PortItem> {
        match side {
            PortSide::Left => &self.left_ports,
            PortSide::Right => &self.right_ports,
            PortSide::Top => &self.top_ports,
            PortSide::Bottom => &self.bottom_ports,
        }
    }
}

/// Build a port model for one node side.
///
/// `constructor` receives `(port_id, color)`; a missing color is empty.
pub fn port_rows<P, F>(ports: &[PortRecord], constructor: F) -> ModelRc<P>
where
    P: Clone + 'static,
    F: Fn(SharedString, SharedString) -> P,
{
    let items: Vec<P> = ports
        .iter()
        .map(|p| {
            constructor(
                p.port_id.as_str().into(),
                p.port_color.as_deref().unwrap_or_default().into(),
            )
        })
        .collect();
    ModelRc::new(VecModel::from(items))
}

/// The widget's own link row. Missing ports are empty strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkItem {
    pub key: i32,
    pub from: i32,
    pub to: i32,
    pub from_port: SharedString,
    pub to_port: SharedString,
    pub relinkable: bool,
}

impl LinkItem {
    fn from_record(link: &LinkRecord, relinkable: bool) -> Self {
        Self {
            key: link.key,
            from: link.from,
            to: link.to,
            from_port: link.from_port.as_deref().unwrap_or_default().into(),
            to_port: link.to_port.as_deref().unwrap_or_default().into(),
            relinkable,
        }
    }
}

/// Keeps one bound Slint model in step with a record list.
trait ModelSyncer<R> {
    fn sync(&self, records: &[R], relinkable: bool);

    /// Rebuild a single row. Returns `false` if the model has no such row.
    fn sync_row(&self, pos: usize, record: &R, relinkable: bool) -> bool;
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<R, P, F> ModelSyncer<R> for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(&R, bool) -> P,
{
    fn sync(&self, records: &[R], relinkable: bool) {
        for (i, record) in records.iter().enumerate() {
            let item = (self.constructor)(record, relinkable);
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
        }
        while self.model.row_count() > records.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }

    fn sync_row(&self, pos: usize, record: &R, relinkable: bool) -> bool {
        if pos >= self.model.row_count() {
            return false;
        }
        self.model.set_row_data(pos, (self.constructor)(record, relinkable));
        true
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Reasons a user gesture on the widget was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// No node with this key
    UnknownNode(Key),
    /// No link with this key
    UnknownLink(Key),
    /// The node has no port with this id
    UnknownPort { node: Key, port: String },
    /// Links cannot be re-drawn while `canRelink` is off
    RelinkDisabled,
    /// Commit or rollback without an open transaction
    NoTransaction,
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(key) => write!(f, "Node {} not found", key),
            Self::UnknownLink(key) => write!(f, "Link {} not found", key),
            Self::UnknownPort { node, port } => write!(f, "Node {} has no port {:?}", node, port),
            Self::RelinkDisabled => write!(f, "Relinking is disabled"),
            Self::NoTransaction => write!(f, "No transaction in progress"),
        }
    }
}

impl std::error::Error for WidgetError {}

// ============================================================================
// Transactions
// ============================================================================

/// Edits recorded since `start_transaction`, plus the state to roll back to.
struct Transaction {
    base_nodes: Vec<NodeRecord>,
    base_links: Vec<LinkRecord>,
    base_model_data: ModelData,
    inserted_nodes: Vec<Key>,
    touched_nodes: Vec<Key>,
    removed_nodes: Vec<Key>,
    inserted_links: Vec<Key>,
    touched_links: Vec<Key>,
    removed_links: Vec<Key>,
    model_data_changed: bool,
}

fn push_unique(keys: &mut Vec<Key>, key: Key) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}

impl Transaction {
    fn begin(widget: &SlintDiagramWidget) -> Self {
        Self {
            base_nodes: widget.nodes.clone(),
            base_links: widget.links.clone(),
            base_model_data: widget.model_data,
            inserted_nodes: Vec::new(),
            touched_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            inserted_links: Vec::new(),
            touched_links: Vec::new(),
            removed_links: Vec::new(),
            model_data_changed: false,
        }
    }

    fn insert(&mut self, kind: RecordKind, key: Key) {
        let (inserted, touched) = match kind {
            RecordKind::Node => (&mut self.inserted_nodes, &mut self.touched_nodes),
            RecordKind::Link => (&mut self.inserted_links, &mut self.touched_links),
        };
        push_unique(inserted, key);
        push_unique(touched, key);
    }

    fn touch(&mut self, kind: RecordKind, key: Key) {
        match kind {
            RecordKind::Node => push_unique(&mut self.touched_nodes, key),
            RecordKind::Link => push_unique(&mut self.touched_links, key),
        }
    }

    /// A record inserted and removed within the same transaction never
    /// existed as far as observers are concerned.
    fn remove(&mut self, kind: RecordKind, key: Key) {
        let (inserted, touched, removed) = match kind {
            RecordKind::Node => (&mut self.inserted_nodes, &mut self.touched_nodes, &mut self.removed_nodes),
            RecordKind::Link => (&mut self.inserted_links, &mut self.touched_links, &mut self.removed_links),
        };
        touched.retain(|&k| k != key);
        if inserted.contains(&key) {
            inserted.retain(|&k| k != key);
        } else {
            push_unique(removed, key);
        }
    }
}

// ============================================================================
// SlintDiagramWidget
// ============================================================================

/// Widget-side document plus the Slint models a front-end binds to.
pub struct SlintDiagramWidget {
    nodes: Vec<NodeRecord>,
    links: Vec<LinkRecord>,
    model_data: ModelData,
    node_items: Rc<VecModel<NodeItem>>,
    link_items: Rc<VecModel<LinkItem>>,
    node_syncers: Vec<Box<dyn ModelSyncer<NodeRecord>>>,
    link_syncers: Vec<Box<dyn ModelSyncer<LinkRecord>>>,
    selection: Option<(RecordKind, Key)>,
    listeners: Vec<(ListenerId, SelectionListener)>,
    next_listener: u64,
    transaction: Option<Transaction>,
    committed: Vec<IncrementalDelta>,
    new_node_label: String,
    new_node_color: String,
}

impl Default for SlintDiagramWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl SlintDiagramWidget {
    pub fn new() -> Self {
        Self::with_settings(&EditorSettings::default())
    }

    /// Create an empty widget; `settings` supplies the click-create style.
    pub fn with_settings(settings: &EditorSettings) -> Self {
        let node_items = Rc::new(VecModel::default());
        let link_items = Rc::new(VecModel::default());
        let node_syncer = ConcreteModelSyncer {
            model: node_items.clone(),
            constructor: |node: &NodeRecord, _: bool| NodeItem::from_record(node),
        };
        let link_syncer = ConcreteModelSyncer {
            model: link_items.clone(),
            constructor: LinkItem::from_record,
        };
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            model_data: ModelData::default(),
            node_items,
            link_items,
            node_syncers: vec![Box::new(node_syncer)],
            link_syncers: vec![Box::new(link_syncer)],
            selection: None,
            listeners: Vec::new(),
            next_listener: 1,
            transaction: None,
            committed: Vec::new(),
            new_node_label: settings.new_node_label.clone(),
            new_node_color: settings.new_node_color.clone(),
        }
    }

    // === Model binding ===

    /// Keep `model` in step with the node list.
    ///
    /// `constructor` builds the front-end's row type, typically the struct
    /// generated by `slint::include_modules!()`. The model is filled at once
    /// and rewritten on every change after that.
    ///
    /// ```ignore
    /// let nodes = Rc::new(VecModel::<NodeData>::default());
    /// widget.bind_node_model(nodes.clone(), |node| NodeData {
    ///     key: node.key,
    ///     label: node.label.as_str().into(),
    ///     left_ports: port_rows(&node.left, |port_id, color| PortData { port_id, color }),
    ///     ..Default::default()
    /// });
    /// window.set_nodes(ModelRc::from(nodes));
    /// ```
    pub fn bind_node_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&NodeRecord) -> P + 'static,
    {
        let syncer = ConcreteModelSyncer {
            model,
            constructor: move |node: &NodeRecord, _: bool| constructor(node),
        };
        syncer.sync(&self.nodes, self.model_data.can_relink);
        self.node_syncers.push(Box::new(syncer));
    }

    /// Keep `model` in step with the link list.
    ///
    /// `constructor` receives each link and whether it may be re-drawn.
    pub fn bind_link_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&LinkRecord, bool) -> P + 'static,
    {
        let syncer = ConcreteModelSyncer { model, constructor };
        syncer.sync(&self.links, self.model_data.can_relink);
        self.link_syncers.push(Box::new(syncer));
    }

    // === Accessors ===

    /// The widget's own node rows.
    pub fn node_items(&self) -> ModelRc<NodeItem> {
        ModelRc::from(self.node_items.clone())
    }

    /// The widget's own link rows.
    pub fn link_items(&self) -> ModelRc<LinkItem> {
        ModelRc::from(self.link_items.clone())
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    pub fn model_data(&self) -> ModelData {
        self.model_data
    }

    pub fn selection(&self) -> Option<(RecordKind, Key)> {
        self.selection
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Number of committed deltas waiting to be taken.
    pub fn pending_changes(&self) -> usize {
        self.committed.len()
    }

    fn node_pos(&self, key: Key) -> Option<usize> {
        self.nodes.iter().position(|n| n.key == key)
    }

    fn link_pos(&self, key: Key) -> Option<usize> {
        self.links.iter().position(|l| l.key == key)
    }

    // === Key generation ===

    /// Whether `key` is in use, or was removed in the open transaction.
    ///
    /// A key freed inside a transaction stays reserved until it commits;
    /// otherwise one delta would insert and remove the same key.
    fn key_taken(&self, kind: RecordKind, key: Key) -> bool {
        let present = match kind {
            RecordKind::Node => self.node_pos(key).is_some(),
            RecordKind::Link => self.link_pos(key).is_some(),
        };
        present
            || self.transaction.as_ref().map_or(false, |tx| match kind {
                RecordKind::Node => tx.removed_nodes.contains(&key),
                RecordKind::Link => tx.removed_links.contains(&key),
            })
    }

    /// Smallest free node key counting up from 1.
    fn unique_node_key(&self) -> Key {
        let mut key = 1;
        while self.key_taken(RecordKind::Node, key) {
            key += 1;
        }
        key
    }

    /// Largest free link key counting down from -1.
    fn unique_link_key(&self) -> Key {
        let mut key = -1;
        while self.key_taken(RecordKind::Link, key) {
            key -= 1;
        }
        key
    }

    // === Selection ===

    /// Change the widget selection and notify listeners in registration order.
    pub fn select(&mut self, target: Option<(RecordKind, Key)>) {
        if self.selection == target {
            return;
        }
        self.selection = target;
        trace!(?target, listeners = self.listeners.len(), "widget selection changed");
        for (_, listener) in &mut self.listeners {
            listener(target);
        }
    }

    // === Transactions ===

    /// Begin grouping user edits. Nested calls join the open transaction.
    pub fn start_transaction(&mut self) {
        if self.transaction.is_none() {
            self.transaction = Some(Transaction::begin(self));
        }
    }

    /// Close the open transaction, queuing its delta if it changed anything.
    pub fn commit_transaction(&mut self) -> Result<(), WidgetError> {
        let tx = self.transaction.take().ok_or(WidgetError::NoTransaction)?;

        let delta = IncrementalDelta {
            inserted_node_keys: tx.inserted_nodes,
            modified_node_data: tx
                .touched_nodes
                .iter()
                .filter_map(|&k| self.node_pos(k).map(|i| self.nodes[i].clone()))
                .collect(),
            removed_node_keys: tx.removed_nodes,
            inserted_link_keys: tx.inserted_links,
            modified_link_data: tx
                .touched_links
                .iter()
                .filter_map(|&k| self.link_pos(k).map(|i| self.links[i].clone()))
                .collect(),
            removed_link_keys: tx.removed_links,
            model_data: tx.model_data_changed.then_some(self.model_data),
        };

        if !delta.is_empty() {
            debug!(
                inserted_nodes = delta.inserted_node_keys.len(),
                modified_nodes = delta.modified_node_data.len(),
                removed_nodes = delta.removed_node_keys.len(),
                inserted_links = delta.inserted_link_keys.len(),
                removed_links = delta.removed_link_keys.len(),
                "widget transaction committed"
            );
            self.committed.push(delta);
        }
        Ok(())
    }

    /// Discard the open transaction and restore the state it started from.
    pub fn rollback_transaction(&mut self) -> Result<(), WidgetError> {
        let tx = self.transaction.take().ok_or(WidgetError::NoTransaction)?;
        self.nodes = tx.base_nodes;
        self.links = tx.base_links;
        self.model_data = tx.base_model_data;
        self.refresh_node_items();
        self.refresh_link_items();
        debug!("widget transaction rolled back");
        Ok(())
    }

    /// Run `edit` inside the open transaction, or inside its own one.
    fn edit<T>(&mut self, edit: impl FnOnce(&mut Self) -> Result<T, WidgetError>) -> Result<T, WidgetError> {
        let own = self.transaction.is_none();
        if own {
            self.start_transaction();
        }
        let result = edit(self);
        if own {
            match &result {
                Ok(_) => self.commit_transaction()?,
                Err(_) => self.rollback_transaction()?,
            }
        }
        result
    }

    fn record(&mut self, f: impl FnOnce(&mut Transaction)) {
        if let Some(tx) = self.transaction.as_mut() {
            f(tx);
        }
    }

    // === User gestures ===

    /// Click on empty canvas: create a node from the archetype at `(x, y)`.
    pub fn create_node_at(&mut self, x: f64, y: f64) -> Result<Key, WidgetError> {
        self.edit(|w| {
            let key = w.unique_node_key();
            let node = NodeRecord::new(
                key,
                w.new_node_label.clone(),
                w.new_node_color.clone(),
                Location::new(x, y),
            );
            w.nodes.push(node);
            w.record(|tx| tx.insert(RecordKind::Node, key));
            w.refresh_node_items();
            Ok(key)
        })
    }

    /// Drag a node to a new location.
    pub fn move_node(&mut self, key: Key, x: f64, y: f64) -> Result<(), WidgetError> {
        self.edit(|w| {
            let pos = w.node_pos(key).ok_or(WidgetError::UnknownNode(key))?;
            w.nodes[pos].location = Location::new(x, y);
            w.record(|tx| tx.touch(RecordKind::Node, key));
            w.refresh_node_row(pos);
            Ok(())
        })
    }

    /// Finish an inline label edit.
    pub fn edit_node_label(&mut self, key: Key, label: &str) -> Result<(), WidgetError> {
        self.edit(|w| {
            let pos = w.node_pos(key).ok_or(WidgetError::UnknownNode(key))?;
            w.nodes[pos].label = label.to_string();
            w.record(|tx| tx.touch(RecordKind::Node, key));
            w.refresh_node_row(pos);
            Ok(())
        })
    }

    fn check_endpoint(&self, node: Key, port: Option<&str>) -> Result<(), WidgetError> {
        let pos = self.node_pos(node).ok_or(WidgetError::UnknownNode(node))?;
        match port {
            Some(port) if !self.nodes[pos].has_port(port) => Err(WidgetError::UnknownPort {
                node,
                port: port.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Draw a new link. Returns its (negative) key.
    pub fn connect(
        &mut self,
        from: Key,
        from_port: Option<&str>,
        to: Key,
        to_port: Option<&str>,
    ) -> Result<Key, WidgetError> {
        self.check_endpoint(from, from_port)?;
        self.check_endpoint(to, to_port)?;
        self.edit(|w| {
            let key = w.unique_link_key();
            w.links.push(LinkRecord {
                key,
                from,
                to,
                from_port: from_port.map(str::to_string),
                to_port: to_port.map(str::to_string),
            });
            w.record(|tx| tx.insert(RecordKind::Link, key));
            w.refresh_link_items();
            Ok(key)
        })
    }

    /// Re-draw an existing link to new endpoints.
    pub fn relink(
        &mut self,
        key: Key,
        from: Key,
        from_port: Option<&str>,
        to: Key,
        to_port: Option<&str>,
    ) -> Result<(), WidgetError> {
        if !self.model_data.can_relink {
            warn!(key, "relink rejected, relinking disabled");
            return Err(WidgetError::RelinkDisabled);
        }
        let pos = self.link_pos(key).ok_or(WidgetError::UnknownLink(key))?;
        self.check_endpoint(from, from_port)?;
        self.check_endpoint(to, to_port)?;
        self.edit(|w| {
            let link = &mut w.links[pos];
            link.from = from;
            link.to = to;
            link.from_port = from_port.map(str::to_string);
            link.to_port = to_port.map(str::to_string);
            w.record(|tx| tx.touch(RecordKind::Link, key));
            w.refresh_link_items();
            Ok(())
        })
    }

    /// Delete a node and every link attached to it.
    pub fn delete_node(&mut self, key: Key) -> Result<(), WidgetError> {
        self.node_pos(key).ok_or(WidgetError::UnknownNode(key))?;
        self.edit(|w| {
            let attached: Vec<Key> = w.links.iter().filter(|l| l.touches(key)).map(|l| l.key).collect();
            w.links.retain(|l| !l.touches(key));
            w.nodes.retain(|n| n.key != key);
            w.record(|tx| {
                for &link in &attached {
                    tx.remove(RecordKind::Link, link);
                }
                tx.remove(RecordKind::Node, key);
            });
            w.refresh_node_items();
            w.refresh_link_items();
            Ok(attached)
        })
        .map(|attached| {
            let selected_gone = match self.selection {
                Some((RecordKind::Node, k)) => k == key,
                Some((RecordKind::Link, k)) => attached.contains(&k),
                None => false,
            };
            if selected_gone {
                self.select(None);
            }
        })
    }

    /// Delete a single link.
    pub fn delete_link(&mut self, key: Key) -> Result<(), WidgetError> {
        self.link_pos(key).ok_or(WidgetError::UnknownLink(key))?;
        self.edit(|w| {
            w.links.retain(|l| l.key != key);
            w.record(|tx| tx.remove(RecordKind::Link, key));
            w.refresh_link_items();
            Ok(())
        })?;
        if self.selection == Some((RecordKind::Link, key)) {
            self.select(None);
        }
        Ok(())
    }

    /// Change model data from inside the widget.
    pub fn set_can_relink(&mut self, allowed: bool) -> Result<(), WidgetError> {
        self.edit(|w| {
            if w.model_data.can_relink != allowed {
                w.model_data = ModelData { can_relink: allowed };
                w.record(|tx| tx.model_data_changed = true);
                w.refresh_link_items();
            }
            Ok(())
        })
    }

    // === Model refresh ===

    fn refresh_node_items(&self) {
        let relinkable = self.model_data.can_relink;
        for syncer in &self.node_syncers {
            syncer.sync(&self.nodes, relinkable);
        }
    }

    fn refresh_node_row(&self, pos: usize) {
        let relinkable = self.model_data.can_relink;
        for syncer in &self.node_syncers {
            if !syncer.sync_row(pos, &self.nodes[pos], relinkable) {
                syncer.sync(&self.nodes, relinkable);
            }
        }
    }

    fn refresh_link_items(&self) {
        let relinkable = self.model_data.can_relink;
        for syncer in &self.link_syncers {
            syncer.sync(&self.links, relinkable);
        }
    }
}

impl DiagramWidget for SlintDiagramWidget {
    fn replace_nodes(&mut self, nodes: &[NodeRecord]) {
        self.nodes = nodes.to_vec();
        if let Some((RecordKind::Node, key)) = self.selection {
            if self.node_pos(key).is_none() {
                self.selection = None;
            }
        }
        self.refresh_node_items();
    }

    fn replace_links(&mut self, links: &[LinkRecord]) {
        self.links = links.to_vec();
        if let Some((RecordKind::Link, key)) = self.selection {
            if self.link_pos(key).is_none() {
                self.selection = None;
            }
        }
        self.refresh_link_items();
    }

    fn replace_model_data(&mut self, model_data: ModelData) {
        self.model_data = model_data;
        self.refresh_link_items();
    }

    fn add_selection_listener(&mut self, listener: SelectionListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    fn remove_selection_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    fn take_changes(&mut self) -> Vec<IncrementalDelta> {
        std::mem::take(&mut self.committed)
    }
}
