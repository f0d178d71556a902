//! Node, link and port records plus the model-level flags.
//!
//! Field names serialize the way a JavaScript diagram model stores them
//! (`text1`, `loc`, `leftArray`, `fromPort`, ...), so incremental deltas
//! produced by such a model deserialize straight into these types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Record key. Node keys are `>= 0`, link keys are `< 0`.
pub type Key = i32;

/// Which list a record lives in.
///
/// The sign of a key decides its kind. That convention is upheld by the
/// widget's key generators and is decoded only through [`RecordKind::of_key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Node,
    Link,
}

impl RecordKind {
    /// Kind implied by the key sign: negative keys are links.
    pub fn of_key(key: Key) -> Self {
        if key < 0 {
            RecordKind::Link
        } else {
            RecordKind::Node
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Link => write!(f, "link"),
        }
    }
}

// ============================================================================
// Location
// ============================================================================

/// A 2D point, stored as `"x y"` in serialized records.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Parse the `"x y"` form.
    pub fn parse(s: &str) -> Result<Self, LocationParseError> {
        let mut parts = s.split_whitespace();
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(LocationParseError::new(s));
        };
        let x = x.parse::<f64>().map_err(|_| LocationParseError::new(s))?;
        let y = y.parse::<f64>().map_err(|_| LocationParseError::new(s))?;
        Ok(Self { x, y })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl FromStr for Location {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Location::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A location string that is not two whitespace-separated numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationParseError {
    input: String,
}

impl LocationParseError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for LocationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid location {:?}, expected \"x y\"", self.input)
    }
}

impl std::error::Error for LocationParseError {}

// ============================================================================
// Ports
// ============================================================================

/// One attachment point on a node side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    pub port_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_color: Option<String>,
}

impl PortRecord {
    pub fn new(port_id: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            port_color: None,
        }
    }
}

/// The four node sides that carry a port list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl PortSide {
    pub const ALL: [PortSide; 4] = [PortSide::Left, PortSide::Right, PortSide::Top, PortSide::Bottom];

    /// Accepts `left|right|top|bottom` and the array-name form (`leftArray`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "left" | "leftArray" => Some(Self::Left),
            "right" | "rightArray" => Some(Self::Right),
            "top" | "topArray" => Some(Self::Top),
            "bottom" | "bottomArray" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for PortSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Nodes and links
// ============================================================================

/// A diagram vertex with four side port lists.
///
/// The label serializes as `text1`. On input a bare `text` is accepted as a
/// fallback, and a record carrying both keeps `text1`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRecordInput")]
pub struct NodeRecord {
    pub key: Key,
    #[serde(rename = "text1")]
    pub label: String,
    pub color: String,
    #[serde(rename = "loc")]
    pub location: Location,
    #[serde(rename = "leftArray")]
    pub left: Vec<PortRecord>,
    #[serde(rename = "rightArray")]
    pub right: Vec<PortRecord>,
    #[serde(rename = "topArray")]
    pub top: Vec<PortRecord>,
    #[serde(rename = "bottomArray")]
    pub bottom: Vec<PortRecord>,
}

impl NodeRecord {
    pub fn new(key: Key, label: impl Into<String>, color: impl Into<String>, location: Location) -> Self {
        Self {
            key,
            label: label.into(),
            color: color.into(),
            location,
            ..Default::default()
        }
    }

    pub fn ports(&self, side: PortSide) -> &[PortRecord] {
        match side {
            PortSide::Left => &self.left,
            PortSide::Right => &self.right,
            PortSide::Top => &self.top,
            PortSide::Bottom => &self.bottom,
        }
    }

    pub fn ports_mut(&mut self, side: PortSide) -> &mut Vec<PortRecord> {
        match side {
            PortSide::Left => &mut self.left,
            PortSide::Right => &mut self.right,
            PortSide::Top => &mut self.top,
            PortSide::Bottom => &mut self.bottom,
        }
    }

    /// Whether any side carries a port with this id.
    pub fn has_port(&self, port_id: &str) -> bool {
        PortSide::ALL
            .iter()
            .any(|&side| self.ports(side).iter().any(|p| p.port_id == port_id))
    }
}

#[derive(Deserialize)]
struct NodeRecordInput {
    key: Key,
    #[serde(default)]
    text1: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    color: String,
    #[serde(default)]
    loc: Location,
    #[serde(rename = "leftArray", default)]
    left: Vec<PortRecord>,
    #[serde(rename = "rightArray", default)]
    right: Vec<PortRecord>,
    #[serde(rename = "topArray", default)]
    top: Vec<PortRecord>,
    #[serde(rename = "bottomArray", default)]
    bottom: Vec<PortRecord>,
}

impl From<NodeRecordInput> for NodeRecord {
    fn from(input: NodeRecordInput) -> Self {
        Self {
            key: input.key,
            label: input.text1.or(input.text).unwrap_or_default(),
            color: input.color,
            location: input.loc,
            left: input.left,
            right: input.right,
            top: input.top,
            bottom: input.bottom,
        }
    }
}

/// A directed edge between two node keys, optionally pinned to ports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub key: Key,
    pub from: Key,
    pub to: Key,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<String>,
}

impl LinkRecord {
    pub fn new(key: Key, from: Key, to: Key) -> Self {
        Self {
            key,
            from,
            to,
            from_port: None,
            to_port: None,
        }
    }

    pub fn with_ports(mut self, from_port: impl Into<String>, to_port: impl Into<String>) -> Self {
        self.from_port = Some(from_port.into());
        self.to_port = Some(to_port.into());
        self
    }

    /// Whether either end of the link is attached to `node`.
    pub fn touches(&self, node: Key) -> bool {
        self.from == node || self.to == node
    }
}

/// Model-level flags shared by every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelData {
    #[serde(default = "default_can_relink")]
    pub can_relink: bool,
}

fn default_can_relink() -> bool {
    true
}

impl Default for ModelData {
    fn default() -> Self {
        Self { can_relink: true }
    }
}

/// Common access to the key of either record type.
pub trait Keyed {
    fn key(&self) -> Key;
}

impl Keyed for NodeRecord {
    fn key(&self) -> Key {
        self.key
    }
}

impl Keyed for LinkRecord {
    fn key(&self) -> Key {
        self.key
    }
}
