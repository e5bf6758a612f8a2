//! Generic graph records handed to the host graph store.
//!
//! Nodes and edges carry fresh UUIDs and open-ended typed properties. After
//! conversion the only field this crate touches again is the node position,
//! written by the layout engine and the final origin normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property key holding the source-file identifier of a person or family.
pub const SOURCE_ID_KEY: &str = "source_id";

/// Property key on edges grouping them by source family.
pub const FAMILY_ID_KEY: &str = "family_id";

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    /// Milliseconds since the Unix epoch.
    Date(i64),
}

impl PropertyValue {
    /// The text payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The timestamp payload, if this is a date value.
    #[must_use]
    pub fn as_date(&self) -> Option<i64> {
        match self {
            Self::Date(millis) => Some(*millis),
            _ => None,
        }
    }
}

/// A point-in-time (or ranged) entry on a node's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub label: String,
    /// Milliseconds since the Unix epoch.
    pub start: i64,
    /// Equal to `start` for instantaneous events.
    pub end: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Fill/stroke/text colors as CSS color strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub fill: String,
    pub stroke: String,
    pub text_color: String,
}

/// Top-left corner of a node in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One person as a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: Uuid,
    pub label: String,
    pub tags: Vec<String>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub events: Vec<TimelineEvent>,
    pub style: NodeStyle,
    pub position: Position,
    pub width: f64,
    pub height: f64,
}

/// Relationship carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    MarriedTo,
    ParentOf,
    SiblingOf,
}

/// Arrow direction of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    None,
    Forward,
    Backward,
    Both,
}

/// One relationship as a graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: Uuid,
    pub source: Uuid,
    pub target: Uuid,
    pub kind: EdgeKind,
    pub label: String,
    pub direction: EdgeDirection,
    pub tags: Vec<String>,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl GraphEdge {
    /// Source family identifier, when the converter recorded one.
    #[must_use]
    pub fn family_id(&self) -> Option<&str> {
        self.properties.get(FAMILY_ID_KEY).and_then(PropertyValue::as_text)
    }
}
