use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel parent id used by the dashboard for top-level planets.
pub const ROOT_PARENT: &str = "center";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Scene coordinates (screen units, y down).
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PointF) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point at `radius` from `self` in direction `angle` (radians).
    pub fn polar_offset(&self, radius: f64, angle: f64) -> PointF {
        PointF {
            x: self.x + radius * angle.cos(),
            y: self.y + radius * angle.sin(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Sun,
    Planet,
    Moon,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Sun => "sun",
            NodeKind::Planet => "planet",
            NodeKind::Moon => "moon",
        };
        f.write_str(s)
    }
}

/// Where a node hangs in the orbit tree.
///
/// On the wire this is a plain string: `"center"` (or a missing/null field)
/// means the conceptual root, anything else is another node's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ParentRef {
    #[default]
    Root,
    Node(NodeId),
}

impl ParentRef {
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            ParentRef::Root => None,
            ParentRef::Node(id) => Some(id),
        }
    }
}

impl From<Option<String>> for ParentRef {
    fn from(raw: Option<String>) -> Self {
        match raw {
            None => ParentRef::Root,
            Some(s) if s.is_empty() || s == ROOT_PARENT => ParentRef::Root,
            Some(s) => ParentRef::Node(NodeId(s)),
        }
    }
}

impl From<ParentRef> for Option<String> {
    fn from(parent: ParentRef) -> Self {
        match parent {
            ParentRef::Root => Some(ROOT_PARENT.to_string()),
            ParentRef::Node(id) => Some(id.0),
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Root => f.write_str(ROOT_PARENT),
            ParentRef::Node(id) => f.write_str(id.as_str()),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    OnTrack,
    AtRisk,
    Delayed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Status implied by a progress value.
    pub fn from_progress(progress: u32) -> Self {
        match progress {
            0 => TaskStatus::Pending,
            p if p >= 100 => TaskStatus::Completed,
            _ => TaskStatus::InProgress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub progress: u32,
    /// ISO date (`yyyy-MM-dd`)
    pub due_date: Option<String>,
    pub linked_kpis: Vec<String>,
    pub linked_milestones: Vec<String>,
    pub assignees: Vec<String>,
}

/// A sun, planet or moon on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub parent_id: ParentRef,
    /// Radius from the parent's position; unused for the sun.
    #[serde(default)]
    pub orbit: f64,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Panel-only data (team, kpis, risks, timeline ...), kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: &str, kind: NodeKind, parent_id: ParentRef, orbit: f64) -> Self {
        Self {
            id: NodeId::from(id),
            kind,
            parent_id,
            orbit,
            progress: 0,
            name: id.to_string(),
            description: None,
            category: None,
            status: Status::default(),
            budget: 0.0,
            spent: 0.0,
            tasks: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn sun(id: &str) -> Self {
        Self::new(id, NodeKind::Sun, ParentRef::Root, 0.0)
    }

    pub fn planet(id: &str, orbit: f64) -> Self {
        Self::new(id, NodeKind::Planet, ParentRef::Root, orbit)
    }

    pub fn moon(id: &str, parent: &str, orbit: f64) -> Self {
        Self::new(id, NodeKind::Moon, ParentRef::from(Some(parent.to_string())), orbit)
    }

    pub fn is_sun(&self) -> bool {
        self.kind == NodeKind::Sun
    }
}
