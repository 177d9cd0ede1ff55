//! Output types for React frontend consumption.
//!
//! These structs are serialized to JSON and sent to the React frontend,
//! which draws bodies, orbit rings and the detail panel from them.

use serde::Serialize;

use crate::model::{Node, NodeId, NodeKind, PointF, Status};
use crate::reparent::SnapPreview;

/// A body ready for React to draw
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub status: Status,
    pub progress: u32,
    /// Scene position (the cursor while this node is being dragged)
    pub position: PointF,
    /// Body radius, already multiplied by the zoom scale
    pub radius: f64,
    pub selected: bool,
    pub dragging: bool,
}

/// Dashed ring drawn around a node's anchor
#[derive(Debug, Clone, Serialize)]
pub struct OrbitOutput {
    pub node: NodeId,
    pub center: PointF,
    pub radius: f64,
}

/// Full record of the selected node for the detail panel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOutput {
    pub node: Node,
    /// `None` when the budget is zero (rendered as "N/A")
    pub budget_utilization: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// The combined output sent to React
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOutput {
    pub scale: f64,
    pub center: PointF,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orbits: Vec<OrbitOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<SnapPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl MapOutput {
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(ErrorInfo { message: message.into() }),
            ..Self::default()
        }
    }
}
