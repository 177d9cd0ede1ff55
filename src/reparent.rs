//! Drag-release snapping.
//!
//! Two rules, evaluated against the node-set snapshot at release time:
//! - a planet dropped close to another planet becomes its moon;
//! - a moon dragged far from its parent becomes a planet again.
//!
//! The sun never moves. `preview_reparenting` runs on every pointer move and
//! only reports what would happen; `resolve_reparenting` turns that into a
//! `Mutation` to commit.
//!
//! The detail panel's link/unlink actions produce the same `Mutation` type
//! with fixed orbits instead of distance rules.

use serde::Serialize;

use crate::error::{OrbitError, Result};
use crate::layout::{compute_position, Frame, LayoutConfig};
use crate::model::{Node, NodeId, NodeKind, NodeSet, ParentRef, PointF};

/// Type/parent/orbit change produced by a drop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub parent_id: ParentRef,
    pub orbit: f64,
}

impl Mutation {
    /// The replacement node: `node` with this mutation's type, parent and orbit.
    pub fn apply(&self, node: &Node) -> Node {
        Node {
            kind: self.kind,
            parent_id: self.parent_id.clone(),
            orbit: self.orbit,
            ..node.clone()
        }
    }
}

/// What releasing the pointer right now would do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SnapPreview {
    /// Nothing changes; the node snaps back to its ring.
    Stay,
    /// The dragged planet would become a moon of `parent`.
    BecomeMoon { parent: NodeId, distance: f64 },
    /// The dragged moon would break free and orbit the center.
    BecomePlanet { distance: f64 },
}

/// Evaluate the snap rules without building a mutation.
pub fn preview_reparenting(
    dragged: &Node,
    cursor: PointF,
    nodes: &NodeSet,
    frame: &Frame,
    cfg: &LayoutConfig,
) -> SnapPreview {
    match dragged.kind {
        NodeKind::Sun => SnapPreview::Stay,
        NodeKind::Planet => nearest_planet(dragged, cursor, nodes, frame, cfg)
            .filter(|(_, d)| *d < cfg.snap_threshold)
            .map_or(SnapPreview::Stay, |(parent, distance)| SnapPreview::BecomeMoon {
                parent: parent.id.clone(),
                distance,
            }),
        NodeKind::Moon => {
            let Some(parent) = dragged.parent_id.node_id().and_then(|id| nodes.get(id)) else {
                return SnapPreview::Stay;
            };
            let distance = cursor.distance(&compute_position(parent, nodes, frame, cfg));
            if distance > 2.0 * cfg.snap_threshold {
                SnapPreview::BecomePlanet { distance }
            } else {
                SnapPreview::Stay
            }
        }
    }
}

/// Decide the new type/parent/orbit for a node dropped at `cursor`.
/// `None` means the drop changes nothing.
pub fn resolve_reparenting(
    dragged: &Node,
    cursor: PointF,
    nodes: &NodeSet,
    frame: &Frame,
    cfg: &LayoutConfig,
) -> Option<Mutation> {
    match preview_reparenting(dragged, cursor, nodes, frame, cfg) {
        SnapPreview::Stay => None,
        SnapPreview::BecomeMoon { parent, .. } => {
            let existing = nodes.count_moons_of(&parent);
            Some(Mutation {
                kind: NodeKind::Moon,
                orbit: cfg.moon_base_orbit + cfg.moon_orbit_step * existing as f64,
                parent_id: ParentRef::Node(parent),
            })
        }
        SnapPreview::BecomePlanet { .. } => Some(Mutation {
            kind: NodeKind::Planet,
            parent_id: ParentRef::Root,
            orbit: cfg.planet_base_orbit + cfg.planet_orbit_step * nodes.count_planets() as f64,
        }),
    }
}

/// Closest planet to `cursor` that `dragged` may orbit.
/// Ties keep the planet that comes first in document order.
fn nearest_planet<'a>(
    dragged: &Node,
    cursor: PointF,
    nodes: &'a NodeSet,
    frame: &Frame,
    cfg: &LayoutConfig,
) -> Option<(&'a Node, f64)> {
    let mut best: Option<(&Node, f64)> = None;
    for candidate in nodes.iter() {
        if candidate.kind != NodeKind::Planet
            || candidate.id == dragged.id
            || nodes.is_descendant_of(&dragged.id, &candidate.id)
        {
            continue;
        }
        let d = cursor.distance(&compute_position(candidate, nodes, frame, cfg));
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((candidate, d));
        }
    }
    best
}

/// Detail-panel "link": make `node` a moon of `parent` on the fixed link ring.
pub fn link_as_moon(node: &Node, parent: &NodeId, nodes: &NodeSet, cfg: &LayoutConfig) -> Result<Mutation> {
    if node.is_sun() {
        return Err(OrbitError::SunIsFixed);
    }
    let target = nodes.get(parent).ok_or_else(|| OrbitError::UnknownNode(parent.clone()))?;
    if target.is_sun() {
        return Err(OrbitError::InvalidParent {
            node: node.id.clone(),
            parent: parent.to_string(),
            reason: "moons orbit a planet or another moon",
        });
    }
    if target.id == node.id || nodes.is_descendant_of(&node.id, &target.id) {
        return Err(OrbitError::Cycle(node.id.clone()));
    }
    Ok(Mutation {
        kind: NodeKind::Moon,
        parent_id: ParentRef::Node(target.id.clone()),
        orbit: cfg.linked_moon_orbit,
    })
}

/// Detail-panel "unlink": make `node` a planet just outside the outermost planet ring.
pub fn unlink_to_planet(node: &Node, nodes: &NodeSet, cfg: &LayoutConfig) -> Result<Mutation> {
    if node.is_sun() {
        return Err(OrbitError::SunIsFixed);
    }
    let outermost = nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Planet)
        .map(|n| n.orbit)
        .fold(0.0_f64, f64::max);
    Ok(Mutation {
        kind: NodeKind::Planet,
        parent_id: ParentRef::Root,
        orbit: outermost + cfg.unlinked_planet_gap,
    })
}
