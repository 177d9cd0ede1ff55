// Orbital layout engine.
//
// Goals:
// - Pure: a position depends only on (node, node set, frame, config)
// - Deterministic: identical inputs give identical coordinates every tick
// - Sun at the viewport center; every other node on a ring of radius
//   `orbit * scale` around its parent's computed position
// - Arbitrary nesting depth (sun -> planet -> moon -> ...)
// - Broken ancestry (dangling parent id, cycle) falls back to the center
//
// Submodules:
// - orbit: angular distribution of siblings
// - viewport: display surface + zoom clamping
//
// Output:
// - LayoutResult with scene positions, ring anchors and body radii.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, Result};
use crate::model::{Ancestry, Node, NodeId, NodeKind, NodeSet, PointF};

pub mod orbit;
mod viewport;

pub use orbit::Slot;
pub use viewport::{Viewport, zoom_by_clamped, zoom_in, zoom_out};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Drop distance below which a planet snaps onto another planet.
    /// Moons break free beyond twice this distance.
    pub snap_threshold: f64,
    /// First moon ring around a planet.
    pub moon_base_orbit: f64,
    /// Extra radius per moon already orbiting the target.
    pub moon_orbit_step: f64,
    /// First planet ring around the sun.
    pub planet_base_orbit: f64,
    /// Extra radius per existing planet.
    pub planet_orbit_step: f64,
    /// Ring used when a node is linked to a parent from the detail panel.
    pub linked_moon_orbit: f64,
    /// Gap beyond the outermost planet when unlinking from the detail panel.
    pub unlinked_planet_gap: f64,
    pub zoom_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub initial_scale: f64,
    /// Rotation added per tree depth (radians).
    pub ring_stagger: f64,
    pub sun_radius: f64,
    pub planet_radius: f64,
    pub moon_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 100.0,
            moon_base_orbit: 60.0,
            moon_orbit_step: 30.0,
            planet_base_orbit: 180.0,
            planet_orbit_step: 100.0,
            linked_moon_orbit: 80.0,
            unlinked_planet_gap: 120.0,
            zoom_step: 1.2,
            min_scale: 0.5,
            max_scale: 2.0,
            initial_scale: 0.8,
            ring_stagger: std::f64::consts::FRAC_PI_6,
            sun_radius: 30.0,
            planet_radius: 20.0,
            moon_radius: 12.0,
        }
    }
}

impl LayoutConfig {
    /// Unscaled body radius for a node kind.
    pub fn body_radius(&self, kind: NodeKind) -> f64 {
        match kind {
            NodeKind::Sun => self.sun_radius,
            NodeKind::Planet => self.planet_radius,
            NodeKind::Moon => self.moon_radius,
        }
    }

    /// Reject values that would break zoom clamping or snapping.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_scale > 0.0 && self.max_scale.is_finite()) {
            return Err(OrbitError::InvalidConfig("scale range must be positive and finite"));
        }
        if self.min_scale > self.max_scale {
            return Err(OrbitError::InvalidConfig("minScale is above maxScale"));
        }
        if !(self.zoom_step > 0.0) {
            return Err(OrbitError::InvalidConfig("zoomStep must be positive"));
        }
        if !(self.snap_threshold >= 0.0) {
            return Err(OrbitError::InvalidConfig("snapThreshold must not be negative"));
        }
        Ok(())
    }
}

/// Everything about the current render frame that layout depends on.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub center: PointF,
    pub scale: f64,
    /// Optional rotation (radians) for a "live" look; 0 keeps the map still.
    #[serde(default)]
    pub phase: f64,
}

impl Frame {
    pub fn new(center: PointF, scale: f64) -> Self {
        Self { center, scale, phase: 0.0 }
    }

    pub fn with_phase(self, phase: f64) -> Self {
        Self { phase, ..self }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutResult {
    /// Scene position of every node.
    pub positions: HashMap<NodeId, PointF>,
    /// Position of the point each non-sun node orbits (its parent, or the center).
    pub anchors: HashMap<NodeId, PointF>,
    /// Body radius after scaling.
    pub radii: HashMap<NodeId, f64>,
}

/// Scene position of `node`.
///
/// Walks the ancestor chain once and places each link on its parent's ring.
/// Falls back to `frame.center` for the sun, for dangling parents and for
/// cyclic chains.
pub fn compute_position(node: &Node, nodes: &NodeSet, frame: &Frame, cfg: &LayoutConfig) -> PointF {
    let mut memo = HashMap::new();
    resolve(node, nodes, frame, cfg, &|n: &Node| orbit::slot_of(n, nodes), &mut memo)
}

/// Positions for the whole node set in one pass.
pub fn layout_nodes(nodes: &NodeSet, frame: &Frame, cfg: &LayoutConfig) -> LayoutResult {
    let slots = orbit::sibling_slots(nodes);
    let slot = |n: &Node| slots.get(&n.id).copied().unwrap_or(Slot::ALONE);

    let mut memo: HashMap<NodeId, PointF> = HashMap::with_capacity(nodes.len());
    let mut positions = HashMap::with_capacity(nodes.len());
    let mut radii = HashMap::with_capacity(nodes.len());
    for n in nodes.iter() {
        let p = resolve(n, nodes, frame, cfg, &slot, &mut memo);
        positions.entry(n.id.clone()).or_insert(p);
        radii.entry(n.id.clone()).or_insert(cfg.body_radius(n.kind) * frame.scale);
    }

    let mut anchors = HashMap::with_capacity(nodes.len());
    for n in nodes.iter().filter(|n| !n.is_sun()) {
        anchors.entry(n.id.clone()).or_insert_with(|| anchor_of(n, nodes, frame, &positions));
    }

    LayoutResult { positions, anchors, radii }
}

/// Scene position of the point `node` orbits, given already computed positions.
pub fn anchor_of(node: &Node, nodes: &NodeSet, frame: &Frame, positions: &HashMap<NodeId, PointF>) -> PointF {
    match node.parent_id.node_id() {
        Some(pid) if nodes.contains(pid) => positions.get(pid).copied().unwrap_or(frame.center),
        _ => frame.center,
    }
}

fn resolve(
    node: &Node,
    nodes: &NodeSet,
    frame: &Frame,
    cfg: &LayoutConfig,
    slot: &dyn Fn(&Node) -> Slot,
    memo: &mut HashMap<NodeId, PointF>,
) -> PointF {
    if node.is_sun() {
        return frame.center;
    }
    let chain = match nodes.ancestry(node) {
        Ancestry::Chain(chain) => chain,
        Ancestry::Dangling(parent) => {
            debug!("node `{}` has missing ancestor `{}`, placing at center", node.id, parent);
            return frame.center;
        }
        Ancestry::Cycle => {
            debug!("node `{}` has cyclic ancestry, placing at center", node.id);
            return frame.center;
        }
    };

    // chain[0] is `node`, chain[last] orbits the center.
    // Start below the deepest ancestor that is already placed.
    let mut pending = chain.len();
    let mut pos = frame.center;
    for (i, n) in chain.iter().enumerate() {
        if let Some(&p) = memo.get(&n.id) {
            pending = i;
            pos = p;
            break;
        }
    }

    let top = chain.len() - 1;
    for i in (0..pending).rev() {
        let n = chain[i];
        pos = orbit::place(pos, n, slot(n), top - i, frame.scale, frame.phase, cfg.ring_stagger);
        memo.insert(n.id.clone(), pos);
    }
    pos
}
