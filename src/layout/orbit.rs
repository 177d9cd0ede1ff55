// Angular distribution of siblings on a ring.
//
// Siblings (nodes sharing an effective parent) are spread evenly, 2π/n apart,
// in document order, starting at 12 o'clock. Each depth level is rotated by
// `ring_stagger` so moons don't sit on the ray through their planet.
// The caller may add a `phase` for slow rotation; it is an input, never state.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::model::{Node, NodeId, NodeSet, ParentKey, PointF};

/// A node's seat among its siblings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub count: usize,
}

impl Slot {
    pub const ALONE: Slot = Slot { index: 0, count: 1 };
}

/// Angle (radians) of slot `slot` on a ring at tree depth `depth`.
pub fn orbit_angle(slot: Slot, depth: usize, phase: f64, stagger: f64) -> f64 {
    let count = slot.count.max(1) as f64;
    -FRAC_PI_2 + phase + depth as f64 * stagger + TAU * slot.index as f64 / count
}

/// Slot of a single node, found by scanning its siblings.
pub fn slot_of(node: &Node, nodes: &NodeSet) -> Slot {
    let siblings = nodes.siblings(node);
    let index = siblings.iter().position(|n| n.id == node.id).unwrap_or(0);
    Slot { index, count: siblings.len().max(1) }
}

/// Slots for every non-sun node in one pass.
pub fn sibling_slots(nodes: &NodeSet) -> HashMap<&NodeId, Slot> {
    let mut counts: HashMap<ParentKey<'_>, usize> = HashMap::new();
    for n in nodes.iter() {
        if let Some(key) = nodes.parent_key(n) {
            *counts.entry(key).or_default() += 1;
        }
    }

    let mut next: HashMap<ParentKey<'_>, usize> = HashMap::new();
    let mut slots = HashMap::with_capacity(nodes.len());
    for n in nodes.iter() {
        let Some(key) = nodes.parent_key(n) else { continue };
        let index = next.entry(key).or_default();
        slots.entry(&n.id).or_insert(Slot { index: *index, count: counts[&key] });
        *index += 1;
    }
    slots
}

/// Place `node` on its ring around `anchor`.
pub fn place(anchor: PointF, node: &Node, slot: Slot, depth: usize, scale: f64, phase: f64, stagger: f64) -> PointF {
    let angle = orbit_angle(slot, depth, phase, stagger);
    anchor.polar_offset(node.orbit * scale, angle)
}
