//! Application state for one orbital map.
//!
//! The session is the single owner of the node set. Input events (pointer,
//! zoom, resize, panel edits) arrive one at a time; each either commits a
//! fully validated new node set or leaves the old one untouched.

use log::{debug, info};

use crate::error::{OrbitError, Result};
use crate::layout::{self, layout_nodes, Frame, LayoutConfig, Viewport};
use crate::model::{Node, NodeId, NodeKind, NodeSet, PointF, Status};
use crate::output::{MapOutput, NodeOutput, OrbitOutput, SelectionOutput};
use crate::progress::{self, TaskDraft};
use crate::reparent::{self, Mutation, SnapPreview};

/// The gesture in progress, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub node: NodeId,
    /// Last pointer position; `None` until the first move.
    pub cursor: Option<PointF>,
    pub preview: SnapPreview,
}

#[derive(Debug, Clone)]
pub struct MapSession {
    nodes: NodeSet,
    viewport: Viewport,
    scale: f64,
    selected: Option<NodeId>,
    drag: Option<DragState>,
    config: LayoutConfig,
}

impl MapSession {
    /// Fails when `config` has an unusable scale range or zoom step.
    pub fn new(nodes: NodeSet, viewport: Viewport, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let scale = config.initial_scale.clamp(config.min_scale, config.max_scale);
        Ok(Self { nodes, viewport, scale, selected: None, drag: None, config })
    }

    pub fn nodes(&self) -> &NodeSet { &self.nodes }
    pub fn viewport(&self) -> Viewport { self.viewport }
    pub fn scale(&self) -> f64 { self.scale }
    pub fn config(&self) -> &LayoutConfig { &self.config }
    pub fn drag(&self) -> Option<&DragState> { self.drag.as_ref() }

    pub fn selected(&self) -> Option<&Node> {
        self.selected.as_ref().and_then(|id| self.nodes.get(id))
    }

    pub fn frame(&self) -> Frame {
        Frame::new(self.viewport.center(), self.scale)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.scale = layout::zoom_in(self.scale, &self.config);
        self.scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.scale = layout::zoom_out(self.scale, &self.config);
        self.scale
    }

    /// Select a node (or clear the selection with `None`).
    pub fn select(&mut self, id: Option<&NodeId>) -> Result<()> {
        match id {
            Some(id) if !self.nodes.contains(id) => Err(OrbitError::UnknownNode(id.clone())),
            _ => {
                self.selected = id.cloned();
                Ok(())
            }
        }
    }

    /// Pointer pressed on a node: select it and start a drag.
    pub fn pointer_down(&mut self, id: &NodeId) -> Result<()> {
        self.select(Some(id))?;
        self.drag = Some(DragState { node: id.clone(), cursor: None, preview: SnapPreview::Stay });
        Ok(())
    }

    /// Pointer moved during a drag. Returns the live snap preview; nothing is
    /// committed.
    pub fn pointer_move(&mut self, cursor: PointF) -> Option<SnapPreview> {
        let frame = self.frame();
        let drag = self.drag.as_mut()?;
        let node = self.nodes.get(&drag.node)?;
        drag.cursor = Some(cursor);
        drag.preview = reparent::preview_reparenting(node, cursor, &self.nodes, &frame, &self.config);
        Some(drag.preview.clone())
    }

    /// Pointer released: resolve the drop and commit the mutation, if any.
    /// The selection follows the updated node.
    pub fn pointer_up(&mut self, cursor: PointF) -> Result<Option<Mutation>> {
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };
        let node = self.nodes.get(&drag.node).ok_or_else(|| OrbitError::UnknownNode(drag.node.clone()))?;
        let Some(mutation) = reparent::resolve_reparenting(node, cursor, &self.nodes, &self.frame(), &self.config) else {
            debug!("drop of `{}` changes nothing", drag.node);
            return Ok(None);
        };

        let updated = mutation.apply(node);
        let from = node.kind;
        self.nodes.replace(updated)?;
        info!("`{}` is now a {} (was {}) orbiting {} at {}", drag.node, mutation.kind, from, mutation.parent_id, mutation.orbit);
        Ok(Some(mutation))
    }

    /// Abandon the gesture without a drop.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Whole-node replacement, validated before commit.
    pub fn update_node(&mut self, node: Node) -> Result<()> {
        self.nodes.replace(node)
    }

    pub fn save_task(&mut self, draft: TaskDraft, editing: Option<&str>) -> Result<()> {
        self.edit_selected(|n| progress::save_task(n, draft, editing))
    }

    pub fn remove_task(&mut self, task_id: &str) -> Result<()> {
        self.edit_selected(|n| progress::remove_task(n, task_id))
    }

    pub fn set_progress(&mut self, value: f64) -> Result<()> {
        self.edit_selected(|n| Ok(progress::set_progress(n, value)))
    }

    pub fn set_spent(&mut self, value: f64) -> Result<()> {
        self.edit_selected(|n| Ok(progress::set_spent(n, value)))
    }

    pub fn set_status(&mut self, status: Status) -> Result<()> {
        self.edit_selected(|n| Ok(progress::set_status(n, status)))
    }

    /// Make the selected node a moon of `parent`.
    pub fn link_selected(&mut self, parent: &NodeId) -> Result<Mutation> {
        let node = self.selected().ok_or(OrbitError::NoSelection)?;
        let mutation = reparent::link_as_moon(node, parent, &self.nodes, &self.config)?;
        let updated = mutation.apply(node);
        self.nodes.replace(updated)?;
        Ok(mutation)
    }

    /// Make the selected node a planet beyond the outermost ring.
    pub fn unlink_selected(&mut self) -> Result<Mutation> {
        let node = self.selected().ok_or(OrbitError::NoSelection)?;
        let mutation = reparent::unlink_to_planet(node, &self.nodes, &self.config)?;
        let updated = mutation.apply(node);
        self.nodes.replace(updated)?;
        Ok(mutation)
    }

    /// Delete a node; its children move up to its parent.
    pub fn delete_node(&mut self, id: &NodeId) -> Result<Node> {
        let removed = self.nodes.remove(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if self.drag.as_ref().is_some_and(|d| &d.node == id) {
            self.drag = None;
        }
        info!("deleted {} `{}`", removed.kind, removed.id);
        Ok(removed)
    }

    fn edit_selected(&mut self, edit: impl FnOnce(&Node) -> Result<Node>) -> Result<()> {
        let node = self.selected().ok_or(OrbitError::NoSelection)?;
        let updated = edit(node)?;
        self.nodes.replace(updated)
    }

    /// Everything the renderer needs for the next frame.
    pub fn snapshot(&self) -> MapOutput {
        let frame = self.frame();
        let layout = layout_nodes(&self.nodes, &frame, &self.config);
        let dragged = self.drag.as_ref().and_then(|d| d.cursor.map(|c| (&d.node, c)));

        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut orbits = Vec::with_capacity(self.nodes.len());
        for n in self.nodes.iter() {
            let dragging = dragged.is_some_and(|(id, _)| *id == n.id);
            let position = match dragged {
                Some((id, cursor)) if *id == n.id => cursor,
                _ => layout.positions.get(&n.id).copied().unwrap_or(frame.center),
            };
            if n.kind != NodeKind::Sun {
                let center = layout.anchors.get(&n.id).copied().unwrap_or(frame.center);
                orbits.push(OrbitOutput { node: n.id.clone(), center, radius: position.distance(&center) });
            }
            nodes.push(NodeOutput {
                id: n.id.clone(),
                kind: n.kind,
                name: n.name.clone(),
                category: n.category.clone(),
                status: n.status,
                progress: n.progress,
                position,
                radius: layout.radii.get(&n.id).copied().unwrap_or(0.0),
                selected: self.selected.as_ref() == Some(&n.id),
                dragging,
            });
        }

        MapOutput {
            scale: self.scale,
            center: frame.center,
            nodes,
            orbits,
            selection: self.selected().map(|n| SelectionOutput {
                node: n.clone(),
                budget_utilization: progress::budget_utilization(n),
            }),
            preview: self.drag.as_ref().map(|d| d.preview.clone()),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::layout::compute_position;
    use crate::model::ParentRef;

    fn session() -> MapSession {
        let nodes = NodeSet::validated(vec![
            Node::sun("sun"),
            Node::planet("p1", 180.0),
            Node::planet("p2", 280.0),
            Node::moon("m1", "p1", 60.0),
        ]).unwrap();
        let cfg = LayoutConfig { initial_scale: 1.0, ..LayoutConfig::default() };
        MapSession::new(nodes, Viewport::new(1000.0, 1000.0), cfg).unwrap()
    }

    fn position_of(s: &MapSession, id: &str) -> PointF {
        let node = s.nodes().get(&NodeId::from(id)).unwrap();
        compute_position(node, s.nodes(), &s.frame(), s.config())
    }

    #[test]
    fn test_initial_scale_from_config() {
        let nodes = NodeSet::validated(vec![Node::sun("sun")]).unwrap();
        let s = MapSession::new(nodes, Viewport::default(), LayoutConfig::default()).unwrap();
        assert_abs_diff_eq!(s.scale(), 0.8);
    }

    #[test]
    fn test_inverted_scale_range_is_rejected() {
        let nodes = NodeSet::validated(vec![Node::sun("sun")]).unwrap();
        let cfg: LayoutConfig = serde_json::from_str(r#"{ "minScale": 3.0 }"#).unwrap();
        let err = MapSession::new(nodes, Viewport::default(), cfg).unwrap_err();
        assert!(matches!(err, OrbitError::InvalidConfig(_)));
    }

    #[test]
    fn test_drag_planet_onto_planet() {
        let mut s = session();
        let p1 = position_of(&s, "p1");
        let p2 = NodeId::from("p2");

        s.pointer_down(&p2).unwrap();
        let preview = s.pointer_move(PointF::new(p1.x + 20.0, p1.y)).unwrap();
        assert!(matches!(preview, SnapPreview::BecomeMoon { .. }));
        // preview does not commit
        assert_eq!(s.nodes().get(&p2).unwrap().kind, NodeKind::Planet);

        let m = s.pointer_up(PointF::new(p1.x + 20.0, p1.y)).unwrap().unwrap();
        assert_eq!(m.kind, NodeKind::Moon);
        let p2_node = s.nodes().get(&p2).unwrap();
        assert_eq!(p2_node.parent_id, ParentRef::Node(NodeId::from("p1")));
        assert_abs_diff_eq!(p2_node.orbit, 90.0);
        assert_eq!(s.selected().unwrap().kind, NodeKind::Moon);
        assert!(s.drag().is_none());
    }

    #[test]
    fn test_drop_without_target_changes_nothing() {
        let mut s = session();
        let before = s.nodes().nodes().to_vec();
        s.pointer_down(&NodeId::from("p2")).unwrap();
        assert_eq!(s.pointer_up(PointF::new(0.0, 0.0)).unwrap(), None);
        assert_eq!(s.nodes().nodes(), &before[..]);
    }

    #[test]
    fn test_pointer_up_without_drag() {
        let mut s = session();
        assert_eq!(s.pointer_up(PointF::new(1.0, 1.0)).unwrap(), None);
        assert!(s.pointer_move(PointF::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_snapshot_draws_dragged_node_at_cursor() {
        let mut s = session();
        s.pointer_down(&NodeId::from("m1")).unwrap();
        s.pointer_move(PointF::new(10.0, 20.0));
        let out = s.snapshot();
        let m1 = out.nodes.iter().find(|n| n.id == NodeId::from("m1")).unwrap();
        assert!(m1.dragging);
        assert_eq!(m1.position, PointF::new(10.0, 20.0));
        let ring = out.orbits.iter().find(|o| o.node == NodeId::from("m1")).unwrap();
        assert_abs_diff_eq!(ring.radius, PointF::new(10.0, 20.0).distance(&ring.center), epsilon = 1e-9);
        assert!(matches!(out.preview, Some(SnapPreview::BecomePlanet { .. })));
        assert_eq!(out.nodes.len(), 4);
        assert_eq!(out.orbits.len(), 3);
    }

    #[test]
    fn test_task_edits_on_selection() {
        let mut s = session();
        assert!(matches!(s.set_progress(10.0), Err(OrbitError::NoSelection)));

        s.select(Some(&NodeId::from("p1"))).unwrap();
        for p in [0, 50, 100] {
            s.save_task(TaskDraft { progress: p, ..Default::default() }, None).unwrap();
        }
        assert_eq!(s.selected().unwrap().progress, 50);

        s.set_status(Status::AtRisk).unwrap();
        assert_eq!(s.selected().unwrap().status, Status::AtRisk);
    }

    #[test]
    fn test_zoom_clamps() {
        let mut s = session();
        for _ in 0..10 {
            s.zoom_in();
        }
        assert_abs_diff_eq!(s.scale(), 2.0);
        for _ in 0..10 {
            s.zoom_out();
        }
        assert_abs_diff_eq!(s.scale(), 0.5);
    }

    #[test]
    fn test_link_unlink_and_delete() {
        let mut s = session();
        s.select(Some(&NodeId::from("p2"))).unwrap();
        s.link_selected(&NodeId::from("m1")).unwrap();
        assert_eq!(s.selected().unwrap().kind, NodeKind::Moon);

        s.unlink_selected().unwrap();
        let p2 = s.selected().unwrap();
        assert_eq!(p2.kind, NodeKind::Planet);
        assert_abs_diff_eq!(p2.orbit, 300.0);

        s.delete_node(&NodeId::from("p2")).unwrap();
        assert!(s.selected().is_none());
        assert!(matches!(s.delete_node(&NodeId::from("sun")), Err(OrbitError::SunIsFixed)));
    }
}
