//! The node-set "document": ordered nodes plus an id index.
//!
//! Document order doubles as sibling order for layout and as the tie-break
//! order for snapping, so every operation here preserves it.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::error::{OrbitError, Result};
use crate::model::{Node, NodeId, NodeKind, ParentRef};

/// Effective parent of a non-sun node.
/// `center` and the sun's own id both mean the root orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKey<'a> {
    Root,
    Node(&'a NodeId),
}

/// Result of walking a node's ancestor chain.
#[derive(Debug)]
pub enum Ancestry<'a> {
    /// Node first, then its parents up to the top-level ancestor.
    Chain(Vec<&'a Node>),
    /// Some link in the chain points at a missing node.
    Dangling(NodeId),
    /// The chain revisits a node.
    Cycle,
}

#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl NodeSet {
    /// Build without validation. Duplicate ids keep their first occurrence in
    /// the index.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            index.entry(n.id.clone()).or_insert(i);
        }
        Self { nodes, index }
    }

    /// Build and check every structural invariant.
    pub fn validated(nodes: Vec<Node>) -> Result<Self> {
        let set = Self::from_nodes(nodes);
        set.validate()?;
        Ok(set)
    }

    pub fn len(&self) -> usize { self.nodes.len() }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
    pub fn nodes(&self) -> &[Node] { &self.nodes }
    pub fn into_nodes(self) -> Vec<Node> { self.nodes }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn sun(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_sun())
    }

    /// `None` for the sun, which has no parent at all.
    pub fn parent_key<'a>(&self, node: &'a Node) -> Option<ParentKey<'a>> {
        if node.is_sun() {
            return None;
        }
        match &node.parent_id {
            ParentRef::Root => Some(ParentKey::Root),
            ParentRef::Node(id) => match self.get(id) {
                Some(parent) if parent.is_sun() => Some(ParentKey::Root),
                _ => Some(ParentKey::Node(id)),
            },
        }
    }

    /// Nodes sharing `node`'s effective parent, in document order (`node` included).
    pub fn siblings<'a>(&'a self, node: &'a Node) -> Vec<&'a Node> {
        let Some(key) = self.parent_key(node) else {
            return vec![node];
        };
        self.nodes
            .iter()
            .filter(|n| self.parent_key(n) == Some(key))
            .collect()
    }

    pub fn children_of<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |n| self.parent_key(n) == Some(ParentKey::Node(id)))
    }

    pub fn count_moons_of(&self, id: &NodeId) -> usize {
        self.children_of(id).filter(|n| n.kind == NodeKind::Moon).count()
    }

    pub fn count_planets(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Planet).count()
    }

    /// Walk from `node` up to its top-level ancestor.
    /// Bounded by the node count and guarded by a visited set.
    pub fn ancestry<'a>(&'a self, node: &'a Node) -> Ancestry<'a> {
        let mut chain = vec![node];
        let mut visited: HashSet<&NodeId> = HashSet::new();
        visited.insert(&node.id);

        let mut current = node;
        loop {
            let parent_id = match self.parent_key(current) {
                None | Some(ParentKey::Root) => return Ancestry::Chain(chain),
                Some(ParentKey::Node(id)) => id,
            };
            let Some(parent) = self.get(parent_id) else {
                return Ancestry::Dangling(parent_id.clone());
            };
            if !visited.insert(&parent.id) || chain.len() > self.nodes.len() {
                return Ancestry::Cycle;
            }
            chain.push(parent);
            current = parent;
        }
    }

    /// True when `candidate` sits somewhere below `ancestor` in the orbit tree.
    pub fn is_descendant_of(&self, ancestor: &NodeId, candidate: &NodeId) -> bool {
        let Some(mut current) = self.get(candidate) else {
            return false;
        };
        let mut visited: HashSet<&NodeId> = HashSet::new();
        visited.insert(&current.id);

        while let Some(ParentKey::Node(parent_id)) = self.parent_key(current) {
            if parent_id == ancestor {
                return true;
            }
            match self.get(parent_id) {
                Some(parent) if visited.insert(&parent.id) => current = parent,
                _ => return false,
            }
        }
        false
    }

    /// Replace the node with the same id. The new set is validated before it
    /// is committed; on error `self` is unchanged.
    pub fn replace(&mut self, node: Node) -> Result<()> {
        let Some(&i) = self.index.get(&node.id) else {
            return Err(OrbitError::UnknownNode(node.id));
        };
        let mut next = self.nodes.clone();
        next[i] = node;
        self.commit(next)
    }

    /// Replace several nodes as one atomic update.
    pub fn replace_all(&mut self, updated: Vec<Node>) -> Result<()> {
        let mut next = self.nodes.clone();
        for node in updated {
            let Some(&i) = self.index.get(&node.id) else {
                return Err(OrbitError::UnknownNode(node.id));
            };
            next[i] = node;
        }
        self.commit(next)
    }

    /// Remove a node and re-home its children onto the removed node's parent.
    /// Children landing on the root become planets, the rest become moons.
    pub fn remove(&mut self, id: &NodeId) -> Result<Node> {
        let Some(&i) = self.index.get(id) else {
            return Err(OrbitError::UnknownNode(id.clone()));
        };
        let removed = self.nodes[i].clone();
        if removed.is_sun() {
            return Err(OrbitError::SunIsFixed);
        }
        let new_parent = match self.parent_key(&removed) {
            Some(ParentKey::Node(pid)) => ParentRef::Node(pid.clone()),
            _ => ParentRef::Root,
        };
        let new_kind = match new_parent {
            ParentRef::Root => NodeKind::Planet,
            ParentRef::Node(_) => NodeKind::Moon,
        };

        let next: Vec<Node> = self.nodes
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, n)| {
                if n.parent_id.node_id() == Some(id) {
                    Node { kind: new_kind, parent_id: new_parent.clone(), ..n.clone() }
                } else {
                    n.clone()
                }
            })
            .collect();
        self.commit(next)?;
        Ok(removed)
    }

    fn commit(&mut self, next: Vec<Node>) -> Result<()> {
        let candidate = Self::from_nodes(next);
        if let Err(e) = candidate.validate() {
            warn!("rejected node-set update: {e}");
            return Err(e);
        }
        *self = candidate;
        Ok(())
    }

    /// Check ids, the single sun, parent references, parent types, progress
    /// ranges and acyclicity.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        for n in &self.nodes {
            if !seen.insert(&n.id) {
                return Err(OrbitError::DuplicateId(n.id.clone()));
            }
        }

        let mut suns = self.nodes.iter().filter(|n| n.is_sun());
        let sun = suns.next().ok_or(OrbitError::MissingSun)?;
        if let Some(other) = suns.next() {
            return Err(OrbitError::MultipleSuns(sun.id.clone(), other.id.clone()));
        }
        if sun.parent_id != ParentRef::Root {
            return Err(OrbitError::InvalidParent {
                node: sun.id.clone(),
                parent: sun.parent_id.to_string(),
                reason: "the sun is the root and has no parent",
            });
        }

        for n in &self.nodes {
            if n.progress > 100 {
                return Err(OrbitError::ProgressOutOfRange { node: n.id.clone(), value: n.progress });
            }
            if let Some(t) = n.tasks.iter().find(|t| t.progress > 100) {
                return Err(OrbitError::ProgressOutOfRange { node: n.id.clone(), value: t.progress });
            }
            if n.is_sun() {
                continue;
            }
            if let ParentRef::Node(pid) = &n.parent_id {
                if !self.contains(pid) {
                    return Err(OrbitError::DanglingParent { node: n.id.clone(), parent: pid.clone() });
                }
            }
            match (n.kind, self.parent_key(n)) {
                (NodeKind::Planet, Some(ParentKey::Node(pid))) => {
                    return Err(OrbitError::InvalidParent {
                        node: n.id.clone(),
                        parent: pid.to_string(),
                        reason: "planets orbit the center",
                    });
                }
                (NodeKind::Moon, Some(ParentKey::Root)) => {
                    return Err(OrbitError::InvalidParent {
                        node: n.id.clone(),
                        parent: n.parent_id.to_string(),
                        reason: "moons orbit a planet or another moon",
                    });
                }
                _ => {}
            }
            if let Ancestry::Cycle = self.ancestry(n) {
                return Err(OrbitError::Cycle(n.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_system() -> NodeSet {
        // sun
        //  ├─ p1 ── m1 ── mm1
        //  └─ p2
        NodeSet::validated(vec![
            Node::sun("sun"),
            Node::planet("p1", 180.0),
            Node::planet("p2", 280.0),
            Node::moon("m1", "p1", 60.0),
            Node::moon("mm1", "m1", 40.0),
        ]).unwrap()
    }

    #[test]
    fn test_validate_accepts_nested_moons() {
        let set = make_system();
        assert_eq!(set.len(), 5);
        assert_eq!(set.count_planets(), 2);
        assert_eq!(set.count_moons_of(&NodeId::from("p1")), 1);
    }

    #[test]
    fn test_sun_id_counts_as_root() {
        let mut p = Node::planet("p1", 180.0);
        p.parent_id = ParentRef::Node(NodeId::from("sun"));
        let set = NodeSet::validated(vec![Node::sun("sun"), p, Node::planet("p2", 280.0)]).unwrap();
        let p1 = set.get(&NodeId::from("p1")).unwrap();
        assert_eq!(set.parent_key(p1), Some(ParentKey::Root));
        assert_eq!(set.siblings(p1).len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_sets() {
        let err = NodeSet::validated(vec![Node::planet("p1", 180.0)]).unwrap_err();
        assert!(matches!(err, OrbitError::MissingSun));

        let err = NodeSet::validated(vec![Node::sun("a"), Node::sun("b")]).unwrap_err();
        assert!(matches!(err, OrbitError::MultipleSuns(..)));

        let err = NodeSet::validated(vec![Node::sun("s"), Node::moon("m", "ghost", 60.0)]).unwrap_err();
        assert!(matches!(err, OrbitError::DanglingParent { .. }));

        let err = NodeSet::validated(vec![Node::sun("s"), Node::moon("m", "center", 60.0)]).unwrap_err();
        assert!(matches!(err, OrbitError::InvalidParent { .. }));

        let err = NodeSet::validated(vec![
            Node::sun("s"),
            Node::moon("a", "b", 60.0),
            Node::moon("b", "a", 60.0),
        ]).unwrap_err();
        assert!(matches!(err, OrbitError::Cycle(_)));
    }

    #[test]
    fn test_ancestry_fallbacks() {
        let set = NodeSet::from_nodes(vec![
            Node::sun("s"),
            Node::moon("orphan", "ghost", 60.0),
            Node::moon("a", "b", 60.0),
            Node::moon("b", "a", 60.0),
        ]);
        let orphan = set.get(&NodeId::from("orphan")).unwrap();
        assert!(matches!(set.ancestry(orphan), Ancestry::Dangling(_)));
        let a = set.get(&NodeId::from("a")).unwrap();
        assert!(matches!(set.ancestry(a), Ancestry::Cycle));
    }

    #[test]
    fn test_is_descendant_of() {
        let set = make_system();
        let p1 = NodeId::from("p1");
        assert!(set.is_descendant_of(&p1, &NodeId::from("m1")));
        assert!(set.is_descendant_of(&p1, &NodeId::from("mm1")));
        assert!(!set.is_descendant_of(&p1, &NodeId::from("p2")));
        assert!(!set.is_descendant_of(&p1, &p1));
    }

    #[test]
    fn test_replace_is_atomic() {
        let mut set = make_system();
        // p1 under its own grandchild would be a cycle
        let mut p1 = set.get(&NodeId::from("p1")).unwrap().clone();
        p1.kind = NodeKind::Moon;
        p1.parent_id = ParentRef::Node(NodeId::from("mm1"));
        assert!(set.replace(p1).is_err());
        assert_eq!(set.get(&NodeId::from("p1")).unwrap().kind, NodeKind::Planet);
    }

    #[test]
    fn test_remove_rehomes_children() {
        let mut set = make_system();
        set.remove(&NodeId::from("m1")).unwrap();
        let mm1 = set.get(&NodeId::from("mm1")).unwrap();
        assert_eq!(mm1.parent_id, ParentRef::Node(NodeId::from("p1")));
        assert_eq!(mm1.kind, NodeKind::Moon);

        set.remove(&NodeId::from("p1")).unwrap();
        let mm1 = set.get(&NodeId::from("mm1")).unwrap();
        assert_eq!(mm1.parent_id, ParentRef::Root);
        assert_eq!(mm1.kind, NodeKind::Planet);

        assert!(matches!(set.remove(&NodeId::from("sun")), Err(OrbitError::SunIsFixed)));
    }
}
