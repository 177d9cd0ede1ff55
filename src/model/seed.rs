//! Seed loading: JSON array of nodes -> validated `NodeSet`.

use log::debug;

use crate::error::Result;
use crate::model::{Node, NodeSet};

/// Decode and validate the startup node collection.
pub fn load_seed(input: &str) -> Result<NodeSet> {
    let nodes: Vec<Node> = serde_json::from_str(input)?;
    debug!("loaded seed with {} nodes", nodes.len());
    NodeSet::validated(nodes)
}
