//! Node data model: the node type, the node-set document and seed loading.

mod types;
mod node_set;
mod seed;

pub use types::*;
pub use node_set::{Ancestry, NodeSet, ParentKey};
pub use seed::load_seed;
