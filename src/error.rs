//! Error type shared by seed loading, validation and session edits.
//!
//! Layout itself never fails: broken ancestry falls back to the viewport
//! center. Only operations that would commit a new node set report errors.

use crate::model::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum OrbitError {
    /// Seed or config JSON could not be decoded
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id `{0}`")]
    DuplicateId(NodeId),

    #[error("node set has no sun")]
    MissingSun,

    #[error("node set has more than one sun (`{0}` and `{1}`)")]
    MultipleSuns(NodeId, NodeId),

    #[error("unknown node `{0}`")]
    UnknownNode(NodeId),

    /// A node points at a parent id that does not exist
    #[error("node `{node}` references missing parent `{parent}`")]
    DanglingParent { node: NodeId, parent: NodeId },

    #[error("parent chain of `{0}` forms a cycle")]
    Cycle(NodeId),

    /// Parent type does not fit the child type (e.g. a planet under a planet)
    #[error("node `{node}` cannot orbit `{parent}`: {reason}")]
    InvalidParent {
        node: NodeId,
        parent: String,
        reason: &'static str,
    },

    #[error("progress {value} of `{node}` is outside 0..=100")]
    ProgressOutOfRange { node: NodeId, value: u32 },

    #[error("the sun is fixed and cannot be moved or deleted")]
    SunIsFixed,

    /// Layout config values that cannot work together
    #[error("invalid layout config: {0}")]
    InvalidConfig(&'static str),

    #[error("no node is selected")]
    NoSelection,

    #[error("node `{node}` has no task `{task}`")]
    UnknownTask { node: NodeId, task: String },
}

pub type Result<T> = std::result::Result<T, OrbitError>;
