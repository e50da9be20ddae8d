//! Error type for procedure graphs.

use crate::types::NodeId;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("cycle detected in graph")]
    Cycle,

    #[error("node {node} reads from unknown node {source_node}")]
    UnknownInput { node: NodeId, source_node: NodeId },

    #[error("duplicate node id {id}")]
    DuplicateNode { id: NodeId },

    #[error("failed to parse procedure: {reason}")]
    Parse { reason: String },
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
