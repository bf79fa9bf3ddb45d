use thiserror::Error;

/// Failures raised by a layered engine while building its layer graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown node `{id}`")]
    UnknownNode { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An edge or group membership references an id the graph never declared.
    #[error("{context}")]
    Structural {
        context: String,
        #[source]
        source: EngineError,
    },
    #[error("unsupported layout direction `{0}`; only top-down layouts are implemented")]
    UnsupportedDirection(String),
}

impl LayoutError {
    pub(crate) fn unknown_edge_endpoint(source: &str, target: &str, missing: &str) -> Self {
        LayoutError::Structural {
            context: format!("edge {source} -> {target} references unknown node `{missing}`"),
            source: EngineError::UnknownNode {
                id: missing.to_string(),
            },
        }
    }

    pub(crate) fn unknown_group_member(group: &str, missing: &str) -> Self {
        LayoutError::Structural {
            context: format!("group `{group}` lists unknown member `{missing}`"),
            source: EngineError::UnknownNode {
                id: missing.to_string(),
            },
        }
    }
}
