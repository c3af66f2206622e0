use crate::domain::node::NodeKind;
use serde::{Deserialize, Serialize};

/// Edge kind - derived from the endpoints, never supplied by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Lexical nesting: directory → file, file → class, class → method, ...
    Containment,
    /// Variable definition → variable usage
    DataFlow,
}

impl EdgeKind {
    pub fn between(source: NodeKind, target: NodeKind) -> Self {
        match (source, target) {
            (NodeKind::VariableDefinition, NodeKind::VariableUsage) => EdgeKind::DataFlow,
            _ => EdgeKind::Containment,
        }
    }
}
