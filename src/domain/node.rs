use crate::domain::attribute::Attributes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural role of a node in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Directory,
    File,
    Class,
    Method,
    Function,
    VariableDefinition,
    VariableUsage,
    Unknown,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Directory => "directory",
            NodeKind::File => "file",
            NodeKind::Class => "class",
            NodeKind::Method => "method",
            NodeKind::Function => "function",
            NodeKind::VariableDefinition => "variable_definition",
            NodeKind::VariableUsage => "variable_usage",
            NodeKind::Unknown => "unknown",
        }
    }

    /// Variable definitions and usages
    pub fn is_variable(&self) -> bool {
        matches!(self, NodeKind::VariableDefinition | NodeKind::VariableUsage)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source position: 1-based line, 0-based column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One typed step of a structural path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Directory(String),
    File(String),
    Class(String),
    Method(String),
    Function(String),
    VariableDefinition(String),
    VariableUsage(String),
    /// Opaque identity supplied by a caller; rendered verbatim
    Unknown(String),
}

impl Segment {
    pub fn kind(&self) -> NodeKind {
        match self {
            Segment::Directory(_) => NodeKind::Directory,
            Segment::File(_) => NodeKind::File,
            Segment::Class(_) => NodeKind::Class,
            Segment::Method(_) => NodeKind::Method,
            Segment::Function(_) => NodeKind::Function,
            Segment::VariableDefinition(_) => NodeKind::VariableDefinition,
            Segment::VariableUsage(_) => NodeKind::VariableUsage,
            Segment::Unknown(_) => NodeKind::Unknown,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Segment::Directory(n)
            | Segment::File(n)
            | Segment::Class(n)
            | Segment::Method(n)
            | Segment::Function(n)
            | Segment::VariableDefinition(n)
            | Segment::VariableUsage(n)
            | Segment::Unknown(n) => n,
        }
    }

    fn is_filesystem(&self) -> bool {
        matches!(self, Segment::Directory(_) | Segment::File(_))
    }
}

/// Typed structural identity of a node.
///
/// Two entities with the same display text but different roles (a class named
/// `x_def` next to a definition of `x`) still get distinct paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<Segment>);

impl NodePath {
    /// Root directory of a source tree
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![Segment::Directory(name.into())])
    }

    /// Identity that carries no structural information
    pub fn opaque(identity: impl Into<String>) -> Self {
        Self(vec![Segment::Unknown(identity.into())])
    }

    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    pub fn kind(&self) -> NodeKind {
        self.last().map(Segment::kind).unwrap_or(NodeKind::Unknown)
    }

    pub fn parent(&self) -> Option<NodePath> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous: Option<&Segment> = None;
        for segment in &self.0 {
            if let Some(prev) = previous {
                if prev.is_filesystem() && segment.is_filesystem() {
                    f.write_str("/")?;
                } else {
                    f.write_str(":")?;
                }
            }
            match segment {
                Segment::VariableDefinition(name) => write!(f, "{}_def", name)?,
                Segment::VariableUsage(name) => write!(f, "{}_usage", name)?,
                other => f.write_str(other.name())?,
            }
            previous = Some(segment);
        }
        Ok(())
    }
}

/// Graph node
#[derive(Debug, Clone)]
pub struct Node {
    pub path: NodePath,
    pub kind: NodeKind,
    pub attributes: Attributes,
    /// Source positions folded into this node (variable definitions/usages)
    pub locations: Vec<Position>,
}

impl Node {
    pub fn new(path: NodePath) -> Self {
        let kind = path.kind();
        Self {
            path,
            kind,
            attributes: Attributes::default(),
            locations: Vec::new(),
        }
    }

    pub fn identity(&self) -> String {
        self.path.to_string()
    }
}
