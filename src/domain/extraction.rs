//! Flat per-file extraction record: the contract between a syntax extractor and the
//! graph builder.
//!
//! An extraction carries no identities; the builder turns names into `NodePath`s
//! under the owning file.

use crate::domain::node::Position;
use serde::Serialize;
use std::collections::BTreeMap;

/// Function or method signature as seen by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionEntry {
    pub name: String,
    /// Parameter names in declaration order (`*args`/`**kwargs` keep their stars)
    pub parameters: Vec<String>,
}

impl FunctionEntry {
    pub fn new(name: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassEntry {
    pub name: String,
    /// Functions defined in the class body, in source order
    pub methods: Vec<FunctionEntry>,
}

/// Everything the builder needs from one source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Classes in source (pre-)order, nested classes included
    pub classes: Vec<ClassEntry>,
    /// Module-level functions in source order
    pub functions: Vec<FunctionEntry>,
    /// Variable name → assignment sites
    pub definitions: BTreeMap<String, Vec<Position>>,
    /// Variable name → read sites
    pub usages: BTreeMap<String, Vec<Position>>,
    /// Variable name → first declared annotation
    pub annotations: BTreeMap<String, String>,
}

/// One definition or usage, for replaying a file in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent<'a> {
    Define(&'a str, Position),
    Use(&'a str, Position),
}

impl FlowEvent<'_> {
    pub fn position(&self) -> Position {
        match self {
            FlowEvent::Define(_, p) | FlowEvent::Use(_, p) => *p,
        }
    }
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.functions.is_empty()
            && self.definitions.is_empty()
            && self.usages.is_empty()
    }

    /// Class name → method names, with every bare function mapped to an empty list.
    pub fn class_methods(&self) -> BTreeMap<String, Vec<String>> {
        let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for class in &self.classes {
            out.entry(class.name.clone())
                .or_default()
                .extend(class.methods.iter().map(|m| m.name.clone()));
        }
        for function in &self.functions {
            out.entry(function.name.clone()).or_default();
        }
        out
    }

    pub fn record_definition(&mut self, name: &str, position: Position) {
        self.definitions
            .entry(name.to_string())
            .or_default()
            .push(position);
    }

    pub fn record_usage(&mut self, name: &str, position: Position) {
        self.usages.entry(name.to_string()).or_default().push(position);
    }

    /// Definitions and usages merged in source order.
    ///
    /// At the same position a definition sorts before a usage.
    pub fn flow_events(&self) -> Vec<FlowEvent<'_>> {
        let mut events: Vec<FlowEvent<'_>> = Vec::new();
        for (name, positions) in &self.definitions {
            events.extend(positions.iter().map(|p| FlowEvent::Define(name.as_str(), *p)));
        }
        for (name, positions) in &self.usages {
            events.extend(positions.iter().map(|p| FlowEvent::Use(name.as_str(), *p)));
        }
        events.sort_by_key(|e| (e.position(), matches!(e, FlowEvent::Use(..))));
        events
    }
}
