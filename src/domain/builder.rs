use crate::domain::attribute::Attribute;
use crate::domain::extraction::{Extraction, FlowEvent, FunctionEntry};
use crate::domain::graph::StructuralGraph;
use crate::domain::node::{NodePath, Position, Segment};
use crate::domain::ports::{SourceTree, SyntaxExtractor};
use anyhow::{Result, bail};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Which file most recently defined each variable name.
///
/// Scoped to one build (or one incremental merge); last writer wins.
#[derive(Debug, Default, Clone)]
pub struct DefinerTable {
    current: HashMap<String, NodePath>,
}

impl DefinerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, variable: &str, file: &NodePath) {
        self.current.insert(variable.to_string(), file.clone());
    }

    pub fn definer_of(&self, variable: &str) -> Option<&NodePath> {
        self.current.get(variable)
    }
}

/// Graph builder - Domain Service for constructing a StructuralGraph
pub struct GraphBuilder<'a> {
    extractor: &'a dyn SyntaxExtractor,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(extractor: &'a dyn SyntaxExtractor) -> Self {
        Self { extractor }
    }

    /// Full build over every source file the tree yields, in its traversal order.
    pub fn build(&self, tree: &dyn SourceTree) -> Result<StructuralGraph> {
        let mut graph = StructuralGraph::new();
        let root = NodePath::root(tree.root_name());
        graph.ensure_node(&root);

        let mut definers = DefinerTable::new();
        let files = tree.source_files()?;
        for relative in &files {
            let file = attach_file(&mut graph, &root, relative);
            let extraction = match tree.read(relative) {
                Ok(source) => extract_or_empty(self.extractor, relative, &source),
                Err(e) => {
                    warn!("Skipping unreadable file {}: {:#}", relative.display(), e);
                    Extraction::default()
                }
            };
            merge_extraction(&mut graph, &file, &extraction, &mut definers);
        }

        info!(
            "Built graph for {}: {} files, {} nodes, {} edges",
            tree.root_name(),
            files.len(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Run the extractor, downgrading a parse failure to an empty record.
pub fn extract_or_empty(
    extractor: &dyn SyntaxExtractor,
    relative: &Path,
    source: &str,
) -> Extraction {
    match extractor.extract(source) {
        Ok(extraction) => extraction,
        Err(e) => {
            warn!("Syntax extraction failed for {}: {}", relative.display(), e);
            Extraction::default()
        }
    }
}

/// Canonical form of a path relative to the tree root: `.` segments dropped,
/// anything that could leave the root rejected.
pub fn normalize_relative(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => normalized.push(part),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!("Path must be relative to the source root: {}", path.display())
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        bail!("Path names no file: {}", path.display());
    }
    Ok(normalized)
}

/// Structural path of a file relative to the tree root.
pub fn file_path(root: &NodePath, relative: &Path) -> NodePath {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let mut path = root.clone();
    if let Some((file, dirs)) = parts.split_last() {
        for dir in dirs {
            path = path.child(Segment::Directory(dir.clone()));
        }
        path = path.child(Segment::File(file.clone()));
    }
    path
}

/// Link a file and its directory chain under the root; returns the file's path.
pub fn attach_file(graph: &mut StructuralGraph, root: &NodePath, relative: &Path) -> NodePath {
    let file = file_path(root, relative);
    let mut parent = root.clone();
    for segment in &file.segments()[1..] {
        let child = parent.child(segment.clone());
        graph.add_edge(&parent, &child);
        parent = child;
    }
    file
}

/// Merge one file's extraction into the graph. Only missing nodes and edges are
/// added; nodes that already exist keep their attributes.
pub fn merge_extraction(
    graph: &mut StructuralGraph,
    file: &NodePath,
    extraction: &Extraction,
    definers: &mut DefinerTable,
) {
    for class in &extraction.classes {
        let class_path = file.child(Segment::Class(class.name.clone()));
        graph.add_edge(file, &class_path);
        for method in &class.methods {
            let method_path = class_path.child(Segment::Method(method.name.clone()));
            add_callable(graph, &class_path, &method_path, method);
        }
    }

    for function in &extraction.functions {
        let function_path = file.child(Segment::Function(function.name.clone()));
        add_callable(graph, file, &function_path, function);
    }

    for event in extraction.flow_events() {
        match event {
            FlowEvent::Define(name, position) => {
                let def_path = file.child(Segment::VariableDefinition(name.to_string()));
                let (def_idx, created) = graph.insert_node(&def_path);
                if created {
                    if let Some(annotation) = extraction.annotations.get(name) {
                        graph.set_attribute(def_idx, Attribute::TypeName(annotation.clone()));
                    }
                }
                record_location(graph, def_idx, position);
                let file_idx = graph.ensure_node(file);
                graph.connect(file_idx, def_idx);
                definers.record(name, file);
            }
            FlowEvent::Use(name, position) => {
                let usage_path = file.child(Segment::VariableUsage(name.to_string()));
                let usage_idx = graph.ensure_node(&usage_path);
                record_location(graph, usage_idx, position);
                let file_idx = graph.ensure_node(file);
                graph.connect(file_idx, usage_idx);

                if let Some(definer) = definers.definer_of(name) {
                    let def_path = definer.child(Segment::VariableDefinition(name.to_string()));
                    if let Some(def_idx) = graph.node_by_path(&def_path) {
                        if graph.connect(def_idx, usage_idx) {
                            debug!("Linked {} -> {}", def_path, usage_path);
                        }
                    }
                }
            }
        }
    }
}

fn record_location(graph: &mut StructuralGraph, idx: NodeIndex, position: Position) {
    let locations = &mut graph.node_mut(idx).locations;
    if !locations.contains(&position) {
        locations.push(position);
    }
}

fn add_callable(
    graph: &mut StructuralGraph,
    parent: &NodePath,
    path: &NodePath,
    entry: &FunctionEntry,
) {
    let (idx, created) = graph.insert_node(path);
    if created {
        graph.set_attribute(idx, Attribute::Parameters(entry.parameters.clone()));
    }
    let parent_idx = graph.ensure_node(parent);
    graph.connect(parent_idx, idx);
}
