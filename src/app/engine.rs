use crate::adapters::fs::FsSourceTree;
use crate::adapters::python::PythonExtractor;
use crate::adapters::test_runner::CommandTestRunner;
use crate::app::config::EngineConfig;
use crate::app::dto::{GraphStats, SyncSummary, UpdateSummary};
use crate::app::localize::{Localization, Localizer};
use crate::domain::attribute::Attribute;
use crate::domain::builder::{GraphBuilder, normalize_relative};
use crate::domain::error::OracleError;
use crate::domain::graph::StructuralGraph;
use crate::domain::ports::{RankingOracle, SourceTree, SyntaxExtractor, TestOutcome, TestRunner};
use crate::domain::propagation::PropagationEngine;
use crate::domain::updater::IncrementalUpdater;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// One analysis session: a source tree, its graph and the tools that mutate it.
pub struct Session {
    config: EngineConfig,
    root: PathBuf,
    tree: Box<dyn SourceTree>,
    extractor: Box<dyn SyntaxExtractor>,
    graph: StructuralGraph,
    propagation: PropagationEngine,
}

impl Session {
    /// Open a directory on disk and run the full build.
    pub fn open(root: &Path, config: EngineConfig) -> Result<Self> {
        let tree = FsSourceTree::open(root)?
            .with_extensions(&config.source_extensions)
            .with_hidden(config.include_hidden)
            .with_follow_links(config.follow_links);
        let root = tree.root().to_path_buf();
        Self::from_parts(root, config, Box::new(tree), Box::new(PythonExtractor::new()))
    }

    /// Build a session over any source tree and extractor.
    pub fn from_parts(
        root: PathBuf,
        config: EngineConfig,
        tree: Box<dyn SourceTree>,
        extractor: Box<dyn SyntaxExtractor>,
    ) -> Result<Self> {
        let graph = GraphBuilder::new(extractor.as_ref())
            .build(tree.as_ref())
            .with_context(|| format!("Failed to build graph for {}", root.display()))?;
        Ok(Self {
            config,
            root,
            tree,
            extractor,
            graph,
            propagation: PropagationEngine::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn graph(&self) -> &StructuralGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut StructuralGraph {
        &mut self.graph
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats::from_graph(self.tree.root_name(), &self.graph)
    }

    /// Path of `file` relative to the source root. Absolute paths must lie under it.
    pub fn relative_path(&self, file: &Path) -> Result<PathBuf> {
        if !file.is_absolute() {
            return normalize_relative(file);
        }
        let under_root = file.strip_prefix(&self.root).ok().map(Path::to_path_buf).or_else(|| {
            let canonical = self.root.canonicalize().ok()?;
            file.strip_prefix(canonical).ok().map(Path::to_path_buf)
        });
        let relative = under_root.with_context(|| {
            format!("{} is outside the source root {}", file.display(), self.root.display())
        })?;
        normalize_relative(&relative)
    }

    /// Merge the current contents of one file into the graph.
    pub fn update_file(&mut self, file: &Path) -> Result<UpdateSummary> {
        let relative = self.relative_path(file)?;
        let report = IncrementalUpdater::new(self.extractor.as_ref()).update_file(
            &mut self.graph,
            self.tree.as_ref(),
            &relative,
        )?;
        Ok(UpdateSummary::from_report(&self.graph, &report))
    }

    /// Write new content for a file, then merge it.
    pub fn apply_fix(&mut self, file: &Path, content: &str) -> Result<UpdateSummary> {
        let relative = self.relative_path(file)?;
        self.tree
            .write(&relative, content)
            .with_context(|| format!("Failed to apply fix to {}", relative.display()))?;
        info!("Applied fix to {}", relative.display());
        self.update_file(&relative)
    }

    pub fn localize(
        &self,
        oracle: &dyn RankingOracle,
        problem: &str,
    ) -> Result<Localization, OracleError> {
        Localizer::new(&self.graph, self.config.top_n, self.config.context_depth)
            .localize(oracle, problem)
    }

    /// Set attributes on a node before synchronizing from it.
    pub fn set_attributes(&mut self, identity: &str, attributes: Vec<Attribute>) -> Result<()> {
        let idx = self.graph.require(identity)?;
        for attribute in attributes {
            self.graph.set_attribute(idx, attribute);
        }
        Ok(())
    }

    /// Synchronize dependencies from each identity in turn.
    pub fn synchronize(&mut self, identities: &[String]) -> Result<Vec<SyncSummary>> {
        let mut summaries = Vec::with_capacity(identities.len());
        for identity in identities {
            let start = self.graph.require(identity)?;
            let report = self.propagation.synchronize_dependencies(&mut self.graph, start);
            let consistent = report
                .visited
                .iter()
                .all(|&idx| self.propagation.find_inconsistency(&self.graph, idx).is_none());
            summaries.push(SyncSummary {
                start: identity.clone(),
                visited: report
                    .visited
                    .iter()
                    .map(|&idx| self.graph.identity(idx))
                    .collect(),
                updated_nodes: report.updates.iter().filter(|u| u.changed_anything()).count(),
                consistent,
            });
        }
        Ok(summaries)
    }

    /// Whether every direct successor of `identity` agrees with it.
    pub fn check(&self, identity: &str) -> Result<bool> {
        let idx = self.graph.require(identity)?;
        Ok(self.propagation.validate_propagation(&self.graph, idx))
    }

    pub fn test_runner(&self) -> CommandTestRunner {
        CommandTestRunner::new(
            self.config.test_command.clone(),
            self.config.resolved_test_dir(&self.root),
        )
    }

    /// Run the configured tests, or one test file relative to the root.
    pub fn validate(&self, runner: &dyn TestRunner, test_file: Option<&Path>) -> TestOutcome {
        match test_file {
            Some(file) if file.is_absolute() => runner.validate_specific_test(file),
            Some(file) => runner.validate_specific_test(&self.root.join(file)),
            None => runner.validate_changes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        std::fs::write(dir.path().join("pkg/b.py"), "print(x)\n").unwrap();
        dir
    }

    fn root_name(dir: &TempDir) -> String {
        dir.path().file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn test_open_links_definition_to_later_usage() {
        let dir = project();
        let session = Session::open(dir.path(), EngineConfig::default()).unwrap();
        let name = root_name(&dir);
        let def = session.graph().node_by_identity(&format!("{}/a.py:x_def", name)).unwrap();
        let usage = session
            .graph()
            .node_by_identity(&format!("{}/pkg/b.py:x_usage", name))
            .unwrap();
        assert!(session.graph().neighbors(def).contains(&usage));
    }

    #[test]
    fn test_apply_fix_adds_new_nodes() {
        let dir = project();
        let mut session = Session::open(dir.path(), EngineConfig::default()).unwrap();
        let summary = session
            .apply_fix(Path::new("a.py"), "x = 1\ndef f(a, b):\n    return a\n")
            .unwrap();
        assert!(summary.added_nodes >= 1);
        let name = root_name(&dir);
        assert!(session.graph().node_by_identity(&format!("{}/a.py:f", name)).is_some());
        assert!(std::fs::read_to_string(dir.path().join("a.py")).unwrap().contains("def f"));
    }

    #[test]
    fn test_synchronize_unknown_identity_is_an_error() {
        let dir = project();
        let mut session = Session::open(dir.path(), EngineConfig::default()).unwrap();
        assert!(session.synchronize(&["nope".to_string()]).is_err());
        assert!(session.check("nope").is_err());
    }

    #[test]
    fn test_synchronize_spreads_type_to_usage() {
        let dir = project();
        let mut session = Session::open(dir.path(), EngineConfig::default()).unwrap();
        let name = root_name(&dir);
        let def = format!("{}/a.py:x_def", name);
        session
            .set_attributes(&def, vec![Attribute::TypeName("int".to_string())])
            .unwrap();
        let summaries = session.synchronize(&[def.clone()]).unwrap();
        assert!(summaries[0].consistent);
        let usage = session
            .graph()
            .node_by_identity(&format!("{}/pkg/b.py:x_usage", name))
            .unwrap();
        assert_eq!(
            session.graph().attributes(usage).type_name.as_deref(),
            Some("int")
        );
        assert!(session.check(&def).unwrap());
    }
}
