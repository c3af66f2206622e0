use crate::adapters::oracle::CommandOracle;
use crate::app::dto::GraphDump;
use crate::app::engine::Session;
use crate::domain::attribute::Attribute;
use crate::domain::error::OracleError;
use crate::domain::refiner::NeighborhoodRefiner;
use anyhow::Result;
use std::path::Path;

/// Node/edge counts per kind as JSON.
pub fn print_stats(session: &Session) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(&session.stats())?);
    Ok(true)
}

pub fn print_summary(session: &Session) -> Result<bool> {
    println!("{}", session.graph().summary());
    Ok(true)
}

/// Whole graph as JSON.
pub fn dump_graph(session: &Session) -> Result<bool> {
    let dump = GraphDump::from_graph(session.graph());
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(true)
}

pub fn update_file(session: &mut Session, file: &Path) -> Result<bool> {
    let summary = session.update_file(file)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(true)
}

/// Refined neighborhood of the given identities, one per line.
pub fn print_neighbors(session: &Session, nodes: &[String], radius: Option<usize>) -> Result<bool> {
    let radius = radius.unwrap_or(session.config().context_depth);
    let refined = NeighborhoodRefiner::new(radius).refine_identities(session.graph(), nodes);
    for identity in refined {
        println!("{}", identity);
    }
    Ok(true)
}

/// Apply attribute changes to `node`, then synchronize from it.
///
/// Fails when any visited node still disagrees with a successor.
pub fn sync_node(
    session: &mut Session,
    node: &str,
    parameters: Option<Vec<String>>,
    type_name: Option<String>,
    log: bool,
) -> Result<bool> {
    let mut changes = Vec::new();
    if let Some(parameters) = parameters {
        changes.push(Attribute::Parameters(parameters));
    }
    if let Some(type_name) = type_name {
        changes.push(Attribute::TypeName(type_name));
    }
    session.set_attributes(node, changes)?;
    if log {
        let idx = session.graph().require(node)?;
        session
            .graph_mut()
            .attributes_mut(idx)
            .log_change("Modified from the command line");
    }

    let summaries = session.synchronize(&[node.to_string()])?;
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(summaries.iter().all(|s| s.consistent))
}

pub fn check_node(session: &Session, node: &str) -> Result<bool> {
    let consistent = session.check(node)?;
    if consistent {
        println!("{}: consistent", node);
    } else {
        println!("{}: inconsistent", node);
    }
    Ok(consistent)
}

/// Ranked and refined nodes for a problem statement as JSON.
pub fn localize(session: &Session, problem: &str, oracle: Option<&str>) -> Result<bool> {
    let argv: Vec<String> = match oracle {
        Some(command) => command.split_whitespace().map(String::from).collect(),
        None => session.config().oracle_command.clone(),
    };
    let oracle = CommandOracle::from_argv(&argv).ok_or(OracleError::NotConfigured)?;
    let localization = session.localize(&oracle, problem)?;
    println!("{}", serde_json::to_string_pretty(&localization)?);
    Ok(!localization.ranked.is_empty())
}

pub fn run_tests(session: &Session, file: Option<&Path>) -> bool {
    let runner = session.test_runner();
    let outcome = session.validate(&runner, file);
    if !outcome.stdout.is_empty() {
        println!("{}", outcome.stdout);
    }
    println!("{}", outcome.message);
    outcome.passed
}
