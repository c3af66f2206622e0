//! repo-graph library: structural graph of a Python source tree, incremental
//! re-analysis and attribute propagation.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
