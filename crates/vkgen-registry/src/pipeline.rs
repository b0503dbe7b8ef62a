//! Parse, sort, analyze, default: the whole run in one call.

use crate::analyzer::{analyze_commands, CommandAnalysis};
use crate::config::RegistryConfig;
use crate::defaults::{synthesize_defaults, DefaultValues};
use crate::error::Result;
use crate::model::{DependencyNode, Registry};
use crate::parser::parse_registry;
use crate::resolver::sort_dependencies;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Everything a binding emitter consumes.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedModel {
    pub registry: Registry,
    /// Declaration order: every node after all of its dependencies.
    pub sorted: Vec<DependencyNode>,
    pub analyses: BTreeMap<String, CommandAnalysis>,
    pub defaults: DefaultValues,
}

pub fn build_model(xml: &str, config: &RegistryConfig) -> Result<ResolvedModel> {
    let registry = parse_registry(xml, config)?;
    let seeds = config.seed_names();
    let sorted = sort_dependencies(&registry.nodes, &seeds)?;
    let analyses = analyze_commands(&registry, config)?;
    let defaults = synthesize_defaults(&sorted, &registry, &seeds)?;

    info!(
        entities = sorted.len(),
        commands = analyses.len(),
        header_version = registry.header_version.as_deref().unwrap_or("unknown"),
        "built model"
    );
    Ok(ResolvedModel {
        registry,
        sorted,
        analyses,
        defaults,
    })
}
