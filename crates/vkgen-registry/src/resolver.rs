//! Dependency ordering.
//!
//! Repeatedly takes the first pending node (in input order) whose every
//! dependency is already available, then restarts the scan. This is
//! quadratic but keeps the output a pure function of the input order,
//! which generated headers rely on for stable diffs.

use crate::error::{RegistryError, Result, StuckEntity};
use crate::model::DependencyNode;
use std::collections::HashMap;
use tracing::{debug, info};

/// Order `nodes` so every node follows all of its dependencies.
///
/// `seeds` are treated as available from the start. A dependency naming
/// neither a node nor a seed can never be satisfied; neither can a cycle.
/// Both end in [`RegistryError::UnresolvableDependency`] listing every node
/// left unplaced.
pub fn sort_dependencies(nodes: &[DependencyNode], seeds: &[String]) -> Result<Vec<DependencyNode>> {
    let mut ids: HashMap<&str, usize> = HashMap::with_capacity(nodes.len() + seeds.len());
    for name in seeds.iter().map(String::as_str).chain(nodes.iter().map(|n| n.name.as_str())) {
        let next = ids.len();
        ids.entry(name).or_insert(next);
    }

    let mut available = vec![false; ids.len()];
    for seed in seeds {
        available[ids[seed.as_str()]] = true;
    }

    // unknown names intern as None and block their node forever
    let mut pending: Vec<(usize, Vec<Option<usize>>)> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let deps = n.dependencies.iter().map(|d| ids.get(d.as_str()).copied()).collect();
            (i, deps)
        })
        .collect();

    let mut sorted = Vec::with_capacity(nodes.len());
    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|(_, deps)| deps.iter().all(|d| d.is_some_and(|id| available[id])));
        match ready {
            Some(pos) => {
                let (index, _) = pending.remove(pos);
                let node = &nodes[index];
                available[ids[node.name.as_str()]] = true;
                sorted.push(node.clone());
            }
            None => {
                let stuck: Vec<StuckEntity> = pending
                    .iter()
                    .map(|(index, _)| {
                        let node = &nodes[*index];
                        StuckEntity {
                            name: node.name.clone(),
                            missing: node
                                .dependencies
                                .iter()
                                .filter(|d| !ids.get(d.as_str()).is_some_and(|&id| available[id]))
                                .cloned()
                                .collect(),
                        }
                    })
                    .collect();
                debug!(placed = sorted.len(), stuck = stuck.len(), "resolver made no progress");
                return Err(RegistryError::UnresolvableDependency { stuck });
            }
        }
    }

    info!(count = sorted.len(), "sorted dependencies");
    Ok(sorted)
}
