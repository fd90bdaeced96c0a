//! Install ordering.

use anyhow::Result;
use log::warn;
use std::collections::{HashMap, VecDeque};

use super::ResolvedArchive;
use crate::error::LipError;

/// Order `archives` so every dependency precedes its dependents.
///
/// Dependencies outside the set (already installed, for instance) add no
/// edge. When several archives share a tooth path the first one wins. Ties
/// keep input order.
#[tracing::instrument(skip_all)]
pub fn plan(archives: &[ResolvedArchive]) -> Result<Vec<ResolvedArchive>> {
    let mut nodes: Vec<&ResolvedArchive> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for archive in archives {
        match index.get(archive.tooth()) {
            Some(&first) => {
                let kept = nodes[first];
                if kept.version() != archive.version() {
                    warn!(
                        "{} resolved to both {} and {}; keeping {}",
                        archive.tooth(),
                        kept.version(),
                        archive.version(),
                        kept.version()
                    );
                }
            }
            None => {
                index.insert(archive.tooth(), nodes.len());
                nodes.push(archive);
            }
        }
    }

    // Edge dependency -> dependent.
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut in_degree: Vec<usize> = vec![0; nodes.len()];
    for (dependent, archive) in nodes.iter().enumerate() {
        for dependency in archive.metadata.dependencies.keys() {
            if let Some(&dependency) = index.get(dependency.as_str()) {
                dependents[dependency].push(dependent);
                in_degree[dependent] += 1;
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered = Vec::with_capacity(nodes.len());

    while let Some(node) = ready.pop_front() {
        ordered.push(nodes[node].clone());
        for &dependent in &dependents[node] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    if ordered.len() < nodes.len() {
        let mut tooths: Vec<String> = (0..nodes.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| nodes[i].tooth().to_string())
            .collect();
        tooths.sort();
        return Err(LipError::DependencyCycle { tooths }.into());
    }

    Ok(ordered)
}
