//! Migration planner (spec §4.8, component C10).
//!
//! A directed multigraph of schema-id edges, each labeled with the
//! `Migration` program that moves a document from one schema version to
//! the next. `plan` runs breadth-first search from a source schema id,
//! composing the edge programs it traverses by concatenation, mirroring
//! `ConversionService`'s single-hop `convert_to_tree` but generalized to
//! multi-hop schema evolution.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::action::MigrationAction;
use crate::engine::Migration;

/// A registry of schema-to-schema migration edges. Schema ids are plain
/// strings (the registry is agnostic to how callers name schema versions).
#[derive(Debug, Clone, Default)]
pub struct MigrationPlanner {
    edges: HashMap<String, Vec<(String, Migration)>>,
}

impl MigrationPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directed edge `from -> to` labeled with `migration`.
    /// Multiple edges between the same pair of schema ids are allowed; BFS
    /// uses whichever is registered first.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>, migration: Migration) {
        self.edges.entry(from.into()).or_default().push((to.into(), migration));
    }

    /// Finds a composed migration from `from` to `to` via breadth-first
    /// search, concatenating edge programs along the shortest path. Returns
    /// `None` if no path exists. Cycles are tolerated: each schema id is
    /// visited at most once.
    pub fn plan(&self, from: &str, to: &str) -> Option<Migration> {
        if from == to {
            return Some(Migration::empty());
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(from.to_string());
        let mut queue: VecDeque<(String, Vec<MigrationAction>)> = VecDeque::new();
        queue.push_back((from.to_string(), Vec::new()));

        while let Some((current, actions_so_far)) = queue.pop_front() {
            let Some(outgoing) = self.edges.get(&current) else { continue };
            for (next, migration) in outgoing {
                if next == to {
                    let mut composed = actions_so_far.clone();
                    composed.extend(migration.actions.iter().cloned());
                    return Some(Migration::new(composed));
                }
                if visited.insert(next.clone()) {
                    let mut composed = actions_so_far.clone();
                    composed.extend(migration.actions.iter().cloned());
                    queue.push_back((next.clone(), composed));
                }
            }
        }

        None
    }
}
