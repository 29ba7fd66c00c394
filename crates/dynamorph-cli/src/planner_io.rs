//! JSON representation of a migration-planner edge registry (ambient CLI
//! surface around spec component C10 — the planner itself has no opinion on
//! how edges are loaded, so the wire format lives here rather than in
//! `dynamorph-migration`).

use serde::{Deserialize, Serialize};

use dynamorph_migration::{Migration, MigrationPlanner};

/// One directed edge: `from` schema id, `to` schema id, and the migration
/// program that moves a document across it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationEdge {
    pub from: String,
    pub to: String,
    pub migration: Migration,
}

/// A flat list of edges, as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeRegistry {
    pub edges: Vec<MigrationEdge>,
}

pub fn build_planner(registry: &EdgeRegistry) -> MigrationPlanner {
    let mut planner = MigrationPlanner::new();
    for edge in &registry.edges {
        planner.add_edge(edge.from.clone(), edge.to.clone(), edge.migration.clone());
    }
    planner
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamorph_expr::Resolved;
    use dynamorph_migration::MigrationAction;
    use dynamorph_optic::DynamicOptic;
    use dynamorph_value::DynamicValue;

    #[test]
    fn registry_round_trips_through_json() {
        let registry = EdgeRegistry {
            edges: vec![MigrationEdge {
                from: "v1".into(),
                to: "v2".into(),
                migration: Migration::new(vec![MigrationAction::AddField {
                    at: DynamicOptic::root(),
                    name: "age".into(),
                    default: Resolved::literal(DynamicValue::i32(0)),
                }]),
            }],
        };
        let json = serde_json::to_string(&registry).unwrap();
        let back: EdgeRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }

    #[test]
    fn builds_a_planner_that_finds_the_registered_edge() {
        let registry = EdgeRegistry {
            edges: vec![MigrationEdge { from: "v1".into(), to: "v2".into(), migration: Migration::empty() }],
        };
        let planner = build_planner(&registry);
        assert!(planner.plan("v1", "v2").is_some());
    }
}
