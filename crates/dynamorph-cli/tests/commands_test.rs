//! Integration tests exercising the CLI's command functions end to end
//! through temp-file JSON round trips, mirroring the teacher's
//! `render_fixture_test.rs` shape (write fixtures, call the library, assert
//! on the result) without needing the `dynamorph` binary itself.

use dynamorph_cli::config::CliConfig;
use dynamorph_cli::planner_io::{build_planner, EdgeRegistry, MigrationEdge};
use dynamorph_cli::{diff_command, migrate_command, patch_command, plan_command};
use dynamorph_expr::Resolved;
use dynamorph_migration::{Migration, MigrationAction};
use dynamorph_optic::DynamicOptic;
use dynamorph_patch::PatchMode;
use dynamorph_value::DynamicValue;

fn person(name: &str, age: i32) -> DynamicValue {
    DynamicValue::record(vec![("name".into(), DynamicValue::string(name)), ("age".into(), DynamicValue::i32(age))])
        .unwrap()
}

#[test]
fn diff_command_then_patch_command_reaches_new_value() {
    let old = person("Alice", 30);
    let new = person("Alice", 31);
    let patch = diff_command(&old, &new);
    let applied = patch_command(&old, &patch, PatchMode::Strict).unwrap();
    assert_eq!(applied, new);
}

#[test]
fn migrate_command_add_field_then_reverse_recovers_source() {
    let source = DynamicValue::record(vec![("name".into(), DynamicValue::string("Alice"))]).unwrap();
    let migration = Migration::new(vec![MigrationAction::AddField {
        at: DynamicOptic::root(),
        name: "age".into(),
        default: Resolved::literal(DynamicValue::i32(0)),
    }]);

    let migrated = migrate_command(&source, &migration, false).unwrap();
    assert_eq!(migrated.field("age"), Some(&DynamicValue::i32(0)));

    let back = migrate_command(&migrated, &migration, true).unwrap();
    assert_eq!(back, source);
}

#[test]
fn plan_command_composes_a_registered_multi_hop_edge() {
    let registry = EdgeRegistry {
        edges: vec![
            MigrationEdge {
                from: "v1".into(),
                to: "v2".into(),
                migration: Migration::new(vec![MigrationAction::AddField {
                    at: DynamicOptic::root(),
                    name: "age".into(),
                    default: Resolved::literal(DynamicValue::i32(0)),
                }]),
            },
            MigrationEdge {
                from: "v2".into(),
                to: "v3".into(),
                migration: Migration::new(vec![MigrationAction::Rename {
                    at: DynamicOptic::root(),
                    from: "age".into(),
                    to: "years".into(),
                }]),
            },
        ],
    };
    let planner = build_planner(&registry);
    let plan = plan_command(&planner, "v1", "v3").expect("path should exist");
    assert_eq!(plan.actions.len(), 2);

    let source = DynamicValue::record(vec![("name".into(), DynamicValue::string("Alice"))]).unwrap();
    let migrated = migrate_command(&source, &plan, false).unwrap();
    assert_eq!(
        migrated,
        DynamicValue::record(vec![("name".into(), DynamicValue::string("Alice")), ("years".into(), DynamicValue::i32(0))])
            .unwrap()
    );
}

#[test]
fn config_mode_resolution_falls_back_through_flag_then_config_then_strict() {
    let config = CliConfig { default_mode: Some("lenient".to_string()), output_dir: None };
    assert_eq!(config.resolve_mode(None).unwrap(), PatchMode::Lenient);
    assert_eq!(config.resolve_mode(Some("clobber")).unwrap(), PatchMode::Clobber);

    let empty = CliConfig::default();
    assert_eq!(empty.resolve_mode(None).unwrap(), PatchMode::Strict);
}
