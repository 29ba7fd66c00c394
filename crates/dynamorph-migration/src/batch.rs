//! Batch migration with rayon parallelism (supplemented module, spec §5:
//! "Parallel execution across independent migrations or patches is safe
//! because all data is immutable and there is no shared mutable state.").
//!
//! Grounded directly on `automapper-core::batch`'s `convert_batch`/
//! `convert_sequential` pair: each document is migrated independently, in
//! the same order as the inputs, with no shared mutable state.

use rayon::prelude::*;

use dynamorph_value::DynamicValue;

use crate::engine::{run, Migration};
use crate::error::SchemaError;

/// Runs `migration` over every document in `documents` in parallel using
/// rayon. Results are returned in the same order as the inputs.
///
/// # Example
///
/// ```ignore
/// let documents: Vec<DynamicValue> = load_documents();
/// let results = migrate_batch(&documents, &migration);
/// for result in results {
///     match result {
///         Ok(migrated) => store(migrated),
///         Err(e) => log_error(e),
///     }
/// }
/// ```
pub fn migrate_batch(documents: &[DynamicValue], migration: &Migration) -> Vec<Result<DynamicValue, SchemaError>> {
    documents.par_iter().map(|document| run(document, migration)).collect()
}

/// Runs `migration` over every document in `documents` sequentially (for
/// comparison/testing against [`migrate_batch`]).
pub fn migrate_sequential(
    documents: &[DynamicValue],
    migration: &Migration,
) -> Vec<Result<DynamicValue, SchemaError>> {
    documents.iter().map(|document| run(document, migration)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamorph_expr::Resolved;
    use dynamorph_optic::DynamicOptic;

    fn add_age_migration() -> Migration {
        Migration::new(vec![crate::action::MigrationAction::AddField {
            at: DynamicOptic::root(),
            name: "age".into(),
            default: Resolved::literal(DynamicValue::i32(0)),
        }])
    }

    fn person(name: &str) -> DynamicValue {
        DynamicValue::record(vec![("name".into(), DynamicValue::string(name))]).unwrap()
    }

    #[test]
    fn batch_migrates_every_document_in_order() {
        let documents = vec![person("Alice"), person("Bob"), person("Carol")];
        let migration = add_age_migration();
        let results = migrate_batch(&documents, &migration);

        assert_eq!(results.len(), 3);
        let names: Vec<String> = results
            .iter()
            .map(|r| {
                let record = r.as_ref().unwrap().as_record().unwrap();
                record.iter().find(|(n, _)| n == "name").unwrap().1.as_primitive().unwrap().to_canonical_string()
            })
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn batch_on_empty_input_is_empty() {
        let results = migrate_batch(&[], &add_age_migration());
        assert!(results.is_empty());
    }

    #[test]
    fn parallel_matches_sequential() {
        let documents = vec![person("Alice"), person("Bob")];
        let migration = add_age_migration();

        let parallel = migrate_batch(&documents, &migration);
        let sequential = migrate_sequential(&documents, &migration);

        assert_eq!(parallel.len(), sequential.len());
        for (p, s) in parallel.iter().zip(sequential.iter()) {
            assert_eq!(p.as_ref().unwrap(), s.as_ref().unwrap());
        }
    }

    #[test]
    fn a_failing_document_does_not_abort_the_batch() {
        let documents = vec![person("Alice"), DynamicValue::i32(1), person("Carol")];
        let migration = add_age_migration();
        let results = migrate_batch(&documents, &migration);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
