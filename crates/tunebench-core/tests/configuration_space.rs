// crates/tunebench-core/tests/configuration_space.rs
// ============================================================================
// Module: Configuration Space Tests
// Description: Atomic updates, constraints, sampling, and introspection.
// Purpose: Ensure failed updates never partially mutate a space.
// ============================================================================

//! Configuration space behavior tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::collections::BTreeMap;

use common::GIB;
use tunebench_core::ConfigurationSpace;
use tunebench_core::DEFAULT_MAX_RANDOM_ATTEMPTS;
use tunebench_core::DefinitionError;
use tunebench_core::ParameterDefinition;
use tunebench_core::ParameterValue;
use tunebench_core::SpaceDefinition;
use tunebench_core::SpaceError;
use tunebench_core::Target;
use tunebench_core::mysql_log_capacity_satisfied;

/// Builds a knob map from pairs.
fn knobs(entries: &[(&str, ParameterValue)]) -> BTreeMap<String, ParameterValue> {
    entries.iter().map(|(name, value)| ((*name).to_string(), value.clone())).collect()
}

/// Returns the MySQL fixture space.
fn mysql_space() -> ConfigurationSpace {
    Target::Mysql.build_space(&common::mysql_definition()).unwrap()
}

/// Tests iteration is name ordered.
#[test]
fn iteration_is_name_ordered() {
    let space = Target::Gcc.build_space(&common::gcc_definition()).unwrap();
    let names: Vec<&str> = space.names().collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert_eq!(space.len(), 6);
}

/// Tests get all is a snapshot copy.
#[test]
fn get_all_is_a_snapshot_copy() {
    let mut space = Target::Llvm.build_space(&common::llvm_definition()).unwrap();
    let snapshot = space.get_all();
    space.set("licm", ParameterValue::on()).unwrap();
    assert_eq!(snapshot.get("licm"), Some(&ParameterValue::off()));
    assert_eq!(space.get("licm").unwrap(), &ParameterValue::on());
}

/// Tests set many with unknown name changes nothing.
#[test]
fn set_many_with_unknown_name_changes_nothing() {
    let mut space = Target::Llvm.build_space(&common::llvm_definition()).unwrap();
    let before = space.get_all();
    let err = space
        .set_many(&knobs(&[
            ("adce", ParameterValue::off()),
            ("unknown_knob", ParameterValue::Integer(1)),
        ]))
        .unwrap_err();
    assert_eq!(
        err,
        SpaceError::UnknownParameter {
            name: "unknown_knob".to_string(),
        }
    );
    assert_eq!(space.get_all(), before);
}

/// Tests set many with one invalid value changes nothing.
#[test]
fn set_many_with_one_invalid_value_changes_nothing() {
    let mut space = Target::Gcc.build_space(&common::gcc_definition()).unwrap();
    let before = space.get_all();
    let err = space
        .set_many(&knobs(&[
            ("inline-functions", ParameterValue::off()),
            ("unroll-limit", ParameterValue::Integer(65)),
        ]))
        .unwrap_err();
    assert!(matches!(err, SpaceError::InvalidValue { ref name, .. } if name == "unroll-limit"));
    assert_eq!(space.get_all(), before);
}

/// Tests set many applies all valid entries.
#[test]
fn set_many_applies_all_valid_entries() {
    let mut space = Target::Gcc.build_space(&common::gcc_definition()).unwrap();
    space
        .set_many(&knobs(&[
            ("inline-functions", ParameterValue::off()),
            ("unroll-limit", ParameterValue::Integer(16)),
        ]))
        .unwrap();
    assert_eq!(space.get("inline-functions").unwrap(), &ParameterValue::off());
    assert_eq!(space.get("unroll-limit").unwrap(), &ParameterValue::Integer(16));
}

/// Tests mysql constraint accepts 500 gib and rejects 600 gib.
#[test]
fn mysql_constraint_accepts_500_gib_and_rejects_600_gib() {
    let mut space = mysql_space();
    space
        .set_many(&knobs(&[
            ("innodb_log_file_size", ParameterValue::Integer(100 * GIB)),
            ("innodb_log_files_in_group", ParameterValue::Integer(5)),
            ("innodb_thread_concurrency", ParameterValue::Integer(1)),
        ]))
        .unwrap();
    assert!(space.constraints_satisfied());

    let before = space.get_all();
    let err = space.set("innodb_log_files_in_group", ParameterValue::Integer(6)).unwrap_err();
    let SpaceError::ConstraintViolation(violation) = err else {
        panic!("expected constraint violation, got {err:?}");
    };
    assert_eq!(violation.values.len(), 3);
    assert_eq!(
        violation.values.get("innodb_log_files_in_group"),
        Some(&ParameterValue::Integer(6))
    );
    assert_eq!(violation.violated.len(), 1);
    assert!(violation.to_string().contains("549755813888"));
    assert_eq!(space.get_all(), before);
    assert!(!mysql_log_capacity_satisfied(100 * GIB, 6, 1));
}

/// Tests mysql constraint rejects log too small for concurrency.
#[test]
fn mysql_constraint_rejects_log_too_small_for_concurrency() {
    let mut space = mysql_space();
    let err = space
        .set_many(&knobs(&[
            ("innodb_log_file_size", ParameterValue::Integer(4 * 1024 * 1024)),
            ("innodb_log_files_in_group", ParameterValue::Integer(2)),
            ("innodb_thread_concurrency", ParameterValue::Integer(1000)),
        ]))
        .unwrap_err();
    assert!(matches!(err, SpaceError::ConstraintViolation(_)));
    assert!(space.constraints_satisfied());
}

/// Tests spaces without constraints are always satisfied.
#[test]
fn spaces_without_constraints_are_always_satisfied() {
    let space = Target::Gcc.build_space(&common::gcc_definition()).unwrap();
    assert!(space.constraints().is_empty());
    assert!(space.constraints_satisfied());
    assert!(space.check_constraints().is_ok());
}

/// Tests randomize all produces legal constraint satisfying values.
#[test]
fn randomize_all_produces_legal_constraint_satisfying_values() {
    let mut space = mysql_space();
    for seed in 0 .. 20 {
        let attempts =
            space.randomize_all(&mut common::rng(seed), DEFAULT_MAX_RANDOM_ATTEMPTS).unwrap();
        assert!(attempts >= 1);
        assert!(space.constraints_satisfied());
        for spec in space.parameters() {
            assert!(spec.validate(spec.current_value()).is_ok());
        }
    }
}

/// Tests randomize all reports exhaustion and leaves space unchanged.
#[test]
fn randomize_all_reports_exhaustion_and_leaves_space_unchanged() {
    let definition = SpaceDefinition::default()
        .with_parameter(
            "innodb_log_file_size",
            ParameterDefinition::integer(400 * GIB, 500 * GIB, None),
        )
        .with_parameter("innodb_log_files_in_group", ParameterDefinition::integer(2, 4, Some(2)))
        .with_parameter("innodb_thread_concurrency", ParameterDefinition::integer(0, 8, None));
    let mut space = ConfigurationSpace::from_definition(&definition)
        .unwrap()
        .with_constraint(std::sync::Arc::new(tunebench_core::MysqlLogCapacity));
    let before = space.get_all();
    let err = space.randomize_all(&mut common::rng(3), 25).unwrap_err();
    assert_eq!(
        err,
        SpaceError::ConstraintUnsatisfiable {
            attempts: 25,
        }
    );
    assert_eq!(space.get_all(), before);
}

/// Tests reset and reset all restore defaults.
#[test]
fn reset_and_reset_all_restore_defaults() {
    let mut space = Target::Gcc.build_space(&common::gcc_definition()).unwrap();
    space.randomize_all(&mut common::rng(5), DEFAULT_MAX_RANDOM_ATTEMPTS).unwrap();
    space.set("unroll-limit", ParameterValue::Integer(63)).unwrap();
    space.reset("unroll-limit").unwrap();
    assert_eq!(space.get("unroll-limit").unwrap(), &ParameterValue::Integer(8));
    space.reset_all();
    for spec in space.parameters() {
        assert_eq!(spec.current_value(), spec.default_value());
    }
    assert!(matches!(space.reset("missing"), Err(SpaceError::UnknownParameter { .. })));
}

/// Tests describe all covers every parameter.
#[test]
fn describe_all_covers_every_parameter() {
    let space = Target::Llvm.build_space(&common::llvm_definition()).unwrap();
    let descriptions = space.describe_all();
    assert_eq!(descriptions.len(), space.len());
    let adce = space.describe("adce").unwrap();
    assert_eq!(descriptions.get("adce"), Some(&adce));
    assert!(matches!(space.describe("nope"), Err(SpaceError::UnknownParameter { .. })));
}

/// Tests set all on skips param scoped knobs.
#[test]
fn set_all_on_skips_param_scoped_knobs() {
    let mut space = Target::Gcc.build_space(&common::gcc_definition()).unwrap();
    let switched = space.set_all_on().unwrap();
    assert_eq!(switched, 2);
    assert_eq!(space.get("tree-vectorize").unwrap(), &ParameterValue::on());
    assert_eq!(space.get("vect-cost-model").unwrap(), &ParameterValue::from("dynamic"));
}

/// Tests duplicate names are rejected.
#[test]
fn duplicate_names_are_rejected() {
    let spec = ParameterDefinition::boolean(true).to_spec("dup").unwrap();
    let err = ConfigurationSpace::new(vec![spec.clone(), spec]).unwrap_err();
    assert_eq!(
        err,
        DefinitionError::DuplicateParameter {
            name: "dup".to_string(),
        }
    );
}
