// crates/tunebench-core/tests/definition.rs
// ============================================================================
// Module: Space Definition Tests
// Description: JSON definition parsing, defaults, and file limits.
// Purpose: Ensure malformed catalogs fail closed before a space exists.
// ============================================================================

//! Space definition loading tests.

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

use std::fs;

use tempfile::tempdir;
use tunebench_core::ConfigurationSpace;
use tunebench_core::DefinitionError;
use tunebench_core::ParameterKind;
use tunebench_core::ParameterScope;
use tunebench_core::ParameterValue;
use tunebench_core::SpaceDefinition;
use tunebench_core::definition::MAX_DEFINITION_BYTES;

const CATALOG: &str = r#"{
    "innodb_buffer_pool_size": {"type": "integer", "min": 5242880, "max": 17179869184, "default": 134217728, "description": "buffer pool"},
    "innodb_adaptive_hash_index": {"type": "enum", "enum_values": ["ON", "OFF"]},
    "innodb_io_capacity": {"type": "integer", "min": 100, "max": 2000},
    "tree-vectorize": {"type": "enum", "enum_values": ["ON", "OFF"], "default": "OFF", "scope": "Transform"},
    "plugin_dir": {"type": "string", "default": "/usr/lib/mysql/plugin"}
}"#;

/// Tests catalog parses with fallback defaults.
#[test]
fn catalog_parses_with_fallback_defaults() {
    let definition = SpaceDefinition::from_json_str(CATALOG).unwrap();
    let space = ConfigurationSpace::from_definition(&definition).unwrap();
    assert_eq!(space.len(), 5);
    assert_eq!(space.get("innodb_io_capacity").unwrap(), &ParameterValue::Integer(100));
    assert_eq!(space.get("innodb_adaptive_hash_index").unwrap(), &ParameterValue::on());
    assert_eq!(
        space.get("innodb_buffer_pool_size").unwrap(),
        &ParameterValue::Integer(134_217_728)
    );
    let scoped = space.parameter("tree-vectorize").unwrap();
    assert_eq!(scoped.scope(), Some(&ParameterScope::Transform));
    let opaque = space.parameter("plugin_dir").unwrap();
    assert_eq!(
        opaque.kind(),
        &ParameterKind::Opaque {
            type_name: "string".to_string(),
        }
    );
}

/// Tests invalid entries are rejected.
#[test]
fn invalid_entries_are_rejected() {
    let cases = [
        (r#"{"a": {"type": "integer", "max": 3}}"#, "missing field min"),
        (r#"{"a": {"type": "integer", "min": 5, "max": 3}}"#, "min 5 exceeds max 3"),
        (r#"{"a": {"type": "enum", "enum_values": []}}"#, "declares no allowed values"),
        (r#"{"a": {"type": "enum"}}"#, "missing field enum_values"),
        (r#"{"a": {"type": "integer", "min": 0, "max": 3, "default": 9}}"#, "invalid default"),
        (r#"{"a": {"type": "enum", "enum_values": ["ON"], "default": "OFF"}}"#, "invalid default"),
    ];
    for (input, needle) in cases {
        let definition = SpaceDefinition::from_json_str(input).unwrap();
        let err = ConfigurationSpace::from_definition(&definition).unwrap_err();
        assert!(err.to_string().contains(needle), "{err} should contain {needle}");
    }
}

/// Tests unsigned 64-bit bounds saturate to the integer range.
#[test]
fn unsigned_64_bit_bounds_saturate_to_the_integer_range() {
    let input = r#"{
        "max_binlog_cache_size": {"type": "integer", "min": 4096, "max": 18446744073709551615},
        "offset": {"type": "integer", "min": -99999999999999999999, "max": 0}
    }"#;

    let definition = SpaceDefinition::from_json_str(input).unwrap();
    let space = ConfigurationSpace::from_definition(&definition).unwrap();

    assert_eq!(
        space.parameter("max_binlog_cache_size").unwrap().kind(),
        &ParameterKind::Integer {
            min: 4096,
            max: i64::MAX,
        }
    );
    assert_eq!(
        space.parameter("offset").unwrap().kind(),
        &ParameterKind::Integer {
            min: i64::MIN,
            max: 0,
        }
    );
    assert_eq!(space.get("offset").unwrap(), &ParameterValue::Integer(i64::MIN));
}

/// Tests malformed json is a parse error.
#[test]
fn malformed_json_is_a_parse_error() {
    for input in ["", "[]", r#"{"a": 1}"#, r#"{"a": {"min": 1}}"#] {
        let err = SpaceDefinition::from_json_str(input).unwrap_err();
        assert!(matches!(err, DefinitionError::Parse(_)), "{input} should fail to parse");
    }
}

/// Tests from path reads file and enforces limit.
#[test]
fn from_path_reads_file_and_enforces_limit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("knobs.json");
    fs::write(&path, CATALOG).unwrap();
    let definition = SpaceDefinition::from_path(&path).unwrap();
    assert_eq!(definition.parameters.len(), 5);

    let oversized = dir.path().join("huge.json");
    fs::write(&oversized, vec![b' '; MAX_DEFINITION_BYTES + 1]).unwrap();
    assert_eq!(
        SpaceDefinition::from_path(&oversized).unwrap_err(),
        DefinitionError::TooLarge {
            max_bytes: MAX_DEFINITION_BYTES,
        }
    );

    let missing = SpaceDefinition::from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(missing, DefinitionError::Io(_)));
}
