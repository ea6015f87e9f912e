// crates/tunebench-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Helpers
// Description: Shared definitions and RNG fixtures for core tests.
// Purpose: Reduce duplication across integration tests for tunebench-core.
// ============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use rand::SeedableRng;
use rand::rngs::StdRng;
use tunebench_core::ParameterDefinition;
use tunebench_core::ParameterValue;
use tunebench_core::SpaceDefinition;

/// One gibibyte.
pub const GIB: i64 = 1024 * 1024 * 1024;

/// Returns a deterministic RNG for sampling tests.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Returns a small GCC definition covering every encoding rule.
pub fn gcc_definition() -> SpaceDefinition {
    SpaceDefinition::default()
        .with_parameter(
            "align-functions",
            ParameterDefinition::integer(0, 0, None).with_scope("Align"),
        )
        .with_parameter(
            "align-loops",
            ParameterDefinition::integer(0, 10, Some(1)).with_scope("Align"),
        )
        .with_parameter("inline-functions", ParameterDefinition::boolean(true))
        .with_parameter("tree-vectorize", ParameterDefinition::boolean(false))
        .with_parameter(
            "vect-cost-model",
            ParameterDefinition::enumeration(
                vec!["unlimited".into(), "dynamic".into(), "cheap".into()],
                Some("dynamic".into()),
            )
            .with_scope("Param"),
        )
        .with_parameter("unroll-limit", ParameterDefinition::integer(0, 64, Some(8)))
}

/// Returns a small LLVM definition with analysis and transform passes.
pub fn llvm_definition() -> SpaceDefinition {
    SpaceDefinition::default()
        .with_parameter("aa-eval", ParameterDefinition::boolean(false).with_scope("Analysis"))
        .with_parameter("basic-aa", ParameterDefinition::boolean(true).with_scope("Analysis"))
        .with_parameter("adce", ParameterDefinition::boolean(true).with_scope("Transform"))
        .with_parameter("licm", ParameterDefinition::boolean(false).with_scope("Transform"))
}

/// Returns a MySQL definition with the redo log knobs plus one enum knob.
pub fn mysql_definition() -> SpaceDefinition {
    SpaceDefinition::default()
        .with_parameter(
            "innodb_log_file_size",
            ParameterDefinition::integer(4 * 1024 * 1024, 512 * GIB, Some(48 * 1024 * 1024)),
        )
        .with_parameter("innodb_log_files_in_group", ParameterDefinition::integer(2, 100, Some(2)))
        .with_parameter("innodb_thread_concurrency", ParameterDefinition::integer(0, 1000, Some(0)))
        .with_parameter(
            "innodb_flush_log_at_trx_commit",
            ParameterDefinition::enumeration(
                vec![
                    ParameterValue::Integer(0),
                    ParameterValue::Integer(1),
                    ParameterValue::Integer(2),
                ],
                Some(ParameterValue::Integer(1)),
            ),
        )
}
