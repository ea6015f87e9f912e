// crates/tunebench-core/tests/quaternion.rs
// ============================================================================
// Module: Quaternion Table Tests
// Description: Alignment tuple formatting and table enumeration.
// Purpose: Keep the alignment index space stable across runs.
// ============================================================================

//! Alignment quaternion table tests.

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

use tunebench_core::ParameterKind;
use tunebench_core::Target;
use tunebench_core::format_quaternion;
use tunebench_core::quaternion::ALIGN_FLAGS;
use tunebench_core::quaternion::quaternion_at;
use tunebench_core::quaternion::quaternion_max_index;
use tunebench_core::quaternion_table;

/// Tests all zero tuple formats empty.
#[test]
fn all_zero_tuple_formats_empty() {
    assert_eq!(format_quaternion(0, 0, 0, 0), "");
}

/// Tests minor parts require positive majors.
#[test]
fn minor_parts_require_positive_majors() {
    assert_eq!(format_quaternion(8, 0, 0, 0), "8");
    assert_eq!(format_quaternion(8, 7, 0, 0), "8:7");
    assert_eq!(format_quaternion(8, 0, 4, 0), "8:4");
    assert_eq!(format_quaternion(8, 7, 4, 3), "8:7:4:3");
    assert_eq!(format_quaternion(0, 7, 4, 3), "4:3");
}

/// Tests table is fixed and ordered.
#[test]
fn table_is_fixed_and_ordered() {
    let table = quaternion_table();
    assert_eq!(table.len(), 1400);
    assert_eq!(table[0], "2:1");
    assert_eq!(table[1], "2:1:1");
    assert_eq!(table[table.len() - 1], "1024:63:512:63");
    assert_eq!(quaternion_table(), table);
    assert_eq!(quaternion_at(-1), None);
    assert_eq!(quaternion_at(1400), None);
}

/// Tests gcc align knobs take table bound.
#[test]
fn gcc_align_knobs_take_table_bound() {
    let mut definition = common::gcc_definition();
    for flag in ALIGN_FLAGS {
        definition = definition.with_parameter(
            flag,
            tunebench_core::ParameterDefinition::integer(0, 3, None).with_scope("Align"),
        );
    }
    let space = Target::Gcc.build_space(&definition).unwrap();
    for flag in ALIGN_FLAGS {
        let spec = space.parameter(flag).unwrap();
        assert_eq!(
            spec.kind(),
            &ParameterKind::Integer {
                min: 0,
                max: quaternion_max_index(),
            }
        );
    }
    assert_eq!(quaternion_max_index(), 1399);
}
