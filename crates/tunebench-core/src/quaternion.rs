// crates/tunebench-core/src/quaternion.rs
// ============================================================================
// Module: Alignment Quaternion Table
// Description: Enumeration of GCC alignment settings as `n:m:n1:m1` strings.
// Purpose: Map an integer knob index onto a GCC `-falign-*` argument.
// Dependencies: std::sync::OnceLock
// ============================================================================

//! ## Overview
//! GCC alignment flags take up to four colon-separated numbers `n:m:n1:m1`.
//! The table enumerates every tuple with `n, n1` drawn from powers of two
//! (plus zero), `m, m1` drawn from `2^k - 1` values, and `m < n`, `n1 < n`,
//! `m1 < n1`, in nested `n, m, n1, m1` order. An alignment knob stores an
//! index into this table; the table is built once and shared.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Candidate values for `n` and `n1`.
pub const ALIGN_N_VALUES: [u32; 12] = [0, 1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024];
/// Candidate values for `m` and `m1`.
pub const ALIGN_M_VALUES: [u32; 7] = [0, 1, 3, 7, 15, 31, 63];
/// GCC alignment knobs encoded through the table.
pub const ALIGN_FLAGS: [&str; 4] =
    ["align-functions", "align-jumps", "align-labels", "align-loops"];

/// Lazily built table shared by every encoder.
static TABLE: OnceLock<Vec<String>> = OnceLock::new();

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats one alignment tuple.
///
/// `n` is emitted when positive and `m` follows only when both are positive;
/// `n1` and `m1` follow the same rule. Parts are joined with `:` and the
/// all-zero tuple renders as the empty string.
#[must_use]
pub fn format_quaternion(n: u32, m: u32, n1: u32, m1: u32) -> String {
    let mut parts = Vec::with_capacity(4);
    for (major, minor) in [(n, m), (n1, m1)] {
        if major > 0 {
            parts.push(major.to_string());
            if minor > 0 {
                parts.push(minor.to_string());
            }
        }
    }
    parts.join(":")
}

// ============================================================================
// SECTION: Table
// ============================================================================

/// Returns the full alignment table in enumeration order.
#[must_use]
pub fn quaternion_table() -> &'static [String] {
    TABLE.get_or_init(build_table)
}

/// Returns the formatted entry at `index`, if in range.
#[must_use]
pub fn quaternion_at(index: i64) -> Option<&'static str> {
    usize::try_from(index).ok().and_then(|idx| quaternion_table().get(idx)).map(String::as_str)
}

/// Returns the largest valid table index.
#[must_use]
pub fn quaternion_max_index() -> i64 {
    i64::try_from(quaternion_table().len().saturating_sub(1)).unwrap_or(i64::MAX)
}

/// Enumerates the table in `n, m, n1, m1` order.
fn build_table() -> Vec<String> {
    let mut table = Vec::new();
    for n in ALIGN_N_VALUES {
        for m in ALIGN_M_VALUES.into_iter().filter(|m| *m < n) {
            for n1 in ALIGN_N_VALUES.into_iter().filter(|n1| *n1 < n) {
                for m1 in ALIGN_M_VALUES.into_iter().filter(|m1| *m1 < n1) {
                    table.push(format_quaternion(n, m, n1, m1));
                }
            }
        }
    }
    table
}
