//! Inline-function ranges.
//!
//! When kotlinc inlines a function body it emits a synthetic local variable
//! named `$i$f$<function>` whose scope covers exactly the inlined
//! instructions. Lines attributed to those instructions belong to the inlined
//! function's source, not the lambda's.

use crate::introspect::LocalVariable;

pub const INLINE_MARKER_PREFIX: &[u8] = b"$i$f$";

/// Half-open bytecode interval `[start, end)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InlineRange {
    pub start: i64,
    pub end: i64,
}

impl InlineRange {
    pub fn contains(&self, location: i64) -> bool {
        self.start <= location && location < self.end
    }
}

pub fn is_inline_marker(name: &[u8]) -> bool {
    name.starts_with(INLINE_MARKER_PREFIX)
}

/// Ranges of every marker variable, in table order.
///
/// Overlapping or duplicate ranges are kept as they are.
pub fn compute_inline_ranges<V: LocalVariable>(variables: &[V]) -> Vec<InlineRange> {
    let mut ranges = Vec::with_capacity(variables.len());
    for var in variables {
        if is_inline_marker(var.name()) {
            let start = var.start_location();
            ranges.push(InlineRange { start, end: start + i64::from(var.length()) });
        }
    }
    ranges
}
