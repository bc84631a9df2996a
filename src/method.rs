//! Locating the lambda's entry method.

use tracing::trace;

use crate::error::IntrospectError;
use crate::inline::{compute_inline_ranges, InlineRange};
use crate::introspect::{ClassIntrospector, ACC_BRIDGE};
use crate::line_range::{analyze, LineSpan};

/// Name of the functional entry point of Kotlin function objects.
pub const DEFAULT_ENTRY_METHOD: &str = "invoke";

/// The chosen method and what its tables produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSelection<M> {
    pub method: M,
    pub span: LineSpan,
    pub inline_ranges: Vec<InlineRange>,
}

/// First non-bridge method named `entry_name`, in declaration order, whose
/// line table yields a span.
///
/// Each candidate's tables are dropped (and released) before the next one
/// is fetched. Any failed query aborts the scan.
pub fn select_entry_method<I: ClassIntrospector>(
    introspector: &I,
    class: I::Class,
    entry_name: &str,
) -> Result<Option<MethodSelection<I::Method>>, IntrospectError> {
    let methods = introspector.class_methods(class)?;

    for &method in methods.iter() {
        let modifiers = introspector.method_modifiers(method)?;
        if modifiers & ACC_BRIDGE != 0 {
            continue;
        }

        let name = introspector.method_name(method)?;
        if name.as_ref() != entry_name.as_bytes() {
            continue;
        }
        drop(name);

        let variables = introspector.local_variable_table(method)?;
        let lines = introspector.line_number_table(method)?;

        let inline_ranges = compute_inline_ranges(&*variables);
        let span = analyze(&lines, &inline_ranges);
        trace!(
            target: "lambda_location",
            lines = lines.len(),
            inline_ranges = inline_ranges.len(),
            ?span,
            "analyzed candidate `{}`",
            entry_name
        );

        if let Some(span) = span {
            return Ok(Some(MethodSelection { method, span, inline_ranges }));
        }
    }

    Ok(None)
}
