//! Class → source location.

use tracing::debug;

use crate::error::ResolveError;
use crate::introspect::ClassIntrospector;
use crate::method::{select_entry_method, DEFAULT_ENTRY_METHOD};
use crate::mutf8;

/// Where a lambda's body lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub source_file: String,
    pub start_line: i32,
    pub end_line: i32,
}

/// Resolves classes against one introspector.
#[derive(Debug, Clone)]
pub struct Resolver<I> {
    introspector: I,
    entry_method: String,
}

impl<I: ClassIntrospector> Resolver<I> {
    pub fn new(introspector: I) -> Self {
        Self::with_entry_method(introspector, DEFAULT_ENTRY_METHOD)
    }

    pub fn with_entry_method(introspector: I, entry_method: impl Into<String>) -> Self {
        Self { introspector, entry_method: entry_method.into() }
    }

    pub fn introspector(&self) -> &I {
        &self.introspector
    }

    /// Source file and line span of `class`'s entry method.
    ///
    /// The source file is only queried once a method has produced a span.
    pub fn resolve(&self, class: I::Class) -> Result<ResolvedLocation, ResolveError> {
        let selection = select_entry_method(&self.introspector, class, &self.entry_method)?
            .ok_or_else(|| ResolveError::NoResolvableMethod {
                entry_method: self.entry_method.clone(),
            })?;

        let source_file = self.introspector.source_file_name(class)?;
        let source_file = mutf8::decode(source_file.as_ref());

        debug!(
            target: "lambda_location",
            %source_file,
            start = selection.span.start,
            end = selection.span.end,
            "resolved lambda location"
        );

        Ok(ResolvedLocation {
            source_file,
            start_line: selection.span.start,
            end_line: selection.span.end,
        })
    }
}

/// One-shot form of [`Resolver::resolve`].
pub fn resolve<I: ClassIntrospector>(
    introspector: I,
    class: I::Class,
    entry_method: &str,
) -> Result<ResolvedLocation, ResolveError> {
    Resolver::with_entry_method(introspector, entry_method).resolve(class)
}
