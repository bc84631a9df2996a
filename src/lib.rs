//! # lambda-location
//!
//! Maps a compiled Kotlin lambda class loaded in a running JVM back to the
//! source file and line span of its body, for layout inspectors that need to
//! jump from a runtime lambda to the editor.
//!
//! The library is loaded into the inspected process, either through
//! `System.loadLibrary` or as a JVMTI agent (`-agentpath`, dynamic attach),
//! and answers the Java call:
//!
//! ```java
//! // androidx.compose.ui.inspection.inspector.LambdaLocation
//! static native LambdaLocation resolve(Class<?> lambdaClass);
//! ```
//!
//! ## How a class is resolved
//!
//! 1. Enumerate the class's methods and take the first non-bridge `invoke`.
//! 2. Collect inline ranges: local variables named `$i$f$…` mark bytecode
//!    that kotlinc inlined from another function (see [`inline`]).
//! 3. Reduce the line number table, ignoring rows inside those ranges and
//!    rows with non-positive lines, to `(min, max)` (see [`line_range`]).
//! 4. Pair the span with the class's `SourceFile`.
//!
//! Steps 1-4 run against any [`introspect::ClassIntrospector`]: a live
//! [`env::Jvmti`] or parsed `.class` files ([`classfile`]).
//!
//! ```rust,ignore
//! use lambda_location::prelude::*;
//!
//! let mut classes = ClassFileIntrospector::new();
//! let id = classes.add(&std::fs::read("MainKt$onCreate$1.class")?)?;
//! let location = Resolver::new(&classes).resolve(id)?;
//! println!("{}:{}-{}", location.source_file, location.start_line, location.end_line);
//! ```
//!
//! ## Failure model
//!
//! JVMTI capability negotiation and result-type binding happen once per
//! process and remember failure. Everything below [`native`] returns typed
//! errors; the exported functions log them through `tracing` and return
//! `null` to Java.

pub mod sys;
pub mod env;

// Implementation modules (use `env` module for the public API)
#[doc(hidden)]
pub mod jvmti_wrapper;
#[doc(hidden)]
pub mod jni_wrapper;

pub mod binding;
pub mod buffer;
pub mod cache;
pub mod capability;
pub mod classfile;
pub mod config;
pub mod context;
pub mod error;
pub mod inline;
pub mod introspect;
pub mod line_range;
pub mod logging;
pub mod method;
pub mod mutf8;
pub mod native;
pub mod prelude;
pub mod resolve;

pub use crate::error::{IntrospectError, ResolveError};
pub use crate::resolve::{resolve, ResolvedLocation, Resolver};
pub use crate::sys::jni;
