//! Error types.
//!
//! Everything below the native boundary returns one of these; the exported
//! functions in [`crate::native`] log them and hand `null` back to Java.

use thiserror::Error;

use crate::sys::jvmti::jvmtiError;

/// A single metadata query failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectError {
    #[error("{call} failed: {error}")]
    Jvmti { call: &'static str, error: jvmtiError },

    #[error("{call}: information not present (compiled without debug info?)")]
    AbsentInformation { call: &'static str },

    #[error("{call}: invalid class or method handle")]
    InvalidHandle { call: &'static str },
}

impl IntrospectError {
    /// Classify a JVMTI status returned by `call`.
    pub fn from_jvmti(call: &'static str, error: jvmtiError) -> Self {
        match error {
            jvmtiError::ABSENT_INFORMATION => IntrospectError::AbsentInformation { call },
            jvmtiError::INVALID_CLASS | jvmtiError::INVALID_METHODID => {
                IntrospectError::InvalidHandle { call }
            }
            _ => IntrospectError::Jvmti { call, error },
        }
    }

    pub fn call(&self) -> &'static str {
        match self {
            IntrospectError::Jvmti { call, .. }
            | IntrospectError::AbsentInformation { call }
            | IntrospectError::InvalidHandle { call } => call,
        }
    }
}

/// Why a lambda class could not be mapped to a source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("JVMTI line number capability is unavailable")]
    CapabilityUnavailable,

    #[error("result class or its constructor could not be bound")]
    BindingUnavailable,

    #[error(transparent)]
    Introspection(#[from] IntrospectError),

    #[error("no non-bridge `{entry_method}` method with line information")]
    NoResolvableMethod { entry_method: String },

    #[error("constructing the result object failed")]
    ResultConstruction,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassFileError {
    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("invalid magic: {0:#x}")]
    InvalidMagic(u32),

    #[error("invalid constant pool index: {0}")]
    InvalidConstantPoolIndex(u16),

    #[error("invalid constant pool tag: {0}")]
    InvalidConstantPoolTag(u8),

    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("option `{0}` is not of the form key=value")]
    MissingValue(String),

    #[error("unknown option `{0}`")]
    UnknownKey(String),

    #[error("option `{0}` has an empty value")]
    EmptyValue(String),
}
