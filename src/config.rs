//! Agent options.
//!
//! When loaded with `-agentpath:liblambda_location.so=<options>` (or through
//! dynamic attach) the options string is a comma separated list of
//! `key=value` pairs:
//!
//! | key            | meaning                                              |
//! |----------------|------------------------------------------------------|
//! | `log`          | `tracing` filter directive, `;` separates directives |
//! | `result_class` | internal name of the class returned to Java          |
//! | `entry_method` | name of the lambda entry method (default `invoke`)   |
//!
//! A library loaded through `System.loadLibrary` never sees options and uses
//! the defaults.

use std::sync::OnceLock;

use crate::error::OptionsError;
use crate::method::DEFAULT_ENTRY_METHOD;

pub const DEFAULT_RESULT_CLASS: &str = "androidx/compose/ui/inspection/inspector/LambdaLocation";

/// Constructor of the result class: `(String fileName, int startLine, int endLine)`.
pub const RESULT_CONSTRUCTOR_SIG: &str = "(Ljava/lang/String;II)V";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    pub log: Option<String>,
    pub result_class: String,
    pub entry_method: String,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            log: None,
            result_class: DEFAULT_RESULT_CLASS.to_string(),
            entry_method: DEFAULT_ENTRY_METHOD.to_string(),
        }
    }
}

impl AgentOptions {
    pub fn parse(options: &str) -> Result<Self, OptionsError> {
        let mut parsed = Self::default();

        for item in options.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = item
                .split_once('=')
                .ok_or_else(|| OptionsError::MissingValue(item.to_string()))?;
            let key = key.trim();
            let value = value.trim();
            if value.is_empty() {
                return Err(OptionsError::EmptyValue(key.to_string()));
            }

            match key {
                // `,` already separates options, so filter directives use `;`
                "log" => parsed.log = Some(value.replace(';', ",")),
                "result_class" => parsed.result_class = value.replace('.', "/"),
                "entry_method" => parsed.entry_method = value.to_string(),
                _ => return Err(OptionsError::UnknownKey(key.to_string())),
            }
        }

        Ok(parsed)
    }
}

static OPTIONS: OnceLock<AgentOptions> = OnceLock::new();

/// Make `options` the process-wide configuration.
///
/// Only the first call has an effect; returns whether it was this one.
pub fn install(options: AgentOptions) -> bool {
    OPTIONS.set(options).is_ok()
}

/// The installed configuration, or the defaults if nothing was installed.
pub fn current() -> &'static AgentOptions {
    OPTIONS.get_or_init(AgentOptions::default)
}
