use std::sync::OnceLock;
use tracing_subscriber::filter::EnvFilter;

/// Environment variable consulted when no `log=` option was given.
pub const LOG_ENV_VAR: &str = "LAMBDA_LOCATION_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

static INIT_GUARD: OnceLock<()> = OnceLock::new();

/// Install a stderr `fmt` subscriber once per process.
///
/// `directive` (from the `log=` agent option) wins over
/// `LAMBDA_LOCATION_LOG`, which wins over `warn`. An invalid directive falls
/// back to the default. If the host process already installed a global
/// subscriber, ours is silently skipped.
pub fn init(directive: Option<&str>) {
    if INIT_GUARD.set(()).is_err() {
        return;
    }

    let filter = directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_from_env(LOG_ENV_VAR).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE));

    let init_res = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
    let _ = init_res; // ignore AlreadyInit
}
