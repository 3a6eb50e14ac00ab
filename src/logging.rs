//! Console logging for the drawing session.

use tracing_subscriber::EnvFilter;

/// Level of an ordinary run. Raw model output and per-directive traces sit at
/// `debug`, below it.
const QUIET: &str = "info";
const VERBOSE: &str = "debug";

/// Filter directives for a run. `RUST_LOG` is only consulted once
/// `debug_logging` is set in the settings file.
pub fn directives(debug_logging: bool, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(env) if debug_logging && !env.is_empty() => env.to_string(),
        _ if debug_logging => VERBOSE.to_string(),
        _ => QUIET.to_string(),
    }
}

/// Installs the stdout subscriber. Later calls leave the first one in place.
pub fn init(debug_logging: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let wanted = directives(debug_logging, env.as_deref());
    let (filter, rejected) = match EnvFilter::try_new(&wanted) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(VERBOSE), Some(e)),
    };
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        return;
    }
    if let Some(e) = rejected {
        tracing::warn!("ignoring {}={wanted}: {e}", EnvFilter::DEFAULT_ENV);
    }
}
