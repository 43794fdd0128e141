//! Log output for bannerd.
//!
//! The binary installs the subscriber before the config file is read, so it
//! starts at `info` and switches to `[logging] level` once the config is
//! loaded. An explicit `RUST_LOG` pins the filter for the whole run.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

static FILTER: OnceLock<FilterHandle> = OnceLock::new();

fn rust_log_is_set() -> bool {
    std::env::var_os("RUST_LOG").is_some()
}

/// Builds a filter from a directive such as `info` or `bannerd_server=debug`.
///
/// An unparsable directive falls back to `info` so a typo in config never
/// silences the process.
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber at `info`.
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_tracing_with_level(level: &str) {
    let filter = if rust_log_is_set() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(level))
    } else {
        filter_for(level)
    };

    let (filter_layer, handle) = reload::Layer::new(filter);
    if FILTER.set(handle).is_err() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Switches the active filter to `level`, unless `RUST_LOG` is set.
pub fn apply_logging_level(level: &str) {
    if rust_log_is_set() {
        return;
    }
    let Some(handle) = FILTER.get() else {
        return;
    };
    if let Err(e) = handle.reload(filter_for(level)) {
        tracing::warn!(error = %e, level, "could not change log level");
    }
}
