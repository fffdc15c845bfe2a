//! Runtime-gated tracing setup, replacing the original's compile-time
//! `#ifdef LAIK_DEBUG printf` blocks with `tracing` calls that a subscriber
//! can filter at runtime via `RUST_LOG` or the [`crate::config::DEBUG_ENV_VAR`]
//! switch.
//!
//! This crate itself only ever emits `tracing::debug!`/`trace!` calls; it
//! never installs a global subscriber on its own (a library should not do
//! that for its embedder). [`init_tracing`] is a convenience the `testing`
//! module and downstream binaries can call.

use tracing_subscriber::EnvFilter;

/// Install a process-wide `tracing` subscriber honoring `RUST_LOG`,
/// defaulting to `debug` when [`crate::config::debug_enabled`] is set and
/// `warn` otherwise. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let default_level = if crate::config::debug_enabled() { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
