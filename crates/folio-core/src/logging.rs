#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Library code logs through `tracing` macros and never installs a
//! subscriber. Hosts that want structured output enable the `tracing-json`
//! feature and call [`init_json`] once at startup.

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,folio_timeline=debug,folio_web=info";

/// Install a global JSON subscriber honouring `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
        .is_ok()
}
