pub mod config;
pub mod models;
pub mod pipeline;
pub mod eval; // Offline evaluation metrics

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Filter comes from `RUST_LOG`, falling back to `config::default_log_filter()`.
/// Calling twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
