//! Tracing bootstrap honoring the configured log format.

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. Calling twice is a no-op,
/// which keeps tests that each boot the stack from panicking.
pub fn init(settings: &TelemetrySettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
