//! Tracing/logging pipeline bootstrap.

use alexandria_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber from telemetry settings.
///
/// `RUST_LOG` overrides the configured filter when set. Safe to call more
/// than once; later calls are ignored so tests stay independent.
pub fn init(settings: &TelemetrySettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match settings.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("telemetry already initialized, keeping existing subscriber");
    }
}
