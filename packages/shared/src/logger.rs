//! Tracing setup shared by the Flexin binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose spans and events are shown at the default level.
const LOGGED_CRATES: [&str; 3] = ["flexin_shared", "flexin_server", "tower_http"];

/// Install the global tracing subscriber.
///
/// Without `RUST_LOG`, the Flexin crates, `tower_http` (request traces) and
/// the binary `binary_name` log at `default_log_level`.
///
/// ```no_run
/// flexin_shared::logger::setup_logger("flexin-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(binary_name, default_log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_directives(binary_name: &str, level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    LOGGED_CRATES
        .iter()
        .copied()
        .chain(std::iter::once(binary_target.as_str()))
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}
