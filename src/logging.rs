//! tracing subscriber setup for both subcommands.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

const SERVER_FILTER: &str = "larder=info,tower_http=info";
const CLIENT_FILTER: &str = "larder=info";

fn env_filter(default: &str) -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to stderr, filtered by `RUST_LOG`.
pub fn init_server() {
  fmt().with_env_filter(env_filter(SERVER_FILTER)).init();
}

/// Log to a daily file under `dir`, since the terminal belongs to the UI.
///
/// The returned guard flushes buffered lines on drop; hold it until exit.
pub fn init_client(dir: &Path) -> WorkerGuard {
  let appender = tracing_appender::rolling::daily(dir, "larder.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  fmt()
    .with_env_filter(env_filter(CLIENT_FILTER))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  guard
}
