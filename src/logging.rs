//! Tracing setup shared by the server and the sample data tool.

use actix_web::middleware::Logger;
use tracing_subscriber::EnvFilter;

/// Access log line: method and path, status, elapsed seconds.
pub const ACCESS_LOG_FORMAT: &str = "%r => %s in %T seconds";

/// Installs the global subscriber. `RUST_LOG` controls verbosity and
/// defaults to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn access_log() -> Logger {
    Logger::new(ACCESS_LOG_FORMAT)
}
