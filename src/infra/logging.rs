use crate::infra::config::Environment;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `fmt` subscriber. `RUST_LOG` wins over the environment default.
pub fn init(environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()));
    fmt().with_env_filter(filter).init();
}
