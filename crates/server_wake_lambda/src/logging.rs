use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info";

pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Installs a JSON subscriber writing one line per event to stdout, where the
/// Lambda service forwards it to CloudWatch. `RUST_LOG` overrides the level.
pub fn init_logging() -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_current_span(false)
        .with_ansi(false)
        .try_init()
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
