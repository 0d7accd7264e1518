use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

pub struct LoggingConfig {
    pub log_file: Option<PathBuf>,
    pub stderr: bool,
}

impl LoggingConfig {
    pub fn new(log_file: Option<PathBuf>, stderr: bool) -> Self {
        Self { log_file, stderr }
    }
}

#[derive(Debug)]
pub enum LogError {
    InitError(String),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::InitError(message) => write!(f, "Failed to initialize logging: {message}"),
        }
    }
}

impl std::error::Error for LogError {}

/// Install the process-wide subscriber: an optional file layer plus an
/// optional stderr layer filtered by `RUST_LOG` (default DEBUG). Callable
/// once per process.
pub fn init(config: LoggingConfig) -> Result<(), LogError> {
    let subscriber = Registry::default();

    let file_layer = if let Some(log_file) = config.log_file {
        let log_file =
            std::fs::File::create(log_file).map_err(|e| LogError::InitError(e.to_string()))?;
        Some(tracing_subscriber::fmt::layer().with_writer(log_file))
    } else {
        None
    };
    let subscriber = subscriber.with(file_layer);

    let stderr_layer = if config.stderr {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::DEBUG.into())
            .from_env_lossy();
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
    } else {
        None
    };
    let subscriber = subscriber.with(stderr_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LogError::InitError(e.to_string()))?;
    Ok(())
}
