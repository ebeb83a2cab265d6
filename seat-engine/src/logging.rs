//! Tracing subscriber setup for hosts embedding the engine

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{EngineError, EngineResult};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured directives. When `log_dir` is set a
/// daily rolling file layer is added, written as JSON lines if `json` is
/// set. Keep the returned guard alive for as long as logs should be
/// flushed. Calling this twice is a no-op.
pub fn init_logging(config: &LoggingConfig) -> EngineResult<Option<WorkerGuard>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::try_new(&config.directives)
            .map_err(|e| EngineError::Config(format!("invalid log directives: {}", e)))?,
    };

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stdout);

    let (text_file_layer, json_file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if config.json {
                let layer = fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(writer);
                (None, Some(layer), Some(guard))
            } else {
                let layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(writer);
                (Some(layer), None, Some(guard))
            }
        }
        None => (None, None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(text_file_layer)
        .with(json_file_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            directives = %config.directives,
            log_dir = ?config.log_dir,
            "Tracing initialized"
        );
    } else {
        tracing::debug!("Tracing subscriber already installed, skipping");
    }
    Ok(guard)
}
