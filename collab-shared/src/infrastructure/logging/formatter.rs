use tracing_subscriber::{fmt, EnvFilter};

use super::config::{LogFormat, LoggerConfig};

/// Initialize the global tracing subscriber from a [`LoggerConfig`].
///
/// Safe to call once at process startup; a second call is a no-op because
/// `tracing`'s global dispatcher can only be set once per process.
pub fn init_logger(config: &LoggerConfig) {
    let filter = if !config.get_filter_string().is_empty() {
        EnvFilter::try_new(config.get_filter_string())
    } else {
        EnvFilter::try_from_default_env()
    }
    .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let result = if config.format == LogFormat::Json {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };

    if let Err(err) = result {
        eprintln!("tracing subscriber already initialized: {err}");
    }
}

/// Initialize the logger with built-in defaults, bypassing [`crate::Settings`].
///
/// Useful for binaries (migrators, one-off scripts) that need logging before
/// configuration has been loaded.
pub fn init_default() {
    init_logger(&LoggerConfig::default());
}
