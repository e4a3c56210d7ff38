//!
//! Logging for the workspace crates: the `log` facade macros plus a `log4rs`
//! console logger configured from a `RUST_LOG`-style filter expression.
//!

mod appender;
mod consts;
mod logger;

pub use consts::*;
pub use log::{Level, LevelFilter, debug, error, info, log_enabled, trace, warn};
pub use logger::LogError;

use appender::AppenderSpec;
use log4rs::{
    Config,
    config::Root,
};
use logger::Loggers;

/// Installs the console logger. `filters` follows the `RUST_LOG` syntax
/// (`info,kastx_wallet_core=debug`); an empty expression falls back to the
/// [`DEFAULT_LOGGER_ENV`] environment variable and then to [`DEFAULT_LOG_FILTERS`].
///
/// The logger is global: once installed, later calls return [`LogError::InitError`].
pub fn try_init_logger(filters: &str) -> Result<(), LogError> {
    let config = logger_config(&resolve_filters(filters), true)?;
    log4rs::init_config(config).map(|_| ()).map_err(|err| LogError::InitError(err.to_string()))
}

/// Same as [`try_init_logger`], ignoring repeated initialisation.
pub fn init_logger(filters: &str) {
    if let Err(err) = try_init_logger(filters) {
        // The global logger may legitimately be installed already (tests, embedding applications)
        log::debug!("{err}");
    }
}

fn resolve_filters(filters: &str) -> String {
    match filters.trim() {
        "" => std::env::var(DEFAULT_LOGGER_ENV).ok().filter(|x| !x.trim().is_empty()).unwrap_or_else(|| DEFAULT_LOG_FILTERS.to_string()),
        filters => filters.to_string(),
    }
}

fn logger_config(filters: &str, colored: bool) -> Result<Config, LogError> {
    let (loggers, errors) = Loggers::parse(filters, LevelFilter::Info);
    for err in errors {
        eprintln!("Ignoring invalid logging spec '{err}'");
    }

    let console = AppenderSpec::console(CONSOLE_APPENDER, None, colored);
    let appenders = [console.name];
    let config = Config::builder()
        .appender(console.appender())
        .loggers(loggers.loggers.iter().map(|spec| spec.logger(&appenders)))
        .build(Root::builder().appenders(appenders).build(loggers.root_level))
        .map_err(|err| LogError::InitError(err.to_string()))?;
    Ok(config)
}
