//! Process-wide log output.
//!
//! Log events are written through [`RoutedWriter`], which looks up the
//! current process sink on every write. Replacing that sink, directly with
//! [`set_output`] or through a [`LogPatcher`](crate::LogPatcher), redirects
//! all subsequent output without reinstalling the subscriber.

use std::mem;
use std::sync::{LazyLock, PoisonError, RwLock};

use thiserror::Error;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{ConfigError, LogConfig, LogFormat};
use crate::log::Sink;

static OUTPUT: LazyLock<RwLock<Sink>> = LazyLock::new(|| RwLock::new(Sink::stderr()));

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// The sink log output is currently written to.
pub fn output() -> Sink {
    OUTPUT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process sink, returning the previous one.
pub fn set_output(sink: Sink) -> Sink {
    let mut current = OUTPUT.write().unwrap_or_else(PoisonError::into_inner);
    mem::replace(&mut *current, sink)
}

/// [`MakeWriter`] that writes to whatever [`output`] is at the time of the
/// event.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutedWriter;

impl<'a> MakeWriter<'a> for RoutedWriter {
    type Writer = Sink;

    fn make_writer(&'a self) -> Self::Writer {
        output()
    }
}

/// Build a subscriber for `config` writing through [`RoutedWriter`].
///
/// # Errors
///
/// Returns [`InitError::Filter`] if the filter directive does not parse.
pub fn subscriber(config: &LogConfig) -> Result<Box<dyn Subscriber + Send + Sync>, InitError> {
    let builder = fmt()
        .with_env_filter(EnvFilter::try_new(&config.filter)?)
        .with_writer(RoutedWriter);
    Ok(match config.format {
        LogFormat::Text => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    })
}

/// Initialise the global subscriber from `PATCHER_LOG_*` variables.
///
/// # Examples
///
/// ```rust,no_run
/// patcher::logging::init().expect("install log subscriber");
/// tracing::info!("logging is initialised");
/// ```
///
/// # Errors
///
/// Returns [`InitError`] if the configuration is invalid or a global
/// subscriber is already installed.
pub fn init() -> Result<(), InitError> {
    init_with_config(&LogConfig::load()?)
}

/// Initialise the global subscriber with an explicit configuration.
///
/// # Errors
///
/// Returns [`InitError`] if the filter is invalid or a global subscriber
/// is already installed.
pub fn init_with_config(config: &LogConfig) -> Result<(), InitError> {
    tracing::subscriber::set_global_default(subscriber(config)?)?;
    Ok(())
}
