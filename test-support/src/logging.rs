//! Logging utilities for tests.
//!
//! Provides an in-memory writer for capturing log output and test-safe
//! subscriber initialisation that avoids reading from the environment.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use patcher::logging::RoutedWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

/// Clonable in-memory writer; clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(PoisonError::into_inner))
            .into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialise logging with a custom writer and explicit filter.
///
/// Returns `false` if a global subscriber was already installed, which
/// happens when several tests in one binary call this.
///
/// # Examples
///
/// ```rust,no_run
/// use test_support::logging::init_with_writer_and_filter;
/// use tracing_subscriber::fmt;
///
/// init_with_writer_and_filter(fmt::writer::BoxMakeWriter::new(std::io::stdout), "info");
/// ```
pub fn init_with_writer_and_filter<W>(writer: W, filter: &str) -> bool
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

/// Initialise logging through the process sink so log patches capture it.
pub fn init_routed(filter: &str) -> bool {
    init_with_writer_and_filter(RoutedWriter, filter)
}
