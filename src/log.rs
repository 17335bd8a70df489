//! Patching the process-wide log sink.
//!
//! [`LogPatcher`] swaps the [`Sink`] that log output is written to. The
//! default target is [`ProcessLogger`], the sink behind
//! [`logging::RoutedWriter`](crate::logging::RoutedWriter), so `tracing`
//! events can be captured by installing a patch with an in-memory writer.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::{Patch, logging};

/// Shared, clonable log destination.
///
/// Clones write to the same underlying writer.
#[derive(Clone)]
pub struct Sink(Arc<Mutex<dyn Write + Send>>);

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self(Arc::new(Mutex::new(writer)))
    }

    /// Sink writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Whether `self` and `other` are clones of the same sink.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sink")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).flush()
    }
}

/// Something holding a replaceable log sink.
pub trait LogOutput {
    /// The sink currently in use.
    fn output(&self) -> Sink;

    /// Replace the sink.
    fn set_output(&self, sink: Sink);
}

impl<L: LogOutput + ?Sized> LogOutput for &L {
    fn output(&self) -> Sink {
        (**self).output()
    }

    fn set_output(&self, sink: Sink) {
        (**self).set_output(sink);
    }
}

/// The process-wide sink managed by [`logging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLogger;

impl LogOutput for ProcessLogger {
    fn output(&self) -> Sink {
        logging::output()
    }

    fn set_output(&self, sink: Sink) {
        logging::set_output(sink);
    }
}

/// Patch that redirects log output to another sink.
#[derive(Debug)]
pub struct LogPatcher<L = ProcessLogger> {
    target: L,
    value: Sink,
    original: Option<Sink>,
    applied: bool,
}

/// Build a patch sending process log output to `writer`.
///
/// # Examples
///
/// ```
/// use patcher::{Patch, set_log_output};
///
/// let mut patch = set_log_output(Vec::new());
/// patch.install();
/// // run code that logs
/// patch.restore();
/// ```
pub fn set_log_output<W: Write + Send + 'static>(writer: W) -> LogPatcher {
    LogPatcher::new(Sink::new(writer))
}

impl LogPatcher {
    /// Build a patch sending process log output to `sink`.
    #[must_use]
    pub fn new(sink: Sink) -> Self {
        Self::with_output(ProcessLogger, sink)
    }
}

impl<L: LogOutput> LogPatcher<L> {
    /// Build a patch replacing `target`'s sink with `sink`.
    pub fn with_output(target: L, sink: Sink) -> Self {
        Self {
            target,
            value: sink,
            original: None,
            applied: false,
        }
    }

    /// Whether the patch is currently installed.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.applied
    }
}

impl<L: LogOutput> Patch for LogPatcher<L> {
    fn install(&mut self) -> &mut dyn Patch {
        if self.applied {
            trace!("log patch already installed");
            return self;
        }

        self.original = Some(self.target.output());
        self.target.set_output(self.value.clone());
        self.applied = true;
        debug!("installed log patch");

        self
    }

    fn restore(&mut self) -> &mut dyn Patch {
        if !self.applied {
            trace!("log patch not installed");
            return self;
        }

        debug!("restoring log patch");
        if let Some(original) = self.original.take() {
            self.target.set_output(original);
        }
        self.applied = false;

        self
    }
}
