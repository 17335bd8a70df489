//! A scripted [`Patch`] for testing code that drives patches.
//!
//! [`MockPatcher`] changes no state of its own. It counts calls, appends
//! them to an optional shared [`CallLog`], and runs any hooks configured
//! with [`MockPatcher::on_install`] or [`MockPatcher::on_restore`]. Unlike
//! the real patchers it records every call, so repeated calls are visible.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::Patch;

/// One recorded call on a [`MockPatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `install` was called on the named mock.
    Install(String),
    /// `restore` was called on the named mock.
    Restore(String),
}

impl Call {
    /// Shorthand for [`Call::Install`].
    pub fn install(name: impl Into<String>) -> Self {
        Self::Install(name.into())
    }

    /// Shorthand for [`Call::Restore`].
    pub fn restore(name: impl Into<String>) -> Self {
        Self::Restore(name.into())
    }
}

/// Ordered record of calls shared between several mocks.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    /// Snapshot of the calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push(&self, call: Call) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

type Hook = Box<dyn FnMut() + Send>;

/// Test double implementing [`Patch`].
pub struct MockPatcher {
    name: String,
    log: Option<CallLog>,
    on_install: Option<Hook>,
    on_restore: Option<Hook>,
    installs: usize,
    restores: usize,
}

impl MockPatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log: None,
            on_install: None,
            on_restore: None,
            installs: 0,
            restores: 0,
        }
    }

    /// Append every call to `log`.
    #[must_use]
    pub fn recording_to(mut self, log: &CallLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Run `hook` each time `install` is called.
    #[must_use]
    pub fn on_install(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_install = Some(Box::new(hook));
        self
    }

    /// Run `hook` each time `restore` is called.
    #[must_use]
    pub fn on_restore(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_restore = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn install_count(&self) -> usize {
        self.installs
    }

    #[must_use]
    pub fn restore_count(&self) -> usize {
        self.restores
    }
}

impl fmt::Debug for MockPatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockPatcher")
            .field("name", &self.name)
            .field("installs", &self.installs)
            .field("restores", &self.restores)
            .finish_non_exhaustive()
    }
}

impl Patch for MockPatcher {
    fn install(&mut self) -> &mut dyn Patch {
        self.installs += 1;
        if let Some(log) = &self.log {
            log.push(Call::install(self.name.as_str()));
        }
        if let Some(hook) = self.on_install.as_mut() {
            hook();
        }
        self
    }

    fn restore(&mut self) -> &mut dyn Patch {
        self.restores += 1;
        if let Some(log) = &self.log {
            log.push(Call::restore(self.name.as_str()));
        }
        if let Some(hook) = self.on_restore.as_mut() {
            hook();
        }
        self
    }
}
