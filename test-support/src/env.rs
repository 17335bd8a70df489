//! In-memory environment for exercising environment patches.
//!
//! `RecordingEnv` implements [`EnvStore`] over a map, records every call in
//! order, and can be told to reject `set` or `unset` calls.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard, PoisonError};

use patcher::{EnvError, EnvStore};

/// One operation performed on a [`RecordingEnv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvCall {
    Lookup(String),
    Set(String, OsString),
    Unset(String),
}

#[derive(Debug, Default)]
struct State {
    vars: HashMap<String, OsString>,
    calls: Vec<EnvCall>,
}

/// Fake environment store.
#[derive(Debug, Default)]
pub struct RecordingEnv {
    state: Mutex<State>,
    fail_set: bool,
    fail_unset: bool,
}

impl RecordingEnv {
    /// Empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name=value` without recording a call.
    #[must_use]
    pub fn with_var(self, name: &str, value: &str) -> Self {
        self.lock().vars.insert(name.to_owned(), value.into());
        self
    }

    /// Make every `set` call fail.
    #[must_use]
    pub fn failing_set(mut self) -> Self {
        self.fail_set = true;
        self
    }

    /// Make every `unset` call fail.
    #[must_use]
    pub fn failing_unset(mut self) -> Self {
        self.fail_unset = true;
        self
    }

    /// Current value of `name`, without recording a call.
    pub fn get(&self, name: &str) -> Option<OsString> {
        self.lock().vars.get(name).cloned()
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<EnvCall> {
        self.lock().calls.clone()
    }

    /// Whether any recorded call was an `unset`.
    pub fn unset_called(&self) -> bool {
        self.lock()
            .calls
            .iter()
            .any(|call| matches!(call, EnvCall::Unset(_)))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rejected(name: &str) -> EnvError {
        EnvError::Rejected {
            name: name.to_owned(),
            message: "injected failure".to_owned(),
        }
    }
}

impl EnvStore for RecordingEnv {
    fn lookup(&self, name: &str) -> Option<OsString> {
        let mut state = self.lock();
        state.calls.push(EnvCall::Lookup(name.to_owned()));
        state.vars.get(name).cloned()
    }

    fn set(&self, name: &str, value: &OsStr) -> Result<(), EnvError> {
        let mut state = self.lock();
        state
            .calls
            .push(EnvCall::Set(name.to_owned(), value.to_owned()));
        if self.fail_set {
            return Err(Self::rejected(name));
        }
        state.vars.insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn unset(&self, name: &str) -> Result<(), EnvError> {
        let mut state = self.lock();
        state.calls.push(EnvCall::Unset(name.to_owned()));
        if self.fail_unset {
            return Err(Self::rejected(name));
        }
        state.vars.remove(name);
        Ok(())
    }
}
