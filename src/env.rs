//! Patching environment variables.
//!
//! [`EnvPatcher`] sets or unsets one variable and remembers whether it
//! existed beforehand, so a variable that was absent is removed again on
//! restore rather than left behind with an empty value.
//!
//! The environment is reached through the [`EnvStore`] capability.
//! [`ProcessEnv`] is the real process environment; tests of code built on
//! this module can supply an in-memory store instead.

use std::ffi::{OsStr, OsString};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::Patch;

/// Errors raised by an [`EnvStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// The name is empty or contains `=` or a NUL byte.
    #[error("invalid environment variable name {name:?}")]
    InvalidName { name: String },
    /// The value contains a NUL byte.
    #[error("value for environment variable {name} contains a NUL byte")]
    InvalidValue { name: String },
    /// The store refused the operation.
    #[error("environment store rejected {name}: {message}")]
    Rejected { name: String, message: String },
}

/// Read and write access to a set of environment variables.
pub trait EnvStore {
    /// Current value of `name`, or `None` if it is not set.
    fn lookup(&self, name: &str) -> Option<OsString>;

    /// Set `name` to `value`.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvError`] if the variable cannot be set.
    fn set(&self, name: &str, value: &OsStr) -> Result<(), EnvError>;

    /// Remove `name`.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvError`] if the variable cannot be removed.
    fn unset(&self, name: &str) -> Result<(), EnvError>;
}

impl<E: EnvStore + ?Sized> EnvStore for &E {
    fn lookup(&self, name: &str) -> Option<OsString> {
        (**self).lookup(name)
    }

    fn set(&self, name: &str, value: &OsStr) -> Result<(), EnvError> {
        (**self).set(name, value)
    }

    fn unset(&self, name: &str) -> Result<(), EnvError> {
        (**self).unset(name)
    }
}

impl<E: EnvStore + ?Sized> EnvStore for Arc<E> {
    fn lookup(&self, name: &str) -> Option<OsString> {
        (**self).lookup(name)
    }

    fn set(&self, name: &str, value: &OsStr) -> Result<(), EnvError> {
        (**self).set(name, value)
    }

    fn unset(&self, name: &str) -> Result<(), EnvError> {
        (**self).unset(name)
    }
}

/// The environment of the current process.
///
/// Mutating the process environment is only sound while no other thread
/// reads or writes it, so tests using this store must run serially.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

fn validate_name(name: &str) -> Result<(), EnvError> {
    if name.is_empty() || name.contains(['=', '\0']) {
        return Err(EnvError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

impl EnvStore for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<OsString> {
        validate_name(name).ok()?;
        std::env::var_os(name)
    }

    fn set(&self, name: &str, value: &OsStr) -> Result<(), EnvError> {
        validate_name(name)?;
        if value.as_encoded_bytes().contains(&0) {
            return Err(EnvError::InvalidValue {
                name: name.to_owned(),
            });
        }
        // SAFETY: callers serialise access to the process environment.
        unsafe { std::env::set_var(name, value) };
        Ok(())
    }

    fn unset(&self, name: &str) -> Result<(), EnvError> {
        validate_name(name)?;
        // SAFETY: callers serialise access to the process environment.
        unsafe { std::env::remove_var(name) };
        Ok(())
    }
}

/// Patch that sets or unsets one environment variable.
#[derive(Debug)]
pub struct EnvPatcher<E = ProcessEnv> {
    env: E,
    name: String,
    value: Option<OsString>,
    original: Option<OsString>,
    applied: bool,
}

/// Build a patch setting the process environment variable `name` to `value`.
///
/// # Examples
///
/// ```
/// use patcher::{Patch, set_env};
///
/// let _guard = set_env("PATCHER_DOC_SET", "value").installed();
/// assert_eq!(std::env::var("PATCHER_DOC_SET").as_deref(), Ok("value"));
/// ```
pub fn set_env(name: impl Into<String>, value: impl Into<OsString>) -> EnvPatcher {
    EnvPatcher::set_in(ProcessEnv, name, value)
}

/// Build a patch removing the process environment variable `name`.
///
/// # Examples
///
/// ```
/// use patcher::{Patch, unset_env};
///
/// let _guard = unset_env("PATCHER_DOC_UNSET").installed();
/// assert!(std::env::var_os("PATCHER_DOC_UNSET").is_none());
/// ```
pub fn unset_env(name: impl Into<String>) -> EnvPatcher {
    EnvPatcher::unset_in(ProcessEnv, name)
}

impl<E: EnvStore> EnvPatcher<E> {
    /// Build a patch setting `name` to `value` in `env`.
    pub fn set_in(env: E, name: impl Into<String>, value: impl Into<OsString>) -> Self {
        Self {
            env,
            name: name.into(),
            value: Some(value.into()),
            original: None,
            applied: false,
        }
    }

    /// Build a patch removing `name` from `env`.
    pub fn unset_in(env: E, name: impl Into<String>) -> Self {
        Self {
            env,
            name: name.into(),
            value: None,
            original: None,
            applied: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the patch is currently installed.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.applied
    }
}

/// Set `name` to `value`, or unset it when `value` is `None`.
///
/// A variable that is already absent is left alone rather than removed
/// again. Failure leaves the environment in an unknown state, so it panics.
fn apply<E: EnvStore>(env: &E, name: &str, value: Option<&OsStr>) {
    let result = match value {
        Some(value) => env.set(name, value),
        None if env.lookup(name).is_some() => env.unset(name),
        None => Ok(()),
    };
    if let Err(err) = result {
        panic!("{err}");
    }
}

impl<E: EnvStore> Patch for EnvPatcher<E> {
    fn install(&mut self) -> &mut dyn Patch {
        if self.applied {
            trace!(name = %self.name, "environment patch already installed");
            return self;
        }

        self.original = self.env.lookup(&self.name);
        apply(&self.env, &self.name, self.value.as_deref());
        self.applied = true;
        debug!(name = %self.name, unset = self.value.is_none(), "installed environment patch");

        self
    }

    fn restore(&mut self) -> &mut dyn Patch {
        if !self.applied {
            trace!(name = %self.name, "environment patch not installed");
            return self;
        }

        apply(&self.env, &self.name, self.original.as_deref());
        self.applied = false;
        debug!(name = %self.name, "restored environment patch");

        self
    }
}
