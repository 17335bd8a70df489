//! Temporary, reversible patches for tests.
//!
//! A [`Patch`] overrides some piece of mutable program state and can later
//! put it back exactly as it found it. This is not monkey patching: the code
//! under test must read its collaborators from a place a patch can reach,
//! such as a `static` cell holding a function pointer, an environment
//! variable, or the process-wide log sink.
//!
//! The patchers provided are:
//! - [`VariableSetter`], built with [`set_var`] or [`set_var_any`], for
//!   caller-owned storage cells.
//! - [`EnvPatcher`], built with [`set_env`] or [`unset_env`], for
//!   environment variables.
//! - [`LogPatcher`], built with [`set_log_output`], for the sink that
//!   [`logging`] routes `tracing` output to.
//! - [`PatchMaster`], which installs a group of patches in order and
//!   restores them in reverse.
//! - [`MockPatcher`], a test double for code that drives patches.
//!
//! # Examples
//!
//! ```
//! use std::sync::Mutex;
//! use patcher::{Patch, set_var};
//!
//! static GREETING: Mutex<&str> = Mutex::new("hello");
//!
//! let mut patch = set_var(&GREETING, "bonjour");
//! patch.install();
//! assert_eq!(*GREETING.lock().expect("lock"), "bonjour");
//! patch.restore();
//! assert_eq!(*GREETING.lock().expect("lock"), "hello");
//! ```

use std::ops::{Deref, DerefMut};

pub mod config;
pub mod env;
pub mod log;
pub mod logging;
pub mod master;
pub mod mock;
pub mod setvar;

pub use env::{EnvError, EnvPatcher, EnvStore, ProcessEnv, set_env, unset_env};
pub use log::{LogOutput, LogPatcher, ProcessLogger, Sink, set_log_output};
pub use master::PatchMaster;
pub use mock::{Call, CallLog, MockPatcher};
pub use setvar::{AnyCell, AssignError, Slot, VariableSetter, set_var, set_var_any, try_set_var_any};

/// A reversible modification of program state.
///
/// Both operations are idempotent: installing an installed patch, or
/// restoring one that is not installed, does nothing. Each returns the
/// receiver so calls can be chained.
pub trait Patch {
    /// Capture whatever is needed to undo the patch, then apply it.
    fn install(&mut self) -> &mut dyn Patch;

    /// Put back the state captured by [`Patch::install`].
    fn restore(&mut self) -> &mut dyn Patch;

    /// Install the patch and return a guard that restores it when dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use patcher::{Patch, set_var};
    ///
    /// let cell = RefCell::new(1);
    /// {
    ///     let _guard = set_var(&cell, 2).installed();
    ///     assert_eq!(*cell.borrow(), 2);
    /// }
    /// assert_eq!(*cell.borrow(), 1);
    /// ```
    fn installed(mut self) -> Installed<Self>
    where
        Self: Sized,
    {
        self.install();
        Installed { patch: self }
    }
}

impl<P: Patch + ?Sized> Patch for Box<P> {
    fn install(&mut self) -> &mut dyn Patch {
        (**self).install();
        self
    }

    fn restore(&mut self) -> &mut dyn Patch {
        (**self).restore();
        self
    }
}

impl<P: Patch + ?Sized> Patch for &mut P {
    fn install(&mut self) -> &mut dyn Patch {
        (**self).install();
        self
    }

    fn restore(&mut self) -> &mut dyn Patch {
        (**self).restore();
        self
    }
}

/// An installed patch that is restored on drop.
///
/// Created by [`Patch::installed`].
#[derive(Debug)]
pub struct Installed<P: Patch> {
    patch: P,
}

impl<P: Patch> Deref for Installed<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.patch
    }
}

impl<P: Patch> DerefMut for Installed<P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.patch
    }
}

impl<P: Patch> Drop for Installed<P> {
    fn drop(&mut self) {
        self.patch.restore();
    }
}
