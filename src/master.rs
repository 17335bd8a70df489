//! Grouping patches.
//!
//! A [`PatchMaster`] installs its patches in the order they were added and
//! restores them in reverse, so a patch that depends on an earlier one is
//! always undone first. It keeps no state of its own beyond the list; each
//! patch's own idempotence decides what a repeated call does.

use std::fmt;

use tracing::debug;

use crate::Patch;

/// Ordered group of patches applied as one.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use patcher::{Patch, PatchMaster, set_var};
///
/// let first = Cell::new(1);
/// let second = Cell::new("a");
/// let third = Cell::new(false);
///
/// let mut patches = PatchMaster::new()
///     .with(set_var(&first, 2))
///     .with(set_var(&second, "b"));
/// patches.install();
/// assert_eq!((first.get(), second.get()), (2, "b"));
///
/// patches.add(set_var(&third, true)).install();
/// assert!(third.get());
///
/// patches.restore();
/// assert_eq!((first.get(), second.get(), third.get()), (1, "a", false));
/// ```
#[derive(Default)]
pub struct PatchMaster<'a> {
    patches: Vec<Box<dyn Patch + 'a>>,
}

/// Build a [`PatchMaster`] from a list of patches.
///
/// ```
/// use std::cell::Cell;
/// use patcher::{Patch, patch_master, set_var};
///
/// let value = Cell::new(0);
/// let mut patches = patch_master![set_var(&value, 1)];
/// patches.install();
/// assert_eq!(value.get(), 1);
/// ```
#[macro_export]
macro_rules! patch_master {
    ($($patch:expr),* $(,)?) => {
        $crate::PatchMaster::new()$(.with($patch))*
    };
}

impl<'a> PatchMaster<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            patches: Vec::new(),
        }
    }

    /// Append `patch` and return the group.
    #[must_use]
    pub fn with<P: Patch + 'a>(mut self, patch: P) -> Self {
        self.patches.push(Box::new(patch));
        self
    }

    /// Append `patch` and return it.
    ///
    /// The patch is not installed; call `install` on the returned patch or
    /// on the group to apply it.
    pub fn add<P: Patch + 'a>(&mut self, patch: P) -> &mut (dyn Patch + 'a) {
        &mut **self.patches.push_mut(Box::new(patch))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

impl fmt::Debug for PatchMaster<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchMaster")
            .field("len", &self.patches.len())
            .finish()
    }
}

impl<'a> FromIterator<Box<dyn Patch + 'a>> for PatchMaster<'a> {
    fn from_iter<I: IntoIterator<Item = Box<dyn Patch + 'a>>>(iter: I) -> Self {
        Self {
            patches: iter.into_iter().collect(),
        }
    }
}

impl<'a> Extend<Box<dyn Patch + 'a>> for PatchMaster<'a> {
    fn extend<I: IntoIterator<Item = Box<dyn Patch + 'a>>>(&mut self, iter: I) {
        self.patches.extend(iter);
    }
}

impl Patch for PatchMaster<'_> {
    fn install(&mut self) -> &mut dyn Patch {
        debug!(count = self.patches.len(), "installing patches");
        for patch in &mut self.patches {
            patch.install();
        }
        self
    }

    fn restore(&mut self) -> &mut dyn Patch {
        debug!(count = self.patches.len(), "restoring patches");
        for patch in self.patches.iter_mut().rev() {
            patch.restore();
        }
        self
    }
}
