//! Patching caller-owned storage cells.
//!
//! A [`VariableSetter`] writes a copy of its value into a [`Slot`] on
//! install and puts the original back on restore. The patch value is
//! cloned on every install, so it must be `Clone`; share closures as
//! `Rc<dyn Fn(..)>` or `Arc<dyn Fn(..)>`. Whatever the code under test
//! writes to the slot while the patch is installed is discarded on restore.
//!
//! Assignability is a compile-time property: [`set_var`] only accepts a
//! value of the slot's own type, and a plain `&T` is not a slot at all.
//! [`AnyCell`] covers the cases where the type is only known at run time;
//! [`try_set_var_any`] checks the type tag when the patch is built.

use std::any::{Any, TypeId, type_name};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, trace};

use crate::Patch;

/// A shared, writable storage cell.
pub trait Slot {
    /// Type of the value held by the cell.
    type Value;

    /// Swap the cell's contents with `value`.
    fn exchange(&self, value: &mut Self::Value);
}

impl<T> Slot for Cell<T> {
    type Value = T;

    fn exchange(&self, value: &mut T) {
        self.swap(Cell::from_mut(value));
    }
}

impl<T> Slot for RefCell<T> {
    type Value = T;

    fn exchange(&self, value: &mut T) {
        mem::swap(&mut *self.borrow_mut(), value);
    }
}

impl<T> Slot for Mutex<T> {
    type Value = T;

    fn exchange(&self, value: &mut T) {
        let mut guard = self.lock().unwrap_or_else(PoisonError::into_inner);
        mem::swap(&mut *guard, value);
    }
}

impl<T> Slot for RwLock<T> {
    type Value = T;

    fn exchange(&self, value: &mut T) {
        let mut guard = self.write().unwrap_or_else(PoisonError::into_inner);
        mem::swap(&mut *guard, value);
    }
}

impl<S: Slot + ?Sized> Slot for &S {
    type Value = S::Value;

    fn exchange(&self, value: &mut S::Value) {
        (**self).exchange(value);
    }
}

impl<S: Slot + ?Sized> Slot for Rc<S> {
    type Value = S::Value;

    fn exchange(&self, value: &mut S::Value) {
        (**self).exchange(value);
    }
}

impl<S: Slot + ?Sized> Slot for Arc<S> {
    type Value = S::Value;

    fn exchange(&self, value: &mut S::Value) {
        (**self).exchange(value);
    }
}

/// Patch that sets a [`Slot`] to a new value.
pub struct VariableSetter<S: Slot> {
    slot: S,
    value: S::Value,
    original: Option<S::Value>,
}

/// Build a [`VariableSetter`] that will set `slot` to `value`.
///
/// # Examples
///
/// ```
/// use std::sync::Mutex;
/// use patcher::{Patch, set_var};
///
/// fn real_read(_: &str) -> Option<String> {
///     None
/// }
///
/// fn canned_read(_: &str) -> Option<String> {
///     Some("hello".into())
/// }
///
/// static READ: Mutex<fn(&str) -> Option<String>> = Mutex::new(real_read);
///
/// let canned: fn(&str) -> Option<String> = canned_read;
/// let mut patch = set_var(&READ, canned);
/// patch.install();
/// assert_eq!((*READ.lock().expect("lock"))("file"), Some("hello".into()));
/// patch.restore();
/// assert_eq!((*READ.lock().expect("lock"))("file"), None);
/// ```
pub fn set_var<S>(slot: S, value: S::Value) -> VariableSetter<S>
where
    S: Slot,
    S::Value: Clone,
{
    VariableSetter {
        slot,
        value,
        original: None,
    }
}

impl<S: Slot> VariableSetter<S> {
    /// Whether the patch is currently installed.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.original.is_some()
    }
}

impl<S: Slot> fmt::Debug for VariableSetter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableSetter")
            .field("type", &type_name::<S::Value>())
            .field("applied", &self.is_applied())
            .finish_non_exhaustive()
    }
}

impl<S> Patch for VariableSetter<S>
where
    S: Slot,
    S::Value: Clone,
{
    fn install(&mut self) -> &mut dyn Patch {
        if self.is_applied() {
            trace!(value_type = type_name::<S::Value>(), "variable patch already installed");
            return self;
        }

        let mut current = self.value.clone();
        self.slot.exchange(&mut current);
        self.original = Some(current);
        debug!(value_type = type_name::<S::Value>(), "installed variable patch");

        self
    }

    fn restore(&mut self) -> &mut dyn Patch {
        let Some(mut original) = self.original.take() else {
            trace!(value_type = type_name::<S::Value>(), "variable patch not installed");
            return self;
        };

        // The slot's current contents are dropped with `original`.
        self.slot.exchange(&mut original);
        debug!(value_type = type_name::<S::Value>(), "restored variable patch");

        self
    }
}

/// Errors raised when building a patch for an [`AnyCell`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignError {
    /// The patch value's type differs from the type held by the cell.
    #[error("cannot assign {value} type to variable type {target}")]
    Unassignable {
        value: &'static str,
        target: &'static str,
    },
}

/// A storage cell whose value type is tracked at run time.
pub struct AnyCell {
    value: RefCell<Rc<dyn Any>>,
    type_id: TypeId,
    type_name: &'static str,
}

impl AnyCell {
    /// Wrap `value`, recording `T` as the only type the cell accepts.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: RefCell::new(Rc::new(value)),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Clone the current value out of the cell if it holds a `T`.
    #[must_use]
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.value.borrow().downcast_ref::<T>().cloned()
    }

    /// Name of the type the cell was created with.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for AnyCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyCell")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Checked handle to an [`AnyCell`].
///
/// Only [`try_set_var_any`] creates one, after the type check, so the cell
/// can never be handed a value of the wrong type.
#[derive(Debug, Clone, Copy)]
pub struct AnyTarget<'a>(&'a AnyCell);

impl Slot for AnyTarget<'_> {
    type Value = Rc<dyn Any>;

    fn exchange(&self, value: &mut Rc<dyn Any>) {
        mem::swap(&mut *self.0.value.borrow_mut(), value);
    }
}

/// Build a patch for an [`AnyCell`], checking `value`'s type first.
///
/// # Errors
///
/// Returns [`AssignError::Unassignable`] if `T` is not the type the cell
/// was created with.
pub fn try_set_var_any<T: Any>(
    cell: &AnyCell,
    value: T,
) -> Result<VariableSetter<AnyTarget<'_>>, AssignError> {
    if TypeId::of::<T>() != cell.type_id {
        return Err(AssignError::Unassignable {
            value: type_name::<T>(),
            target: cell.type_name,
        });
    }
    let value: Rc<dyn Any> = Rc::new(value);
    Ok(set_var(AnyTarget(cell), value))
}

/// Build a patch for an [`AnyCell`].
///
/// # Panics
///
/// Panics if `T` is not the type the cell was created with. A mismatched
/// patch is a bug in the test, not a condition to recover from.
pub fn set_var_any<T: Any>(cell: &AnyCell, value: T) -> VariableSetter<AnyTarget<'_>> {
    match try_set_var_any(cell, value) {
        Ok(patch) => patch,
        Err(err) => panic!("{err}"),
    }
}
