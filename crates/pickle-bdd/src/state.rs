//! Scenario state helpers for sharing mutable data across steps.
//!
//! Fixtures are shared immutably, so state that steps must update lives in a
//! [`Slot`]. A slot wraps a `Mutex<Option<T>>` and exposes helpers for
//! populating, inspecting and clearing the value without lock boilerplate.
//!
//! # Examples
//!
//! ```
//! use pickle_bdd::state::Slot;
//!
//! let state = Slot::default();
//! assert!(state.is_empty());
//!
//! state.set("value");
//! assert_eq!(state.get(), Some("value"));
//! assert!(state.is_filled());
//! assert_eq!(state.take(), Some("value"));
//! assert!(state.is_empty());
//! ```
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared scenario storage for a single value of type `T`.
///
/// A poisoned lock (a step panicked while holding it) is recovered, since the
/// panic has already failed the scenario.
pub struct Slot<T> {
    inner: Mutex<Option<T>>,
}

impl<T> Slot<T> {
    /// Construct an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the slot contents, returning the previous value when present.
    pub fn replace(&self, value: T) -> Option<T> {
        self.lock().replace(value)
    }

    /// Store `value`, discarding any previous contents.
    pub fn set(&self, value: T) {
        let _ = self.replace(value);
    }

    /// Remove the current value from the slot.
    #[must_use]
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    /// Apply `update` to the value, inserting one produced by `init` first
    /// when the slot is empty.
    pub fn update_or_insert_with<R>(
        &self,
        init: impl FnOnce() -> T,
        update: impl FnOnce(&mut T) -> R,
    ) -> R {
        update(self.lock().get_or_insert_with(init))
    }

    /// Read the current value by cloning it.
    #[must_use]
    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().clone()
    }

    /// Apply `with_value` to the contained value if present.
    #[must_use]
    pub fn with_ref<R>(&self, with_value: impl FnOnce(&T) -> R) -> Option<R> {
        self.lock().as_ref().map(with_value)
    }

    /// Apply `with_value` to the contained value mutably if present.
    pub fn with_mut<R>(&self, with_value: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.lock().as_mut().map(with_value)
    }

    /// Return `true` when the slot holds a value.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.lock().is_some()
    }

    /// Return `true` when the slot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.is_filled()
    }

    /// Remove the current value, leaving the slot empty.
    pub fn clear(&self) {
        let _ = self.take();
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Slot").field(&*self.lock()).finish()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}
