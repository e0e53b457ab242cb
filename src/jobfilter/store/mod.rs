//! # Parameter Store
//!
//! The [`ParamStore`] trait is the engine's only view of persisted filter
//! state. In a browser this is the address bar's query string; here it is
//! anything that can hold a [`QueryParams`] and say when it changed.
//!
//! ## Change Notification
//!
//! Writes are not delivered to the engine one by one. A store records that
//! its contents changed and the engine consumes that with
//! [`ParamStore::take_change`] when it digests. Several writes between two
//! digests are observed as one change, which is what lets batch operations
//! (toggling many values at once) recompute the derived state only once.
//!
//! The store is shared with writers the engine knows nothing about
//! (back/forward navigation, a person editing the URL). The engine never
//! remembers its own writes; it always re-derives from [`ParamStore::read`].
//!
//! ## Implementations
//!
//! - [`memory::InMemoryParamStore`]: in-process store, used by the CLI and tests.
//! - `&mut T` for any store `T`, so the engine can borrow a store it does not own.

use crate::params::{ParamValue, QueryParams};

pub mod memory;

pub trait ParamStore {
    /// Current contents.
    fn read(&self) -> &QueryParams;

    /// Set a key, or remove it with `None`. Returns whether the contents
    /// changed; writing an equal value is not a change.
    fn write(&mut self, key: &str, value: Option<ParamValue>) -> bool;

    /// Replace the whole contents at once.
    fn replace_all(&mut self, params: QueryParams) -> bool;

    /// Whether the contents changed since the last call. Clears the flag.
    fn take_change(&mut self) -> bool;
}

impl<T: ParamStore + ?Sized> ParamStore for &mut T {
    fn read(&self) -> &QueryParams {
        (**self).read()
    }

    fn write(&mut self, key: &str, value: Option<ParamValue>) -> bool {
        (**self).write(key, value)
    }

    fn replace_all(&mut self, params: QueryParams) -> bool {
        (**self).replace_all(params)
    }

    fn take_change(&mut self) -> bool {
        (**self).take_change()
    }
}
