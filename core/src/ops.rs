//! The capability that plugs a context type into propagation.

use std::cell::RefCell;
use std::fmt;
use std::thread::LocalKey;

use crate::carrying::{ContextCallable, ContextRunnable};
use crate::task::{BoxCallable, Task};

/// Read, write and clear the ambient context of the current thread.
///
/// Implementations hold no per-call state and are shared freely across
/// threads; the storage they address is per thread.
pub trait ContextOps: Clone + Send + Sync + 'static {
    type Context: Clone + PartialEq + Send + Sync + 'static;

    /// The ambient context, or [`ContextOps::empty`] when nothing is set.
    fn current(&self) -> Self::Context;

    fn set_current(&self, context: Self::Context);

    /// Return the storage to its unset state.
    fn clear_current(&self);

    /// The canonical "no context" value.
    fn empty(&self) -> Self::Context;

    fn is_empty(&self, context: &Self::Context) -> bool {
        *context == self.empty()
    }

    /// Bind `task` to `context`, or to the context ambient on this thread right now.
    fn wrap_runnable(&self, task: Task, context: Option<Self::Context>) -> ContextRunnable<Self> {
        ContextRunnable::create(task, context, self.clone())
    }

    /// Callable counterpart of [`ContextOps::wrap_runnable`].
    fn wrap_callable<T: Send + 'static>(
        &self,
        task: BoxCallable<T>,
        context: Option<Self::Context>,
    ) -> ContextCallable<Self, T> {
        ContextCallable::create(task, context, self.clone())
    }
}

/// [`ContextOps`] over a `thread_local!` slot.
///
/// `C::default()` is the empty value. An unset slot reads as empty.
///
/// ```ignore
/// thread_local! {
///     static TENANT: RefCell<Option<Tenant>> = const { RefCell::new(None) };
/// }
/// let ops = ThreadLocalOps::new(&TENANT);
/// ```
pub struct ThreadLocalOps<C: 'static> {
    slot: &'static LocalKey<RefCell<Option<C>>>,
}

impl<C: 'static> ThreadLocalOps<C> {
    #[must_use]
    pub const fn new(slot: &'static LocalKey<RefCell<Option<C>>>) -> Self {
        Self { slot }
    }

    /// Whether a value, empty or not, is installed on this thread.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot.with(|slot| slot.borrow().is_some())
    }
}

impl<C: 'static> Clone for ThreadLocalOps<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: 'static> Copy for ThreadLocalOps<C> {}

impl<C: 'static> fmt::Debug for ThreadLocalOps<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadLocalOps").finish_non_exhaustive()
    }
}

impl<C> ContextOps for ThreadLocalOps<C>
where
    C: Clone + Default + PartialEq + Send + Sync + 'static,
{
    type Context = C;

    fn current(&self) -> C {
        self.slot
            .with(|slot| slot.borrow().clone())
            .unwrap_or_default()
    }

    fn set_current(&self, context: C) {
        self.slot.with(|slot| *slot.borrow_mut() = Some(context));
    }

    fn clear_current(&self) {
        self.slot.with(|slot| slot.borrow_mut().take());
    }

    fn empty(&self) -> C {
        C::default()
    }
}
