//! Scoped install/restore of the ambient context.

use std::thread;

use tracing::{debug, trace};

use crate::ops::ContextOps;

/// Installs a context on the current thread until dropped.
///
/// On drop the context that was ambient before [`ContextScope::enter`] comes
/// back. An empty prior context is cleared rather than reinstalled, so storage
/// that was unset stays unset. Drop runs during unwinding too.
#[must_use = "the previous context is restored as soon as the scope is dropped"]
pub struct ContextScope<'a, O: ContextOps> {
    ops: &'a O,
    original: Option<O::Context>,
}

impl<'a, O: ContextOps> ContextScope<'a, O> {
    pub fn enter(ops: &'a O, context: O::Context) -> Self {
        let original = ops.current();
        ops.set_current(context);
        trace!("bound context installed");
        Self {
            ops,
            original: Some(original),
        }
    }
}

impl<O: ContextOps> Drop for ContextScope<'_, O> {
    fn drop(&mut self) {
        let Some(original) = self.original.take() else {
            return;
        };
        if self.ops.is_empty(&original) {
            self.ops.clear_current();
        } else {
            self.ops.set_current(original);
        }
        if thread::panicking() {
            debug!("ambient context restored after task panic");
        } else {
            trace!("ambient context restored");
        }
    }
}
