use std::cell::RefCell;

use ferry_core::{ContextOps, ThreadLocalOps};

use crate::context::SecurityContext;

thread_local! {
    static CONTEXT: RefCell<Option<SecurityContext>> = const { RefCell::new(None) };
}

fn slot() -> ThreadLocalOps<SecurityContext> {
    ThreadLocalOps::new(&CONTEXT)
}

/// Per-thread storage for the current [`SecurityContext`].
#[derive(Debug, Clone, Copy)]
pub struct SecurityContextHolder;

impl SecurityContextHolder {
    /// The context of this thread; empty when none is set.
    #[must_use]
    pub fn context() -> SecurityContext {
        slot().current()
    }

    pub fn set_context(context: SecurityContext) {
        slot().set_current(context);
    }

    pub fn clear_context() {
        slot().clear_current();
    }

    #[must_use]
    pub fn create_empty_context() -> SecurityContext {
        SecurityContext::empty()
    }

    /// Whether anything, even an empty context, is stored on this thread.
    #[must_use]
    pub fn is_set() -> bool {
        slot().is_set()
    }
}
