//! Units of work handed to executors.
//!
//! Both task kinds take `&mut self`: a task may be run again (periodic
//! scheduling relies on this), but never from two threads at once.

use std::any::type_name;
use std::fmt;

/// Fire-and-forget work. A panic is the only way to signal failure.
pub trait Runnable: Send + 'static {
    fn run(&mut self);

    /// Textual representation used in logs and diagnostics.
    fn describe(&self) -> String {
        type_name::<Self>().to_string()
    }
}

impl<F> Runnable for F
where
    F: FnMut() + Send + 'static,
{
    fn run(&mut self) {
        self()
    }
}

/// Work that produces a value or an error.
pub trait Callable<T>: Send + 'static {
    fn call(&mut self) -> anyhow::Result<T>;

    /// Textual representation used in logs and diagnostics.
    fn describe(&self) -> String {
        type_name::<Self>().to_string()
    }
}

impl<T, F> Callable<T> for F
where
    F: FnMut() -> anyhow::Result<T> + Send + 'static,
{
    fn call(&mut self) -> anyhow::Result<T> {
        self()
    }
}

pub type Task = Box<dyn Runnable>;
pub type BoxCallable<T> = Box<dyn Callable<T>>;

/// A task with a human-readable description.
///
/// Closures otherwise describe themselves by their compiler-generated type name.
pub struct Named<F> {
    name: String,
    inner: F,
}

/// Attach `name` as the description of `inner`.
pub fn named<F>(name: impl Into<String>, inner: F) -> Named<F> {
    Named {
        name: name.into(),
        inner,
    }
}

impl<F: Runnable> Runnable for Named<F> {
    fn run(&mut self) {
        self.inner.run();
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl<T, F: Callable<T>> Callable<T> for Named<F> {
    fn call(&mut self) -> anyhow::Result<T> {
        self.inner.call()
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl<F> fmt::Debug for Named<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
