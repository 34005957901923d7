//! The lazy, memoizing deferred value.
//!
//! A [`Future`] holds exactly one of a value, an error, or a zero-argument
//! computation. The computation runs synchronously inside the first call that
//! needs the outcome, and the outcome (success or failure) is memoized for the
//! lifetime of the instance. Nothing here is scheduled on a thread pool: a
//! `Future` is a captured computation, not a task.

use std::cell::{Cell, OnceCell};
use std::fmt;

use folio_common::{ConstructionError, Error};

/// A boxed computation producing one step of resolution.
type Thunk<T, E> = Box<dyn FnOnce() -> Step<T, E>>;

/// A boxed computation producing a final outcome.
pub type Computation<T, E = Error> = Box<dyn FnOnce() -> Result<T, E>>;

/// The outcome of running one computation.
///
/// `Nested` hands back another future whose outcome becomes this one's.
/// Resolution loops over nested steps instead of recursing, so a chain of
/// callbacks that each return a further future resolves in constant stack.
pub enum Step<T, E = Error> {
    /// The final outcome.
    Ready(Result<T, E>),
    /// Another future to resolve in place of this one.
    Nested(Future<T, E>),
}

/// A single-assignment, lazily evaluated value.
///
/// State moves from unresolved to resolved exactly once, on first access:
///
/// ```text
/// Unresolved --(first resolve)--> Value | Error
/// ```
///
/// Both resolved states are terminal. Resolving a future from inside its own
/// computation is a caller bug and panics.
pub struct Future<T, E = Error> {
    outcome: OnceCell<Result<T, E>>,
    pending: Cell<Option<Thunk<T, E>>>,
}

enum Parts<T, E> {
    Resolved(Result<T, E>),
    Pending(Thunk<T, E>),
}

impl<T: 'static, E: 'static> Future<T, E> {
    /// Creates a future already resolved to `value`.
    pub fn value(value: T) -> Self {
        Self::from_result(Ok(value))
    }

    /// Creates a future already resolved to `error`.
    pub fn error(error: E) -> Self {
        Self::from_result(Err(error))
    }

    /// Creates a future already resolved to `result`.
    pub fn from_result(result: Result<T, E>) -> Self {
        Self {
            outcome: OnceCell::from(result),
            pending: Cell::new(None),
        }
    }

    /// Creates a future that runs `compute` the first time it is resolved.
    pub fn deferred<F>(compute: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + 'static,
    {
        Self::suspend(move || Step::Ready(compute()))
    }

    /// Creates a future from whichever parts are present.
    ///
    /// A value takes precedence over an error, which takes precedence over a
    /// computation. Supplying none of the three is a [`ConstructionError`].
    pub fn from_parts(
        value: Option<T>,
        error: Option<E>,
        compute: Option<Computation<T, E>>,
    ) -> Result<Self, ConstructionError> {
        match (value, error, compute) {
            (Some(value), _, _) => Ok(Self::value(value)),
            (None, Some(error), _) => Ok(Self::error(error)),
            (None, None, Some(compute)) => Ok(Self::deferred(compute)),
            (None, None, None) => Err(ConstructionError),
        }
    }

    fn suspend<F>(step: F) -> Self
    where
        F: FnOnce() -> Step<T, E> + 'static,
    {
        Self {
            outcome: OnceCell::new(),
            pending: Cell::new(Some(Box::new(step))),
        }
    }

    /// Returns `true` once the outcome has been computed.
    pub fn is_resolved(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// Resolves the future and returns a reference to the memoized outcome.
    ///
    /// The computation runs at most once; every later call observes the same
    /// outcome without running anything.
    pub fn resolve(&self) -> &Result<T, E> {
        self.outcome.get_or_init(|| match self.pending.take() {
            Some(thunk) => trampoline(thunk),
            None => panic!("future resolved re-entrantly from its own computation"),
        })
    }

    /// Resolves the future and returns a copy of the memoized outcome.
    ///
    /// A failure is handed back as the originally captured error, not a
    /// rewrapped summary.
    pub fn get(&self) -> Result<T, E>
    where
        T: Clone,
        E: Clone,
    {
        self.resolve().clone()
    }

    /// Consumes the future and returns its outcome, resolving it if needed.
    pub fn into_result(self) -> Result<T, E> {
        match self.into_parts() {
            Parts::Resolved(result) => result,
            Parts::Pending(thunk) => trampoline(thunk),
        }
    }

    fn into_parts(self) -> Parts<T, E> {
        let Future { outcome, pending } = self;
        if let Some(result) = outcome.into_inner() {
            return Parts::Resolved(result);
        }
        match pending.into_inner() {
            Some(thunk) => Parts::Pending(thunk),
            None => panic!("future lost its computation before resolving"),
        }
    }

    /// Chains a callback that runs on success; failures pass through untouched.
    ///
    /// The callback returns a future, which is resolved transparently: the
    /// returned future's outcome becomes the chained future's outcome.
    pub fn then<U, S>(self, on_success: S) -> Future<U, E>
    where
        U: 'static,
        S: FnOnce(T) -> Future<U, E> + 'static,
    {
        self.then_or_else(on_success, Future::error)
    }

    /// Chains callbacks for both outcomes of this future.
    ///
    /// Nothing runs until the returned future is resolved. Whatever future the
    /// chosen callback returns is flattened, transitively, into the result.
    pub fn then_or_else<U, S, F>(self, on_success: S, on_error: F) -> Future<U, E>
    where
        U: 'static,
        S: FnOnce(T) -> Future<U, E> + 'static,
        F: FnOnce(E) -> Future<U, E> + 'static,
    {
        Future::suspend(move || match self.into_result() {
            Ok(value) => Step::Nested(on_success(value)),
            Err(err) => Step::Nested(on_error(err)),
        })
    }

    /// Chains a plain transformation of the success value.
    pub fn map<U, F>(self, transform: F) -> Future<U, E>
    where
        U: 'static,
        F: FnOnce(T) -> U + 'static,
    {
        Future::suspend(move || Step::Ready(self.into_result().map(transform)))
    }
}

/// Runs a computation, following nested futures iteratively until one
/// produces a final outcome.
fn trampoline<T: 'static, E: 'static>(mut thunk: Thunk<T, E>) -> Result<T, E> {
    loop {
        match thunk() {
            Step::Ready(result) => return result,
            Step::Nested(next) => match next.into_parts() {
                Parts::Resolved(result) => return result,
                Parts::Pending(next_thunk) => thunk = next_thunk,
            },
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome.get() {
            Some(Ok(value)) => f.debug_tuple("Future::Value").field(value).finish(),
            Some(Err(err)) => f.debug_tuple("Future::Error").field(err).finish(),
            None => f.write_str("Future::Unresolved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn counting(calls: &Rc<Cell<u32>>, value: i32) -> Future<i32> {
        let calls = Rc::clone(calls);
        Future::deferred(move || {
            calls.set(calls.get() + 1);
            Ok(value)
        })
    }

    #[test]
    fn value_is_resolved_immediately() {
        let f: Future<i32> = Future::value(7);
        assert!(f.is_resolved());
        assert_eq!(f.get().unwrap(), 7);
    }

    #[test]
    fn deferred_runs_lazily_and_once() {
        let calls = Rc::new(Cell::new(0));
        let f = counting(&calls, 5);
        assert_eq!(calls.get(), 0);
        assert!(!f.is_resolved());

        assert_eq!(f.get().unwrap(), 5);
        assert_eq!(f.get().unwrap(), 5);
        assert_eq!(calls.get(), 1);
        assert!(f.is_resolved());
    }

    #[test]
    fn memoized_error_is_the_original() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let f: Future<i32> = Future::deferred(move || {
            counter.set(counter.get() + 1);
            Err(Error::upstream(
                "fetching",
                std::io::Error::new(std::io::ErrorKind::TimedOut, "slow"),
            ))
        });

        let first = f.get().unwrap_err();
        let second = f.get().unwrap_err();
        assert_eq!(calls.get(), 1);
        match (first, second) {
            (Error::Upstream { source: a, .. }, Error::Upstream { source: b, .. }) => {
                assert!(std::sync::Arc::ptr_eq(&a, &b));
            }
            other => panic!("unexpected errors: {other:?}"),
        }
    }

    #[test]
    fn from_parts_requires_a_source() {
        let err = Future::<i32>::from_parts(None, None, None).unwrap_err();
        assert_eq!(err, ConstructionError);
    }

    #[test]
    fn from_parts_prefers_value_then_error() {
        let f = Future::<i32>::from_parts(
            Some(1),
            Some(Error::not_found("x")),
            Some(Box::new(|| Ok(3))),
        )
        .unwrap();
        assert_eq!(f.get().unwrap(), 1);

        let f =
            Future::<i32>::from_parts(None, Some(Error::not_found("x")), Some(Box::new(|| Ok(3))))
                .unwrap();
        assert!(f.get().unwrap_err().is_not_found());

        let f = Future::<i32>::from_parts(None, None, Some(Box::new(|| Ok(3)))).unwrap();
        assert!(!f.is_resolved());
        assert_eq!(f.get().unwrap(), 3);
    }

    #[test]
    fn then_flattens_nested_futures() {
        let f: Future<i32> = Future::value(1)
            .then(|x| Future::value(x + 1))
            .then(|x| Future::value(x + 1));
        assert_eq!(f.get().unwrap(), 3);
    }

    #[test]
    fn then_flattens_deferred_results() {
        let f: Future<i32> =
            Future::value(2).then(|x| Future::deferred(move || Ok(x * 10)).then(|y| Future::value(y + 1)));
        assert_eq!(f.get().unwrap(), 21);
    }

    #[test]
    fn then_is_lazy() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let chained = counting(&calls, 1).then(move |x| {
            counter.set(counter.get() + 10);
            Future::value(x)
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(chained.get().unwrap(), 1);
        assert_eq!(calls.get(), 11);
    }

    #[test]
    fn then_rethrows_by_default() {
        let called = Rc::new(Cell::new(false));
        let flag = Rc::clone(&called);
        let f: Future<i32> = Future::<i32>::error(Error::not_found("gone")).then(move |x| {
            flag.set(true);
            Future::value(x)
        });
        let err = f.get().unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "gone"));
        assert!(!called.get());
    }

    #[test]
    fn then_or_else_recovers() {
        let f: Future<String> = Future::<i32>::error(Error::not_found("gone")).then_or_else(
            |x| Future::value(x.to_string()),
            |err| {
                if err.is_not_found() {
                    Future::value("fallback".to_string())
                } else {
                    Future::error(err)
                }
            },
        );
        assert_eq!(f.get().unwrap(), "fallback");
    }

    #[test]
    fn map_transforms_value() {
        let f: Future<usize> = Future::value("docs").map(str::len);
        assert_eq!(f.get().unwrap(), 4);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        fn countdown(n: u64) -> Future<u64> {
            if n == 0 {
                Future::value(0)
            } else {
                Future::value(n).then(move |_| countdown(n - 1))
            }
        }
        assert_eq!(countdown(200_000).get().unwrap(), 0);
    }

    #[test]
    fn into_result_consumes_pending() {
        let calls = Rc::new(Cell::new(0));
        let f = counting(&calls, 9);
        assert_eq!(f.into_result().unwrap(), 9);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn debug_reports_state() {
        let f: Future<i32> = Future::deferred(|| Ok(1));
        assert_eq!(format!("{f:?}"), "Future::Unresolved");
        f.resolve();
        assert_eq!(format!("{f:?}"), "Future::Value(1)");
    }
}
