//! Error predicates for the partial-failure combinators.

use std::fmt;

use folio_common::Error;

/// Decides which errors a combinator tolerates.
///
/// Filters are always explicit predicates. [`ErrorFilter::none`] matches
/// nothing, so every error propagates.
pub struct ErrorFilter<E = Error> {
    predicate: Box<dyn Fn(&E) -> bool>,
}

impl<E> ErrorFilter<E> {
    /// A filter that matches no error.
    pub fn none() -> Self {
        Self {
            predicate: Box::new(|_| false),
        }
    }

    /// A filter backed by an arbitrary predicate.
    pub fn new<P>(predicate: P) -> Self
    where
        P: Fn(&E) -> bool + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// Returns `true` if `error` is tolerated by this filter.
    pub fn matches(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

impl ErrorFilter<Error> {
    /// A filter matching [`Error::NotFound`] only.
    pub fn not_found() -> Self {
        Self::new(Error::is_not_found)
    }
}

impl<E> Default for ErrorFilter<E> {
    fn default() -> Self {
        Self::none()
    }
}

impl<E> fmt::Debug for ErrorFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorFilter(..)")
    }
}
