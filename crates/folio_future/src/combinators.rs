//! Aggregate combinators over sequences of futures.
//!
//! Evaluation is sequential and follows input order. [`all`] yields outcomes in
//! input order because that is the order it resolves them in, and [`race`] is a
//! fallback chain: it stops at the first acceptable candidate rather than
//! waiting on concurrent completions.

use std::fmt;

use folio_common::Error;
use tracing::error;

use crate::filter::ErrorFilter;
use crate::future::Future;

/// Resolves every future in order into a sequence of optional values.
///
/// An error matching `filter` leaves `None` in its slot (logged when
/// `log_filtered` is set). Any other error aborts the aggregate and becomes
/// its error.
pub fn all<T, E, I>(futures: I, filter: ErrorFilter<E>, log_filtered: bool) -> Future<Vec<Option<T>>, E>
where
    T: 'static,
    E: fmt::Display + 'static,
    I: IntoIterator<Item = Future<T, E>>,
{
    let futures: Vec<Future<T, E>> = futures.into_iter().collect();
    Future::deferred(move || {
        let mut resolved = Vec::with_capacity(futures.len());
        for (index, future) in futures.into_iter().enumerate() {
            match future.into_result() {
                Ok(value) => resolved.push(Some(value)),
                Err(err) if filter.matches(&err) => {
                    if log_filtered {
                        error!(index, error = %err, "tolerated failure in aggregate");
                    }
                    resolved.push(None);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(resolved)
    })
}

/// Resolves to the first candidate, in input order, that is acceptable.
///
/// A candidate is acceptable when it succeeds, or when it fails with an error
/// outside `filter` (that error is then the race's outcome). When every
/// candidate fails with a filtered error, the race resolves to `default` if
/// one is given.
///
/// Without a default, the race fails with the **first** candidate's error, not
/// the last one seen. The first candidate is usually the preferred source, so
/// its failure is the useful diagnostic. With no candidates at all and no
/// default, the race fails with [`Error::NotFound`].
pub fn race<T, E, I>(futures: I, filter: ErrorFilter<E>, default: Option<T>) -> Future<T, E>
where
    T: 'static,
    E: From<Error> + 'static,
    I: IntoIterator<Item = Future<T, E>>,
{
    let futures: Vec<Future<T, E>> = futures.into_iter().collect();
    Future::deferred(move || {
        let mut first_error = None;
        for future in futures {
            match future.into_result() {
                Ok(value) => return Ok(value),
                Err(err) if filter.matches(&err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Err(err) => return Err(err),
            }
        }
        if let Some(value) = default {
            return Ok(value);
        }
        Err(first_error.unwrap_or_else(|| Error::not_found("race over no candidates").into()))
    })
}
