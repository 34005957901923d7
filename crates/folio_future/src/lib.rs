//! Lazy, memoizing deferred values and the combinators built on them.
//!
//! A [`Future`] here is a synchronous, single-threaded construct: it captures
//! a computation and runs it inside the first call that asks for the outcome.
//! It is not an `async` task and never touches an executor.

#![warn(missing_docs)]

pub mod combinators;
pub mod filter;
pub mod future;

pub use combinators::{all, race};
pub use filter::ErrorFilter;
pub use future::{Computation, Future, Step};
