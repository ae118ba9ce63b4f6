//! Cooperative cancellation.
//!
//! A single [`CancellationToken`] is broadcast to every phase task of a
//! run. Cancellation is observed before each phase starts, before each
//! module executes, and inside any module that performs suspending work.

mod token;

pub use token::CancellationToken;
