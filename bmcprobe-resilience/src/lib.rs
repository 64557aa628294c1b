//! Resilience patterns for bmcprobe
//!
//! This crate provides the backoff strategies and the bounded polling
//! combinator used to wait for remote state to converge.

pub mod backoff;
pub mod poll;

// Re-export commonly used types
pub use backoff::BackoffStrategy;
pub use poll::{PollError, PollPolicy, PollSuccess, Poller};
