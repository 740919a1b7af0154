//! Windowed top-K aggregation.
//!
//! A single coordination thread owns the [`BoundedTopK`](crate::topk::BoundedTopK)
//! and multiplexes three event sources:
//!
//! shutdown signal (watch)
//! flush ticker (interval)
//! observation queue (mpsc)
//!
//! Everything else talks to it through messages, so the ranking structure
//! never needs a lock.

mod error;
mod lifecycle;
mod manager;
mod stats;
mod worker;


pub use error::*;
pub use lifecycle::*;
pub use manager::*;
pub use stats::*;
