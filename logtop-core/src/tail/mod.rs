//! Follow a growing file line by line (`tail -F`).
//!
//! The follower survives truncation and replacement of the file and only
//! ends its line stream when explicitly stopped.

mod error;
mod follower;
mod tailer;


pub use error::*;
pub use tailer::*;
