//! Section-key extraction from access-log lines.
//!
//! raw line
//! parse_line
//! AccessLogEntry
//! section_of(path)
//! section key

mod error;
mod parse;
mod types;

pub use error::*;
pub use parse::*;
pub use types::*;
