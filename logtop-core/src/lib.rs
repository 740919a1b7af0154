pub mod aggregation;
pub mod cli;
pub mod config;
pub mod logging;
pub mod report;
pub mod section;
pub mod tail;
pub mod topk;
