use crate::config::ConfigOverrides;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Access log to follow (overrides the config file)
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Path to a logtop TOML config file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Reporting window in seconds
    #[arg(long, short)]
    pub period: Option<u64>,

    /// Number of sections to report per window
    #[arg(long, short = 'k')]
    pub top: Option<usize>,

    /// Ignore content already in the file at start
    #[arg(long)]
    pub from_end: bool,

    /// Emit one JSON object per window instead of a table
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            file: self.file.clone(),
            period_secs: self.period,
            top_k: self.top,
            from_end: self.from_end,
            json: self.json,
        }
    }
}
