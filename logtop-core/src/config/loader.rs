use crate::config::{ConfigError, LogtopConfig};
use std::fs;
use std::path::{Path, PathBuf};

impl LogtopConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&s).map_err(|e| ConfigError::parse(path, e))
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Check the values the runtime cannot work with.
    pub fn validate(&self) -> Result<&Path, ConfigError> {
        if self.period_secs == 0 {
            return Err(ConfigError::invalid("period_secs", "must be greater than zero"));
        }
        if self.top_k == 0 {
            return Err(ConfigError::invalid("top_k", "must be greater than zero"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::invalid(
                "channel_capacity",
                "must be greater than zero",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "poll_interval_ms",
                "must be greater than zero",
            ));
        }

        self.file.as_deref().ok_or(ConfigError::MissingFile)
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub file: Option<PathBuf>,
    pub period_secs: Option<u64>,
    pub top_k: Option<usize>,
    pub from_end: bool,
    pub json: bool,
}

pub fn load_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<LogtopConfig, ConfigError> {
    let mut cfg = match path {
        Some(path) => LogtopConfig::from_file(path)?,
        None => LogtopConfig::default(),
    };

    if let Some(file) = overrides.file {
        cfg.file = Some(file);
    }
    if let Some(period) = overrides.period_secs {
        cfg.period_secs = period;
    }
    if let Some(k) = overrides.top_k {
        cfg.top_k = k;
    }
    cfg.from_end |= overrides.from_end;
    if overrides.json {
        cfg.output = crate::report::OutputFormat::Json;
    }

    cfg.validate()?;
    Ok(cfg)
}
