use chrono::{DateTime, FixedOffset};

/// One Common Log Format record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogEntry {
    pub remote_host: String,
    pub ident: Option<String>,
    pub auth_user: Option<String>,
    pub timestamp: DateTime<FixedOffset>,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub status: u16,
    /// `-` in the log is recorded as 0
    pub bytes: u64,
}

impl AccessLogEntry {
    pub fn section(&self) -> String {
        super::section_of(&self.path)
    }
}
