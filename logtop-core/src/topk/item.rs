use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// One tracked section and its accumulated score within the current window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Item {
    pub key: String,
    pub score: u64,
}

impl Item {
    pub fn new(key: impl Into<String>, score: u64) -> Self {
        Self {
            key: key.into(),
            score,
        }
    }

    /// Ranking order: higher score first, then ascending key.
    ///
    /// `Ordering::Less` means `self` ranks ahead of `other`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.score)
    }
}
