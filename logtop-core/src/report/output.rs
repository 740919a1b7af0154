use crate::topk::Item;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One flushed window as it is emitted in JSON mode.
#[derive(Debug, Serialize)]
pub struct FlushReport<'a> {
    pub window_seconds: u64,
    pub sections: &'a [Item],
}

pub fn render(format: OutputFormat, period: Duration, sections: &[Item]) -> String {
    match format {
        OutputFormat::Text => render_sections(period, sections),
        OutputFormat::Json => render_json(period, sections),
    }
}

pub fn render_sections(period: Duration, sections: &[Item]) -> String {
    let mut out = format!("Top sections ({}s window)\n", period.as_secs().max(1));

    if sections.is_empty() {
        out.push_str("  no sections in the last period\n");
        return out;
    }

    let width = sections.iter().map(|s| s.key.len()).max().unwrap_or(0);
    for (rank, s) in sections.iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:<width$}  {:>6}\n",
            rank + 1,
            s.key,
            s.score
        ));
    }

    out
}

pub fn render_json(period: Duration, sections: &[Item]) -> String {
    let report = FlushReport {
        window_seconds: period.as_secs().max(1),
        sections,
    };
    // Serializing plain strings and integers cannot fail.
    serde_json::to_string(&report).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PERIOD: Duration = Duration::from_secs(10);

    #[test]
    fn test_render_empty_window() {
        assert_eq!(
            render_sections(PERIOD, &[]),
            "Top sections (10s window)\n  no sections in the last period\n"
        );
    }

    #[test]
    fn test_render_ranked_sections() {
        let sections = vec![Item::new("/api", 12), Item::new("/report", 3)];

        assert_eq!(
            render_sections(PERIOD, &sections),
            "Top sections (10s window)\n   1. /api         12\n   2. /report       3\n"
        );
    }

    #[test]
    fn test_render_json() {
        let sections = vec![Item::new("/api", 2)];

        assert_eq!(
            render(OutputFormat::Json, PERIOD, &sections),
            r#"{"window_seconds":10,"sections":[{"key":"/api","score":2}]}"#
        );
    }
}
