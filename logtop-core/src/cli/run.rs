use crate::aggregation::AggregationLoop;
use crate::cli::args::RunArgs;
use crate::config::{LogtopConfig, load_config};
use crate::report::render;
use crate::section::extract_section;
use crate::tail::Tailer;
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::Arc;

/// Counters for the line pump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub lines: u64,
    pub skipped: u64,
}

pub fn run_from_args(args: &RunArgs) -> Result<()> {
    let cfg = load_config(args.config.as_deref(), args.overrides())?;
    run(cfg)
}

pub fn run(cfg: LogtopConfig) -> Result<()> {
    let path = cfg.validate()?.to_path_buf();

    let aggregation =
        AggregationLoop::with_channel_capacity(cfg.period(), cfg.top_k, cfg.channel_capacity)?;
    let tailer = Arc::new(Tailer::with_options(&path, cfg.tail_options()));

    let lines = tailer
        .start()
        .with_context(|| format!("failed to follow {}", path.display()))?;

    let format = cfg.output;
    let period = cfg.period();
    aggregation.start(move |sections| {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", render(format, period, &sections));
        let _ = out.flush();
    })?;

    // Stopping the tailer closes `lines`, which unwinds everything below.
    let interrupted = tailer.clone();
    ctrlc::set_handler(move || {
        tracing::info!("interrupt received, shutting down");
        let _ = interrupted.stop();
    })
    .context("failed to install Ctrl-C handler")?;

    let stats = pump_lines(lines, &aggregation);

    aggregation.stop()?;
    aggregation.wait()?;
    tailer.wait()?;

    let loop_stats = aggregation.stats();
    tracing::info!(
        lines = stats.lines,
        skipped = stats.skipped,
        observed = loop_stats.observed,
        dropped = loop_stats.dropped,
        flushes = loop_stats.flushes,
        "logtop finished"
    );

    Ok(())
}

/// Feed raw lines through section extraction into the aggregation loop.
/// Lines that do not parse are skipped and never observed.
pub fn pump_lines<I>(lines: I, aggregation: &AggregationLoop) -> PumpStats
where
    I: IntoIterator<Item = String>,
{
    let mut stats = PumpStats::default();

    for line in lines {
        stats.lines += 1;
        match extract_section(&line) {
            Ok(section) => aggregation.observe(section),
            Err(e) => {
                stats.skipped += 1;
                tracing::debug!(error = %e, line = %line, "skipping unparseable line");
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topk::Item;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_pump_skips_unparseable_lines() {
        let aggregation = AggregationLoop::new(Duration::from_millis(100), 3).unwrap();
        let (tx, rx) = mpsc::channel();
        aggregation
            .start(move |items| {
                let _ = tx.send(items);
            })
            .unwrap();

        let lines = vec![
            r#"127.0.0.1 - - [09/May/2018:16:00:39 +0000] "GET /api/user HTTP/1.0" 200 12"#,
            "garbage",
            r#"127.0.0.1 - - [09/May/2018:16:00:40 +0000] "GET /api/order HTTP/1.0" 200 12"#,
            "",
        ];
        let stats = pump_lines(lines.into_iter().map(String::from), &aggregation);

        assert_eq!(stats, PumpStats { lines: 4, skipped: 2 });

        let flushed = loop {
            let items = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            if !items.is_empty() {
                break items;
            }
        };
        assert_eq!(flushed, vec![Item::new("/api", 2)]);

        aggregation.stop().unwrap();
        aggregation.wait().unwrap();
    }
}
