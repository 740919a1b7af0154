use crate::aggregation::stats::LoopCounters;
use crate::topk::{BoundedTopK, IncrOutcome, Item};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};

/// State moved onto the coordination thread at start.
pub(crate) struct Worker {
    pub(crate) period: Duration,
    pub(crate) topk: BoundedTopK,
    pub(crate) observations: mpsc::Receiver<String>,
    pub(crate) shutdown: watch::Receiver<bool>,
    pub(crate) counters: Arc<LoopCounters>,
}

impl Worker {
    pub(crate) async fn run<F>(mut self, mut on_flush: F)
    where
        F: FnMut(Vec<Item>),
    {
        // First flush happens one full period after start.
        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        // A tick missed while a flush is still running is dropped, never queued.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            period = ?self.period,
            k = self.topk.capacity(),
            "aggregation loop started"
        );

        // Local copy so the select does not hold a borrow of `self`.
        let mut shutdown = self.shutdown.clone();

        loop {
            tokio::select! {
                biased;

                // Also resolves when the sender side is gone.
                _ = shutdown.wait_for(|stop| *stop) => {
                    break;
                }

                _ = ticker.tick() => {
                    self.flush(&mut on_flush);
                }

                Some(key) = self.observations.recv() => {
                    self.apply(&key);
                }
            }
        }

        tracing::info!("exiting aggregation loop");
    }

    fn flush<F>(&mut self, on_flush: &mut F)
    where
        F: FnMut(Vec<Item>),
    {
        // Observations already queued when the tick fired belong to this window.
        let queued = self.observations.len();
        for _ in 0..queued {
            match self.observations.try_recv() {
                Ok(key) => self.apply(&key),
                Err(_) => break,
            }
        }

        let sections = self.topk.top_k();
        self.topk.reset();

        let flushes = LoopCounters::bump(&self.counters.flushes);
        tracing::debug!(flush = flushes, sections = sections.len(), "flushing sections");

        on_flush(sections);
    }

    fn apply(&mut self, key: &str) {
        match self.topk.incr_by(key, 1) {
            Ok(IncrOutcome::Evicted(evicted)) => {
                tracing::trace!(key, evicted = %evicted, "section evicted from ranking");
            }
            Ok(_) => {}
            Err(err) => {
                LoopCounters::bump(&self.counters.increment_failures);
                tracing::error!(key, error = %err, "cannot increment section");
            }
        }
    }
}
