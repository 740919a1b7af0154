use crate::aggregation::stats::LoopCounters;
use crate::aggregation::worker::Worker;
use crate::aggregation::{AggregationError, AtomicLifecycle, Lifecycle, LoopStats};
use crate::topk::{BoundedTopK, Item};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Periodically flushed top-K counter of section keys.
///
/// Invariants:
/// - `start` launches the coordination thread at most once
/// - `stop` delivers the shutdown signal at most once
/// - `observe` never blocks forever: outside `Running` it drops, and once
///   the coordination thread exits the queue is closed
pub struct AggregationLoop {
    period: Duration,
    k: usize,
    lifecycle: AtomicLifecycle,
    observations: mpsc::Sender<String>,
    shutdown: watch::Sender<bool>,
    // Handed to the coordination thread by the winning `start`.
    worker: Mutex<Option<Worker>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<LoopCounters>,
}

impl AggregationLoop {
    pub fn new(period: Duration, k: usize) -> Result<Self, AggregationError> {
        Self::with_channel_capacity(period, k, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_channel_capacity(
        period: Duration,
        k: usize,
        capacity: usize,
    ) -> Result<Self, AggregationError> {
        if period.is_zero() {
            return Err(AggregationError::InvalidPeriod);
        }
        if capacity == 0 {
            return Err(AggregationError::InvalidChannelCapacity);
        }

        let topk = BoundedTopK::new(k)?;
        let (tx, rx) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let counters = Arc::new(LoopCounters::default());

        Ok(Self {
            period,
            k,
            lifecycle: AtomicLifecycle::new(),
            observations: tx,
            shutdown: shutdown_tx,
            worker: Mutex::new(Some(Worker {
                period,
                topk,
                observations: rx,
                shutdown: shutdown_rx,
                counters: counters.clone(),
            })),
            handle: Mutex::new(None),
            counters,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn state(&self) -> Lifecycle {
        self.lifecycle.load()
    }

    pub fn stats(&self) -> LoopStats {
        self.counters.snapshot()
    }

    /// Launch the coordination thread. `on_flush` runs on that thread once
    /// per period with the drained ranking (possibly empty).
    ///
    /// Only the first call has an effect; later calls return
    /// `AlreadyStarted` and leave the running loop untouched.
    pub fn start<F>(&self, on_flush: F) -> Result<(), AggregationError>
    where
        F: FnMut(Vec<Item>) + Send + 'static,
    {
        // Taken before the transition and held until the handle is stored,
        // so `wait` never sees a half-started loop.
        let Ok(mut slot) = self.handle.lock() else {
            return Err(AggregationError::LoopPanicked);
        };

        if self
            .lifecycle
            .transition(Lifecycle::Idle, Lifecycle::Running)
            .is_err()
        {
            return Err(AggregationError::AlreadyStarted);
        }

        let Some(worker) = self.worker.lock().ok().and_then(|mut w| w.take()) else {
            self.mark_stopped();
            return Err(AggregationError::AlreadyStarted);
        };

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                self.mark_stopped();
                return Err(AggregationError::Runtime(e));
            }
        };

        let spawned = std::thread::Builder::new()
            .name("logtop-aggregation".into())
            .spawn(move || runtime.block_on(worker.run(on_flush)));

        match spawned {
            Ok(handle) => {
                *slot = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.mark_stopped();
                Err(AggregationError::Runtime(e))
            }
        }
    }

    /// Record one occurrence of `key`.
    ///
    /// While running this waits for queue space if the loop is busy
    /// flushing; accepted observations are never lost. Outside `Running`
    /// the observation is dropped and counted.
    ///
    /// Must not be called from inside an async context; use
    /// [`observe_async`](Self::observe_async) there.
    pub fn observe(&self, key: impl Into<String>) {
        if !self.accepting() {
            return;
        }
        let sent = self.observations.blocking_send(key.into());
        self.record_send(sent.is_ok());
    }

    pub async fn observe_async(&self, key: impl Into<String>) {
        if !self.accepting() {
            return;
        }
        let sent = self.observations.send(key.into()).await;
        self.record_send(sent.is_ok());
    }

    /// Signal the loop to exit after its current iteration. Does not wait.
    ///
    /// Safe to call from many threads: only the first call sends the signal.
    pub fn stop(&self) -> Result<(), AggregationError> {
        match self
            .lifecycle
            .transition(Lifecycle::Running, Lifecycle::Stopped)
        {
            Ok(()) => {
                // Receiver lives as long as the worker; a send error means it already exited.
                let _ = self.shutdown.send(true);
                tracing::debug!("aggregation loop stop requested");
                Ok(())
            }
            Err(Lifecycle::Idle) => Err(AggregationError::NotStarted),
            Err(_) => Ok(()),
        }
    }

    /// Block until the coordination thread has exited.
    pub fn wait(&self) -> Result<(), AggregationError> {
        if self.lifecycle.load() == Lifecycle::Idle {
            return Err(AggregationError::NotStarted);
        }

        // Concurrent waiters queue on the lock until the join completes.
        let mut slot = self
            .handle
            .lock()
            .map_err(|_| AggregationError::LoopPanicked)?;

        match slot.take() {
            Some(handle) => handle.join().map_err(|_| AggregationError::LoopPanicked),
            None => Ok(()),
        }
    }

    fn accepting(&self) -> bool {
        if self.lifecycle.load() == Lifecycle::Running {
            return true;
        }
        let dropped = LoopCounters::bump(&self.counters.dropped);
        tracing::debug!(dropped, "aggregation loop not running, observation dropped");
        false
    }

    fn record_send(&self, accepted: bool) {
        if accepted {
            LoopCounters::bump(&self.counters.observed);
        } else {
            // The coordination thread is gone.
            let dropped = LoopCounters::bump(&self.counters.dropped);
            tracing::debug!(dropped, "aggregation loop exited, observation dropped");
        }
    }

    fn mark_stopped(&self) {
        let _ = self
            .lifecycle
            .transition(Lifecycle::Running, Lifecycle::Stopped);
    }
}

impl Drop for AggregationLoop {
    fn drop(&mut self) {
        // No join: the worker also exits once `shutdown` is dropped.
        let _ = self.stop();
    }
}
