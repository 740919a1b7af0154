use crate::tail::TailError;
use crate::tail::follower::{Follower, Source};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
pub struct TailOptions {
    /// How long to sleep after reaching EOF before looking again.
    pub poll_interval: Duration,
    /// Skip the content present at start.
    pub from_end: bool,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            from_end: false,
        }
    }
}

/// Follows a single file on a dedicated thread.
pub struct Tailer {
    path: PathBuf,
    options: TailOptions,
    started: AtomicBool,
    stop: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Tailer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, TailOptions::default())
    }

    pub fn with_options(path: impl Into<PathBuf>, options: TailOptions) -> Self {
        Self {
            path: path.into(),
            options,
            started: AtomicBool::new(false),
            stop: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start following. The file must exist.
    ///
    /// The returned channel yields lines without their terminator and
    /// closes only after `stop`.
    pub fn start(&self) -> Result<mpsc::Receiver<String>, TailError> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TailError::AlreadyStarted);
        }

        let mut slot = self.handle.lock().map_err(|_| TailError::ThreadPanicked)?;

        let source = match Source::open(&self.path, self.options.from_end) {
            Ok(source) => source,
            Err(e) => {
                // Allow a retry once the file shows up.
                self.started.store(false, Ordering::Release);
                return Err(TailError::open(&self.path, e));
            }
        };

        let (tx, rx) = mpsc::channel();
        let follower = Follower {
            path: self.path.clone(),
            source,
            poll_interval: self.options.poll_interval,
            stop: self.stop.clone(),
            lines: tx,
        };

        let handle = std::thread::Builder::new()
            .name("logtop-tail".into())
            .spawn(move || follower.run())
            .map_err(|e| {
                self.started.store(false, Ordering::Release);
                TailError::open(&self.path, e)
            })?;

        *slot = Some(handle);
        tracing::info!(path = %self.path.display(), "tailing file");

        Ok(rx)
    }

    pub fn stop(&self) -> Result<(), TailError> {
        if !self.started.load(Ordering::Acquire) {
            return Err(TailError::NotStarted);
        }
        self.stop.store(true, Ordering::Release);
        Ok(())
    }

    pub fn wait(&self) -> Result<(), TailError> {
        if !self.started.load(Ordering::Acquire) {
            return Err(TailError::NotStarted);
        }

        let mut slot = self.handle.lock().map_err(|_| TailError::ThreadPanicked)?;
        match slot.take() {
            Some(handle) => handle.join().map_err(|_| TailError::ThreadPanicked),
            None => Ok(()),
        }
    }
}
