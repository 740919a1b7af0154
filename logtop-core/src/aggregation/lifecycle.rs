use std::sync::atomic::{AtomicU8, Ordering};

/// One-directional lifecycle: `Idle -> Running -> Stopped`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Lifecycle {
    Idle = 0,
    Running = 1,
    Stopped = 2,
}

impl Lifecycle {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Lifecycle::Idle,
            1 => Lifecycle::Running,
            _ => Lifecycle::Stopped,
        }
    }
}

/// Lock-free lifecycle cell. Every transition is a compare-and-set, so
/// exactly one caller wins it.
#[derive(Debug)]
pub(crate) struct AtomicLifecycle(AtomicU8);

impl AtomicLifecycle {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(Lifecycle::Idle as u8))
    }

    pub(crate) fn load(&self) -> Lifecycle {
        Lifecycle::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Returns the observed state on failure.
    pub(crate) fn transition(&self, from: Lifecycle, to: Lifecycle) -> Result<(), Lifecycle> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(Lifecycle::from_u8)
    }
}
