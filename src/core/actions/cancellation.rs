use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use thiserror::Error;

pub const CANCEL_CHECK_INTERVAL_PIXELS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

pub trait CancelToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> CancelToken for F
where
    F: Fn() -> bool + Send + Sync,
{
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Owning half of a cancellation token; one per render session.
///
/// Cancelling sets a flag for polling loops and disconnects a channel so that
/// blocked waiters can `select!` on [`CancelSignal::receiver`].
#[derive(Debug)]
pub struct CancelSource {
    flag: Arc<AtomicBool>,
    trigger: Option<Sender<()>>,
    receiver: Receiver<()>,
}

impl CancelSource {
    #[must_use]
    pub fn new() -> Self {
        let (trigger, receiver) = bounded(0);

        Self {
            flag: Arc::new(AtomicBool::new(false)),
            trigger: Some(trigger),
            receiver,
        }
    }

    #[must_use]
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            flag: Arc::clone(&self.flag),
            receiver: self.receiver.clone(),
        }
    }

    /// Returns `false` if the token had already fired.
    pub fn cancel(&mut self) -> bool {
        let was_cancelled = self.flag.swap(true, Ordering::AcqRel);
        self.trigger = None;
        !was_cancelled
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observing half of a [`CancelSource`], cheap to clone across threads.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
    receiver: Receiver<()>,
}

impl CancelSignal {
    /// Becomes ready (disconnected) once the source is cancelled or dropped.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }

    /// A signal whose source is already gone: it never fires.
    #[must_use]
    pub fn never() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            receiver: crossbeam_channel::never(),
        }
    }
}

impl CancelToken for CancelSignal {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
