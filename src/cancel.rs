use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One-shot shutdown broadcast shared by every worker of a pipeline run.
///
/// The token owns the only sender of a zero-capacity channel that never
/// carries a message. Cancelling drops that sender, so every clone of the
/// receiver becomes permanently ready with a disconnect. Workers race
/// [`receiver`](CancellationToken::receiver) against their data channels
/// inside `crossbeam::select!`.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl CancellationToken {
    /// Create a token in the active state
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                sender: Mutex::new(Some(sender)),
                receiver,
            }),
        }
    }

    /// Signal every observer. Returns true only for the call that performed
    /// the transition; later calls do nothing.
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.inner.sender.lock().take();
        tracing::info!("cancellation signaled");
        true
    }

    /// Check whether cancellation has been signaled
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Channel that becomes ready (disconnected) once cancelled. Meant for
    /// `recv(token.receiver())` arms in `select!`.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.inner.receiver
    }

    /// Block until cancelled
    pub fn wait(&self) {
        let _ = self.inner.receiver.recv();
    }

    /// Block until cancelled or the timeout passes. Returns true if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let _ = self.inner.receiver.recv_timeout(timeout);
        self.is_cancelled()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
