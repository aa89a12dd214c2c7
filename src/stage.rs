use crate::cancel::CancellationToken;
use crate::error::{PipelineError, Result};
use crate::stream::{self, handoff, Recv, Stream};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A unit of pipeline work: consumes one stream and returns a new one.
///
/// `run` must return immediately. The output stream is populated by worker
/// threads started through [`StageContext::spawn`], and every worker exits
/// once the context's cancellation token fires.
pub trait Stage: Send + Sync {
    /// Start the stage's workers and return the stream they write to
    fn run(&self, ctx: &StageContext, input: Stream) -> Stream;

    /// Get a human-readable name for this stage
    fn name(&self) -> &str {
        "stage"
    }
}

struct Worker {
    name: String,
    handle: JoinHandle<()>,
}

/// Run-scoped state handed to every stage: the shared cancellation token
/// plus the set of worker threads started for this run.
#[derive(Clone)]
pub struct StageContext {
    cancel: CancellationToken,
    workers: Arc<Mutex<Vec<Worker>>>,
    failures: Arc<Mutex<Vec<PipelineError>>>,
}

impl StageContext {
    /// Create a context around an existing token
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            workers: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the shared cancellation token
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Start a named worker thread tracked by this context.
    ///
    /// If the thread cannot be created, the failure is recorded for
    /// [`join`](StageContext::join) and the whole run is cancelled.
    pub fn spawn<F>(&self, name: &str, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match thread::Builder::new().name(name.to_string()).spawn(f) {
            Ok(handle) => self.workers.lock().push(Worker {
                name: name.to_string(),
                handle,
            }),
            Err(err) => self.fail(PipelineError::Spawn(format!("{name}: {err}"))),
        }
    }

    /// Record a failure and tear the run down
    pub fn fail(&self, err: PipelineError) {
        tracing::error!(error = %err, "stage failed, cancelling pipeline");
        self.failures.lock().push(err);
        self.cancel.cancel();
    }

    /// Number of workers started and not yet joined
    pub fn active_workers(&self) -> usize {
        self.workers
            .lock()
            .iter()
            .filter(|w| !w.handle.is_finished())
            .count()
    }

    /// Wait for every tracked worker to exit.
    ///
    /// Returns the first recorded failure, a panic from any worker, or
    /// [`PipelineError::JoinTimeout`] if some worker is still running when
    /// `timeout` elapses. Timed-out workers stay tracked.
    pub fn join(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let finished = {
                let mut workers = self.workers.lock();
                let (done, running): (Vec<_>, Vec<_>) =
                    workers.drain(..).partition(|w| w.handle.is_finished());
                *workers = running;
                done
            };

            for worker in finished {
                if worker.handle.join().is_err() {
                    return Err(PipelineError::WorkerPanicked(worker.name));
                }
                tracing::debug!(worker = %worker.name, "worker joined");
            }

            if self.workers.lock().is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                return Err(PipelineError::JoinTimeout(timeout));
            }
            thread::sleep(Duration::from_millis(1));
        }

        match self.failures.lock().first() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Predicate for the positive filter
pub fn is_positive(value: i64) -> bool {
    value > 0
}

/// Predicate for the multiple-of-three filter. Zero is rejected.
pub fn is_nonzero_multiple_of_three(value: i64) -> bool {
    value != 0 && value % 3 == 0
}

/// A stage that forwards values matching a predicate and silently drops the
/// rest. One worker, one value in flight, order preserved.
pub struct FilterStage<P> {
    name: String,
    predicate: Arc<P>,
}

impl<P> FilterStage<P>
where
    P: Fn(i64) -> bool + Send + Sync + 'static,
{
    /// Create a new filter stage
    pub fn new(name: impl Into<String>, predicate: P) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl<P> Stage for FilterStage<P>
where
    P: Fn(i64) -> bool + Send + Sync + 'static,
{
    fn run(&self, ctx: &StageContext, input: Stream) -> Stream {
        let (tx, rx) = handoff();
        let cancel = ctx.cancellation().clone();
        let predicate = Arc::clone(&self.predicate);
        let name = self.name.clone();

        ctx.spawn(&self.name, move || {
            tracing::debug!(stage = %name, "filter started");
            loop {
                let value = match stream::recv(&cancel, &input) {
                    Recv::Value(value) => value,
                    Recv::Cancelled => break,
                    Recv::Closed => {
                        tracing::debug!(stage = %name, "upstream closed");
                        break;
                    }
                };
                if !predicate(value) {
                    tracing::trace!(stage = %name, value, "dropped");
                    continue;
                }
                if !stream::send(&cancel, &tx, value) {
                    break;
                }
            }
            tracing::debug!(stage = %name, "filter exited");
        });

        rx
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Drops every value that is not strictly positive
pub fn positive_filter() -> FilterStage<fn(i64) -> bool> {
    FilterStage::new("positive_filter", is_positive as fn(i64) -> bool)
}

/// Drops zero and every value that is not a multiple of three
pub fn multiple_of_three_filter() -> FilterStage<fn(i64) -> bool> {
    FilterStage::new(
        "multiple_of_three_filter",
        is_nonzero_multiple_of_three as fn(i64) -> bool,
    )
}

/// Adapts a plain function or closure into a [`Stage`]
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(&StageContext, Stream) -> Stream + Send + Sync,
{
    /// Wrap `f` as a stage called `name`
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&StageContext, Stream) -> Stream + Send + Sync,
{
    fn run(&self, ctx: &StageContext, input: Stream) -> Stream {
        (self.f)(ctx, input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
