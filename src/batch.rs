use crate::buffer::RingBuffer;
use crate::config::BufferConfig;
use crate::error::{PipelineError, Result};
use crate::stage::{Stage, StageContext};
use crate::stream::{self, handoff, Recv, Stream};
use crossbeam::channel::{after, select};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Collects values into a [`RingBuffer`] and emits them in batches on a
/// fixed interval.
///
/// Each run starts two workers around a fresh buffer:
///
/// - the collector pushes every input value into the buffer and never waits
///   on downstream;
/// - the flusher sleeps for `flush_interval`, drains the buffer and forwards
///   the drained values in order, then re-arms its timer. Flush spacing is
///   therefore the interval plus the time spent forwarding.
///
/// Cancellation during a flush discards whatever was drained but not yet
/// forwarded. When upstream closes, the next flush is the last one and the
/// output stream closes after it.
#[derive(Debug, Clone)]
pub struct BufferStage {
    config: BufferConfig,
    capacity: NonZeroUsize,
}

impl BufferStage {
    /// Create a buffering stage, rejecting invalid settings up front
    pub fn new(config: BufferConfig) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or_else(|| PipelineError::Config("buffer capacity must be at least 1".into()))?;
        Ok(Self { config, capacity })
    }

    /// Get the validated settings this stage runs with
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }
}

impl Stage for BufferStage {
    fn run(&self, ctx: &StageContext, input: Stream) -> Stream {
        let (tx, rx) = handoff();
        let buffer = RingBuffer::with_capacity(self.capacity);
        let upstream_closed = Arc::new(AtomicBool::new(false));

        let cancel = ctx.cancellation().clone();
        let collector_buffer = buffer.clone();
        let collector_closed = Arc::clone(&upstream_closed);
        ctx.spawn("buffer_collector", move || {
            tracing::debug!("collector started");
            loop {
                match stream::recv(&cancel, &input) {
                    Recv::Value(value) => collector_buffer.push(value),
                    Recv::Cancelled => break,
                    Recv::Closed => {
                        collector_closed.store(true, Ordering::Release);
                        tracing::debug!("upstream closed, collector done");
                        break;
                    }
                }
            }
            tracing::debug!("collector exited");
        });

        let cancel = ctx.cancellation().clone();
        let interval = self.config.flush_interval;
        ctx.spawn("buffer_flusher", move || {
            tracing::debug!(?interval, "flusher started");
            'flush: loop {
                select! {
                    recv(after(interval)) -> _ => {},
                    recv(cancel.receiver()) -> _ => break 'flush,
                }

                // Read the flag before draining so a closed upstream's
                // last pushes are part of this batch.
                let last_flush = upstream_closed.load(Ordering::Acquire);
                let batch = buffer.get();
                if !batch.is_empty() {
                    tracing::debug!(count = batch.len(), "flushing batch");
                }
                for value in batch {
                    if !stream::send(&cancel, &tx, value) {
                        break 'flush;
                    }
                }
                if last_flush {
                    break;
                }
            }
            tracing::debug!("flusher exited");
        });

        rx
    }

    fn name(&self) -> &str {
        "buffer"
    }
}
