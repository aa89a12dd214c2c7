//! A concurrent integer stream pipeline with time-windowed batching.
//!
//! Every stage runs on its own worker thread(s) and hands values to the next
//! stage over a rendezvous channel. A single [`CancellationToken`] is shared
//! by all workers; signaling it tears the whole pipeline down.
//!
//! # Features
//!
//! - Composable [`Stage`]s folded over a source stream by [`Pipeline::run`]
//! - Positive and multiple-of-three filters built on [`FilterStage`]
//! - [`BufferStage`]: a [`RingBuffer`] that overwrites when full, flushed
//!   downstream on a fixed interval
//! - Source and sink adapters for iterators, line-based readers and
//!   terminal consumers
//!
//! # Example
//!
//! ```no_run
//! use int_pipeline::{source, sink, BufferConfig, CancellationToken, Pipeline};
//!
//! # fn main() -> int_pipeline::Result<()> {
//! let cancel = CancellationToken::new();
//! let pipeline = Pipeline::standard(cancel.clone(), BufferConfig::default())?;
//!
//! let input = source::from_iter(pipeline.context(), vec![-5, 3, 6, 0, 9, -9, 12]);
//! let output = pipeline.run(input);
//!
//! sink::consume(&cancel, &output, |value| println!("processed {value}"));
//! pipeline.join(std::time::Duration::from_secs(1))?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod buffer;
pub mod cancel;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod stage;
pub mod stream;

// Re-exports for convenience
pub use batch::BufferStage;
pub use buffer::RingBuffer;
pub use cancel::CancellationToken;
pub use config::{BufferConfig, DEFAULT_BUFFER_CAPACITY, DEFAULT_FLUSH_INTERVAL};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use stage::{
    multiple_of_three_filter, positive_filter, FilterStage, FnStage, Stage, StageContext,
};
pub use stream::{handoff, Stream, StreamSender};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
