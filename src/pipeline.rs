use crate::batch::BufferStage;
use crate::cancel::CancellationToken;
use crate::config::BufferConfig;
use crate::error::{PipelineError, Result};
use crate::stage::{multiple_of_three_filter, positive_filter, Stage, StageContext};
use crate::stream::Stream;
use std::time::Duration;

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    cancel: CancellationToken,
    stages: Vec<Box<dyn Stage>>,
    error: Option<PipelineError>,
}

impl PipelineBuilder {
    /// Create a builder whose stages will observe `cancel`
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            stages: Vec::new(),
            error: None,
        }
    }

    /// Append any stage
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append the positive filter
    pub fn positive_filter(self) -> Self {
        self.add_stage(positive_filter())
    }

    /// Append the multiple-of-three filter
    pub fn multiple_of_three_filter(self) -> Self {
        self.add_stage(multiple_of_three_filter())
    }

    /// Append a buffering stage. An invalid config is reported by `build`.
    pub fn buffer(mut self, config: BufferConfig) -> Self {
        match BufferStage::new(config) {
            Ok(stage) => self.stages.push(Box::new(stage)),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Pipeline::new(self.cancel, self.stages))
    }
}

/// An ordered chain of stages sharing one cancellation token.
///
/// The pipeline holds no buffers of its own; [`run`](Pipeline::run) just
/// hands each stage the previous stage's output.
pub struct Pipeline {
    ctx: StageContext,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create a pipeline from stages in execution order
    pub fn new(cancel: CancellationToken, stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            ctx: StageContext::new(cancel),
            stages,
        }
    }

    /// positive filter → multiple-of-three filter → buffer
    pub fn standard(cancel: CancellationToken, config: BufferConfig) -> Result<Self> {
        PipelineBuilder::new(cancel)
            .positive_filter()
            .multiple_of_three_filter()
            .buffer(config)
            .build()
    }

    /// Start every stage and return the last stage's output. With no
    /// stages the source comes back unchanged.
    pub fn run(&self, source: Stream) -> Stream {
        tracing::info!(stages = ?self.stage_names(), "pipeline started");
        self.stages
            .iter()
            .fold(source, |input, stage| stage.run(&self.ctx, input))
    }

    /// Get the run context, for starting sources on the same token
    pub fn context(&self) -> &StageContext {
        &self.ctx
    }

    /// Get the shared cancellation token
    pub fn cancellation(&self) -> &CancellationToken {
        self.ctx.cancellation()
    }

    /// Names of the configured stages, in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of configured stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Wait for every worker started by this pipeline to exit
    pub fn join(&self, timeout: Duration) -> Result<()> {
        self.ctx.join(timeout)
    }

    /// Signal cancellation and wait for all workers to exit
    pub fn shutdown(&self, timeout: Duration) -> Result<()> {
        self.ctx.cancellation().cancel();
        self.join(timeout)
    }
}
