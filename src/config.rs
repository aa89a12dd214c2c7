use crate::error::{PipelineError, Result};
use std::time::Duration;

/// Number of values the buffering stage holds between flushes
pub const DEFAULT_BUFFER_CAPACITY: usize = 10;

/// Time the buffering stage waits between flushes
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Settings for the buffering stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    pub capacity: usize,
    pub flush_interval: Duration,
}

impl BufferConfig {
    /// Create a config with the default capacity and flush interval
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    /// Set the ring buffer capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the flush interval
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Reject a zero capacity or a zero flush interval
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(PipelineError::Config(
                "buffer capacity must be at least 1".into(),
            ));
        }
        if self.flush_interval.is_zero() {
            return Err(PipelineError::Config(
                "flush interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BufferConfig::default();
        assert_eq!(config.capacity, 10);
        assert_eq!(config.flush_interval, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = BufferConfig::new().with_capacity(0);
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = BufferConfig::new().with_flush_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }
}
