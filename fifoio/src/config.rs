//! Pipe configuration.

use std::time::Duration;

use crate::bytes::DEFAULT_CAPACITY;
use crate::error::Result;
use crate::pipe::{split, PipeReader, PipeWriter};
use crate::ring::RingBuffer;

/// Pipe configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeConfig {
    /// Ring capacity in bytes.
    pub capacity: usize,
    /// Longest time a single write may block. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
    /// Longest time a single read may block. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipeConfig {
    /// Create a new config (1 MiB, no timeouts).
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            write_timeout: None,
            read_timeout: None,
        }
    }

    /// Set ring capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Set read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the same timeout on both ends.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_write_timeout(timeout).with_read_timeout(timeout)
    }

    /// Build a connected writer/reader pair.
    pub fn build(&self) -> Result<(PipeWriter, PipeReader)> {
        let ring = RingBuffer::new(self.capacity)?;
        Ok(split(ring, self.write_timeout, self.read_timeout))
    }
}
