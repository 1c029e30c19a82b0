//! Stream handles over a shared [`RingBuffer`].

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::ring::RingBuffer;

/// Creates a connected writer/reader pair over a ring of `capacity` bytes.
///
/// Fails with [`PipeError::InvalidCapacity`](crate::PipeError::InvalidCapacity)
/// when `capacity` is zero.
///
/// # Example
///
/// ```
/// use std::io::{Read, Write};
///
/// let (mut writer, mut reader) = fifoio::create_pair(16).unwrap();
/// writer.write_all(b"hello").unwrap();
/// writer.close();
///
/// let mut out = String::new();
/// reader.read_to_string(&mut out).unwrap();
/// assert_eq!(out, "hello");
/// ```
pub fn create_pair(capacity: usize) -> Result<(PipeWriter, PipeReader)> {
    let ring = RingBuffer::new(capacity)?;
    Ok(split(ring, None, None))
}

pub(crate) fn split(
    ring: RingBuffer,
    write_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
) -> (PipeWriter, PipeReader) {
    let ring = Arc::new(ring);
    let writer = PipeWriter {
        ring: Arc::clone(&ring),
        timeout: write_timeout,
    };
    let reader = PipeReader {
        ring,
        timeout: read_timeout,
    };
    (writer, reader)
}

/// Producer end of a pipe.
///
/// Implements [`io::Write`]. Each `write` is a partial transfer: it returns
/// as soon as some bytes fit, so use `write_all` to push a whole payload.
/// Closing or dropping the writer marks end-of-input, after which the reader
/// drains what is left and then sees end-of-stream.
pub struct PipeWriter {
    ring: Arc<RingBuffer>,
    timeout: Option<Duration>,
}

impl PipeWriter {
    /// Returns the pipe capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns a snapshot of the bytes that can be written without blocking.
    pub fn bytes_free(&self) -> usize {
        self.ring.bytes_free()
    }

    /// Returns a snapshot of the bytes not yet read.
    pub fn available(&self) -> usize {
        self.ring.available()
    }

    /// Returns the timeout applied to each write, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns a handle that can cancel the pipe from another thread.
    pub fn canceller(&self) -> Canceller {
        Canceller {
            ring: Arc::clone(&self.ring),
        }
    }

    /// Marks end-of-input and releases the writer.
    pub fn close(self) {
        self.ring.mark_end_of_input();
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.timeout {
            Some(timeout) => self.ring.write_timeout(buf, timeout)?,
            None => self.ring.write(buf)?,
        };
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.ring.mark_end_of_input();
    }
}

/// Consumer end of a pipe.
///
/// Implements [`io::Read`]. Each `read` returns as soon as any bytes are
/// available and returns `Ok(0)` once the writer is gone and the pipe is
/// drained. Closing the reader never marks end-of-input.
pub struct PipeReader {
    ring: Arc<RingBuffer>,
    timeout: Option<Duration>,
}

impl PipeReader {
    /// Reads up to `dest.len()` bytes, blocking while the pipe is empty.
    ///
    /// Honors the configured read timeout. See [`RingBuffer::read_into`].
    pub fn read_into(&mut self, dest: &mut [u8]) -> Result<usize> {
        match self.timeout {
            Some(timeout) => self.ring.read_into_timeout(dest, timeout),
            None => self.ring.read_into(dest),
        }
    }

    /// Returns the pipe capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns a snapshot of the bytes that can be written without blocking.
    pub fn bytes_free(&self) -> usize {
        self.ring.bytes_free()
    }

    /// Returns a snapshot of the bytes waiting to be read.
    pub fn available(&self) -> usize {
        self.ring.available()
    }

    /// Returns true once the writer has marked end-of-input.
    pub fn is_end_of_input(&self) -> bool {
        self.ring.is_end_of_input()
    }

    /// Returns the timeout applied to each read, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns a handle that can cancel the pipe from another thread.
    pub fn canceller(&self) -> Canceller {
        Canceller {
            ring: Arc::clone(&self.ring),
        }
    }

    /// Releases the reader. The writer side is left untouched.
    pub fn close(self) {}
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

/// Cancels a pipe from any thread.
///
/// Blocked and future transfers on both ends fail with
/// [`PipeError::Cancelled`](crate::PipeError::Cancelled).
#[derive(Clone)]
pub struct Canceller {
    ring: Arc<RingBuffer>,
}

impl Canceller {
    /// Cancels the pipe. Idempotent.
    pub fn cancel(&self) {
        self.ring.cancel();
    }

    /// Returns true once the pipe has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.ring.is_cancelled()
    }
}
