//! Fixed-capacity blocking byte ring shared by one producer and one consumer.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::error::{PipeError, Result};

/// A thread-safe fixed-capacity byte ring with blocking backpressure.
///
/// `RingBuffer` is the shared half of a pipe. The producer calls
/// [`write`](Self::write) and [`mark_end_of_input`](Self::mark_end_of_input),
/// the consumer calls [`read_into`](Self::read_into). Both transfers are
/// partial: they move as many bytes as currently fit (or are available) and
/// report the count, blocking only when not a single byte can move.
///
/// # Semantics
///
/// - **Write**: Blocks while the ring has zero free bytes
/// - **Read**: Blocks while the ring is empty and end-of-input is not marked
/// - **End of input**: Readers drain what is left, then get `Ok(0)` forever
/// - **Cancel**: Every blocked and future transfer fails with [`PipeError::Cancelled`]
///
/// One producer and one consumer is the supported topology. More threads
/// on either side stay memory safe, but byte interleaving between them is
/// unspecified.
///
/// # Example
///
/// ```
/// use fifoio::RingBuffer;
/// use std::sync::Arc;
/// use std::thread;
///
/// let ring = Arc::new(RingBuffer::new(4).unwrap());
/// let producer_ring = Arc::clone(&ring);
///
/// let producer = thread::spawn(move || {
///     let mut data: &[u8] = b"hello, pipe";
///     while !data.is_empty() {
///         let n = producer_ring.write(data).unwrap();
///         data = &data[n..];
///     }
///     producer_ring.mark_end_of_input();
/// });
///
/// let mut out = Vec::new();
/// let mut chunk = [0u8; 3];
/// loop {
///     let n = ring.read_into(&mut chunk).unwrap();
///     if n == 0 {
///         break;
///     }
///     out.extend_from_slice(&chunk[..n]);
/// }
///
/// producer.join().unwrap();
/// assert_eq!(out, b"hello, pipe");
/// ```
pub struct RingBuffer {
    capacity: usize,
    state: Mutex<RingState>,
    space_available: Condvar,
    data_available: Condvar,
}

struct RingState {
    storage: Box<[u8]>,
    // Virtual cursors counting every byte ever written and read. They wrap
    // after 2^64 bytes; only their wrapping difference is meaningful.
    write_cursor: u64,
    read_cursor: u64,
    // Physical positions of the cursors inside `storage`.
    tail: usize,
    head: usize,
    end_of_input: bool,
    cancelled: bool,
}

impl RingState {
    fn capacity(&self) -> usize {
        self.storage.len()
    }

    fn available(&self) -> usize {
        self.write_cursor.wrapping_sub(self.read_cursor) as usize
    }

    fn free(&self) -> usize {
        self.capacity() - self.available()
    }

    /// Copies as much of `data` as fits, splitting at the end of storage.
    fn push(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.free());
        if n == 0 {
            return 0;
        }

        let capacity = self.capacity();
        let tail = self.tail;
        let first = n.min(capacity - tail);
        self.storage[tail..tail + first].copy_from_slice(&data[..first]);
        self.storage[..n - first].copy_from_slice(&data[first..n]);

        self.tail = (tail + n) % capacity;
        self.write_cursor = self.write_cursor.wrapping_add(n as u64);
        n
    }

    /// Moves as many bytes as are available into `dest`.
    fn pop(&mut self, dest: &mut [u8]) -> usize {
        let n = dest.len().min(self.available());
        if n == 0 {
            return 0;
        }

        let capacity = self.capacity();
        let head = self.head;
        let first = n.min(capacity - head);
        dest[..first].copy_from_slice(&self.storage[head..head + first]);
        dest[first..n].copy_from_slice(&self.storage[..n - first]);

        self.head = (head + n) % capacity;
        self.read_cursor = self.read_cursor.wrapping_add(n as u64);
        n
    }
}

impl RingBuffer {
    /// Creates a new ring holding at most `capacity` bytes.
    ///
    /// Fails with [`PipeError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or(PipeError::InvalidCapacity)
    }

    /// Infallible form of [`new`](Self::new).
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self::with_cursor(capacity, 0)
    }

    fn with_cursor(capacity: NonZeroUsize, cursor: u64) -> Self {
        let capacity = capacity.get();
        debug!(capacity, "pipe ring created");

        RingBuffer {
            capacity,
            state: Mutex::new(RingState {
                storage: vec![0u8; capacity].into_boxed_slice(),
                write_cursor: cursor,
                read_cursor: cursor,
                tail: 0,
                head: 0,
                end_of_input: false,
                cancelled: false,
            }),
            space_available: Condvar::new(),
            data_available: Condvar::new(),
        }
    }

    /// Returns the fixed capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of bytes that can be written without blocking.
    ///
    /// The value is a snapshot and may be stale as soon as it is returned.
    pub fn bytes_free(&self) -> usize {
        self.state.lock().free()
    }

    /// Returns the number of bytes waiting to be read.
    ///
    /// The value is a snapshot and may be stale as soon as it is returned.
    pub fn available(&self) -> usize {
        self.state.lock().available()
    }

    /// Returns true if no bytes are waiting to be read.
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Returns true if no byte can be written without blocking.
    pub fn is_full(&self) -> bool {
        self.bytes_free() == 0
    }

    /// Returns true once the producer has marked end-of-input.
    pub fn is_end_of_input(&self) -> bool {
        self.state.lock().end_of_input
    }

    /// Returns true once the ring has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// Total bytes written over the ring's lifetime, modulo 2^64.
    pub fn total_written(&self) -> u64 {
        self.state.lock().write_cursor
    }

    /// Total bytes read over the ring's lifetime, modulo 2^64.
    pub fn total_read(&self) -> u64 {
        self.state.lock().read_cursor
    }

    /// Writes as much of `data` as currently fits and returns the count.
    ///
    /// Blocks only while the ring has zero free bytes; a request larger than
    /// the free space is cut short rather than waited on. Callers needing the
    /// whole payload delivered loop over the remainder. An empty `data`
    /// returns `Ok(0)` without blocking.
    ///
    /// Fails with [`PipeError::Closed`] after end-of-input has been marked and
    /// with [`PipeError::Cancelled`] after [`cancel`](Self::cancel).
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        self.write_until(data, None)
    }

    /// Like [`write`](Self::write), but gives up with [`PipeError::TimedOut`]
    /// if no byte could be written within `timeout`. A timeout too large to
    /// represent waits indefinitely.
    pub fn write_timeout(&self, data: &[u8], timeout: Duration) -> Result<usize> {
        self.write_until(data, Instant::now().checked_add(timeout))
    }

    /// Reads up to `dest.len()` bytes into `dest` and returns the count.
    ///
    /// Blocks only while the ring is empty and end-of-input has not been
    /// marked. Returns `Ok(0)` once the ring is drained after end-of-input,
    /// and for an empty `dest`.
    ///
    /// Fails with [`PipeError::Cancelled`] after [`cancel`](Self::cancel).
    pub fn read_into(&self, dest: &mut [u8]) -> Result<usize> {
        self.read_until(dest, None)
    }

    /// Like [`read_into`](Self::read_into), but gives up with
    /// [`PipeError::TimedOut`] if no byte arrived within `timeout`.
    pub fn read_into_timeout(&self, dest: &mut [u8], timeout: Duration) -> Result<usize> {
        self.read_until(dest, Instant::now().checked_add(timeout))
    }

    /// Marks that the producer will write no more bytes.
    ///
    /// Wakes a blocked reader so it observes end-of-stream, and a blocked
    /// writer so it fails with [`PipeError::Closed`]. Idempotent.
    pub fn mark_end_of_input(&self) {
        let mut state = self.state.lock();
        if state.end_of_input {
            return;
        }
        state.end_of_input = true;
        debug!(pending = state.available(), "pipe end of input");

        self.data_available.notify_all();
        self.space_available.notify_all();
    }

    /// Cancels the ring.
    ///
    /// All blocked transfers wake and fail with [`PipeError::Cancelled`], as
    /// does every later non-empty transfer. Idempotent.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if state.cancelled {
            return;
        }
        state.cancelled = true;
        debug!(pending = state.available(), "pipe cancelled");

        self.data_available.notify_all();
        self.space_available.notify_all();
    }

    fn write_until(&self, data: &[u8], deadline: Option<Instant>) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        loop {
            if state.cancelled {
                return Err(PipeError::Cancelled);
            }
            if state.end_of_input {
                warn!(len = data.len(), "pipe write after end of input");
                return Err(PipeError::Closed);
            }

            let n = state.push(data);
            if n > 0 {
                self.data_available.notify_one();
                return Ok(n);
            }

            trace!(capacity = self.capacity, "pipe full, writer waiting");
            wait(&self.space_available, &mut state, deadline)?;
        }
    }

    fn read_until(&self, dest: &mut [u8], deadline: Option<Instant>) -> Result<usize> {
        if dest.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        loop {
            if state.cancelled {
                return Err(PipeError::Cancelled);
            }

            let n = state.pop(dest);
            if n > 0 {
                self.space_available.notify_one();
                return Ok(n);
            }
            if state.end_of_input {
                return Ok(0);
            }

            trace!(capacity = self.capacity, "pipe empty, reader waiting");
            wait(&self.data_available, &mut state, deadline)?;
        }
    }
}

/// Waits on `cond`, failing if `deadline` already passed.
///
/// The caller re-checks its predicate after every return, so a wake that
/// races the deadline still gets one more chance to make progress.
fn wait(
    cond: &Condvar,
    state: &mut MutexGuard<'_, RingState>,
    deadline: Option<Instant>,
) -> Result<()> {
    match deadline {
        None => {
            cond.wait(state);
            Ok(())
        }
        Some(deadline) if Instant::now() >= deadline => {
            debug!("pipe wait timed out");
            Err(PipeError::TimedOut)
        }
        Some(deadline) => {
            cond.wait_until(state, deadline);
            Ok(())
        }
    }
}
