//! Size constants and pre-sized pipe constructors.

use std::num::NonZeroUsize;

use crate::pipe::{split, PipeReader, PipeWriter};
use crate::ring::RingBuffer;

/// One kibibyte.
pub const ONE_KILOBYTE: usize = 1024;

/// One mebibyte.
pub const ONE_MEGABYTE: usize = 1024 * ONE_KILOBYTE;

/// Capacity used by [`pipe`] and [`PipeConfig::new`](crate::PipeConfig::new).
pub const DEFAULT_CAPACITY: usize = ONE_MEGABYTE;

const fn size(bytes: usize) -> NonZeroUsize {
    match NonZeroUsize::new(bytes) {
        Some(size) => size,
        None => panic!("pipe size must be greater than 0"),
    }
}

fn sized(capacity: NonZeroUsize) -> (PipeWriter, PipeReader) {
    split(RingBuffer::with_capacity(capacity), None, None)
}

/// Creates a 4KB pipe.
pub fn pipe_4kb() -> (PipeWriter, PipeReader) {
    const SIZE: NonZeroUsize = size(4 * ONE_KILOBYTE);
    sized(SIZE)
}

/// Creates a 64KB pipe.
pub fn pipe_64kb() -> (PipeWriter, PipeReader) {
    const SIZE: NonZeroUsize = size(64 * ONE_KILOBYTE);
    sized(SIZE)
}

/// Creates a 1MB pipe.
pub fn pipe_1mb() -> (PipeWriter, PipeReader) {
    const SIZE: NonZeroUsize = size(ONE_MEGABYTE);
    sized(SIZE)
}

/// Creates a pipe with the default 1MB capacity.
pub fn pipe() -> (PipeWriter, PipeReader) {
    const SIZE: NonZeroUsize = size(DEFAULT_CAPACITY);
    sized(SIZE)
}
