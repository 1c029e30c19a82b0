//! In-process byte pipe over a fixed-capacity ring.
//!
//! This crate moves bytes from one producer thread to one consumer thread
//! through a bounded circular buffer, with blocking backpressure in both
//! directions and an end-of-input signal. It behaves like an OS pipe without
//! leaving the process.
//!
//! - [`RingBuffer`]: The shared ring. Partial `write`/`read_into` transfers
//!   that block only when nothing at all can move
//! - [`PipeWriter`] / [`PipeReader`]: [`std::io::Write`] and [`std::io::Read`]
//!   handles over one ring
//! - [`PipeConfig`]: Capacity and per-call timeouts
//!
//! # Example
//!
//! ```
//! use std::io::{BufRead, BufReader, Write};
//! use std::thread;
//!
//! let (mut writer, reader) = fifoio::create_pair(64).unwrap();
//!
//! let producer = thread::spawn(move || {
//!     for i in 0..100 {
//!         writeln!(writer, "{}", i).unwrap();
//!     }
//!     // Dropping the writer marks end-of-input
//! });
//!
//! let lines: Vec<String> = BufReader::new(reader)
//!     .lines()
//!     .map(|line| line.unwrap())
//!     .collect();
//!
//! producer.join().unwrap();
//! assert_eq!(lines.len(), 100);
//! assert_eq!(lines[99], "99");
//! ```
//!
//! # Closing
//!
//! Only the producer ends the stream: [`PipeWriter::close`] (or dropping the
//! writer) marks end-of-input, and the reader drains what is left before
//! reading `0`. Closing the reader releases it and nothing else. Writing
//! directly to a [`RingBuffer`] after end-of-input fails with
//! [`PipeError::Closed`].
//!
//! # Cancellation
//!
//! A [`Canceller`] taken from either end aborts the pipe: blocked and later
//! transfers fail with [`PipeError::Cancelled`]. Timeouts set through
//! [`PipeConfig`] fail a single call with [`PipeError::TimedOut`].

mod bytes;
mod config;
mod error;
mod pipe;
mod ring;

pub use bytes::*;
pub use config::PipeConfig;
pub use error::{PipeError, Result};
pub use pipe::{create_pair, Canceller, PipeReader, PipeWriter};
pub use ring::RingBuffer;
