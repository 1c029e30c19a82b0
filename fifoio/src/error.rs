//! Error types for pipe operations.

use std::io;

use thiserror::Error;

/// Pipe operation error.
///
/// A full or empty buffer is never an error: those states block. Errors
/// only describe misuse of the pipe or an aborted wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipeError {
    /// The requested capacity cannot hold a single byte.
    #[error("pipe: capacity must be greater than 0")]
    InvalidCapacity,

    /// The producer already marked end-of-input.
    #[error("pipe: write after end of input")]
    Closed,

    /// The pipe was cancelled while or before waiting.
    #[error("pipe: cancelled")]
    Cancelled,

    /// A bounded wait elapsed before the pipe could make progress.
    #[error("pipe: timed out")]
    TimedOut,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipeError>;

impl From<PipeError> for io::Error {
    fn from(err: PipeError) -> Self {
        // Interrupted is avoided on purpose: write_all and read_to_end
        // retry it forever.
        let kind = match err {
            PipeError::InvalidCapacity => io::ErrorKind::InvalidInput,
            PipeError::Closed => io::ErrorKind::BrokenPipe,
            PipeError::TimedOut => io::ErrorKind::TimedOut,
            PipeError::Cancelled => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_error_display() {
        assert_eq!(
            PipeError::InvalidCapacity.to_string(),
            "pipe: capacity must be greater than 0"
        );
        assert_eq!(PipeError::Closed.to_string(), "pipe: write after end of input");
        assert_eq!(PipeError::Cancelled.to_string(), "pipe: cancelled");
        assert_eq!(PipeError::TimedOut.to_string(), "pipe: timed out");
    }

    #[test]
    fn test_io_error_kinds() {
        let cases = [
            (PipeError::InvalidCapacity, io::ErrorKind::InvalidInput),
            (PipeError::Closed, io::ErrorKind::BrokenPipe),
            (PipeError::TimedOut, io::ErrorKind::TimedOut),
            (PipeError::Cancelled, io::ErrorKind::Other),
        ];
        for (err, kind) in cases {
            let io_err: io::Error = err.into();
            assert_eq!(io_err.kind(), kind);
        }
    }

    #[test]
    fn test_io_error_keeps_source() {
        let io_err: io::Error = PipeError::Closed.into();
        let inner = io_err
            .get_ref()
            .and_then(|e| e.downcast_ref::<PipeError>())
            .copied();
        assert_eq!(inner, Some(PipeError::Closed));
    }
}
