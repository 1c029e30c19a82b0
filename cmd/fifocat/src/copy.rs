//! Producer/consumer copy through a pipe.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, ensure, Context, Result};
use fifoio::PipeConfig;
use tracing::{debug, warn};

/// Outcome of a finished copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Copies `input` to `output` through a pipe built from `config`.
///
/// `input` is drained on a producer thread in reads of at most `chunk`
/// bytes; the calling thread drains the pipe into `output`. If the output
/// side fails the pipe is cancelled so the producer never stays blocked.
pub fn copy_through_pipe<R, W>(
    mut input: R,
    mut output: W,
    config: &PipeConfig,
    chunk: usize,
) -> Result<CopyStats>
where
    R: Read + Send + 'static,
    W: Write,
{
    ensure!(chunk > 0, "chunk size must be greater than 0");

    let (mut writer, mut reader) = config.build().context("create pipe")?;
    let canceller = reader.canceller();
    debug!(capacity = config.capacity, chunk, "starting copy");
    let start = Instant::now();

    let producer = thread::spawn(move || -> Result<u64> {
        let mut buf = vec![0u8; chunk];
        let mut sent = 0u64;
        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("read input"),
            };
            writer.write_all(&buf[..n]).context("write to pipe")?;
            sent += n as u64;
        }
        writer.close();
        Ok(sent)
    });

    let consumed = io::copy(&mut reader, &mut output)
        .and_then(|n| output.flush().map(|_| n))
        .context("write output");
    if consumed.is_err() {
        warn!("output failed, cancelling pipe");
        canceller.cancel();
    }

    let sent = producer
        .join()
        .map_err(|_| anyhow!("producer thread panicked"))?;
    let received = consumed?;
    let sent = sent?;
    ensure!(
        sent == received,
        "pipe lost bytes: sent {}, received {}",
        sent,
        received
    );

    Ok(CopyStats {
        bytes: received,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Seek};

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_copy_small_pipe() {
        let data = payload(100_000);
        let config = PipeConfig::new().with_capacity(17);

        let mut out = Vec::new();
        let stats = copy_through_pipe(Cursor::new(data.clone()), &mut out, &config, 5).unwrap();
        assert_eq!(stats.bytes, data.len() as u64);
        assert_eq!(out, data);
    }

    #[test]
    fn test_copy_empty_input() {
        let mut out = Vec::new();
        let stats =
            copy_through_pipe(io::empty(), &mut out, &PipeConfig::new(), 4096).unwrap();
        assert_eq!(stats.bytes, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_copy_from_file() {
        let data = payload(300_000);
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(&data).unwrap();
        file.rewind().unwrap();

        let mut out = Vec::new();
        let config = PipeConfig::new().with_capacity(4096);
        copy_through_pipe(file, &mut out, &config, 1000).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_zero_chunk() {
        let result = copy_through_pipe(io::empty(), io::sink(), &PipeConfig::new(), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_capacity() {
        let config = PipeConfig::new().with_capacity(0);
        let result = copy_through_pipe(io::empty(), io::sink(), &config, 16);
        assert!(result.is_err());
    }

    struct FailingOutput;

    impl Write for FailingOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "output gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_failure_unblocks_producer() {
        // Far larger than the pipe, so the producer must block without a cancel
        let data = payload(1_000_000);
        let config = PipeConfig::new().with_capacity(64);

        let err = copy_through_pipe(Cursor::new(data), FailingOutput, &config, 512).unwrap_err();
        assert!(format!("{:#}", err).contains("output gone"));
    }
}
