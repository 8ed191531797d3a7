// src/exec/pumps.rs

//! Background tasks that each own one child channel.
//!
//! - [`pump_stdin`] writes queued chunks in order and half-closes stdin once
//!   the caller's write side ends.
//! - [`pump_stdout`] reads stdout into a bounded channel; a full channel
//!   suspends reading, which is how backpressure reaches the child.
//! - [`collect_stderr`] owns the diagnostic buffer for the invocation.
//! - [`supervise_exit`] waits for exit (or cancellation) and reports it once
//!   stdout and stderr have closed.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::exec::backend::{BoxedReader, BoxedWriter, ChildExit};
use crate::exec::routing::ChildSignal;

/// One caller write on its way to child stdin.
pub(crate) struct WriteRequest {
    pub chunk: Vec<u8>,
    /// Completed once the child's stdin accepted the chunk.
    pub ack: Option<oneshot::Sender<io::Result<()>>>,
}

/// Tracks queued-but-unwritten stdin bytes against the high-water mark.
#[derive(Debug)]
pub(crate) struct WriteGauge {
    pending: AtomicUsize,
    need_drain: AtomicBool,
    high_water_mark: usize,
}

impl WriteGauge {
    pub fn new(high_water_mark: usize) -> Self {
        Self {
            pending: AtomicUsize::new(0),
            need_drain: AtomicBool::new(false),
            high_water_mark,
        }
    }

    /// Account for a newly queued chunk. Returns `false` when the caller
    /// should wait for a drain before writing more.
    pub fn queued(&self, len: usize) -> bool {
        let pending = self.pending.fetch_add(len, Ordering::SeqCst) + len;
        let below = pending < self.high_water_mark;
        if !below {
            self.need_drain.store(true, Ordering::SeqCst);
        }
        below
    }

    /// Account for a chunk whose writer waits on its own acknowledgement.
    /// Counts toward the mark but never owes a drain.
    pub fn queued_acked(&self, len: usize) {
        self.pending.fetch_add(len, Ordering::SeqCst);
    }

    /// Account for a written (or discarded) chunk. Returns `true` when a
    /// drain is owed to the caller.
    pub fn written(&self, len: usize) -> bool {
        let pending = self.pending.fetch_sub(len, Ordering::SeqCst) - len;
        pending == 0 && self.need_drain.swap(false, Ordering::SeqCst)
    }
}

pub(crate) async fn pump_stdin(
    mut stdin: BoxedWriter,
    mut rx: mpsc::UnboundedReceiver<WriteRequest>,
    gauge: Arc<WriteGauge>,
    signals: mpsc::UnboundedSender<ChildSignal>,
) {
    while let Some(WriteRequest { chunk, ack }) = rx.recv().await {
        let result = write_chunk(&mut stdin, &chunk).await;
        match result {
            Ok(()) => {
                if let Some(ack) = ack {
                    let _ = ack.send(Ok(()));
                }
                if gauge.written(chunk.len()) {
                    debug!("child stdin drained");
                    let _ = signals.send(ChildSignal::StdinDrained);
                }
            }
            Err(err) => {
                debug!(error = %err, "write to child stdin failed");
                if let Some(ack) = ack {
                    let _ = ack.send(Err(io::Error::new(err.kind(), err.to_string())));
                }
                let _ = signals.send(ChildSignal::StdinError(err));
                return;
            }
        }
    }

    // Every sender is gone: the caller ended its write side.
    match stdin.shutdown().await {
        Ok(()) => {
            debug!("child stdin closed");
            let _ = signals.send(ChildSignal::StdinClosed);
        }
        Err(err) => {
            debug!(error = %err, "closing child stdin failed");
            let _ = signals.send(ChildSignal::StdinError(err));
        }
    }
}

async fn write_chunk(stdin: &mut BoxedWriter, chunk: &[u8]) -> io::Result<()> {
    stdin.write_all(chunk).await?;
    stdin.flush().await
}

pub(crate) async fn pump_stdout(
    mut stdout: BoxedReader,
    tx: mpsc::Sender<ChildSignal>,
    chunk_size: usize,
) {
    let mut buf = vec![0u8; chunk_size];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => {
                debug!("child stdout ended");
                let _ = tx.send(ChildSignal::StdoutEof).await;
                return;
            }
            Ok(n) => {
                if tx.send(ChildSignal::StdoutChunk(buf[..n].to_vec())).await.is_err() {
                    debug!("stream dropped; no longer reading child stdout");
                    return;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                debug!(error = %err, "read from child stdout failed");
                let _ = tx.send(ChildSignal::StdoutError(err)).await;
                return;
            }
        }
    }
}

/// Read stderr to its end and hand back everything it produced.
pub(crate) async fn collect_stderr(mut stderr: BoxedReader) -> Vec<u8> {
    let mut diagnostics = Vec::new();
    if let Err(err) = stderr.read_to_end(&mut diagnostics).await {
        debug!(error = %err, "read from child stderr failed");
    }
    diagnostics
}

/// Everything the exit supervisor owns.
pub(crate) struct Supervision {
    pub exit: Box<dyn ChildExit>,
    pub stdout_task: JoinHandle<()>,
    pub stderr_task: JoinHandle<Vec<u8>>,
    pub cancel_rx: oneshot::Receiver<()>,
    pub command: String,
}

pub(crate) async fn supervise_exit(
    supervision: Supervision,
    signals: mpsc::UnboundedSender<ChildSignal>,
) {
    let Supervision {
        mut exit,
        stdout_task,
        stderr_task,
        mut cancel_rx,
        command,
    } = supervision;

    // Either the process exits on its own, or the caller cancels (or drops)
    // the stream.
    let code = tokio::select! {
        status = exit.wait() => match status {
            Ok(code) => code,
            Err(err) => {
                warn!(command = %command, error = %err, "failed to wait for script process");
                -1
            }
        },

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => info!(command = %command, "cancellation requested; killing script process"),
                Err(_) => debug!(command = %command, "stream dropped; killing script process"),
            }
            if let Err(err) = exit.kill().await {
                warn!(command = %command, error = %err, "failed to kill script process");
            }
            if cancel.is_ok() {
                let _ = signals.send(ChildSignal::Cancelled);
            }
            return;
        }
    };

    // Report only after the output channels closed, so the caller sees the
    // end of stdout before the exit outcome.
    if let Err(err) = stdout_task.await {
        debug!(error = %err, "stdout pump did not finish cleanly");
    }
    let diagnostics = match stderr_task.await {
        Ok(diagnostics) => diagnostics,
        Err(err) => {
            debug!(error = %err, "stderr collector did not finish cleanly");
            Vec::new()
        }
    };

    if code == 0 {
        info!(command = %command, exit_code = code, "script process exited");
    } else {
        warn!(command = %command, exit_code = code, "script process exited with failure");
    }

    let _ = signals.send(ChildSignal::Exited {
        code,
        command,
        diagnostics,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_owes_drain_only_after_crossing_the_mark() {
        let gauge = WriteGauge::new(4);

        assert!(gauge.queued(2));
        assert!(!gauge.written(2));

        assert!(gauge.queued(3));
        assert!(!gauge.queued(3));
        assert!(!gauge.written(3));
        assert!(gauge.written(3));
        assert!(!gauge.written(0));
    }

    #[test]
    fn acknowledged_writes_never_owe_a_drain() {
        let gauge = WriteGauge::new(4);

        gauge.queued_acked(5);
        assert!(!gauge.written(5));

        gauge.queued_acked(5);
        assert!(!gauge.queued(1));
        assert!(!gauge.written(5));
        assert!(gauge.written(1));
    }
}
