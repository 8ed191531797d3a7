// src/exec/stream.rs

//! Caller-facing bidirectional stream over one interpreter process.

use std::io;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::config::{ScriptOptions, StreamOptions, validate_options};
use crate::errors::{FsxError, Result};
use crate::exec::backend::{ChildHandles, Spawner, TokioSpawner};
use crate::exec::pumps::{
    Supervision, WriteGauge, WriteRequest, collect_stderr, pump_stdin, pump_stdout,
    supervise_exit,
};
use crate::exec::routing::{ChildSignal, StreamEvent, route};
use crate::exec::spec::SpawnSpec;
use crate::locate::Locator;
use crate::types::{AdapterState, ChildChannel, HalfClose};

/// Spawn the interpreter for a script and return the stream bridging its
/// stdin and stdout.
///
/// Accepts a bare script path or full [`ScriptOptions`]. The executable is
/// located on the current platform unless the options name one. Must be
/// called from within a Tokio runtime.
pub fn spawn_script(opts: impl Into<ScriptOptions>) -> Result<ScriptStream> {
    spawn_script_with(opts, &Locator::system(), &TokioSpawner)
}

/// Like [`spawn_script`], with an explicit locator and spawner.
pub fn spawn_script_with(
    opts: impl Into<ScriptOptions>,
    locator: &Locator,
    spawner: &dyn Spawner,
) -> Result<ScriptStream> {
    let opts = opts.into();
    validate_options(&opts)?;

    let ScriptOptions {
        path,
        executable,
        args,
        stream,
    } = opts;
    let script = path.ok_or_else(FsxError::missing_script_path)?;

    let executable = match executable.filter(|path| !path.as_os_str().is_empty()) {
        Some(executable) => executable,
        None => locator.locate_configured()?,
    };

    let spec = SpawnSpec::new(executable, script, args);
    info!(command = %spec.command_line(), "spawning script interpreter");

    let handles = spawner
        .spawn(spec.executable(), &spec.argv())
        .map_err(|source| FsxError::Spawn {
            executable: spec.executable().to_path_buf(),
            source,
        })?;

    Ok(ScriptStream::attach(spec, handles, &stream))
}

/// A running script seen as one bidirectional byte stream.
///
/// Writes go to the child's stdin, child stdout comes back as
/// [`StreamEvent::Data`], and failures (including a non-zero exit status,
/// reported with everything the child wrote to stderr) arrive as exactly one
/// [`StreamEvent::Error`] each.
///
/// Dropping the stream ends the write side and kills the child.
pub struct ScriptStream {
    spec: SpawnSpec,
    state: AdapterState,
    stdin_tx: Option<mpsc::UnboundedSender<WriteRequest>>,
    gauge: Arc<WriteGauge>,
    stdout_rx: mpsc::Receiver<ChildSignal>,
    signals_rx: mpsc::UnboundedReceiver<ChildSignal>,
    cancel_tx: Option<oneshot::Sender<()>>,
    read_ended: bool,
    write_ended: bool,
    stdin_failed: bool,
    exited_ok: bool,
    terminated: bool,
}

impl ScriptStream {
    fn attach(spec: SpawnSpec, handles: ChildHandles, opts: &StreamOptions) -> Self {
        let ChildHandles {
            stdin,
            stdout,
            stderr,
            exit,
        } = handles;

        let (stdin_tx, stdin_rx) = mpsc::unbounded_channel();
        let (stdout_tx, stdout_rx) = mpsc::channel(opts.read_ahead);
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let gauge = Arc::new(WriteGauge::new(opts.high_water_mark));

        tokio::spawn(pump_stdin(
            stdin,
            stdin_rx,
            Arc::clone(&gauge),
            signals_tx.clone(),
        ));
        let stdout_task = tokio::spawn(pump_stdout(stdout, stdout_tx, opts.read_chunk_size));
        let stderr_task = tokio::spawn(collect_stderr(stderr));
        tokio::spawn(supervise_exit(
            Supervision {
                exit,
                stdout_task,
                stderr_task,
                cancel_rx,
                command: spec.command_line(),
            },
            signals_tx,
        ));

        let mut stream = Self {
            spec,
            state: AdapterState::Spawning,
            stdin_tx: Some(stdin_tx),
            gauge,
            stdout_rx,
            signals_rx,
            cancel_tx: Some(cancel_tx),
            read_ended: false,
            write_ended: false,
            stdin_failed: false,
            exited_ok: false,
            terminated: false,
        };
        stream.refresh_state();
        stream
    }

    /// Executable, script and arguments this stream was spawned with.
    pub fn spec(&self) -> &SpawnSpec {
        &self.spec
    }

    pub fn state(&self) -> &AdapterState {
        &self.state
    }

    /// Queue `chunk` for the child's stdin.
    ///
    /// Returns `false` once the queued bytes reach the high-water mark; a
    /// [`StreamEvent::Drain`] follows when they have all been written.
    pub fn write(&self, chunk: impl Into<Vec<u8>>) -> Result<bool> {
        let tx = self.stdin_tx.as_ref().ok_or(FsxError::WriteAfterEnd)?;
        let chunk = chunk.into();
        let len = chunk.len();

        let below = self.gauge.queued(len);
        if tx.send(WriteRequest { chunk, ack: None }).is_err() {
            self.gauge.written(len);
            return Err(stdin_closed());
        }
        Ok(below)
    }

    /// Queue `chunk` and wait until the child's stdin has accepted it.
    pub async fn write_all(&self, chunk: impl Into<Vec<u8>>) -> Result<()> {
        let tx = self.stdin_tx.as_ref().ok_or(FsxError::WriteAfterEnd)?;
        let chunk = chunk.into();
        let len = chunk.len();
        let (ack_tx, ack_rx) = oneshot::channel();

        self.gauge.queued_acked(len);
        if tx
            .send(WriteRequest {
                chunk,
                ack: Some(ack_tx),
            })
            .is_err()
        {
            self.gauge.written(len);
            return Err(stdin_closed());
        }

        match ack_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(FsxError::Channel {
                channel: ChildChannel::Stdin,
                source,
            }),
            Err(_) => Err(stdin_closed()),
        }
    }

    /// Signal that no more data will be written.
    ///
    /// Queued chunks are still delivered; child stdin is then closed and a
    /// single [`StreamEvent::Finish`] follows. Calling this again is a no-op.
    pub fn end(&mut self) {
        if self.stdin_tx.take().is_some() {
            debug!(command = %self.spec.command_line(), "write side ended");
        }
    }

    /// Kill the child and surface [`FsxError::Cancelled`].
    ///
    /// No-op once the process has exited or after a previous call.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel_tx.take() {
            if cancel.send(()).is_err() {
                debug!(command = %self.spec.command_line(), "process already finished while cancelling");
            }
        }
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the process outcome has been delivered and
    /// nothing else is queued, or when every child channel is exhausted.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let signal = if self.terminated {
            match self.stdout_rx.try_recv() {
                Ok(signal) => signal,
                // The write side was ended but its close has not been
                // reported yet; the stdin pump reports it before exiting.
                Err(_) if self.finish_pending() => self.signals_rx.recv().await?,
                // Otherwise only drain what is already queued; the stdin
                // pump may be parked waiting for writes that will never come.
                Err(_) => self.signals_rx.try_recv().ok()?,
            }
        } else {
            tokio::select! {
                biased;
                Some(signal) = self.stdout_rx.recv() => signal,
                Some(signal) = self.signals_rx.recv() => signal,
                else => return None,
            }
        };

        let event = route(signal);
        self.observe(&event);
        Some(event)
    }

    /// Collect stdout until the process outcome is known.
    ///
    /// Returns the first error delivered, if any. Call [`end`](Self::end)
    /// first when the script reads its input to the end.
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut first_error = None;

        while let Some(event) = self.next_event().await {
            match event {
                StreamEvent::Data(bytes) => output.extend_from_slice(&bytes),
                StreamEvent::Error(err) => {
                    first_error.get_or_insert(err);
                }
                _ => {}
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(output),
        }
    }

    fn finish_pending(&self) -> bool {
        self.stdin_tx.is_none() && !self.write_ended && !self.stdin_failed
    }

    fn observe(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::End => self.read_ended = true,
            StreamEvent::Finish => {
                self.write_ended = true;
                self.stdin_tx = None;
            }
            StreamEvent::Close { .. } => self.exited_ok = true,
            StreamEvent::Error(err) => {
                if matches!(
                    err,
                    FsxError::Channel {
                        channel: ChildChannel::Stdin,
                        ..
                    }
                ) {
                    self.stdin_failed = true;
                }
                debug!(error = %err, "stream failed");
                self.state = AdapterState::Failed(err.to_string());
            }
            StreamEvent::Data(_) | StreamEvent::Drain => {}
        }
        if event.is_terminal() {
            self.terminated = true;
            self.cancel_tx = None;
        }
        self.refresh_state();
    }

    fn refresh_state(&mut self) {
        if matches!(self.state, AdapterState::Failed(_)) {
            return;
        }
        let next = if self.read_ended && self.exited_ok {
            AdapterState::Closed
        } else if self.read_ended {
            AdapterState::HalfClosed(HalfClose::ReadEnd)
        } else if self.write_ended {
            AdapterState::HalfClosed(HalfClose::WriteEnd)
        } else {
            AdapterState::Active
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "stream state changed");
            self.state = next;
        }
    }
}

fn stdin_closed() -> FsxError {
    FsxError::Channel {
        channel: ChildChannel::Stdin,
        source: io::Error::new(io::ErrorKind::BrokenPipe, "child stdin is closed"),
    }
}
