use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, DuplexStream, ReadBuf};
use tokio::sync::oneshot;

use fsx_stream::exec::{BoxedReader, ChildExit, ChildHandles, Spawner};

/// One recorded call to [`Spawner::spawn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    pub executable: PathBuf,
    pub argv: Vec<String>,
}

/// A spawner that:
/// - records every executable/argument vector it was asked to start
/// - hands out in-memory pipes instead of starting a process.
///
/// The far ends of the pipes are kept as [`FakeChild`]s that the test takes
/// with [`FakeSpawner::take_child`] to play the interpreter's part.
#[derive(Clone)]
pub struct FakeSpawner {
    spawned: Arc<Mutex<Vec<SpawnRecord>>>,
    children: Arc<Mutex<VecDeque<FakeChild>>>,
    pipe_capacity: usize,
    fail_with: Option<io::ErrorKind>,
    stdout_fails_with: Option<io::ErrorKind>,
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self {
            spawned: Arc::new(Mutex::new(Vec::new())),
            children: Arc::new(Mutex::new(VecDeque::new())),
            pipe_capacity: 64 * 1024,
            fail_with: None,
            stdout_fails_with: None,
        }
    }

    /// Use pipes that hold at most `capacity` bytes before blocking.
    pub fn with_pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = capacity;
        self
    }

    /// Make every spawn fail with `kind`.
    pub fn failing(mut self, kind: io::ErrorKind) -> Self {
        self.fail_with = Some(kind);
        self
    }

    /// Hand the adapter a stdout whose every read fails with `kind`.
    pub fn with_failing_stdout(mut self, kind: io::ErrorKind) -> Self {
        self.stdout_fails_with = Some(kind);
        self
    }

    pub fn spawned(&self) -> Vec<SpawnRecord> {
        self.spawned.lock().unwrap().clone()
    }

    /// The oldest child not yet taken.
    pub fn take_child(&self) -> FakeChild {
        self.children
            .lock()
            .unwrap()
            .pop_front()
            .expect("no child has been spawned")
    }
}

impl Default for FakeSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner for FakeSpawner {
    fn spawn(&self, executable: &Path, argv: &[String]) -> io::Result<ChildHandles> {
        self.spawned.lock().unwrap().push(SpawnRecord {
            executable: executable.to_path_buf(),
            argv: argv.to_vec(),
        });

        if let Some(kind) = self.fail_with {
            return Err(io::Error::new(kind, "fake spawn failure"));
        }

        let (stdin_adapter, stdin_child) = tokio::io::duplex(self.pipe_capacity);
        let (stdout_adapter, stdout_child) = tokio::io::duplex(self.pipe_capacity);
        let (stderr_adapter, stderr_child) = tokio::io::duplex(self.pipe_capacity);
        let (exit_tx, exit_rx) = oneshot::channel();
        let killed = Arc::new(AtomicBool::new(false));

        let stdout: BoxedReader = match self.stdout_fails_with {
            Some(kind) => Box::new(FailingReader { kind }),
            None => Box::new(stdout_adapter),
        };

        self.children.lock().unwrap().push_back(FakeChild {
            stdin: Some(stdin_child),
            stdout: Some(stdout_child),
            stderr: Some(stderr_child),
            exit: Some(exit_tx),
            killed: Arc::clone(&killed),
        });

        Ok(ChildHandles {
            stdin: Box::new(stdin_adapter),
            stdout,
            stderr: Box::new(stderr_adapter),
            exit: Box::new(FakeExit {
                rx: Some(exit_rx),
                code: None,
                killed,
            }),
        })
    }
}

/// The interpreter's side of a fake child process.
pub struct FakeChild {
    stdin: Option<DuplexStream>,
    stdout: Option<DuplexStream>,
    stderr: Option<DuplexStream>,
    exit: Option<oneshot::Sender<i32>>,
    killed: Arc<AtomicBool>,
}

impl FakeChild {
    /// Read what the adapter wrote to stdin until it closes stdin.
    pub async fn read_stdin_to_end(&mut self) -> Vec<u8> {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        let mut buf = Vec::new();
        stdin.read_to_end(&mut buf).await.unwrap();
        buf
    }

    /// Read exactly `len` bytes the adapter wrote to stdin.
    pub async fn read_stdin_exact(&mut self, len: usize) -> Vec<u8> {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        let mut buf = vec![0u8; len];
        stdin.read_exact(&mut buf).await.unwrap();
        buf
    }

    /// Stop reading input; later writes by the adapter fail.
    pub fn close_stdin(&mut self) {
        self.stdin = None;
    }

    pub async fn write_stdout(&mut self, bytes: &[u8]) {
        let stdout = self.stdout.as_mut().expect("stdout already closed");
        stdout.write_all(bytes).await.unwrap();
    }

    pub async fn write_stderr(&mut self, bytes: &[u8]) {
        let stderr = self.stderr.as_mut().expect("stderr already closed");
        stderr.write_all(bytes).await.unwrap();
    }

    pub fn close_stdout(&mut self) {
        self.stdout = None;
    }

    pub fn close_stderr(&mut self) {
        self.stderr = None;
    }

    /// Close stdout and stderr, then report `code` as the exit status.
    pub fn exit(&mut self, code: i32) {
        self.close_stdout();
        self.close_stderr();
        if let Some(exit) = self.exit.take() {
            let _ = exit.send(code);
        }
    }

    pub fn was_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

struct FailingReader {
    kind: io::ErrorKind,
}

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(self.kind, "fake stdout failure")))
    }
}

struct FakeExit {
    rx: Option<oneshot::Receiver<i32>>,
    code: Option<i32>,
    killed: Arc<AtomicBool>,
}

impl ChildExit for FakeExit {
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<i32>> + Send + '_>> {
        Box::pin(async move {
            if let Some(code) = self.code {
                return Ok(code);
            }
            let code = match self.rx.as_mut() {
                Some(rx) => rx.await.unwrap_or(-1),
                None => -1,
            };
            self.rx = None;
            self.code = Some(code);
            Ok(code)
        })
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.killed.store(true, Ordering::SeqCst);
            self.rx = None;
            self.code.get_or_insert(-1);
            Ok(())
        })
    }
}

/// Interpreter path the default fake locator resolves to.
pub const FAKE_INTERPRETER: &str = "/usr/bin/fsharpi";

/// Spawn `opts` on Linux with `fsharpi` at [`FAKE_INTERPRETER`] and a fresh
/// [`FakeSpawner`]; returns the stream, the fake child and the spawner.
pub fn spawn_fake(
    opts: impl Into<fsx_stream::config::ScriptOptions>,
) -> (fsx_stream::ScriptStream, FakeChild, FakeSpawner) {
    spawn_fake_with(opts, FakeSpawner::new())
}

pub fn spawn_fake_with(
    opts: impl Into<fsx_stream::config::ScriptOptions>,
    spawner: FakeSpawner,
) -> (fsx_stream::ScriptStream, FakeChild, FakeSpawner) {
    let locator = crate::builders::LocatorBuilder::new(fsx_stream::locate::Platform::Linux)
        .on_path("fsharpi", FAKE_INTERPRETER)
        .build();
    let stream = fsx_stream::spawn_script_with(opts, &locator, &spawner)
        .expect("fake spawn should succeed");
    let child = spawner.take_child();
    (stream, child, spawner)
}
