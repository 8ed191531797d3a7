// tests/real_process.rs
//
// Runs the real `TokioSpawner` with `sh` standing in for the interpreter.

#![cfg(unix)]

use std::io::Write;

use tempfile::NamedTempFile;

use fsx_stream::config::ScriptOptions;
use fsx_stream::errors::FsxError;
use fsx_stream::{AdapterState, StreamEvent, spawn_script};
use fsx_stream_test_utils::{init_tracing, with_timeout};

fn script(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{body}").unwrap();
    file
}

#[tokio::test]
async fn echoes_input_through_a_real_process() {
    init_tracing();
    let file = script(r#"while read line; do echo "got $line $1"; done"#);
    let opts = ScriptOptions::new(file.path())
        .with_executable("sh")
        .with_args(["!"]);

    let mut stream = spawn_script(opts).unwrap();
    stream.write_all("hello\n").await.unwrap();
    stream.write("world\n").unwrap();
    stream.end();

    let output = with_timeout(stream.read_to_end()).await.unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), "got hello !\ngot world !\n");
    assert_eq!(stream.state(), &AdapterState::Closed);
}

#[tokio::test]
async fn failing_script_reports_stderr() {
    init_tracing();
    let file = script("echo partial; echo 'boom' >&2; exit 3");

    let mut stream = spawn_script(ScriptOptions::new(file.path()).with_executable("sh")).unwrap();
    stream.end();

    let mut output = Vec::new();
    let mut failures = Vec::new();
    while let Some(event) = with_timeout(stream.next_event()).await {
        match event {
            StreamEvent::Data(bytes) => output.extend(bytes),
            StreamEvent::Error(err) => failures.push(err),
            _ => {}
        }
    }

    assert_eq!(output, b"partial\n");
    assert_eq!(failures.len(), 1);
    match &failures[0] {
        FsxError::ProcessExit {
            code, diagnostics, ..
        } => {
            assert_eq!(*code, 3);
            assert!(diagnostics.contains("boom"));
        }
        other => panic!("expected ProcessExit, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_interpreter_fails_to_spawn() {
    let result = spawn_script(
        ScriptOptions::new("a.fsx").with_executable("/definitely/not/an/interpreter"),
    );
    assert!(matches!(result, Err(FsxError::Spawn { .. })));
}
