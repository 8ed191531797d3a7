// tests/exit_status.rs

use std::time::Duration;

use fsx_stream::errors::FsxError;
use fsx_stream::types::AdapterState;
use fsx_stream::{ScriptStream, StreamEvent};
use fsx_stream_test_utils::fake_spawner::{FAKE_INTERPRETER, spawn_fake};
use fsx_stream_test_utils::{init_tracing, with_timeout};

async fn drain(stream: &mut ScriptStream) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next_event().await {
        events.push(event);
    }
    events
}

fn errors(events: &[StreamEvent]) -> Vec<&FsxError> {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Error(err) => Some(err),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn non_zero_exit_reports_code_command_and_stderr_once() {
    init_tracing();
    let (mut stream, mut child, _spawner) = spawn_fake("script");

    child.write_stderr(b"boom").await;
    child.exit(1);

    let events = with_timeout(drain(&mut stream)).await;
    let errors = errors(&events);
    assert_eq!(errors.len(), 1);

    match errors[0] {
        FsxError::ProcessExit {
            code,
            command,
            diagnostics,
        } => {
            assert_eq!(*code, 1);
            assert_eq!(command, &format!("{FAKE_INTERPRETER} script"));
            assert_eq!(diagnostics, "boom");
        }
        other => panic!("expected ProcessExit, got {other:?}"),
    }

    let message = errors[0].to_string();
    assert!(message.contains("non-zero exit code 1"));
    assert!(message.contains(&format!("running: {FAKE_INTERPRETER} script")));
    assert!(message.contains("boom"));
    assert!(matches!(stream.state(), AdapterState::Failed(_)));
    assert!(stream.state().is_terminal());
}

#[tokio::test]
async fn zero_exit_with_diagnostics_is_not_an_error() {
    let (mut stream, mut child, _spawner) = spawn_fake("script");

    child.write_stdout(b"ok").await;
    child.write_stderr(b"warning FS0064: less generic").await;
    child.exit(0);

    let events = with_timeout(drain(&mut stream)).await;
    assert!(errors(&events).is_empty());
    assert!(matches!(events.last(), Some(StreamEvent::Close { code: 0 })));
    assert_eq!(stream.state(), &AdapterState::Closed);
    assert!(stream.state().is_terminal());
}

#[tokio::test]
async fn end_of_stdout_is_delivered_before_the_exit_outcome() {
    let (mut stream, mut child, _spawner) = spawn_fake("script");

    child.write_stdout(b"partial").await;
    child.write_stderr(b"unhandled exception").await;
    child.exit(2);

    let events = with_timeout(drain(&mut stream)).await;
    let end = events
        .iter()
        .position(|e| matches!(e, StreamEvent::End))
        .expect("stdout end");
    let failure = events
        .iter()
        .position(|e| matches!(e, StreamEvent::Error(FsxError::ProcessExit { .. })))
        .expect("exit failure");
    assert!(end < failure);
}

#[tokio::test]
async fn read_to_end_returns_output_or_the_exit_failure() {
    let (mut stream, mut child, _spawner) = spawn_fake("script");
    child.write_stdout(b"world").await;
    child.exit(0);
    assert_eq!(with_timeout(stream.read_to_end()).await.unwrap(), b"world");

    let (mut stream, mut child, _spawner) = spawn_fake("script");
    child.write_stderr(b"error FS0039").await;
    child.exit(1);
    match with_timeout(stream.read_to_end()).await {
        Err(FsxError::ProcessExit { diagnostics, .. }) => assert_eq!(diagnostics, "error FS0039"),
        other => panic!("expected ProcessExit, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_kills_child_and_reports_cancelled() {
    init_tracing();
    let (mut stream, child, _spawner) = spawn_fake("script");

    stream.cancel();
    stream.cancel();

    let events = with_timeout(drain(&mut stream)).await;
    let errors = errors(&events);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], FsxError::Cancelled));
    assert!(child.was_killed());
    assert!(matches!(stream.state(), AdapterState::Failed(_)));
}

#[tokio::test]
async fn cancel_after_exit_is_a_no_op() {
    let (mut stream, mut child, _spawner) = spawn_fake("script");
    child.exit(0);

    let events = with_timeout(drain(&mut stream)).await;
    stream.cancel();

    assert!(errors(&events).is_empty());
    assert!(!child.was_killed());
    assert!(stream.next_event().await.is_none());
}

#[tokio::test]
async fn dropping_the_stream_kills_the_child() {
    let (stream, child, _spawner) = spawn_fake("script");

    drop(stream);

    with_timeout(async {
        while !child.was_killed() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}
