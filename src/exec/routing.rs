// src/exec/routing.rs

//! Forwarding table from child-channel signals to caller-facing events.
//!
//! The pump tasks only ever produce [`ChildSignal`]s; [`route`] is the single
//! place deciding what the caller sees for each of them.

use std::io;

use crate::errors::FsxError;
use crate::types::ChildChannel;

/// Something that happened on one of the child's channels.
#[derive(Debug)]
pub(crate) enum ChildSignal {
    StdoutChunk(Vec<u8>),
    StdoutEof,
    StdoutError(io::Error),
    StdinDrained,
    StdinClosed,
    StdinError(io::Error),
    Exited {
        code: i32,
        command: String,
        diagnostics: Vec<u8>,
    },
    Cancelled,
}

/// Event delivered to the caller by [`crate::exec::ScriptStream::next_event`].
#[derive(Debug)]
pub enum StreamEvent {
    /// Bytes the child wrote to stdout, in emission order.
    Data(Vec<u8>),
    /// Child stdout ended. Delivered at most once.
    End,
    /// Queued stdin bytes fully flushed after `write` reported backpressure.
    Drain,
    /// Child stdin was closed after the write side ended. Delivered at most once.
    Finish,
    /// Child exited with status 0 and its output channels closed.
    Close { code: i32 },
    /// Channel failure, non-zero exit or cancellation.
    Error(FsxError),
}

impl StreamEvent {
    /// Whether no further process events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::Close { .. }
                | StreamEvent::Error(FsxError::ProcessExit { .. })
                | StreamEvent::Error(FsxError::Cancelled)
        )
    }
}

pub(crate) fn route(signal: ChildSignal) -> StreamEvent {
    match signal {
        ChildSignal::StdoutChunk(bytes) => StreamEvent::Data(bytes),
        ChildSignal::StdoutEof => StreamEvent::End,
        ChildSignal::StdoutError(source) => StreamEvent::Error(FsxError::Channel {
            channel: ChildChannel::Stdout,
            source,
        }),
        ChildSignal::StdinDrained => StreamEvent::Drain,
        ChildSignal::StdinClosed => StreamEvent::Finish,
        ChildSignal::StdinError(source) => StreamEvent::Error(FsxError::Channel {
            channel: ChildChannel::Stdin,
            source,
        }),
        ChildSignal::Exited { code: 0, .. } => StreamEvent::Close { code: 0 },
        ChildSignal::Exited {
            code,
            command,
            diagnostics,
        } => StreamEvent::Error(FsxError::ProcessExit {
            code,
            command,
            diagnostics: String::from_utf8_lossy(&diagnostics).into_owned(),
        }),
        ChildSignal::Cancelled => StreamEvent::Error(FsxError::Cancelled),
    }
}
