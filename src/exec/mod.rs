// src/exec/mod.rs

//! Process stream adapter.
//!
//! This module spawns the interpreter and bridges its channels to a single
//! caller-facing [`ScriptStream`].
//!
//! - [`backend`] provides the `Spawner` trait and the production
//!   `TokioSpawner`; tests replace it with in-memory pipes.
//! - [`spec`] holds the resolved executable and argument vector.
//! - [`pumps`] owns the per-channel background tasks.
//! - [`routing`] maps child-channel signals to [`StreamEvent`]s.
//! - [`stream`] is the caller-facing stream and its factory functions.

pub mod backend;
mod pumps;
pub mod routing;
pub mod spec;
pub mod stream;

pub use backend::{BoxedReader, BoxedWriter, ChildExit, ChildHandles, Spawner, TokioSpawner};
pub use routing::StreamEvent;
pub use spec::SpawnSpec;
pub use stream::{ScriptStream, spawn_script, spawn_script_with};
