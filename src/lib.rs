//! A small interactive launcher that reports per-command resource usage.
//!
//! Each line read from the user is split on spaces into an argument vector, the
//! named program is started with `fork` + `execvp`, and once it exits the shell
//! prints the child's user CPU time and involuntary context switches as collected
//! by `wait4`. Commands run strictly one at a time; there are no pipes,
//! redirections, jobs or expansions.
//!
//! The main entry point is [`Interpreter`]. Process creation and reaping sit behind
//! the [`ProcessSpawner`] and [`ProcessWaiter`] traits in [`command`], so the loop
//! can be driven with fakes.

pub mod command;
pub mod config;
pub mod input;
mod interpreter;
mod launcher;
mod lexer;
pub mod logging;
mod usage;

pub use command::{ChildHandle, ExitCode, ProcessSpawner, ProcessWaiter, SpawnError, Termination};
pub use interpreter::{Interpreter, Outcome, render};
pub use launcher::ForkExecLauncher;
pub use lexer::{ArgVector, tokenize};
pub use usage::{ResourceUsage, UsageCollector};
