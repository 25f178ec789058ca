use crate::lexer::ArgVector;
use crate::usage::ResourceUsage;
use anyhow::Result;
use nix::errno::Errno;
use nix::unistd::Pid;
use std::fmt;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Children killed by a signal are reported as `128 + signal`, the way POSIX shells do.
pub type ExitCode = i32;

/// Handle to a spawned child process that has not been waited for yet.
///
/// The handle is consumed by [`ProcessWaiter::wait`], so a child can be reaped only once.
#[derive(Debug, PartialEq, Eq)]
pub struct ChildHandle {
    pid: Pid,
}

impl ChildHandle {
    /// Wrap the process id of a freshly spawned child.
    pub fn new(pid: Pid) -> Self {
        Self { pid }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }
}

/// Everything the shell learns about a child once it is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    /// Process id of the reaped child. Only meaningful for display.
    pub pid: Pid,
    /// Exit code, or `128 + signal` for children killed by a signal.
    pub status: ExitCode,
    /// Resource usage accounted to the child by the kernel.
    pub usage: ResourceUsage,
}

impl Termination {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Errors that can occur while starting a child process.
#[derive(Debug)]
pub enum SpawnError {
    /// The argument vector holds no command name.
    NoCommand,
    /// An argument contains an interior NUL byte and cannot be passed to `execvp`.
    InvalidArgument(String),
    /// The operating system refused to duplicate the process.
    Fork(Errno),
}

impl SpawnError {
    /// Whether this failure should end the session under the default policy.
    ///
    /// Only a failed fork says something about the state of the system; the other
    /// variants are problems with a single command line.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SpawnError::Fork(_))
    }
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::NoCommand => write!(f, "no command to run"),
            SpawnError::InvalidArgument(arg) => {
                write!(f, "argument contains a NUL byte: {:?}", arg)
            }
            SpawnError::Fork(errno) => write!(f, "fork failed: {}", errno),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Capability to start a new process running the program named by `argv`.
///
/// Implemented by [`crate::ForkExecLauncher`] for real processes; tests substitute
/// their own implementation to drive the shell loop without touching the OS.
pub trait ProcessSpawner {
    /// Start `argv.program()` with the whole vector as its arguments.
    fn spawn(&mut self, argv: &ArgVector) -> std::result::Result<ChildHandle, SpawnError>;
}

/// Capability to block until a child exits and collect its accounting data.
pub trait ProcessWaiter {
    /// Wait for `child` to terminate by any means.
    fn wait(&mut self, child: ChildHandle) -> Result<Termination>;
}
