use crate::command::{ChildHandle, ProcessSpawner, SpawnError};
use crate::lexer::ArgVector;
use log::debug;
use nix::unistd::{ForkResult, fork, write};
use std::ffi::CString;
use std::io::Write;
use std::os::fd::BorrowedFd;
use std::ptr;

/// Printed by the child when the requested program cannot be executed.
pub const EXEC_FAILED_MESSAGE: &str = "That didn't work.\n";

/// Exit status of a child whose `execvp` failed.
pub const EXEC_FAILED_STATUS: libc::c_int = 1;

/// Starts programs by forking the shell and replacing the child's image with `execvp`.
///
/// The program name is looked up in `PATH` by `execvp` itself. A child that fails
/// to exec prints [`EXEC_FAILED_MESSAGE`] and exits with [`EXEC_FAILED_STATUS`]
/// without ever returning into shell code.
#[derive(Debug, Default)]
pub struct ForkExecLauncher;

impl ProcessSpawner for ForkExecLauncher {
    fn spawn(&mut self, argv: &ArgVector) -> Result<ChildHandle, SpawnError> {
        // Everything the child needs is allocated before the fork.
        let args = argv.to_c_strings()?;
        let arg_ptrs = sentinel_terminated(&args);

        // Buffered output would otherwise be duplicated into the child.
        if let Err(e) = std::io::stdout().flush() {
            debug!("failed to flush stdout before fork: {}", e);
        }

        // SAFETY: the child only calls libc::execvp, write and _exit, none of which allocate.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!("spawned {:?} as pid {}", argv.program(), child);
                Ok(ChildHandle::new(child))
            }
            Ok(ForkResult::Child) => exec_or_exit(&arg_ptrs),
            Err(errno) => Err(SpawnError::Fork(errno)),
        }
    }
}

/// Pointers to `args` followed by the NULL sentinel `execvp` expects.
///
/// The pointers borrow from `args`, which must outlive every use of the result.
fn sentinel_terminated(args: &[CString]) -> Vec<*const libc::c_char> {
    args.iter()
        .map(|arg| arg.as_ptr())
        .chain(std::iter::once(ptr::null()))
        .collect()
}

fn exec_or_exit(arg_ptrs: &[*const libc::c_char]) -> ! {
    // SAFETY: arg_ptrs holds at least the program name and ends with NULL; the
    // strings it points to live in `spawn`'s frame, which the fork copied.
    unsafe { libc::execvp(arg_ptrs[0], arg_ptrs.as_ptr()) };
    // SAFETY: fd 1 is only borrowed for this single write.
    let stdout = unsafe { BorrowedFd::borrow_raw(libc::STDOUT_FILENO) };
    let _ = write(stdout, EXEC_FAILED_MESSAGE.as_bytes());
    // SAFETY: _exit skips atexit handlers and stdio flushing inherited from the parent.
    unsafe { libc::_exit(EXEC_FAILED_STATUS) }
}
