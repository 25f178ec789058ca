use crate::command::{ChildHandle, ExitCode, ProcessWaiter, Termination};
use anyhow::{Context, Result, bail};
use log::debug;
use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::mem::MaybeUninit;

/// Snapshot of the accounting data the kernel keeps for a terminated child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    /// Whole seconds of user-mode CPU time.
    pub user_time_secs: i64,
    /// Microsecond remainder of user-mode CPU time.
    pub user_time_micros: i64,
    /// Times the scheduler forced the child off the CPU.
    pub involuntary_switches: i64,
}

impl ResourceUsage {
    /// Total user CPU time in microseconds.
    pub fn user_micros(&self) -> i64 {
        self.user_time_secs * 1_000_000 + self.user_time_micros
    }
}

impl From<&libc::rusage> for ResourceUsage {
    fn from(raw: &libc::rusage) -> Self {
        Self {
            user_time_secs: raw.ru_utime.tv_sec as i64,
            user_time_micros: raw.ru_utime.tv_usec as i64,
            involuntary_switches: raw.ru_nivcsw as i64,
        }
    }
}

/// Waits for children with `wait4`, which reports status and usage in one call.
#[derive(Debug, Default)]
pub struct UsageCollector;

impl ProcessWaiter for UsageCollector {
    fn wait(&mut self, child: ChildHandle) -> Result<Termination> {
        let pid = child.pid();
        let mut status: libc::c_int = 0;
        let mut raw_usage = MaybeUninit::<libc::rusage>::zeroed();

        let reaped = loop {
            // SAFETY: both out-pointers are valid for writes for the duration of the call.
            let ret = unsafe { libc::wait4(pid.as_raw(), &mut status, 0, raw_usage.as_mut_ptr()) };
            if ret >= 0 {
                break Pid::from_raw(ret);
            }
            match Errno::last() {
                Errno::EINTR => continue,
                errno => {
                    return Err(errno).with_context(|| format!("wait4 failed for child {}", pid));
                }
            }
        };
        if reaped != pid {
            bail!("waited for child {} but reaped {}", pid, reaped);
        }

        // SAFETY: wait4 succeeded, so the kernel filled in the structure; it was zeroed anyway.
        let usage = ResourceUsage::from(unsafe { raw_usage.assume_init_ref() });
        let status = decode_status(pid, status)?;
        debug!("child {} exited with status {}", pid, status);

        Ok(Termination { pid, status, usage })
    }
}

fn decode_status(pid: Pid, raw: libc::c_int) -> Result<ExitCode> {
    let status = WaitStatus::from_raw(pid, raw)
        .with_context(|| format!("unrecognized wait status {:#x} for child {}", raw, pid))?;
    Ok(match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => 128 + signal as i32,
        _ => -1,
    })
}
