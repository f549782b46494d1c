//! Platform handles on the parent process

use std::io;
use std::time::Duration;

/// A process that can be waited on until it exits
pub trait ParentProcess: Send + 'static {
    /// Block until the process exits
    fn wait_for_exit(self: Box<Self>) -> io::Result<()>;
}

/// Acquire a waitable handle on `pid`.
///
/// Fails when the process is already gone, the id is invalid, or access is
/// denied. `poll_interval` only matters on platforms without a waitable
/// process handle.
pub fn open_parent(pid: u32, poll_interval: Duration) -> io::Result<Box<dyn ParentProcess>> {
    #[cfg(unix)]
    {
        let process = unix::PolledProcess::open(pid, poll_interval)?;
        Ok(Box::new(process))
    }

    #[cfg(windows)]
    {
        let _ = poll_interval;
        let process = windows::ProcessHandle::open(pid)?;
        Ok(Box::new(process))
    }
}

#[cfg(unix)]
mod unix {
    use super::ParentProcess;
    use std::io;
    use std::time::Duration;

    /// Unix has no portable waitable handle for a non-child process, so poll
    /// with `kill(pid, 0)`. If `pid` was our parent, being re-parented also
    /// counts as exit, which catches a parent that lingers as a zombie.
    pub(super) struct PolledProcess {
        pid: libc::pid_t,
        was_parent: bool,
        poll_interval: Duration,
    }

    impl PolledProcess {
        pub(super) fn open(pid: u32, poll_interval: Duration) -> io::Result<Self> {
            let pid = libc::pid_t::try_from(pid)
                .ok()
                .filter(|pid| *pid > 0)
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, format!("invalid pid {pid}"))
                })?;

            if !is_alive(pid)? {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("process {pid} is not running"),
                ));
            }

            // SAFETY: getppid has no preconditions
            let was_parent = unsafe { libc::getppid() } == pid;

            Ok(Self {
                pid,
                was_parent,
                poll_interval,
            })
        }

        fn has_exited(&self) -> io::Result<bool> {
            // SAFETY: getppid has no preconditions
            if self.was_parent && unsafe { libc::getppid() } != self.pid {
                return Ok(true);
            }
            Ok(!is_alive(self.pid)?)
        }
    }

    impl ParentProcess for PolledProcess {
        fn wait_for_exit(self: Box<Self>) -> io::Result<()> {
            while !self.has_exited()? {
                std::thread::sleep(self.poll_interval);
            }
            Ok(())
        }
    }

    fn is_alive(pid: libc::pid_t) -> io::Result<bool> {
        // SAFETY: signal 0 only checks whether the process exists
        if unsafe { libc::kill(pid, 0) } == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ESRCH) => Ok(false),
            // Exists but belongs to someone else
            Some(libc::EPERM) => Ok(true),
            _ => Err(err),
        }
    }
}

#[cfg(windows)]
mod windows {
    use super::ParentProcess;
    use std::io;
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
    use windows_sys::Win32::System::Threading::{
        INFINITE, OpenProcess, PROCESS_SYNCHRONIZE, WaitForSingleObject,
    };

    /// Process handle opened with SYNCHRONIZE access
    pub(super) struct ProcessHandle {
        /// HANDLE stored as an integer so the type is Send
        handle: isize,
    }

    impl ProcessHandle {
        pub(super) fn open(pid: u32) -> io::Result<Self> {
            // SAFETY: OpenProcess returns null on failure and sets last error
            let handle = unsafe { OpenProcess(PROCESS_SYNCHRONIZE, 0, pid) };
            if handle.is_null() {
                return Err(io::Error::last_os_error());
            }
            Ok(Self {
                handle: handle as isize,
            })
        }
    }

    impl ParentProcess for ProcessHandle {
        fn wait_for_exit(self: Box<Self>) -> io::Result<()> {
            // SAFETY: handle is open until Drop
            let result = unsafe { WaitForSingleObject(self.handle as HANDLE, INFINITE) };
            if result == WAIT_OBJECT_0 {
                Ok(())
            } else {
                Err(io::Error::last_os_error())
            }
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            // SAFETY: handle came from OpenProcess and is closed once
            unsafe { CloseHandle(self.handle as HANDLE) };
        }
    }
}
