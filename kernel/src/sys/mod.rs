/// Kernel collaborators consumed by the shell.
///
/// The shell never touches hardware or the process table directly. Each
/// subsystem it drives is reached through one of these traits, so the
/// serial console, the CMOS clock and the real scheduler can be swapped for
/// the in-memory doubles in [`mock`] when running on the host.
use core::fmt;
use core::time::Duration;

#[cfg(any(test, feature = "mock-devices"))]
pub mod mock;

/// Process identifier handed out by the process table.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exit record for a terminated child, as filled in by the process table.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub exit_code: i32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<ProcessInfo>(), 8);

/// Which child a wait is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    /// Whichever child the process table reports first.
    Any,
    /// One specific child.
    Pid(Pid),
}

/// Result of a bounded wait that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    Exited(ProcessInfo),
    /// The deadline passed; the child is still alive and unreaped.
    TimedOut,
}

/// Process table failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("no such executable")]
    NotFound,
    #[error("process table full")]
    TableFull,
    #[error("no such process {0}")]
    NoSuchProcess(Pid),
    #[error("process {0} is still running")]
    StillRunning(Pid),
    #[error("process {0} has already exited")]
    AlreadyExited(Pid),
    #[error("no child processes")]
    NoChildren,
}

/// Opaque reference to a directory entry owned by the filesystem driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirHandle(pub u64);

/// Filesystem driver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    #[error("couldn't mount filesystem!")]
    MountFailed,
    #[error("couldn't access root dir!")]
    NoRoot,
    #[error("stale directory handle")]
    StaleHandle,
}

/// Wall-clock reading from the real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtcTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl fmt::Display for RtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Byte-oriented input device.
pub trait Keyboard {
    /// Block until a byte arrives. `None` means the device is gone.
    fn read_byte(&mut self) -> Option<u8>;

    /// Return a pending byte without blocking.
    fn try_read_byte(&mut self) -> Option<u8>;
}

/// Text output device.
pub trait Console: fmt::Write {
    /// Emit one raw byte (control characters included).
    fn put_byte(&mut self, byte: u8);
}

/// The kernel's process table, as seen from the shell.
pub trait ProcessTable {
    /// Create a process running `path` with the given argument vector.
    fn spawn(&mut self, path: &str, argv: &[&str]) -> Result<Pid, ProcessError>;

    /// Give up the rest of the current time slice.
    fn yield_now(&mut self);

    /// Block until a matching child exits or `timeout` elapses.
    ///
    /// Never reaps. An exited but unreaped child is reported again on every
    /// call until it is reaped.
    fn wait(&mut self, target: WaitTarget, timeout: Duration) -> Result<WaitStatus, ProcessError>;

    /// Release the table slot of an exited child.
    fn reap(&mut self, pid: Pid) -> Result<(), ProcessError>;

    /// Ask for `pid` to be terminated. Returns once the request is queued.
    fn kill(&mut self, pid: Pid) -> Result<(), ProcessError>;
}

/// Filesystem driver.
pub trait FileSystem {
    /// Mount volume `unit` and return its root directory.
    fn mount(&mut self, unit: u32) -> Result<DirHandle, FsError>;

    /// Fill `buf` with the NUL-terminated names in `dir`.
    /// Returns the number of bytes written.
    fn read_dir(&mut self, dir: DirHandle, buf: &mut [u8]) -> Result<usize, FsError>;
}

/// Real-time clock.
pub trait Clock {
    fn now(&mut self) -> RtcTime;
}
