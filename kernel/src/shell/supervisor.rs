/// Process supervision commands: `start`, `run`, `wait`, `reap`, `kill`,
/// `stress`.
///
/// A child moves through `SPAWNED → RUNNING → EXITED → REAPED`. A wait that
/// hits its deadline leaves the child RUNNING; nothing here cleans up after
/// a timeout, so the child can still be waited on, reaped or killed later.
///
/// Only `run` reaps on its own, and only the pid it just spawned, after a
/// wait that saw it exit. `stress` and plain `wait` never reap.
use alloc::string::ToString;
use log::{debug, trace};

use super::error::{ShellError, ShellResult};
use super::line::CTRL_C;
use super::Session;
use crate::param::{STRESS_ARGV, STRESS_PROGRAM, WAIT_TIMEOUT};
use crate::sys::{Pid, ProcessInfo, WaitStatus, WaitTarget};

fn spawn(session: &mut Session<'_>, path: &str, argv: &[&str]) -> ShellResult<Pid> {
    let pid = session
        .procs
        .spawn(path, argv)
        .map_err(|source| ShellError::Spawn {
            path: path.to_string(),
            source,
        })?;
    debug!("spawned {} as pid {}", path, pid);
    Ok(pid)
}

fn report(session: &mut Session<'_>, info: &ProcessInfo) {
    outln!(session, "process {} exited with status {}", info.pid, info.exit_code);
}

/// Bounded wait. A timeout comes back as `ShellError::Timeout`.
fn wait_for(session: &mut Session<'_>, target: WaitTarget) -> ShellResult<ProcessInfo> {
    match session.procs.wait(target, WAIT_TIMEOUT)? {
        WaitStatus::Exited(info) => {
            trace!("wait {:?}: pid {} exited with {}", target, info.pid, info.exit_code);
            Ok(info)
        }
        WaitStatus::TimedOut => {
            debug!("wait {:?}: timed out after {:?}", target, WAIT_TIMEOUT);
            Err(ShellError::Timeout)
        }
    }
}

/// `start <path>`: spawn without waiting.
pub fn start(session: &mut Session<'_>, path: &str) -> ShellResult<()> {
    let pid = spawn(session, path, &[path, "start"])?;
    outln!(session, "started process {}", pid);
    session.procs.yield_now();
    Ok(())
}

/// `run <path>`: spawn, wait for that child, reap it if it exited.
pub fn run(session: &mut Session<'_>, path: &str) -> ShellResult<()> {
    let pid = spawn(session, path, &[path, "run"])?;
    outln!(session, "started process {}", pid);

    let info = wait_for(session, WaitTarget::Pid(pid))?;
    report(session, &info);
    session.procs.reap(info.pid)?;
    debug!("reaped pid {}", info.pid);
    Ok(())
}

/// `wait`: report the first child to exit. Does not reap.
pub fn wait(session: &mut Session<'_>) -> ShellResult<()> {
    let info = wait_for(session, WaitTarget::Any)?;
    report(session, &info);
    Ok(())
}

/// `reap <pid>`: release an exited child.
pub fn reap(session: &mut Session<'_>, pid: Pid) -> ShellResult<()> {
    match session.procs.reap(pid) {
        Ok(()) => {
            debug!("reaped pid {}", pid);
            outln!(session, "process {} reaped", pid);
            Ok(())
        }
        Err(e) => {
            outln!(session, "reap failed!");
            Err(e.into())
        }
    }
}

/// `kill <pid>`: request termination and return immediately.
pub fn kill(session: &mut Session<'_>, pid: Pid) -> ShellResult<()> {
    session.procs.kill(pid)?;
    debug!("kill requested for pid {}", pid);
    outln!(session, "kill requested for process {}", pid);
    Ok(())
}

/// `stress`: spawn and wait on the test workload until something fails.
///
/// Stops on a non-zero exit status, a timeout, a spawn failure (a full
/// process table included), or a Ctrl-C pending on the keyboard. Children
/// are left in the table for `reap`.
pub fn stress(session: &mut Session<'_>) -> ShellResult<()> {
    let mut rounds: u64 = 0;
    loop {
        if interrupted(session) {
            outln!(session, "stress: interrupted after {} runs", rounds);
            return Ok(());
        }

        let pid = spawn(session, STRESS_PROGRAM, &STRESS_ARGV)?;
        let info = wait_for(session, WaitTarget::Pid(pid))?;
        report(session, &info);
        rounds += 1;

        if info.exit_code != 0 {
            debug!("stress: stopping after {} runs", rounds);
            return Err(ShellError::ChildFailed {
                pid: info.pid,
                exit_code: info.exit_code,
            });
        }
    }
}

/// Drain keyboard input that arrived while `stress` was running.
/// Anything other than Ctrl-C is dropped.
fn interrupted(session: &mut Session<'_>) -> bool {
    while let Some(byte) = session.keyboard.try_read_byte() {
        if byte == CTRL_C {
            return true;
        }
    }
    false
}
