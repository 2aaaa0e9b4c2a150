/// In-memory collaborators for host-side testing.
///
/// Simulates the keyboard, console, process table, filesystem and clock
/// entirely in memory. The process table runs on a virtual millisecond
/// clock that only advances inside `wait`, so timeouts are deterministic.
use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

use super::{
    Clock, Console, DirHandle, FileSystem, FsError, Keyboard, Pid, ProcessError, ProcessInfo,
    ProcessTable, RtcTime, WaitStatus, WaitTarget,
};

// ---- Keyboard ----

/// Keyboard fed from a fixed script.
///
/// `read_byte` consumes the script, then anything queued with
/// [`ScriptedKeyboard::press`]. Pressed bytes are already sitting in the
/// device FIFO and are the only ones visible to the non-blocking
/// `try_read_byte`, which is how escape-sequence tails and keys hit while a
/// command runs are modelled.
pub struct ScriptedKeyboard {
    script: VecDeque<u8>,
    pending: VecDeque<u8>,
}

impl ScriptedKeyboard {
    pub fn new(script: &str) -> Self {
        Self::from_bytes(script.as_bytes())
    }

    pub fn from_bytes(script: &[u8]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            pending: VecDeque::new(),
        }
    }

    /// Queue a byte that arrives while a command is running.
    pub fn press(&mut self, byte: u8) {
        self.pending.push_back(byte);
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len() + self.pending.len()
    }
}

impl Keyboard for ScriptedKeyboard {
    fn read_byte(&mut self) -> Option<u8> {
        self.script.pop_front().or_else(|| self.pending.pop_front())
    }

    fn try_read_byte(&mut self) -> Option<u8> {
        self.pending.pop_front()
    }
}

// ---- Console ----

/// Console that records everything written to it.
#[derive(Default)]
pub struct CaptureConsole {
    out: String,
}

impl CaptureConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, control bytes included.
    pub fn output(&self) -> &str {
        &self.out
    }

    /// Output split into lines, with CR stripped.
    pub fn lines(&self) -> Vec<&str> {
        self.out
            .split('\n')
            .map(|l| l.trim_end_matches('\r'))
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.out.contains(needle)
    }

    pub fn clear(&mut self) {
        self.out.clear();
    }
}

impl fmt::Write for CaptureConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}

impl Console for CaptureConsole {
    fn put_byte(&mut self, byte: u8) {
        self.out.push(byte as char);
    }
}

// ---- Process table ----

/// Behavior of one spawned program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Program {
    pub exit_code: i32,
    /// How long the process runs. `None` never exits on its own.
    pub runtime: Option<Duration>,
}

impl Program {
    pub const fn exits(exit_code: i32, after_ms: u64) -> Self {
        Self {
            exit_code,
            runtime: Some(Duration::from_millis(after_ms)),
        }
    }

    pub const fn hangs() -> Self {
        Self {
            exit_code: 0,
            runtime: None,
        }
    }
}

/// Exit code reported for a killed process.
pub const KILLED_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone, Copy)]
enum ProcState {
    Running { exits_at: Option<u64>, exit_code: i32 },
    Exited { at: u64, exit_code: i32 },
}

/// A recorded `spawn` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    pub pid: Pid,
    pub path: String,
    pub argv: Vec<String>,
}

/// Process table on a virtual clock.
pub struct MockProcessTable {
    programs: BTreeMap<String, VecDeque<Program>>,
    procs: BTreeMap<Pid, ProcState>,
    spawned: Vec<SpawnRecord>,
    next_pid: u32,
    now_ms: u64,
    capacity: usize,
    yields: usize,
}

impl MockProcessTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            programs: BTreeMap::new(),
            procs: BTreeMap::new(),
            spawned: Vec::new(),
            next_pid: 1,
            now_ms: 0,
            capacity,
            yields: 0,
        }
    }

    /// Make `path` spawnable. Every spawn behaves like `program`.
    pub fn install(&mut self, path: &str, program: Program) {
        self.install_sequence(path, &[program]);
    }

    /// Make `path` spawnable with one behavior per spawn. The last entry
    /// repeats once the others are used up.
    pub fn install_sequence(&mut self, path: &str, programs: &[Program]) {
        self.programs
            .insert(path.to_string(), programs.iter().copied().collect());
    }

    /// Live (unreaped) entries, running or exited.
    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.procs.contains_key(&pid)
    }

    pub fn is_running(&self, pid: Pid) -> bool {
        matches!(self.procs.get(&pid), Some(ProcState::Running { exits_at, .. })
            if exits_at.map_or(true, |t| t > self.now_ms))
    }

    pub fn spawned(&self) -> &[SpawnRecord] {
        &self.spawned
    }

    pub fn yields(&self) -> usize {
        self.yields
    }

    /// Virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Advance virtual time without waiting on anything.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
        self.settle();
    }

    /// Move every process whose exit time has passed into the exited state.
    fn settle(&mut self) {
        let now = self.now_ms;
        for state in self.procs.values_mut() {
            if let ProcState::Running { exits_at: Some(t), exit_code } = *state {
                if t <= now {
                    *state = ProcState::Exited { at: t, exit_code };
                }
            }
        }
    }

    fn exit_time(state: &ProcState) -> Option<u64> {
        match *state {
            ProcState::Running { exits_at, .. } => exits_at,
            ProcState::Exited { at, .. } => Some(at),
        }
    }

    fn next_program(&mut self, path: &str) -> Option<Program> {
        let queue = self.programs.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().copied()
        }
    }
}

impl ProcessTable for MockProcessTable {
    fn spawn(&mut self, path: &str, argv: &[&str]) -> Result<Pid, ProcessError> {
        if !self.programs.contains_key(path) {
            return Err(ProcessError::NotFound);
        }
        if self.procs.len() >= self.capacity {
            return Err(ProcessError::TableFull);
        }
        let program = self.next_program(path).ok_or(ProcessError::NotFound)?;

        let pid = Pid(self.next_pid);
        self.next_pid += 1;

        let exits_at = program
            .runtime
            .map(|r| self.now_ms + r.as_millis() as u64);
        self.procs.insert(
            pid,
            ProcState::Running {
                exits_at,
                exit_code: program.exit_code,
            },
        );
        self.spawned.push(SpawnRecord {
            pid,
            path: path.to_string(),
            argv: argv.iter().map(|a| a.to_string()).collect(),
        });
        Ok(pid)
    }

    fn yield_now(&mut self) {
        self.yields += 1;
    }

    fn wait(&mut self, target: WaitTarget, timeout: Duration) -> Result<WaitStatus, ProcessError> {
        self.settle();
        let deadline = self.now_ms + timeout.as_millis() as u64;

        let candidates: Vec<(Pid, ProcState)> = match target {
            WaitTarget::Any => {
                if self.procs.is_empty() {
                    return Err(ProcessError::NoChildren);
                }
                self.procs.iter().map(|(p, s)| (*p, *s)).collect()
            }
            WaitTarget::Pid(pid) => {
                let state = self
                    .procs
                    .get(&pid)
                    .ok_or(ProcessError::NoSuchProcess(pid))?;
                alloc::vec![(pid, *state)]
            }
        };

        // First to exit wins; ties go to the lowest pid.
        let first = candidates
            .iter()
            .filter_map(|(pid, state)| Self::exit_time(state).map(|t| (t, *pid)))
            .filter(|(t, _)| *t <= deadline)
            .min();

        match first {
            Some((at, pid)) => {
                self.now_ms = self.now_ms.max(at);
                self.settle();
                match self.procs.get(&pid) {
                    Some(ProcState::Exited { exit_code, .. }) => {
                        Ok(WaitStatus::Exited(ProcessInfo { pid, exit_code: *exit_code }))
                    }
                    _ => Err(ProcessError::NoSuchProcess(pid)),
                }
            }
            None => {
                self.now_ms = deadline;
                self.settle();
                Ok(WaitStatus::TimedOut)
            }
        }
    }

    fn reap(&mut self, pid: Pid) -> Result<(), ProcessError> {
        self.settle();
        match self.procs.get(&pid) {
            None => Err(ProcessError::NoSuchProcess(pid)),
            Some(ProcState::Running { .. }) => Err(ProcessError::StillRunning(pid)),
            Some(ProcState::Exited { .. }) => {
                self.procs.remove(&pid);
                Ok(())
            }
        }
    }

    fn kill(&mut self, pid: Pid) -> Result<(), ProcessError> {
        self.settle();
        let now = self.now_ms;
        match self.procs.get_mut(&pid) {
            None => Err(ProcessError::NoSuchProcess(pid)),
            Some(ProcState::Exited { .. }) => Err(ProcessError::AlreadyExited(pid)),
            Some(state) => {
                // Takes effect at the next scheduling point, not here.
                *state = ProcState::Running {
                    exits_at: Some(now),
                    exit_code: KILLED_EXIT_CODE,
                };
                Ok(())
            }
        }
    }
}

// ---- Filesystem ----

struct Volume {
    names: Vec<String>,
    has_root: bool,
}

/// Filesystem with volumes held in memory, keyed by unit number.
#[derive(Default)]
pub struct MemFs {
    volumes: BTreeMap<u32, Volume>,
    mounts: usize,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a volume whose root directory holds `names`.
    pub fn add_volume(&mut self, unit: u32, names: &[&str]) {
        self.volumes.insert(
            unit,
            Volume {
                names: names.iter().map(|n| n.to_string()).collect(),
                has_root: true,
            },
        );
    }

    /// Attach a volume that mounts but has no readable root directory.
    pub fn add_rootless_volume(&mut self, unit: u32) {
        self.volumes.insert(
            unit,
            Volume {
                names: Vec::new(),
                has_root: false,
            },
        );
    }

    /// Number of successful mounts.
    pub fn mounts(&self) -> usize {
        self.mounts
    }
}

impl FileSystem for MemFs {
    fn mount(&mut self, unit: u32) -> Result<DirHandle, FsError> {
        let volume = self.volumes.get(&unit).ok_or(FsError::MountFailed)?;
        if !volume.has_root {
            return Err(FsError::NoRoot);
        }
        self.mounts += 1;
        Ok(DirHandle(u64::from(unit)))
    }

    fn read_dir(&mut self, dir: DirHandle, buf: &mut [u8]) -> Result<usize, FsError> {
        let unit = u32::try_from(dir.0).map_err(|_| FsError::StaleHandle)?;
        let volume = self.volumes.get(&unit).ok_or(FsError::StaleHandle)?;

        // Whole entries only; whatever does not fit is left out.
        let mut len = 0;
        for name in &volume.names {
            let bytes = name.as_bytes();
            if len + bytes.len() + 1 > buf.len() {
                break;
            }
            buf[len..len + bytes.len()].copy_from_slice(bytes);
            buf[len + bytes.len()] = 0;
            len += bytes.len() + 1;
        }
        Ok(len)
    }
}

// ---- Clock ----

/// Clock stuck at one instant.
pub struct FixedClock(pub RtcTime);

impl Clock for FixedClock {
    fn now(&mut self) -> RtcTime {
        self.0
    }
}
