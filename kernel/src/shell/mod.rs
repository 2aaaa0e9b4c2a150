//! Interactive kernel shell.
//!
//! Reads lines from the keyboard, echoes them to the console, and runs one
//! built-in command per line to completion before reading the next. The
//! only places the loop blocks are the keyboard read and the bounded wait
//! on a child process.
//!
//! Everything the shell touches lives in a [`Session`]: the collaborator
//! drivers and the root directory picked by the last `mount`.

/// Print a line to the session console. Console errors are dropped.
macro_rules! outln {
    ($session:expr) => {{
        let _ = writeln!($session.console);
    }};
    ($session:expr, $($arg:tt)*) => {{
        let _ = writeln!($session.console, $($arg)*);
    }};
}

mod command;
mod commands;
mod error;
mod line;
mod supervisor;
mod volume;


pub use command::{Command, Rejected};
pub use commands::{execute, Flow};
pub use error::{ShellError, ShellResult};
pub use line::{Input, LineEditor};

use crate::param::PROMPT;
use crate::sys::{Clock, Console, DirHandle, FileSystem, Keyboard, ProcessTable};

/// Per-shell state shared by all commands.
pub struct Session<'k> {
    pub keyboard: &'k mut dyn Keyboard,
    pub console: &'k mut dyn Console,
    pub procs: &'k mut dyn ProcessTable,
    pub fs: &'k mut dyn FileSystem,
    pub clock: &'k mut dyn Clock,
    /// Root of the most recently mounted volume. Written only by `mount`.
    root: Option<DirHandle>,
}

impl<'k> Session<'k> {
    pub fn new(
        keyboard: &'k mut dyn Keyboard,
        console: &'k mut dyn Console,
        procs: &'k mut dyn ProcessTable,
        fs: &'k mut dyn FileSystem,
        clock: &'k mut dyn Clock,
    ) -> Self {
        Self {
            keyboard,
            console,
            procs,
            fs,
            clock,
            root: None,
        }
    }

    /// Start with a root directory already mounted, e.g. the boot volume.
    pub fn with_root(mut self, root: DirHandle) -> Self {
        self.root = Some(root);
        self
    }

    pub fn root(&self) -> Option<DirHandle> {
        self.root
    }
}

/// Why the shell loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The user typed `exit`.
    Exit,
    /// The keyboard closed or Ctrl-D was pressed on an empty line.
    InputClosed,
}

pub struct Shell<'k> {
    editor: LineEditor,
    session: Session<'k>,
}

impl<'k> Shell<'k> {
    pub fn new(session: Session<'k>) -> Self {
        Self {
            editor: LineEditor::new(),
            session,
        }
    }

    /// Run until `exit` or end of input.
    pub fn run(&mut self) -> ExitReason {
        log::info!("shell started");

        loop {
            let _ = self.session.console.write_str(PROMPT);

            match self
                .editor
                .read_line(&mut *self.session.keyboard, &mut *self.session.console)
            {
                Input::Line(line) => {
                    if execute(&mut self.session, line) == Flow::Exit {
                        log::info!("shell exited");
                        return ExitReason::Exit;
                    }
                }
                Input::Cancelled => {}
                Input::Closed => {
                    log::info!("input closed, leaving shell");
                    return ExitReason::InputClosed;
                }
            }
        }
    }

    pub fn session(&self) -> &Session<'k> {
        &self.session
    }
}

/// Run a shell over `session` until it exits.
pub fn launch(session: Session<'_>) -> ExitReason {
    let _ = writeln!(session.console, "kernel shell ready. Type 'help' for commands.");
    Shell::new(session).run()
}

/// Run a shell on the COM1 serial line with the CMOS clock.
#[cfg(all(target_arch = "x86_64", not(test)))]
pub fn launch_on_serial(procs: &mut dyn ProcessTable, fs: &mut dyn FileSystem) -> ExitReason {
    use crate::arch::x86_64::cmos::{CmosRtc, DEFAULT_CENTURY_REG};
    use crate::arch::x86_64::serial::SerialPort;

    crate::arch::x86_64::init();

    let mut keyboard = SerialPort;
    let mut console = SerialPort;
    let mut clock = CmosRtc::with_century(DEFAULT_CENTURY_REG);
    launch(Session::new(&mut keyboard, &mut console, procs, fs, &mut clock))
}
