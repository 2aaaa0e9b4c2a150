/// Built-in shell commands.
///
/// Each command maps to one kernel operation: spawning or reaping a
/// process, mounting a volume, reading the clock. Handlers report their own
/// output; failures come back as `ShellError` and are printed here, prefixed
/// with the command name. Only `exit` ends the loop.
use super::command::Command;
use super::error::{ShellError, ShellResult};
use super::{supervisor, volume, Session};
use crate::selftest;

/// Whether the shell loop keeps going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Parse and run one line.
pub fn execute(session: &mut Session<'_>, line: &str) -> Flow {
    let cmd = match Command::parse(line) {
        Ok(Some(cmd)) => cmd,
        Ok(None) => return Flow::Continue,
        Err(rejected) => {
            outln!(session, "{}: {}", rejected.word, rejected.error);
            return Flow::Continue;
        }
    };

    match dispatch(session, cmd) {
        Ok(flow) => flow,
        Err(e) => {
            outln!(session, "{}: {}", cmd.name(), e);
            Flow::Continue
        }
    }
}

fn dispatch(session: &mut Session<'_>, cmd: Command<'_>) -> ShellResult<Flow> {
    match cmd {
        Command::Echo(text) => {
            if let Some(text) = text {
                outln!(session, "{}", text);
            }
        }
        Command::Start(path) => supervisor::start(session, path)?,
        Command::Run(path) => supervisor::run(session, path)?,
        Command::Wait => supervisor::wait(session)?,
        Command::Reap(pid) => supervisor::reap(session, pid)?,
        Command::Kill(pid) => supervisor::kill(session, pid)?,
        Command::Stress => supervisor::stress(session)?,
        Command::Mount(unit) => volume::mount(session, unit)?,
        Command::List => volume::list(session)?,
        Command::Test(name) => cmd_test(session, name)?,
        Command::Time => cmd_time(session),
        Command::Help => cmd_help(session),
        Command::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

fn cmd_test(session: &mut Session<'_>, name: &str) -> ShellResult<()> {
    match name {
        "kmalloc" => {
            let report = selftest::kmalloc()?;
            outln!(
                session,
                "kmalloc: {} allocations, {} bytes verified",
                report.allocations,
                report.bytes
            );
            Ok(())
        }
        _ => Err(ShellError::TestNotFound(name.into())),
    }
}

fn cmd_time(session: &mut Session<'_>) {
    let now = session.clock.now();
    outln!(session, "{}", now);
}

fn cmd_help(session: &mut Session<'_>) {
    outln!(session, "Commands:");
    outln!(session, "  echo <text>      print text (first word only)");
    outln!(session, "  start <path>     start a process in the background");
    outln!(session, "  run <path>       run a process and wait for it");
    outln!(session, "  wait             wait for any child to exit");
    outln!(session, "  reap <pid>       release an exited process");
    outln!(session, "  kill <pid>       request termination of a process");
    outln!(session, "  stress           spawn TEST.EXE until one fails");
    outln!(session, "  mount <unit>     mount a volume as the root directory");
    outln!(session, "  list             list the root directory");
    outln!(session, "  test <function>  run a self-test (kmalloc)");
    outln!(session, "  time             show the date and time");
    outln!(session, "  help             show this help");
    outln!(session, "  exit             leave the shell");
}
