/// Command-line parsing.
///
/// A line is split on ASCII whitespace and the first word picks a variant.
/// Argument counts and integer arguments are checked here, so handlers only
/// ever see well-formed commands.
use alloc::string::ToString;
use core::str::FromStr;

use super::error::{ShellError, ShellResult};
use crate::sys::Pid;

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Only the first word is kept; anything after it is dropped.
    Echo(Option<&'a str>),
    Start(&'a str),
    Run(&'a str),
    Mount(u32),
    Reap(Pid),
    Kill(Pid),
    Wait,
    List,
    Stress,
    Test(&'a str),
    Time,
    Help,
    Exit,
}

/// A line that could not be turned into a [`Command`].
#[derive(Debug)]
pub struct Rejected<'a> {
    /// First word of the line, used as the message prefix.
    pub word: &'a str,
    pub error: ShellError,
}

impl<'a> Command<'a> {
    /// Parse one line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &'a str) -> Result<Option<Self>, Rejected<'a>> {
        let mut words = line.split_ascii_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };

        Self::from_words(word, &mut words)
            .map(Some)
            .map_err(|error| Rejected { word, error })
    }

    fn from_words<I>(word: &'a str, args: &mut I) -> ShellResult<Self>
    where
        I: Iterator<Item = &'a str>,
    {
        let cmd = match word {
            "echo" => Command::Echo(args.next()),
            "start" => Command::Start(one(args)?),
            "run" => Command::Run(one(args)?),
            "mount" => Command::Mount(number(one(args)?, "unit number")?),
            "reap" => Command::Reap(Pid(number(one(args)?, "process id number")?)),
            "kill" => Command::Kill(Pid(number(one(args)?, "process id number")?)),
            "test" => Command::Test(one(args)?),
            "wait" => none(args).map(|()| Command::Wait)?,
            "list" => none(args).map(|()| Command::List)?,
            "stress" => none(args).map(|()| Command::Stress)?,
            "time" => none(args).map(|()| Command::Time)?,
            "help" => none(args).map(|()| Command::Help)?,
            "exit" => none(args).map(|()| Command::Exit)?,
            _ => return Err(ShellError::CommandNotFound),
        };
        Ok(cmd)
    }

    /// The word that selects this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Echo(_) => "echo",
            Command::Start(_) => "start",
            Command::Run(_) => "run",
            Command::Mount(_) => "mount",
            Command::Reap(_) => "reap",
            Command::Kill(_) => "kill",
            Command::Wait => "wait",
            Command::List => "list",
            Command::Stress => "stress",
            Command::Test(_) => "test",
            Command::Time => "time",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }
}

fn none<'a, I: Iterator<Item = &'a str>>(args: &mut I) -> ShellResult<()> {
    match args.next() {
        Some(extra) => Err(ShellError::UnexpectedArgument(extra.to_string())),
        None => Ok(()),
    }
}

fn one<'a, I: Iterator<Item = &'a str>>(args: &mut I) -> ShellResult<&'a str> {
    let arg = args.next().ok_or(ShellError::MissingArgument)?;
    none(args)?;
    Ok(arg)
}

fn number<T: FromStr>(token: &str, expected: &'static str) -> ShellResult<T> {
    token.parse().map_err(|_| ShellError::Parse {
        expected,
        token: token.to_string(),
    })
}
