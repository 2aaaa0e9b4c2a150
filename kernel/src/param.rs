/// Compile-time shell parameters.
///
/// None of these are reachable from the command line; changing them means
/// rebuilding the kernel.
use core::time::Duration;

/// Prompt printed before every line.
pub const PROMPT: &str = "$ ";

/// Line buffer capacity in bytes, including the terminator slot.
pub const MAX_LINE: usize = 1024;

/// Bound on every blocking wait issued by the supervisor.
pub const WAIT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Scratch buffer handed to the filesystem for a directory listing.
pub const DIR_BUFFER_LEN: usize = 1024;

/// Workload spawned by `stress` on every iteration.
pub const STRESS_PROGRAM: &str = "TEST.EXE";

/// Argument vector for the `stress` workload (argv[0] included).
pub const STRESS_ARGV: [&str; 6] = [STRESS_PROGRAM, "arg1", "arg2", "arg3", "arg4", "arg5"];

static_assertions::const_assert!(MAX_LINE >= 2);
static_assertions::const_assert!(DIR_BUFFER_LEN > 0);
