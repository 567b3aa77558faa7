// src/constants.rs

/// The shell used to interpret command lines.
#[cfg(not(windows))]
pub const SHELL: &str = "sh";
#[cfg(windows)]
pub const SHELL: &str = "cmd";

/// The flag that makes [`SHELL`] read the command line from its next argument.
#[cfg(not(windows))]
pub const SHELL_COMMAND_FLAG: &str = "-c";
#[cfg(windows)]
pub const SHELL_COMMAND_FLAG: &str = "/C";

/// Exit status recorded when a command could not be launched at all.
pub const LAUNCH_FAILURE_STATUS: i32 = -1;

/// Process exit code for a run that finished normally or was aborted by the operator.
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code when a command failure escaped every section.
pub const EXIT_COMMAND_FAILURE: i32 = 1;

/// Process exit code when the script's arguments failed validation.
pub const EXIT_INVALID_ARGUMENTS: i32 = 2;

/// Process exit code used when the operator quits from a confirmation prompt.
pub const EXIT_OPERATOR_QUIT: i32 = 0;

/// Help shown when the operator answers `h` at a confirmation prompt.
pub const CONFIRM_HELP: &str = "\
  y, <enter>  run this command
  n           skip this command
  a           run this and all remaining commands without asking
  d           switch this and all remaining commands to dry-run
  q           quit immediately
  h, ?        show this help";
