// src/cli.rs

use crate::core::policy::ExecutionPolicy;
use crate::models::Verbosity;
use clap::Parser;

/// Options every script accepts.
///
/// Anything left unset falls back to the script's [`ScriptDefaults`].
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct ScriptOptions {
    /// How much to show while running.
    #[arg(short, long, value_enum)]
    pub verbosity: Option<Verbosity>,

    /// Show commands instead of running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Ask before running each command.
    #[arg(short, long)]
    pub interactive: bool,

    /// Keep going when a command fails.
    #[arg(short = 'k', long)]
    pub keep_going: bool,

    /// Stream command output live instead of capturing it.
    #[arg(long)]
    pub stream: bool,

    /// Report how long the script took.
    #[arg(short, long)]
    pub time: bool,

    /// Arguments for the script itself. Pass values starting with `-` after `--`.
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

/// What a script uses for options the command line did not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDefaults {
    /// Verbosity when `--verbosity` is absent.
    pub verbosity: Verbosity,
    /// Capture command output unless `--stream` is given.
    pub capture_output: bool,
    /// Keep going after failures even without `--keep-going`.
    pub continue_on_error: bool,
    /// Dry-run even without `--dry-run`.
    pub dry_run: bool,
    /// Ask before each command even without `--interactive`.
    pub interactive: bool,
    /// Report elapsed time even without `--time`.
    pub time: bool,
}

impl Default for ScriptDefaults {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Cmds,
            capture_output: true,
            continue_on_error: false,
            dry_run: false,
            interactive: false,
            time: false,
        }
    }
}

impl ScriptOptions {
    /// Builds the script-wide baseline from these options, filling gaps from `defaults`.
    pub fn to_policy(&self, defaults: &ScriptDefaults) -> ExecutionPolicy {
        let mut policy =
            ExecutionPolicy::for_level(self.verbosity.unwrap_or(defaults.verbosity));
        policy.interactive = self.interactive || defaults.interactive;
        policy.continue_on_error = self.keep_going || defaults.continue_on_error;
        policy.capture_output = defaults.capture_output && !self.stream;
        policy.with_dry_run(self.dry_run || defaults.dry_run)
    }

    /// Whether the run should be timed.
    pub fn timed(&self, defaults: &ScriptDefaults) -> bool {
        self.time || defaults.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let options = ScriptOptions::try_parse_from([
            "deploy", "-v", "all", "-n", "-k", "--stream", "target", "--", "--flag",
        ])
        .unwrap();
        assert_eq!(options.verbosity, Some(Verbosity::All));
        assert!(options.dry_run && options.keep_going && options.stream);
        assert!(!options.interactive);
        assert_eq!(options.args, vec!["target", "--flag"]);
    }

    #[test]
    fn test_flags_after_positionals_still_apply() {
        let options = ScriptOptions::try_parse_from(["demo", "target", "-n"]).unwrap();
        assert!(options.dry_run);
        assert_eq!(options.args, vec!["target"]);
    }

    #[test]
    fn test_rejects_unknown_flag() {
        let err = ScriptOptions::try_parse_from(["demo", "--no-such-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);

        let passed = ScriptOptions::try_parse_from(["demo", "--", "--no-such-flag"]).unwrap();
        assert_eq!(passed.args, vec!["--no-such-flag"]);
    }

    #[test]
    fn test_rejects_unknown_verbosity() {
        assert!(ScriptOptions::try_parse_from(["deploy", "-v", "loud"]).is_err());
    }

    #[test]
    fn test_defaults_fill_gaps() {
        let defaults = ScriptDefaults {
            verbosity: Verbosity::Errors,
            continue_on_error: true,
            ..ScriptDefaults::default()
        };
        let policy = ScriptOptions::default().to_policy(&defaults);
        assert_eq!(policy.verbosity, Verbosity::Errors);
        assert!(policy.continue_on_error);
        assert!(policy.capture_output);

        let explicit = ScriptOptions {
            verbosity: Some(Verbosity::Echoes),
            stream: true,
            ..ScriptOptions::default()
        };
        let policy = explicit.to_policy(&defaults);
        assert_eq!(policy.verbosity, Verbosity::Echoes);
        assert!(!policy.capture_output);
    }

    #[test]
    fn test_dry_run_flag_raises_verbosity() {
        let options = ScriptOptions {
            dry_run: true,
            verbosity: Some(Verbosity::Silent),
            ..ScriptOptions::default()
        };
        let policy = options.to_policy(&ScriptDefaults::default());
        assert!(policy.dry_run);
        assert_eq!(policy.verbosity, Verbosity::All);
    }
}
