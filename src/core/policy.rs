// src/core/policy.rs

//! Resolution of the switches that decide what the engine shows and how it
//! reacts to failures.
//!
//! A script has one baseline [`ExecutionPolicy`], derived from its
//! [`Verbosity`]. Each command may carry a sparse [`CommandOptions`] record;
//! [`ExecutionPolicy::resolve`] merges the two into the policy for that one
//! invocation without touching the baseline.

use crate::models::Verbosity;

/// The effective switches for a script, or for a single command once
/// per-command options have been merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPolicy {
    /// The level the display switches were derived from.
    pub verbosity: Verbosity,
    /// Show every command line and all output, regardless of per-command hints.
    pub debug: bool,
    /// Print command lines before running them.
    pub show_command: bool,
    /// Print captured command output.
    pub show_command_output: bool,
    /// Print author echoes.
    pub show_echoes: bool,
    /// Print section headers.
    pub show_headers: bool,
    /// Print failure reports.
    pub show_errors: bool,
    /// Keep going after a non-zero exit instead of failing.
    pub continue_on_error: bool,
    /// Display commands instead of running them.
    pub dry_run: bool,
    /// Ask the operator before every command.
    pub interactive: bool,
    /// Run even in dry-run mode.
    pub force: bool,
    /// Buffer child output instead of streaming it to the terminal.
    pub capture_output: bool,
    /// Do not run the command at all.
    pub skip: bool,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::for_level(Verbosity::default())
    }
}

impl ExecutionPolicy {
    /// Builds a baseline policy whose display switches follow `verbosity`.
    pub fn for_level(verbosity: Verbosity) -> Self {
        let mut policy = Self {
            verbosity,
            debug: false,
            show_command: false,
            show_command_output: false,
            show_echoes: false,
            show_headers: false,
            show_errors: false,
            continue_on_error: false,
            dry_run: false,
            interactive: false,
            force: false,
            capture_output: true,
            skip: false,
        };
        policy.apply_level(verbosity);
        policy
    }

    /// Returns this policy with its display switches re-derived from `verbosity`.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.apply_level(verbosity);
        self
    }

    /// Turns dry-run on or off. Enabling it raises verbosity to at least
    /// [`Verbosity::All`] so the operator sees what would have run.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        if dry_run && self.verbosity < Verbosity::All {
            self.apply_level(Verbosity::All);
        }
        self
    }

    fn apply_level(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
        self.debug = verbosity >= Verbosity::Debug;
        self.show_command_output = verbosity >= Verbosity::All;
        self.show_command = verbosity >= Verbosity::Cmds;
        self.show_echoes = verbosity >= Verbosity::Echoes;
        self.show_headers = verbosity >= Verbosity::Echoes;
        self.show_errors = verbosity >= Verbosity::Errors;
    }

    /// Merges per-command `options` over this baseline.
    ///
    /// Display hints can only switch off what the level switched on. In debug
    /// mode the command-line and output hints are ignored entirely.
    pub fn resolve(&self, options: &CommandOptions) -> Self {
        let mut policy = self.clone();
        let silent = options.silent.unwrap_or(false);

        if !policy.debug {
            policy.show_command &= options.show_command.unwrap_or(true) && !silent;
            policy.show_command_output &= options.show_command_output.unwrap_or(true) && !silent;
        }
        if let Some(show_errors) = options.show_errors {
            policy.show_errors &= show_errors;
        }
        if let Some(continue_on_error) = options.continue_on_error {
            policy.continue_on_error = continue_on_error;
        }
        if options.ignore_nonzero_exit == Some(true) {
            policy.show_errors = false;
            policy.continue_on_error = true;
        }
        if let Some(interactive) = options.interactive {
            policy.interactive &= interactive;
        }
        if let Some(force) = options.force {
            policy.force = force;
        }
        if let Some(capture_output) = options.capture_output {
            policy.capture_output = capture_output;
        }
        policy.skip = options.skip.unwrap_or(false);

        log::trace!("Resolved policy {:?} from options {:?}", policy, options);
        policy
    }

    /// Whether a command under this policy must not reach the shell.
    pub fn should_skip(&self) -> bool {
        self.skip || (self.dry_run && !self.force)
    }
}

/// Per-command overrides. Every field left as `None` inherits the baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Never run this command.
    pub skip: Option<bool>,
    /// Hide the command line and its output.
    pub silent: Option<bool>,
    /// Hint for printing the command line.
    pub show_command: Option<bool>,
    /// Hint for printing captured output.
    pub show_command_output: Option<bool>,
    /// Hint for printing failure reports.
    pub show_errors: Option<bool>,
    /// Capture (`true`) or stream (`false`) the child's output.
    pub capture_output: Option<bool>,
    /// Keep going after a non-zero exit.
    pub continue_on_error: Option<bool>,
    /// Hide failure reports *and* keep going after a non-zero exit.
    pub ignore_nonzero_exit: Option<bool>,
    /// Run even in dry-run mode.
    pub force: Option<bool>,
    /// Allow (or suppress) the confirmation prompt for this command.
    pub interactive: Option<bool>,
}

impl CommandOptions {
    /// An empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`CommandOptions::skip`].
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets [`CommandOptions::silent`].
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    /// Sets [`CommandOptions::show_command`].
    pub fn show_command(mut self, show: bool) -> Self {
        self.show_command = Some(show);
        self
    }

    /// Sets [`CommandOptions::show_command_output`].
    pub fn show_command_output(mut self, show: bool) -> Self {
        self.show_command_output = Some(show);
        self
    }

    /// Sets [`CommandOptions::show_errors`].
    pub fn show_errors(mut self, show: bool) -> Self {
        self.show_errors = Some(show);
        self
    }

    /// Sets [`CommandOptions::capture_output`].
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = Some(capture);
        self
    }

    /// Sets [`CommandOptions::continue_on_error`].
    pub fn continue_on_error(mut self, keep_going: bool) -> Self {
        self.continue_on_error = Some(keep_going);
        self
    }

    /// Sets [`CommandOptions::ignore_nonzero_exit`].
    pub fn ignore_nonzero_exit(mut self, ignore: bool) -> Self {
        self.ignore_nonzero_exit = Some(ignore);
        self
    }

    /// Sets [`CommandOptions::force`].
    pub fn force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }

    /// Sets [`CommandOptions::interactive`].
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = Some(interactive);
        self
    }

    /// Fills the defaults used by the output/status conveniences: capture,
    /// hide the command line and output, and run even in dry-run. Anything
    /// the caller already set is kept.
    pub fn harvest(mut self) -> Self {
        self.capture_output.get_or_insert(true);
        self.show_command.get_or_insert(false);
        self.show_command_output.get_or_insert(false);
        self.force.get_or_insert(true);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switches(policy: &ExecutionPolicy) -> [bool; 6] {
        [
            policy.debug,
            policy.show_command_output,
            policy.show_command,
            policy.show_echoes,
            policy.show_headers,
            policy.show_errors,
        ]
    }

    #[test]
    fn test_level_table() {
        let expected = [
            (Verbosity::Silent, [false, false, false, false, false, false]),
            (Verbosity::Errors, [false, false, false, false, false, true]),
            (Verbosity::Echoes, [false, false, false, true, true, true]),
            (Verbosity::Cmds, [false, false, true, true, true, true]),
            (Verbosity::All, [false, true, true, true, true, true]),
            (Verbosity::Debug, [true, true, true, true, true, true]),
        ];
        for (level, row) in expected {
            assert_eq!(switches(&ExecutionPolicy::for_level(level)), row, "{level}");
        }
    }

    #[test]
    fn test_levels_are_monotone() {
        for (i, low) in Verbosity::ALL.iter().enumerate() {
            for high in Verbosity::ALL.iter().skip(i + 1) {
                let low_switches = switches(&ExecutionPolicy::for_level(*low));
                let high_switches = switches(&ExecutionPolicy::for_level(*high));
                for (on_low, on_high) in low_switches.iter().zip(high_switches.iter()) {
                    assert!(!on_low || *on_high, "{low} enables a switch {high} does not");
                }
            }
        }
    }

    #[test]
    fn test_dry_run_raises_verbosity() {
        let policy = ExecutionPolicy::for_level(Verbosity::Errors).with_dry_run(true);
        assert_eq!(policy.verbosity, Verbosity::All);
        assert!(policy.show_command && policy.show_command_output);

        let debug = ExecutionPolicy::for_level(Verbosity::Debug).with_dry_run(true);
        assert_eq!(debug.verbosity, Verbosity::Debug);
    }

    #[test]
    fn test_overrides_only_suppress_display() {
        let baseline = ExecutionPolicy::for_level(Verbosity::Errors);
        let forced_on = baseline.resolve(
            &CommandOptions::new()
                .show_command(true)
                .show_command_output(true),
        );
        assert!(!forced_on.show_command);
        assert!(!forced_on.show_command_output);

        let all = ExecutionPolicy::for_level(Verbosity::All);
        let silenced = all.resolve(&CommandOptions::new().silent(true));
        assert!(!silenced.show_command);
        assert!(!silenced.show_command_output);
        assert!(silenced.show_errors);
    }

    #[test]
    fn test_resolve_leaves_baseline_untouched() {
        let baseline = ExecutionPolicy::for_level(Verbosity::All);
        let before = baseline.clone();
        let _ = baseline.resolve(&CommandOptions::new().silent(true).force(true).skip(true));
        assert_eq!(baseline, before);
    }

    #[test]
    fn test_debug_ignores_display_hints() {
        let debug = ExecutionPolicy::for_level(Verbosity::Debug);
        let resolved = debug.resolve(&CommandOptions::new().silent(true).harvest());
        assert!(resolved.show_command);
        assert!(resolved.show_command_output);
    }

    #[test]
    fn test_ignore_nonzero_exit_couples_both_switches() {
        let baseline = ExecutionPolicy::for_level(Verbosity::All);
        let resolved = baseline.resolve(&CommandOptions::new().ignore_nonzero_exit(true));
        assert!(!resolved.show_errors);
        assert!(resolved.continue_on_error);
    }

    #[test]
    fn test_harvest_defaults_respect_explicit_choices() {
        let options = CommandOptions::new().force(false).harvest();
        assert_eq!(options.force, Some(false));
        assert_eq!(options.capture_output, Some(true));
        assert_eq!(options.show_command, Some(false));
        assert_eq!(options.show_command_output, Some(false));
    }

    #[test]
    fn test_should_skip() {
        let dry = ExecutionPolicy::default().with_dry_run(true);
        assert!(dry.resolve(&CommandOptions::new()).should_skip());
        assert!(!dry.resolve(&CommandOptions::new().force(true)).should_skip());
        assert!(
            ExecutionPolicy::default()
                .resolve(&CommandOptions::new().skip(true).force(true))
                .should_skip()
        );
    }
}
