// src/core/script_runner.rs

//! The top-level driver of a script.
//!
//! A run moves through a fixed sequence of phases, none of them repeated:
//!
//! 1. **ParseConfig**: command-line options are parsed into [`ScriptOptions`].
//! 2. **ApplyDefaults**: unset options are filled from [`ScriptDefaults`].
//! 3. **ClientOverrides**: the author may adjust the resulting baseline policy.
//! 4. **ValidateArguments**: the author's validator inspects the options; on
//!    failure the usage is printed and the run ends without running the body.
//! 5. **InstallSignalHandlers**, then **StartTimer** if timing was asked for.
//! 6. **RunBody**: script aborts and command failures that escaped every
//!    section are handled here.
//! 7. **ReportElapsed**, then the run terminates with an [`Outcome`].

use crate::cli::{ScriptDefaults, ScriptOptions};
use crate::constants::{EXIT_COMMAND_FAILURE, EXIT_INVALID_ARGUMENTS, EXIT_SUCCESS};
use crate::core::{
    context::ScriptContext,
    error::ScriptError,
    output::{ConsoleReporter, Reporter},
    policy::ExecutionPolicy,
    timer::RunTimer,
};
use crate::models::EventKind;
use crate::system::operator::Operator;
use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

type PolicyOverride = Box<dyn FnOnce(&mut ExecutionPolicy)>;
type Validator = Box<dyn FnOnce(&ScriptOptions) -> Result<(), ScriptError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ParseConfig,
    ApplyDefaults,
    ClientOverrides,
    ValidateArguments,
    PrintUsage,
    InstallSignalHandlers,
    StartTimer,
    RunBody,
    ReportElapsed,
    Terminate,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The body returned normally.
    CompletedNormally,
    /// The operator aborted the whole script.
    CompletedViaScriptAbort,
    /// A command failure escaped every section.
    TerminatedByUnhandledCommandFailure,
    /// The arguments were rejected; the body never ran.
    TerminatedByInvalidArguments,
}

impl Outcome {
    /// The process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::CompletedNormally | Self::CompletedViaScriptAbort => EXIT_SUCCESS,
            Self::TerminatedByUnhandledCommandFailure => EXIT_COMMAND_FAILURE,
            Self::TerminatedByInvalidArguments => EXIT_INVALID_ARGUMENTS,
        }
    }
}

/// Builds and drives one script run.
pub struct ScriptRunner {
    name: String,
    about: Option<String>,
    defaults: ScriptDefaults,
    overrides: Option<PolicyOverride>,
    validator: Option<Validator>,
    reporter: Option<Box<dyn Reporter>>,
    operator: Option<Box<dyn Operator>>,
    cwd: Option<PathBuf>,
    handle_signals: bool,
}

impl fmt::Debug for ScriptRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRunner")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .field("handle_signals", &self.handle_signals)
            .finish_non_exhaustive()
    }
}

impl ScriptRunner {
    /// A runner for the script called `name` (used in usage text).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            defaults: ScriptDefaults::default(),
            overrides: None,
            validator: None,
            reporter: None,
            operator: None,
            cwd: None,
            handle_signals: true,
        }
    }

    /// One-line description shown in the usage text.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Values used where the command line is silent.
    pub fn defaults(mut self, defaults: ScriptDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Adjusts the baseline policy after defaults are applied.
    pub fn overrides(mut self, overrides: impl FnOnce(&mut ExecutionPolicy) + 'static) -> Self {
        self.overrides = Some(Box::new(overrides));
        self
    }

    /// Checks the parsed options before anything runs. Returning
    /// [`ScriptError::ArgumentsNotValid`] prints the usage and ends the run.
    pub fn validate(
        mut self,
        validator: impl FnOnce(&ScriptOptions) -> Result<(), ScriptError> + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Sends output events somewhere other than the console.
    pub fn reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Reads operator input from somewhere other than the terminal.
    pub fn operator(mut self, operator: Box<dyn Operator>) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Starts commands in `cwd` instead of the process's current directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Whether to take over SIGINT/SIGQUIT for the run (on by default).
    pub fn handle_signals(mut self, handle: bool) -> Self {
        self.handle_signals = handle;
        self
    }

    fn enter(phase: Phase) {
        log::debug!("Script phase: {:?}", phase);
    }

    fn command(&self) -> clap::Command {
        let command = ScriptOptions::command().name(self.name.clone());
        match &self.about {
            Some(about) => command.about(about.clone()),
            None => command,
        }
    }

    /// Runs `body` with options parsed from `args` (the first item is the
    /// program name).
    ///
    /// Errors outside the handled taxonomy (I/O, prompts, invalid arguments
    /// raised from inside the body) are returned as fatal.
    pub fn run<I, T, F>(mut self, args: I, body: F) -> Result<Outcome, ScriptError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        F: FnOnce(&mut ScriptContext) -> Result<(), ScriptError>,
    {
        Self::enter(Phase::ParseConfig);
        let mut command = self.command();
        let parsed = command
            .try_get_matches_from_mut(args)
            .and_then(|matches| ScriptOptions::from_arg_matches(&matches));
        let options = match parsed {
            Ok(options) => options,
            Err(e) => {
                let invalid = e.use_stderr();
                e.print()?;
                Self::enter(Phase::Terminate);
                return Ok(if invalid {
                    Outcome::TerminatedByInvalidArguments
                } else {
                    Outcome::CompletedNormally
                });
            }
        };
        log::debug!("Script options parsed: {:?}", options);

        Self::enter(Phase::ApplyDefaults);
        let mut policy = options.to_policy(&self.defaults);
        let timed = options.timed(&self.defaults);

        Self::enter(Phase::ClientOverrides);
        if let Some(overrides) = self.overrides.take() {
            overrides(&mut policy);
        }

        Self::enter(Phase::ValidateArguments);
        let reporter = self
            .reporter
            .take()
            .unwrap_or_else(|| Box::new(ConsoleReporter) as Box<dyn Reporter>);
        if let Some(validator) = self.validator.take() {
            match validator(&options) {
                Ok(()) => {}
                Err(ScriptError::ArgumentsNotValid(message)) => {
                    Self::enter(Phase::PrintUsage);
                    reporter.event(EventKind::Error, &format!("invalid arguments: {}", message));
                    eprintln!("\n{}", command.render_usage());
                    Self::enter(Phase::Terminate);
                    return Ok(Outcome::TerminatedByInvalidArguments);
                }
                Err(other) => return Err(other),
            }
        }

        let mut ctx = ScriptContext::new(policy)?
            .with_reporter(reporter)
            .with_args(options.args.clone());
        if let Some(operator) = self.operator.take() {
            ctx = ctx.with_operator(operator);
        }
        if let Some(cwd) = self.cwd.take() {
            ctx = ctx.with_cwd(cwd);
        }

        if self.handle_signals {
            Self::enter(Phase::InstallSignalHandlers);
            ctx.install_signal_handlers()?;
        }

        let timer = if timed {
            Self::enter(Phase::StartTimer);
            Some(RunTimer::start())
        } else {
            None
        };

        Self::enter(Phase::RunBody);
        let result = body(&mut ctx).and_then(|()| ctx.checkpoint());
        let outcome = match result {
            Ok(()) => Outcome::CompletedNormally,
            Err(ScriptError::Aborted(scope)) => {
                log::debug!("Script body ended by a {} abort.", scope);
                if ctx.policy().show_echoes {
                    ctx.emit(EventKind::Echo, "user aborted");
                }
                Outcome::CompletedViaScriptAbort
            }
            Err(failure @ ScriptError::CommandFailure { .. }) => {
                if ctx.policy().show_errors {
                    ctx.emit(EventKind::Error, &format!("fatal: {}", failure));
                }
                Outcome::TerminatedByUnhandledCommandFailure
            }
            Err(other) => return Err(other),
        };

        if let Some(timer) = timer {
            Self::enter(Phase::ReportElapsed);
            ctx.emit(
                EventKind::Echo,
                &format!("finished `{}` in {}", self.name, timer.elapsed_text()),
            );
        }

        Self::enter(Phase::Terminate);
        log::debug!("Script '{}' ended: {:?}", self.name, outcome);
        Ok(outcome)
    }

    /// Runs `body` with the process's own arguments and exits with the
    /// outcome's code. Fatal errors are printed before exiting with status 1.
    pub fn run_and_exit<F>(self, body: F) -> !
    where
        F: FnOnce(&mut ScriptContext) -> Result<(), ScriptError>,
    {
        match self.run(std::env::args_os(), body) {
            Ok(outcome) => std::process::exit(outcome.exit_code()),
            Err(e) => {
                eprintln!("\n{}: {}", "Error".red().bold(), e);
                std::process::exit(EXIT_COMMAND_FAILURE);
            }
        }
    }
}
