// src/core/command_runner.rs

use crate::constants::{CONFIRM_HELP, EXIT_OPERATOR_QUIT};
use crate::core::{context::ScriptContext, error::ScriptError, policy::CommandOptions};
use crate::models::{AbortScope, Choice, CommandResult, EventKind};
use crate::system::executor::{self, Completion};

impl ScriptContext {
    /// Runs `command` with the baseline policy.
    pub fn run(&mut self, command: &str) -> Result<CommandResult, ScriptError> {
        self.run_with(command, &CommandOptions::new())
    }

    /// Runs `command` through the host shell with `options` merged over the
    /// baseline policy.
    ///
    /// Skipped and dry-run commands never reach the shell and return an empty
    /// successful result. A command cancelled by a command-scoped abort also
    /// returns an empty successful result. A non-zero exit fails with
    /// [`ScriptError::CommandFailure`] unless the effective policy continues
    /// on error.
    pub fn run_with(
        &mut self,
        command: &str,
        options: &CommandOptions,
    ) -> Result<CommandResult, ScriptError> {
        self.checkpoint()?;
        let mut policy = self.policy.resolve(options);

        if policy.interactive {
            match self.confirm(command)? {
                Choice::Skip => policy.skip = true,
                Choice::RunAll => {
                    self.policy.interactive = false;
                }
                Choice::DryRun => {
                    self.policy = self.policy.clone().with_dry_run(true);
                    self.policy.interactive = false;
                    policy = self.policy.resolve(options);
                }
                Choice::Run | Choice::Quit | Choice::Help => {}
            }
        }

        if policy.should_skip() {
            if policy.show_command {
                self.emit(EventKind::SkippedCommand, command);
            }
            return Ok(CommandResult::empty());
        }

        if policy.show_command {
            self.emit(EventKind::Command, command);
        }

        let completion = self.runtime.block_on(executor::run_shell(
            command,
            &self.cwd,
            policy.capture_output,
            &self.router,
        ))?;
        let result = match completion {
            Completion::Finished(result) => result,
            Completion::Aborted(AbortScope::Command) => return Ok(self.command_aborted(command)),
            // Routed while a section was open, but that section has since closed.
            Completion::Aborted(AbortScope::Section) if self.depth.current() == 0 => {
                return Ok(self.command_aborted(command));
            }
            Completion::Aborted(scope) => return Err(ScriptError::Aborted(scope)),
        };

        if policy.capture_output && policy.show_command_output {
            self.emit_captured(EventKind::CommandOutput, &result);
        }

        if !result.success() {
            if policy.show_errors {
                self.emit(
                    EventKind::Error,
                    &format!("`{}` exited with status {}", command, result.exit_status),
                );
                self.emit_captured(EventKind::Error, &result);
            }
            if !policy.continue_on_error {
                return Err(ScriptError::CommandFailure {
                    command: command.to_string(),
                    status: result.exit_status,
                });
            }
        }

        Ok(result)
    }

    /// Runs `command` and returns its standard output, without showing
    /// anything and even in dry-run mode.
    pub fn output(&mut self, command: &str) -> Result<String, ScriptError> {
        self.output_with(command, CommandOptions::new())
    }

    /// Like [`ScriptContext::output`], with explicit overrides taking
    /// precedence over the harvesting defaults.
    pub fn output_with(
        &mut self,
        command: &str,
        options: CommandOptions,
    ) -> Result<String, ScriptError> {
        let result = self.run_with(command, &options.harvest())?;
        Ok(result.stdout)
    }

    /// Runs `command` and returns its exit status, without showing anything
    /// and even in dry-run mode. A non-zero status is returned, not raised.
    pub fn status(&mut self, command: &str) -> Result<i32, ScriptError> {
        self.status_with(command, CommandOptions::new())
    }

    /// Like [`ScriptContext::status`], with explicit overrides taking
    /// precedence over the harvesting defaults.
    pub fn status_with(
        &mut self,
        command: &str,
        mut options: CommandOptions,
    ) -> Result<i32, ScriptError> {
        options.ignore_nonzero_exit.get_or_insert(true);
        let result = self.run_with(command, &options.harvest())?;
        Ok(result.exit_status)
    }

    /// Reports a command cut short by the operator. The script carries on as
    /// if it had succeeded with no output.
    fn command_aborted(&self, command: &str) -> CommandResult {
        log::debug!("Command '{}' aborted by operator.", command);
        if self.policy.show_echoes {
            self.emit(EventKind::Echo, &format!("aborted `{}`", command));
        }
        CommandResult::empty()
    }

    fn emit_captured(&self, kind: EventKind, result: &CommandResult) {
        if !result.stdout.is_empty() {
            self.emit(kind, &result.stdout);
        }
        let stderr = executor::chomp(result.stderr.clone());
        if !stderr.is_empty() {
            self.emit(kind, &stderr);
        }
    }

    /// Asks the operator about `command` until the answer is one the runner
    /// acts on. Quitting ends the process on the spot.
    fn confirm(&mut self, command: &str) -> Result<Choice, ScriptError> {
        loop {
            match self.operator.confirm(command)? {
                Choice::Help => self.emit(EventKind::Echo, CONFIRM_HELP),
                Choice::Quit => {
                    log::debug!("Operator quit at '{}'.", command);
                    std::process::exit(EXIT_OPERATOR_QUIT);
                }
                choice => return Ok(choice),
            }
        }
    }
}
