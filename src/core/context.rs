// src/core/context.rs

//! The state of one script run.
//!
//! A [`ScriptContext`] owns everything the engine needs while a script body
//! runs: the baseline policy, the nesting depth, the abort router, the working
//! directory and the collaborators that show output and read operator input.
//! Command execution and sections are implemented on it in
//! `command_runner` and `section_runner`.

use crate::core::{
    abort_router::{AbortRouter, NestingDepth},
    error::ScriptError,
    output::{ConsoleReporter, Reporter},
    policy::ExecutionPolicy,
};
use crate::models::{AbortScope, EventKind};
use crate::system::{
    operator::{Operator, TerminalOperator},
    signals,
};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// One script run: baseline policy, nesting depth and collaborators.
///
/// Several contexts can live in the same process; none of them touches
/// process-wide state except the signal handlers installed by
/// [`ScriptContext::install_signal_handlers`].
///
/// The context drives its own runtime, so its methods must not be called from
/// inside another async runtime.
pub struct ScriptContext {
    pub(crate) policy: ExecutionPolicy,
    pub(crate) depth: NestingDepth,
    pub(crate) router: Arc<AbortRouter>,
    pub(crate) cwd: PathBuf,
    args: Vec<String>,
    pub(crate) reporter: Box<dyn Reporter>,
    pub(crate) operator: Box<dyn Operator>,
    signals: Option<JoinHandle<()>>,
    pub(crate) runtime: Runtime,
}

impl fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("policy", &self.policy)
            .field("depth", &self.depth.current())
            .field("cwd", &self.cwd)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl ScriptContext {
    /// Creates a context that reports to the console and asks the terminal,
    /// starting in the process's current directory.
    pub fn new(policy: ExecutionPolicy) -> Result<Self, ScriptError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("cmdflow-engine")
            .enable_all()
            .build()?;
        let depth = NestingDepth::new();
        let router = Arc::new(AbortRouter::new(depth.clone()));
        let operator = TerminalOperator::new(runtime.handle().clone());

        Ok(Self {
            policy,
            depth,
            router,
            cwd: std::env::current_dir()?,
            args: Vec::new(),
            reporter: Box::new(ConsoleReporter),
            operator: Box::new(operator),
            signals: None,
            runtime,
        })
    }

    /// Replaces the output collaborator.
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replaces the operator-input collaborator.
    pub fn with_operator(mut self, operator: Box<dyn Operator>) -> Self {
        self.operator = operator;
        self
    }

    /// Sets the positional arguments the script body can read.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Sets the directory commands start in.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Routes SIGINT/SIGQUIT (Ctrl-C/Ctrl-Break) to this context's abort router.
    pub fn install_signal_handlers(&mut self) -> Result<(), ScriptError> {
        if self.signals.is_none() {
            let handle = signals::install(self.runtime.handle(), Arc::clone(&self.router))?;
            self.signals = Some(handle);
        }
        Ok(())
    }

    // --- Accessors ---

    /// The script-wide baseline policy.
    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    /// How many sections are currently open.
    pub fn depth(&self) -> usize {
        self.depth.current()
    }

    /// The router interrupts are delivered to.
    pub fn router(&self) -> Arc<AbortRouter> {
        Arc::clone(&self.router)
    }

    /// The directory commands run in.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Positional arguments left over after option parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    // --- Text output ---

    pub(crate) fn emit(&self, kind: EventKind, text: &str) {
        self.reporter.event(kind, text);
    }

    /// Prints author text, if echoes are shown.
    pub fn echo(&mut self, text: impl AsRef<str>) -> Result<(), ScriptError> {
        self.checkpoint()?;
        if self.policy.show_echoes {
            self.emit(EventKind::Echo, text.as_ref());
        }
        Ok(())
    }

    /// Prints a header line, if headers are shown.
    pub fn header(&mut self, text: impl AsRef<str>) -> Result<(), ScriptError> {
        self.checkpoint()?;
        if self.policy.show_headers {
            self.emit(EventKind::Header, text.as_ref());
        }
        Ok(())
    }

    /// Prints an error line, if errors are shown.
    pub fn error(&mut self, text: impl AsRef<str>) -> Result<(), ScriptError> {
        self.checkpoint()?;
        if self.policy.show_errors {
            self.emit(EventKind::Error, text.as_ref());
        }
        Ok(())
    }

    // --- Aborts ---

    /// Surfaces an abort that arrived while no command was running.
    ///
    /// Command-scoped aborts have nothing left to cancel here, and a section
    /// abort that outlived every section is dropped.
    pub fn checkpoint(&self) -> Result<(), ScriptError> {
        match self.router.take_pending() {
            None | Some(AbortScope::Command) => Ok(()),
            Some(AbortScope::Section) if self.depth.current() == 0 => {
                log::debug!("Dropping section abort raised outside any section.");
                Ok(())
            }
            Some(scope) => Err(ScriptError::Aborted(scope)),
        }
    }

    // --- Navigation and input ---

    /// Moves the working directory for every later command. Runs even in
    /// dry-run mode, since the rest of the script depends on it.
    ///
    /// `~` and environment variables are expanded; relative paths resolve
    /// against the current working directory.
    pub fn change_directory(&mut self, path: &str) -> Result<PathBuf, ScriptError> {
        self.checkpoint()?;
        let expanded = shellexpand::full(path)
            .map_err(|e| ScriptError::PathExpansion(path.to_string(), e.to_string()))?;
        let target = self.cwd.join(&*expanded);

        let resolved =
            dunce::canonicalize(&target).map_err(|source| ScriptError::ChangeDirectory {
                path: target.clone(),
                source,
            })?;
        if !resolved.is_dir() {
            return Err(ScriptError::ChangeDirectory {
                path: resolved,
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        if self.policy.show_command {
            self.emit(EventKind::Command, &format!("cd {}", resolved.display()));
        }
        log::debug!("Working directory is now {}", resolved.display());
        self.cwd = resolved.clone();
        Ok(resolved)
    }

    /// Asks the operator a question and returns the single-token answer.
    ///
    /// An empty answer, end of input, or an elapsed `timeout` all yield
    /// `default` (or an empty string without one).
    pub fn ask(
        &mut self,
        question: &str,
        default: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<String, ScriptError> {
        self.checkpoint()?;
        let prompt = match default {
            Some(value) => format!("{} [{}]", question, value),
            None => question.to_string(),
        };
        let answer = self.operator.read_token(&prompt, timeout)?;
        let answer = answer.filter(|token| !token.is_empty());
        Ok(answer.unwrap_or_else(|| default.unwrap_or_default().to_string()))
    }
}

impl Drop for ScriptContext {
    fn drop(&mut self) {
        if let Some(listener) = self.signals.take() {
            listener.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Interrupt, Verbosity};
    use crate::test_support::{Recorder, ScriptedOperator, SlowInput, context};
    use std::time::Instant;

    #[test]
    fn test_echo_follows_verbosity() {
        let recorder = Recorder::new();
        let mut ctx = context(Verbosity::Errors, &recorder);
        ctx.echo("hidden").unwrap();
        ctx.header("hidden too").unwrap();
        ctx.error("shown").unwrap();
        assert_eq!(recorder.events(), vec![(EventKind::Error, "shown".to_string())]);
    }

    #[test]
    fn test_checkpoint_surfaces_script_abort() {
        let recorder = Recorder::new();
        let mut ctx = context(Verbosity::All, &recorder);
        ctx.router().deliver(Interrupt::Hard);
        let err = ctx.echo("never printed").unwrap_err();
        assert!(matches!(err, ScriptError::Aborted(AbortScope::Script)));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_change_directory_runs_in_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("inner")).unwrap();
        let recorder = Recorder::new();
        let mut ctx = context(Verbosity::Cmds, &recorder).with_cwd(dir.path());
        ctx.policy = ctx.policy.clone().with_dry_run(true);

        let moved = ctx.change_directory("inner").unwrap();
        assert_eq!(moved, dunce::canonicalize(dir.path().join("inner")).unwrap());
        assert_eq!(ctx.cwd(), moved.as_path());
        assert_eq!(ctx.output("pwd").unwrap(), moved.display().to_string());
    }

    #[test]
    fn test_change_directory_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::new();
        let mut ctx = context(Verbosity::Cmds, &recorder).with_cwd(dir.path());
        let err = ctx.change_directory("nope").unwrap_err();
        assert!(matches!(err, ScriptError::ChangeDirectory { .. }));
        assert_eq!(ctx.cwd(), dir.path());
    }

    #[test]
    fn test_ask_substitutes_default() {
        let recorder = Recorder::new();
        let operator = ScriptedOperator::with_tokens(vec![None, Some(String::new()), Some("blue".into())]);
        let mut ctx = context(Verbosity::Cmds, &recorder).with_operator(Box::new(operator));
        let timeout = Some(Duration::from_millis(10));
        assert_eq!(ctx.ask("Color?", Some("red"), timeout).unwrap(), "red");
        assert_eq!(ctx.ask("Color?", Some("red"), None).unwrap(), "red");
        assert_eq!(ctx.ask("Color?", None, None).unwrap(), "blue");
    }

    #[test]
    fn test_timed_ask_lets_context_shut_down() {
        let recorder = Recorder::new();
        let ctx = context(Verbosity::Cmds, &recorder);
        let input = io::BufReader::new(SlowInput::new(Duration::from_secs(10), "blue\n"));
        let operator = TerminalOperator::with_input(ctx.runtime.handle().clone(), input);
        let mut ctx = ctx.with_operator(Box::new(operator));

        let started = Instant::now();
        let answer = ctx.ask("Color?", Some("red"), Some(Duration::from_millis(100)));
        assert_eq!(answer.unwrap(), "red");
        drop(ctx);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
