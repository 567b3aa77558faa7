// src/models.rs

//! Plain data shared by every layer of the engine: verbosity levels, command
//! results, abort scopes and the output event categories.

use clap::ValueEnum;
use std::fmt;

// --- VERBOSITY ---

/// How much the engine shows while a script runs.
///
/// Levels are ordered: every display switch enabled at one level stays enabled
/// at all higher levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, ValueEnum)]
pub enum Verbosity {
    /// Nothing at all.
    Silent = 0,
    /// Only failures.
    Errors = 1,
    /// Failures, echoes and section headers.
    Echoes = 2,
    /// Everything above plus the command lines being run.
    #[default]
    Cmds = 3,
    /// Everything above plus captured command output.
    All = 4,
    /// Everything, ignoring per-command display hints.
    Debug = 5,
}

impl Verbosity {
    /// All levels in ascending order.
    pub const ALL: [Self; 6] = [
        Self::Silent,
        Self::Errors,
        Self::Echoes,
        Self::Cmds,
        Self::All,
        Self::Debug,
    ];
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Silent => "silent",
            Self::Errors => "errors",
            Self::Echoes => "echoes",
            Self::Cmds => "cmds",
            Self::All => "all",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

// --- COMMAND RESULTS ---

/// What one command invocation produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    /// Process exit code. `0` is success; negative values mean the command
    /// never launched.
    pub exit_status: i32,
    /// Captured standard output, minus at most one trailing line terminator.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandResult {
    /// The result reported for commands that were skipped, dry-run, or
    /// cancelled by a command-scoped abort.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the command exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

// --- ABORTS ---

/// How far an operator interrupt reaches.
///
/// Variants are ordered by severity so that a pending abort is never
/// downgraded by a later, weaker one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AbortScope {
    /// Cancel the running command only.
    Command,
    /// Cancel the innermost open section.
    Section,
    /// Cancel the whole script body.
    Script,
}

impl fmt::Display for AbortScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Command => "command",
            Self::Section => "section",
            Self::Script => "script",
        };
        f.write_str(name)
    }
}

/// The two interrupt strengths the host can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// An ordinary interrupt (SIGINT / Ctrl-C). Scoped by nesting depth.
    Soft,
    /// The escape hatch (SIGQUIT / Ctrl-Break). Always aborts the script.
    Hard,
}

// --- OUTPUT EVENTS ---

/// Semantic category of a line handed to the [`Reporter`](crate::core::output::Reporter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A command about to run.
    Command,
    /// A command that was not run (skip or dry-run).
    SkippedCommand,
    /// Free text from the script author.
    Echo,
    /// A section title.
    Header,
    /// A failure report.
    Error,
    /// Output captured from a command.
    CommandOutput,
}

// --- INTERACTIVE CONFIRMATION ---

/// The operator's answer when asked whether to run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Run this command.
    Run,
    /// Do not run this command.
    Skip,
    /// Run this and every remaining command without asking.
    RunAll,
    /// Switch this and every remaining command to dry-run.
    DryRun,
    /// Terminate the whole process right away.
    Quit,
    /// Show what the answers mean, then ask again.
    Help,
}

impl Choice {
    /// Parses one operator token. An empty answer means [`Choice::Run`].
    /// Returns `None` for anything unrecognized so the caller can ask again.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "" | "y" | "yes" | "r" | "run" => Some(Self::Run),
            "n" | "no" | "s" | "skip" => Some(Self::Skip),
            "a" | "all" => Some(Self::RunAll),
            "d" | "dry" | "dry-run" => Some(Self::DryRun),
            "q" | "quit" => Some(Self::Quit),
            "h" | "help" | "?" => Some(Self::Help),
            _ => None,
        }
    }
}
