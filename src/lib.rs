//! Compose shell commands into script-like programs.
//!
//! A script body receives a [`ScriptContext`] and runs commands, echoes and
//! named sections through it. The engine decides for each unit of work
//! whether it runs (dry-run, skip, force, interactive confirmation), how its
//! output is captured or streamed, how failures propagate, and which unit an
//! operator interrupt cancels.
//!
//! ```no_run
//! use cmdflow::{CommandOptions, ScriptRunner};
//!
//! ScriptRunner::new("deploy").run_and_exit(|ctx| {
//!     let branch = ctx.output("git rev-parse --abbrev-ref HEAD")?;
//!     ctx.echo(format!("deploying {branch}"))?;
//!     ctx.section("build", |s| {
//!         s.run("cargo build --release")?;
//!         s.run_with("strip target/release/app", &CommandOptions::new().ignore_nonzero_exit(true))?;
//!         Ok(())
//!     })?;
//!     ctx.run("scp target/release/app host:/srv/app")?;
//!     Ok(())
//! });
//! ```

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::cli::{ScriptDefaults, ScriptOptions};
pub use crate::core::{
    context::ScriptContext,
    error::ScriptError,
    output::{ConsoleReporter, Reporter},
    policy::{CommandOptions, ExecutionPolicy},
    script_runner::{Outcome, ScriptRunner},
};
pub use crate::models::{AbortScope, CommandResult, EventKind, Verbosity};
