// src/bin/cmdflow.rs

use anyhow::{Context, Result};
use cmdflow::constants::EXIT_COMMAND_FAILURE;
use cmdflow::{Outcome, ScriptError, ScriptRunner};
use colored::Colorize;

/// Runs each argument as a shell command line, in order.
///
/// An argument of the form `[name]` opens a section that collects the commands
/// after it, up to the next `[name]`, so a failure or Ctrl+C in one group
/// does not stop the rest.
fn main() {
    env_logger::init();

    match run_cli() {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("\n{}: {:#}", "Error".red().bold(), e);
            std::process::exit(EXIT_COMMAND_FAILURE);
        }
    }
}

fn run_cli() -> Result<Outcome> {
    let outcome = ScriptRunner::new("cmdflow")
        .about("Run shell commands with dry-run, confirmation and scoped interrupts.")
        .validate(|options| {
            if options.args.is_empty() {
                Err(ScriptError::invalid_arguments("no commands given"))
            } else {
                Ok(())
            }
        })
        .run(std::env::args_os(), |ctx| {
            let args = ctx.args().to_vec();
            for (name, commands) in group_by_section(&args) {
                match name {
                    Some(name) => ctx.section(name, |s| {
                        for command in &commands {
                            s.run(command)?;
                        }
                        Ok(())
                    })?,
                    None => {
                        for command in &commands {
                            ctx.run(command)?;
                        }
                    }
                }
            }
            Ok(())
        })
        .context("cmdflow could not run its commands")?;
    log::debug!("Finished with {:?}", outcome);
    Ok(outcome)
}

/// Splits the arguments into runs of commands, each optionally headed by a
/// `[section]` marker.
fn group_by_section(args: &[String]) -> Vec<(Option<&str>, Vec<&str>)> {
    let mut groups: Vec<(Option<&str>, Vec<&str>)> = vec![(None, Vec::new())];
    for arg in args {
        let marker = arg
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'));
        match marker {
            Some(name) => groups.push((Some(name), Vec::new())),
            None => {
                if let Some((_, commands)) = groups.last_mut() {
                    commands.push(arg.as_str());
                }
            }
        }
    }
    groups.retain(|(name, commands)| name.is_some() || !commands.is_empty());
    groups
}
