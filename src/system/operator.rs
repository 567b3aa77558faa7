// src/system/operator.rs

use crate::models::Choice;
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Failures while talking to the operator.
#[derive(Error, Debug)]
pub enum OperatorError {
    /// The interactive prompt could not be shown or read.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    /// Standard input could not be read.
    #[error("Could not read operator input: {0}")]
    Io(#[from] io::Error),
}

/// The person running the script.
pub trait Operator {
    /// Asks whether `command` should run. Implementations keep asking until
    /// they get a recognized answer.
    fn confirm(&mut self, command: &str) -> Result<Choice, OperatorError>;

    /// Reads a single token after showing `prompt`. Returns `Ok(None)` when
    /// `timeout` elapses or input is exhausted.
    fn read_token(
        &mut self,
        prompt: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<String>, OperatorError>;
}

/// Talks to the operator on the controlling terminal.
///
/// Typed answers are read line by line on a dedicated thread and handed over
/// through a channel, so a prompt that times out leaves nothing blocking the
/// runtime. A line typed after its prompt gave up answers the next one.
pub struct TerminalOperator {
    runtime: Handle,
    input: Option<Box<dyn BufRead + Send>>,
    lines: Option<UnboundedReceiver<io::Result<String>>>,
}

impl fmt::Debug for TerminalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalOperator")
            .field("reading", &self.lines.is_some())
            .finish_non_exhaustive()
    }
}

impl TerminalOperator {
    /// Creates an operator reading answers from stdin, whose timed reads run
    /// on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self::with_input(runtime, BufReader::new(io::stdin()))
    }

    /// Creates an operator reading answers from `input` instead of stdin.
    /// Nothing is read until the first [`Operator::read_token`].
    pub fn with_input(runtime: Handle, input: impl BufRead + Send + 'static) -> Self {
        Self {
            runtime,
            input: Some(Box::new(input)),
            lines: None,
        }
    }

    fn lines(&mut self) -> io::Result<&mut UnboundedReceiver<io::Result<String>>> {
        if let Some(input) = self.input.take() {
            self.lines = Some(spawn_reader(input)?);
        }
        match self.lines.as_mut() {
            Some(lines) => Ok(lines),
            None => Err(io::Error::other("operator input reader is gone")),
        }
    }
}

/// Forwards lines from `input` until it is exhausted or nobody listens.
fn spawn_reader(
    input: Box<dyn BufRead + Send>,
) -> io::Result<UnboundedReceiver<io::Result<String>>> {
    let (sender, receiver) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("cmdflow-input".to_string())
        .spawn(move || {
            for line in input.lines() {
                let failed = line.is_err();
                if sender.send(line).is_err() || failed {
                    break;
                }
            }
            log::debug!("Operator input closed.");
        })?;
    Ok(receiver)
}

impl Operator for TerminalOperator {
    fn confirm(&mut self, command: &str) -> Result<Choice, OperatorError> {
        loop {
            let answer: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("Run `{}`? [Y/n/a/d/q/h]", command))
                .default("y".to_string())
                .show_default(false)
                .validate_with(|input: &String| -> Result<(), &'static str> {
                    Choice::parse(input)
                        .map(|_| ())
                        .ok_or("Unrecognized answer, type h for help")
                })
                .interact_text()?;

            if let Some(choice) = Choice::parse(&answer) {
                return Ok(choice);
            }
        }
    }

    fn read_token(
        &mut self,
        prompt: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<String>, OperatorError> {
        eprint!("{} ", prompt.bold());
        io::stderr().flush()?;

        let runtime = self.runtime.clone();
        let lines = self.lines()?;
        let received = runtime.block_on(async {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, lines.recv()).await {
                    Ok(read) => read,
                    Err(_) => {
                        log::debug!("Prompt timed out after {:?}", limit);
                        None
                    }
                },
                None => lines.recv().await,
            }
        });
        let line = received.transpose()?;

        if line.is_none() {
            eprintln!();
        }
        Ok(line.map(|l| l.split_whitespace().next().unwrap_or_default().to_string()))
    }
}
