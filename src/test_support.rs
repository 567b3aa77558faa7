// src/test_support.rs

//! Collaborators for unit tests: a reporter that records events, an
//! operator that answers from a script and operator input that arrives late.

use crate::core::{context::ScriptContext, output::Reporter, policy::ExecutionPolicy};
use crate::models::{Choice, EventKind, Verbosity};
use crate::system::operator::{Operator, OperatorError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Cursor, Read};
use std::rc::Rc;
use std::time::Duration;

/// Shared log of every event a context emitted.
#[derive(Debug, Clone, Default)]
pub(crate) struct Recorder(Rc<RefCell<Vec<(EventKind, String)>>>);

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn events(&self) -> Vec<(EventKind, String)> {
        self.0.borrow().clone()
    }

    pub(crate) fn texts(&self, kind: EventKind) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl Reporter for Recorder {
    fn event(&self, kind: EventKind, text: &str) {
        self.0.borrow_mut().push((kind, text.to_string()));
    }
}

/// Answers prompts from queues; panics when a queue runs dry.
#[derive(Debug, Default)]
pub(crate) struct ScriptedOperator {
    choices: VecDeque<Choice>,
    tokens: VecDeque<Option<String>>,
    pub(crate) asked: Rc<RefCell<Vec<String>>>,
}

impl ScriptedOperator {
    pub(crate) fn with_choices(choices: Vec<Choice>) -> Self {
        Self {
            choices: choices.into(),
            ..Self::default()
        }
    }

    pub(crate) fn with_tokens(tokens: Vec<Option<String>>) -> Self {
        Self {
            tokens: tokens.into(),
            ..Self::default()
        }
    }
}

impl Operator for ScriptedOperator {
    fn confirm(&mut self, command: &str) -> Result<Choice, OperatorError> {
        self.asked.borrow_mut().push(command.to_string());
        Ok(self.choices.pop_front().expect("no scripted choice left"))
    }

    fn read_token(
        &mut self,
        prompt: &str,
        _timeout: Option<Duration>,
    ) -> Result<Option<String>, OperatorError> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.tokens.pop_front().expect("no scripted token left"))
    }
}

/// A context at `verbosity` that reports into `recorder` and never reads the terminal.
pub(crate) fn context(verbosity: Verbosity, recorder: &Recorder) -> ScriptContext {
    ScriptContext::new(ExecutionPolicy::for_level(verbosity))
        .expect("engine runtime")
        .with_reporter(Box::new(recorder.clone()))
        .with_operator(Box::new(ScriptedOperator::default()))
}

/// Input that blocks for `delay` before yielding `text`, like an operator
/// who is slow to type.
#[derive(Debug)]
pub(crate) struct SlowInput {
    delay: Duration,
    text: Cursor<Vec<u8>>,
}

impl SlowInput {
    pub(crate) fn new(delay: Duration, text: &str) -> Self {
        Self {
            delay,
            text: Cursor::new(text.as_bytes().to_vec()),
        }
    }
}

impl Read for SlowInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.delay.is_zero() {
            std::thread::sleep(std::mem::take(&mut self.delay));
        }
        self.text.read(buf)
    }
}
