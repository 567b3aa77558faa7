// src/core/section_runner.rs

use crate::core::{context::ScriptContext, error::ScriptError};
use crate::models::{AbortScope, EventKind};

impl ScriptContext {
    /// Runs `body` as a named section.
    ///
    /// The section absorbs its own failures: a section-scoped abort or a
    /// command failure inside `body` ends the section, is reported, and the
    /// script carries on after it. Script-scoped aborts and every other error
    /// propagate.
    pub fn section<F>(&mut self, name: &str, body: F) -> Result<(), ScriptError>
    where
        F: FnOnce(&mut Self) -> Result<(), ScriptError>,
    {
        self.checkpoint()?;
        if !name.is_empty() && self.policy.show_headers {
            self.emit(EventKind::Header, name);
        }
        let label = if name.is_empty() { "section" } else { name };

        let outcome = {
            let _level = self.depth.enter();
            body(self).and_then(|()| self.checkpoint())
        };

        match outcome {
            Ok(()) => {
                if self.policy.show_echoes {
                    self.emit(EventKind::Echo, &format!("done with `{}`", label));
                }
                Ok(())
            }
            Err(ScriptError::Aborted(AbortScope::Section)) => {
                log::debug!("Section '{}' aborted by operator.", label);
                if self.policy.show_echoes {
                    self.emit(EventKind::Echo, &format!("`{}` aborted by operator", label));
                }
                Ok(())
            }
            Err(failure @ ScriptError::CommandFailure { .. }) => {
                log::debug!("Section '{}' stopped: {}", label, failure);
                if self.policy.show_errors {
                    self.emit(
                        EventKind::Error,
                        &format!("section `{}` aborted: {}", label, failure),
                    );
                }
                Ok(())
            }
            Err(other) => Err(other),
        }
    }
}
