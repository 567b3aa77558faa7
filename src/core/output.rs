// src/core/output.rs

use crate::models::EventKind;
use colored::Colorize;

/// Receives every line the engine decides to show.
///
/// The engine has already applied the display switches by the time an event
/// arrives; a reporter only decides how it looks.
pub trait Reporter {
    /// Shows `text` rendered for `kind`.
    fn event(&self, kind: EventKind, text: &str);
}

/// Renders events on the terminal with ANSI colors.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn event(&self, kind: EventKind, text: &str) {
        match kind {
            EventKind::Command => println!("{} {}", "→".blue(), text.green()),
            EventKind::SkippedCommand => {
                println!("{} {}", "⊘".dimmed(), text.dimmed().strikethrough());
            }
            EventKind::Echo => println!("{}", text),
            EventKind::Header => println!("\n{}", format!("── {} ──", text).yellow().bold()),
            EventKind::Error => eprintln!("{}", text.red()),
            EventKind::CommandOutput => println!("{}", text),
        }
    }
}
