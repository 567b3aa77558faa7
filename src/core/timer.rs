// src/core/timer.rs

use std::time::{Duration, Instant};

/// Measures how long a script body takes.
#[derive(Debug, Clone, Copy)]
pub struct RunTimer {
    start: Instant,
}

impl RunTimer {
    /// Starts timing now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since [`RunTimer::start`], formatted for people.
    pub fn elapsed_text(&self) -> String {
        format_duration(self.start.elapsed())
    }
}

/// Formats as `12.3s` below a minute and `4m 5.6s` above.
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let tenths = d.subsec_millis() / 100;
    if total_secs < 60 {
        format!("{total_secs}.{tenths}s")
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{mins}m {secs}.{tenths}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0.0s");
        assert_eq!(format_duration(Duration::from_millis(12_345)), "12.3s");
        assert_eq!(format_duration(Duration::from_millis(245_600)), "4m 5.6s");
    }
}
