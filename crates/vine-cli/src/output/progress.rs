//! Progress bar for long-running operations.
//!
//! Used while resolving many dependency trees concurrently.

use std::time::{Duration, Instant};

/// Simple progress bar for terminal output
pub struct ProgressBar {
    total: u64,
    current: u64,
    last_update: Instant,
    message: String,
}

impl ProgressBar {
    /// Create a new progress bar
    pub fn new(total: u64, message: String) -> Self {
        Self {
            total,
            current: 0,
            last_update: Instant::now(),
            message,
        }
    }

    /// Increment progress by 1
    pub fn increment(&mut self) {
        self.current += 1;
        let now = Instant::now();

        // Only update display every 100ms to avoid flickering
        if now.duration_since(self.last_update) > Duration::from_millis(100) {
            self.display();
            self.last_update = now;
        }
    }

    /// Finish the progress bar
    pub fn finish(&self) {
        self.display();
        println!();
    }

    /// Display the current progress
    fn display(&self) {
        let percentage = if self.total > 0 {
            (self.current * 100) / self.total
        } else {
            0
        };

        print!(
            "\r{} [{}/{}] {}%",
            self.message, self.current, self.total, percentage
        );

        use std::io::{self, Write};
        let _ = io::stdout().flush();
    }
}
