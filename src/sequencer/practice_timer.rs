// Practice timer - Total time spent playing, across stop/start

use std::time::Duration;

/// Accumulates playing time against the session clock
///
/// Times are clock readings (`Timer::now`), so the same timer works on
/// virtual and wall-clock time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PracticeTimer {
    accumulated: Duration,
    running_since: Option<Duration>,
}

impl PracticeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Start accumulating. No-op when already running.
    pub fn start(&mut self, now: Duration) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Stop accumulating, keeping the total
    pub fn stop(&mut self, now: Duration) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_sub(since);
        }
    }

    /// Total practice time as of `now`
    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_sub(since),
            None => self.accumulated,
        }
    }

    /// Back to zero; a running timer keeps running from `now`
    pub fn reset(&mut self, now: Duration) {
        self.accumulated = Duration::ZERO;
        if self.running_since.is_some() {
            self.running_since = Some(now);
        }
    }

    /// Elapsed time as `HH:MM:SS`
    pub fn display(&self, now: Duration) -> String {
        format_hms(self.elapsed(now))
    }
}

/// Format a duration as `HH:MM:SS`, truncating fractions of a second
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
