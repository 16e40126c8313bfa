use std::time::Duration;

use crate::config::ClientSettings;

/// Parameters of the geometric wait between status queries.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
            factor: 1.5,
        }
    }
}

impl From<&ClientSettings> for BackoffConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            initial_interval: Duration::from_secs_f64(settings.initial_interval),
            max_interval: Duration::from_secs_f64(settings.max_interval),
            factor: settings.backoff_factor,
        }
    }
}

impl BackoffConfig {
    /// `min(current * factor, max_interval)`. Saturates at the cap instead
    /// of overflowing.
    pub fn next_interval(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.factor)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }

    pub fn start(&self) -> Backoff {
        Backoff {
            current: self.initial_interval,
            config: self.clone(),
        }
    }
}

/// Running backoff state. Iterating yields the infinite interval sequence
/// starting at `initial_interval`.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    config: BackoffConfig,
}

impl Backoff {
    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn advance(&mut self) {
        self.current = self.config.next_interval(self.current);
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.current;
        self.advance();
        Some(current)
    }
}
