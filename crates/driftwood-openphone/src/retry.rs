use std::time::Duration;

/// Exponential backoff: `multiplier * 2^(attempt - 1)`, clamped to
/// `[min, max]`, for at most `max_tries` attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub multiplier: Duration,
    pub min: Duration,
    pub max: Duration,
    pub max_tries: u32,
}

impl Backoff {
    /// Policy for API requests (send and status lookups).
    pub const fn request() -> Self {
        Self {
            multiplier: Duration::from_secs(1),
            min: Duration::from_secs(2),
            max: Duration::from_secs(30),
            max_tries: 5,
        }
    }

    /// Policy for waiting on a queued or sent message to reach a terminal
    /// status.
    pub const fn delivery_poll() -> Self {
        Self {
            multiplier: Duration::from_secs(1),
            min: Duration::from_secs(1),
            max: Duration::from_secs(10),
            max_tries: 10,
        }
    }

    /// No waiting between attempts.
    pub const fn immediate(max_tries: u32) -> Self {
        Self {
            multiplier: Duration::ZERO,
            min: Duration::ZERO,
            max: Duration::ZERO,
            max_tries,
        }
    }

    /// Delay after the given 1-based attempt failed.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.multiplier
            .saturating_mul(factor)
            .clamp(self.min, self.max.max(self.min))
    }
}
