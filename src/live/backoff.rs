use rand::Rng;
use tokio::time::Duration;

/// Reconnect backoff for the push channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconnectConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_factor: f64,
    /// `None` keeps dialing forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 250,
            max_delay_ms: 8000,
            jitter_factor: 0.2,
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            base_delay_ms: env_parse("RECONNECT_BASE_MS").unwrap_or(d.base_delay_ms),
            max_delay_ms: env_parse("RECONNECT_MAX_MS").unwrap_or(d.max_delay_ms),
            jitter_factor: env_parse("RECONNECT_JITTER").unwrap_or(d.jitter_factor),
            max_attempts: env_parse("RECONNECT_MAX_ATTEMPTS"),
        }
    }

    /// Exponential backoff with jitter. `attempt` counts failed dials since
    /// the last successful connection, starting at 0.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms as f64 * 2.0_f64.powi(attempt.min(30) as i32);
        let clamped = base.min(self.max_delay_ms as f64);

        // ±jitter_factor of the delay
        let jitter_range = clamped * self.jitter_factor;
        let jitter: f64 = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        let final_delay = (clamped + jitter).max(0.0);

        Duration::from_millis(final_delay as u64)
    }

    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.map(|max| attempt >= max).unwrap_or(false)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
