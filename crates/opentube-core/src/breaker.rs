use std::time::{Duration, Instant};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests flow normally.
    Closed,
    /// Requests are rejected until the cooldown elapses.
    Open,
    /// Cooldown elapsed; the next request probes the backend.
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long the circuit stays open before allowing a probe.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Failure-tracking value object guarding calls to a flaky backend.
///
/// Holds no clock of its own: callers pass `Instant::now()` (or a synthetic
/// instant in tests) so transitions are deterministic and testable. All state
/// lives in the value; wrap it in a mutex to share across tasks.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            config,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Whether a request may proceed at `now`. An open circuit whose cooldown
    /// has elapsed transitions to half-open and admits the probe request.
    pub fn should_allow(&mut self, now: Instant) -> bool {
        match self.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled_down = self
                    .opened_at
                    .map(|t| now.duration_since(t) >= self.config.cooldown)
                    .unwrap_or(true);
                if cooled_down {
                    self.state = CircuitState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call. Any state collapses back to closed.
    pub fn record_success(&mut self) {
        self.state = CircuitState::Closed;
        self.consecutive_failures = 0;
        self.opened_at = None;
    }

    /// Record a failed call at `now`. A half-open probe failure reopens the
    /// circuit immediately; closed-state failures open it at the threshold.
    pub fn record_failure(&mut self, now: Instant) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        match self.state {
            CircuitState::HalfOpen => {
                self.state = CircuitState::Open;
                self.opened_at = Some(now);
            }
            CircuitState::Closed => {
                if self.consecutive_failures >= self.config.failure_threshold {
                    self.state = CircuitState::Open;
                    self.opened_at = Some(now);
                }
            }
            CircuitState::Open => {}
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown_ms: u64) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            cooldown: Duration::from_millis(cooldown_ms),
        })
    }

    #[test]
    fn test_opens_after_threshold_failures() {
        let now = Instant::now();
        let mut b = breaker(3, 1000);

        b.record_failure(now);
        b.record_failure(now);
        assert_eq!(b.state(), CircuitState::Closed);
        assert!(b.should_allow(now));

        b.record_failure(now);
        assert_eq!(b.state(), CircuitState::Open);
        assert!(!b.should_allow(now));
    }

    #[test]
    fn test_success_resets_failure_count() {
        let now = Instant::now();
        let mut b = breaker(3, 1000);

        b.record_failure(now);
        b.record_failure(now);
        b.record_success();
        b.record_failure(now);
        b.record_failure(now);
        assert_eq!(b.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_after_cooldown() {
        let now = Instant::now();
        let mut b = breaker(1, 500);

        b.record_failure(now);
        assert!(!b.should_allow(now));
        assert!(!b.should_allow(now + Duration::from_millis(499)));

        assert!(b.should_allow(now + Duration::from_millis(500)));
        assert_eq!(b.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn test_half_open_probe_failure_reopens() {
        let now = Instant::now();
        let mut b = breaker(1, 500);

        b.record_failure(now);
        let probe_at = now + Duration::from_millis(600);
        assert!(b.should_allow(probe_at));

        b.record_failure(probe_at);
        assert_eq!(b.state(), CircuitState::Open);
        assert!(!b.should_allow(probe_at + Duration::from_millis(100)));
        assert!(b.should_allow(probe_at + Duration::from_millis(500)));
    }

    #[test]
    fn test_half_open_probe_success_closes() {
        let now = Instant::now();
        let mut b = breaker(1, 500);

        b.record_failure(now);
        assert!(b.should_allow(now + Duration::from_millis(501)));

        b.record_success();
        assert_eq!(b.state(), CircuitState::Closed);
        assert_eq!(b.consecutive_failures(), 0);
    }
}
