use std::time::Duration;

/// Wait applied before retrying after a timed-out request
pub const DEFAULT_TIMEOUT_BACKOFF: Duration = Duration::from_secs(5);

/// How a single statistics request failed, as seen by the retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Response arrived with a non-200 status
    BadStatus,
    /// Request exceeded the configured timeout
    TimedOut,
    /// Any other transport-level failure (DNS, connect, TLS, body read)
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { backoff: Duration },
    GiveUp,
}

/// Retry rules for the statistics endpoint. Pure decision logic, so the
/// schedule can be tested without sleeping or a live server.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub timeout_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            timeout_backoff: DEFAULT_TIMEOUT_BACKOFF,
        }
    }

    /// Decide what to do after `attempts_made` attempts have failed, the
    /// latest with `failure`. Transport failures other than timeouts are
    /// permanent for the article; bad statuses retry without delay, timeouts
    /// retry after a fixed backoff, and both count toward the ceiling.
    pub fn decide(&self, attempts_made: usize, failure: AttemptFailure) -> RetryDecision {
        match failure {
            AttemptFailure::Network => RetryDecision::GiveUp,
            _ if attempts_made >= self.max_attempts => RetryDecision::GiveUp,
            AttemptFailure::TimedOut => RetryDecision::Retry {
                backoff: self.timeout_backoff,
            },
            AttemptFailure::BadStatus => RetryDecision::Retry {
                backoff: Duration::ZERO,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_retries_without_backoff() {
        let policy = RetryPolicy::new(3);
        assert_eq!(
            policy.decide(1, AttemptFailure::BadStatus),
            RetryDecision::Retry {
                backoff: Duration::ZERO
            }
        );
        assert_eq!(
            policy.decide(2, AttemptFailure::BadStatus),
            RetryDecision::Retry {
                backoff: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_timeout_retries_after_fixed_backoff() {
        let policy = RetryPolicy::new(3);
        assert_eq!(
            policy.decide(1, AttemptFailure::TimedOut),
            RetryDecision::Retry {
                backoff: DEFAULT_TIMEOUT_BACKOFF
            }
        );
    }

    #[test]
    fn test_ceiling_exhausts_retries() {
        let policy = RetryPolicy::new(3);
        assert_eq!(
            policy.decide(3, AttemptFailure::BadStatus),
            RetryDecision::GiveUp
        );
        assert_eq!(policy.decide(3, AttemptFailure::TimedOut), RetryDecision::GiveUp);
    }

    #[test]
    fn test_network_failure_gives_up_immediately() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.decide(1, AttemptFailure::Network), RetryDecision::GiveUp);
    }

    #[test]
    fn test_single_attempt_policy_never_retries() {
        let policy = RetryPolicy::new(1);
        assert_eq!(
            policy.decide(1, AttemptFailure::BadStatus),
            RetryDecision::GiveUp
        );
    }
}
