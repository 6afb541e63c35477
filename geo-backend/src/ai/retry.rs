//! Bounded retry for provider calls.
//!
//! Retries are manual and bounded (`MAX_RETRIES = 2`), and only fire when the
//! error message matches one of the transient classes: timeouts, connection
//! failures, gateway errors, rate limits. Backoff doubles per attempt.

use std::time::Duration;

/// Maximum retry attempts after the initial call
pub const MAX_RETRIES: u32 = 2;

/// Backoff before the first retry, doubled for each subsequent one
const BASE_BACKOFF_SECS: u64 = 2;

/// Check whether a provider error is worth retrying
pub fn is_retryable_error(error: &str) -> bool {
    let error_lower = error.to_lowercase();

    // Network/connection errors
    if error_lower.contains("timeout")
        || error_lower.contains("timed out")
        || error_lower.contains("connection")
        || error_lower.contains("network")
        || error_lower.contains("dns")
    {
        return true;
    }

    // Gateway errors (5xx that are typically transient)
    if error_lower.contains("502")
        || error_lower.contains("bad gateway")
        || error_lower.contains("503")
        || error_lower.contains("service unavailable")
        || error_lower.contains("504")
        || error_lower.contains("gateway timeout")
    {
        return true;
    }

    // Rate limiting
    if error_lower.contains("429")
        || error_lower.contains("too many requests")
        || error_lower.contains("rate limit")
    {
        return true;
    }

    false
}

/// Backoff delay before retry attempt `attempt` (1-based)
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(BASE_BACKOFF_SECS << (attempt.saturating_sub(1)).min(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error("504 Gateway Timeout"));
        assert!(is_retryable_error("Connection timed out"));
        assert!(is_retryable_error("Chat API error (429): rate limit exceeded"));
        assert!(is_retryable_error("503 Service Unavailable"));
        assert!(!is_retryable_error("404 Not Found"));
        assert!(!is_retryable_error("401 Unauthorized"));
        assert!(!is_retryable_error("Failed to parse chat response"));
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
    }
}
