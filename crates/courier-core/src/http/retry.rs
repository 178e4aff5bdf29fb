//! Needle-based retry policy
//!
//! A failed attempt is retried when its failure message contains the
//! configured needle and the attempt budget is not exhausted. Attempts run
//! back to back; there is no delay between them.

use serde::{Deserialize, Serialize};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_count: u32,
    /// Substring that marks a failure message as retryable
    pub needle: Option<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_count: 1,
            needle: None,
        }
    }
}

/// Decision taken after an attempt completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Run another attempt with this retry count
    Retry { next_count: u32 },
    /// Keep the current envelope
    Done,
}

impl RetryPolicy {
    /// Create a policy with a retry budget and needle
    pub fn new(max_count: u32, needle: impl Into<String>) -> Self {
        Self {
            max_count,
            needle: Some(needle.into()),
        }
    }

    /// Set the maximum retry count
    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    /// Set the needle
    pub fn with_needle(mut self, needle: impl Into<String>) -> Self {
        self.needle = Some(needle.into());
        self
    }

    /// Whether `message` contains the configured needle
    pub fn matches(&self, message: &str) -> bool {
        self.needle
            .as_deref()
            .is_some_and(|needle| message.contains(needle))
    }

    /// Decide whether the attempt numbered `retry_count` should be retried
    pub fn decide(&self, message: &str, retry_count: u32) -> RetryDecision {
        if self.matches(message) && retry_count < self.max_count {
            RetryDecision::Retry {
                next_count: retry_count + 1,
            }
        } else {
            RetryDecision::Done
        }
    }
}
