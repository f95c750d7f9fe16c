//! Session statistics
//!
//! Counters tracked for the lifetime of the local profile: messages sent,
//! tokens reported by the backend, and the latency of every backend
//! round-trip. The [`ChatSession`](crate::session::ChatSession) owns the
//! single instance and persists it after every mutation.

use serde::{Deserialize, Serialize};

/// Message count, token usage and response-time history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Number of user messages submitted
    pub message_count: u64,
    /// Sum of token counts reported by the backend
    pub tokens_used: u64,
    /// Round-trip latency samples in milliseconds, oldest first
    pub response_times: Vec<u64>,
}

impl SessionStats {
    /// Count one submitted user message
    pub fn record_message(&mut self) {
        self.message_count = self.message_count.saturating_add(1);
    }

    /// Append one round-trip latency sample
    pub fn record_response_time(&mut self, millis: u64) {
        self.response_times.push(millis);
    }

    /// Add tokens reported for a reply
    pub fn add_tokens(&mut self, tokens: u64) {
        self.tokens_used = self.tokens_used.saturating_add(tokens);
    }

    /// Zero every counter and drop the latency history
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Mean response time in seconds, rounded to two decimals
    ///
    /// Computed as `round(mean_ms / 10) / 100`. Returns `None` when no sample
    /// has been recorded yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofi_chat::stats::SessionStats;
    ///
    /// let mut stats = SessionStats::default();
    /// stats.record_response_time(1234);
    /// stats.record_response_time(1000);
    /// assert_eq!(stats.average_response_secs(), Some(1.12));
    /// ```
    pub fn average_response_secs(&self) -> Option<f64> {
        if self.response_times.is_empty() {
            return None;
        }
        let total: u128 = self.response_times.iter().map(|&ms| u128::from(ms)).sum();
        let mean = total as f64 / self.response_times.len() as f64;
        Some((mean / 10.0).round() / 100.0)
    }

    /// Display snapshot used by every view
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            message_count: self.message_count,
            tokens_used: format_thousands(self.tokens_used),
            average_response: format_average(self.average_response_secs()),
        }
    }
}

/// Pre-formatted statistics for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Messages sent
    pub message_count: u64,
    /// Token total with thousands separators
    pub tokens_used: String,
    /// Average response time such as `1.25s`
    pub average_response: String,
}

/// Render an average in seconds with two decimals, `0.00s` when absent
pub fn format_average(secs: Option<f64>) -> String {
    format!("{:.2}s", secs.unwrap_or(0.0))
}

/// Group digits in threes: `1234567` becomes `1,234,567`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_zero() {
        let stats = SessionStats::default();
        assert_eq!(stats.message_count, 0);
        assert_eq!(stats.tokens_used, 0);
        assert!(stats.response_times.is_empty());
        assert_eq!(stats.average_response_secs(), None);
    }

    #[test]
    fn test_average_rounds_to_hundredths() {
        let stats = SessionStats {
            response_times: vec![1500, 2001, 999],
            ..Default::default()
        };
        // mean = 1500ms
        assert_eq!(stats.average_response_secs(), Some(1.5));

        let stats = SessionStats {
            response_times: vec![1234],
            ..Default::default()
        };
        // round(123.4) / 100
        assert_eq!(stats.average_response_secs(), Some(1.23));

        let stats = SessionStats {
            response_times: vec![1235, 1236],
            ..Default::default()
        };
        // mean 1235.5 -> round(123.55) = 124
        assert_eq!(stats.average_response_secs(), Some(1.24));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut stats = SessionStats::default();
        stats.record_message();
        stats.add_tokens(42);
        stats.record_response_time(10);
        stats.reset();
        assert_eq!(stats, SessionStats::default());
    }

    #[test]
    fn test_snapshot_formatting() {
        let stats = SessionStats {
            message_count: 3,
            tokens_used: 1_234_567,
            response_times: vec![500, 1500],
        };
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.message_count, 3);
        assert_eq!(snapshot.tokens_used, "1,234,567");
        assert_eq!(snapshot.average_response, "1.00s");
    }

    #[test]
    fn test_empty_snapshot_average() {
        assert_eq!(SessionStats::default().snapshot().average_response, "0.00s");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(123456), "123,456");
    }

    #[test]
    fn test_add_tokens_saturates() {
        let mut stats = SessionStats {
            tokens_used: u64::MAX - 1,
            ..Default::default()
        };
        stats.add_tokens(10);
        assert_eq!(stats.tokens_used, u64::MAX);
    }
}
