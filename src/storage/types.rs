use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::stats::SessionStats;

/// On-disk shape of the statistics record
///
/// Field names are camelCase so records written by the browser client can be
/// imported unchanged. Missing fields default to zero/empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredStats {
    /// Number of user messages submitted
    #[serde(default)]
    pub message_count: u64,
    /// Sum of reported tokens
    #[serde(default)]
    pub tokens_used: u64,
    /// Latency samples in milliseconds
    #[serde(default)]
    pub response_times: Vec<u64>,
    /// Milliseconds since the Unix epoch when the record was written
    #[serde(default)]
    pub timestamp: i64,
}

impl StoredStats {
    /// Build a record stamped with the current time
    pub fn from_stats(stats: &SessionStats) -> Self {
        Self {
            message_count: stats.message_count,
            tokens_used: stats.tokens_used,
            response_times: stats.response_times.clone(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

impl From<StoredStats> for SessionStats {
    fn from(stored: StoredStats) -> Self {
        Self {
            message_count: stored.message_count,
            tokens_used: stored.tokens_used,
            response_times: stored.response_times,
        }
    }
}
