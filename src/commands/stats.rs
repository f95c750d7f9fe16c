//! Statistics command for Sofi Chat
//!
//! Prints the statistics persisted by chat sessions, optionally resetting
//! them first.

use crate::config::Config;
use crate::error::{Result, SofiError};
use crate::stats::SessionStats;
use crate::storage::{load_stats, save_stats, FileStore, StoredStats};
use prettytable::{cell, row, Table};

/// Show (and optionally reset) the stored statistics
///
/// # Arguments
///
/// * `config` - Configuration containing the storage location
/// * `json` - Print the stored record as JSON
/// * `reset` - Zero every counter before printing
///
/// # Errors
///
/// Returns error if the store cannot be opened or written
pub fn show_stats(config: &Config, json: bool, reset: bool) -> Result<()> {
    let mut store = FileStore::from_config(&config.storage)?;
    tracing::debug!("Reading statistics from {}", store.path().display());

    let stats = if reset {
        let stats = SessionStats::default();
        save_stats(&mut store, &stats)?;
        tracing::info!("Statistics reset");
        if !json {
            println!("Statistics reset");
        }
        stats
    } else {
        load_stats(&store)
    };

    if json {
        println!("{}", stats_json(&stats)?);
    } else {
        stats_table(&stats).printstd();
    }
    Ok(())
}

/// Stored record of `stats` as pretty JSON
///
/// # Errors
///
/// Returns `SofiError::Serialization` if serialization fails
pub fn stats_json(stats: &SessionStats) -> Result<String> {
    let json = serde_json::to_string_pretty(&StoredStats::from_stats(stats))
        .map_err(SofiError::Serialization)?;
    Ok(json)
}

/// Two-column table of the displayed statistics
pub fn stats_table(stats: &SessionStats) -> Table {
    let snapshot = stats.snapshot();
    let mut table = Table::new();
    table.add_row(row!["Messages sent", snapshot.message_count]);
    table.add_row(row!["Tokens used", snapshot.tokens_used]);
    table.add_row(row!["Average response", snapshot.average_response]);
    table.add_row(row!["Responses measured", stats.response_times.len()]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::storage::STATS_KEY;
    use crate::storage::KeyValueStore;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            storage: StorageConfig {
                path: Some(dir.path().join("stats.json")),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_table_formats_values() {
        let stats = SessionStats {
            message_count: 2,
            tokens_used: 12_345,
            response_times: vec![1000, 2000],
        };
        let rendered = stats_table(&stats).to_string();
        assert!(rendered.contains("12,345"));
        assert!(rendered.contains("1.50s"));
    }

    #[test]
    fn test_stats_json_uses_stored_field_names() {
        let json = stats_json(&SessionStats::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["messageCount"], 0);
        assert!(value["responseTimes"].as_array().unwrap().is_empty());
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_reset_zeroes_stored_record() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let mut store = FileStore::from_config(&config.storage).unwrap();
        let stats = SessionStats {
            message_count: 9,
            tokens_used: 99,
            response_times: vec![10],
        };
        save_stats(&mut store, &stats).unwrap();

        show_stats(&config, true, true).unwrap();

        let reopened = FileStore::from_config(&config.storage).unwrap();
        assert!(reopened.get(STATS_KEY).unwrap().is_some());
        assert_eq!(load_stats(&reopened), SessionStats::default());
    }

    #[test]
    fn test_show_without_reset_keeps_record() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let mut store = FileStore::from_config(&config.storage).unwrap();
        let stats = SessionStats {
            message_count: 1,
            ..Default::default()
        };
        save_stats(&mut store, &stats).unwrap();

        show_stats(&config, false, false).unwrap();

        let reopened = FileStore::from_config(&config.storage).unwrap();
        assert_eq!(load_stats(&reopened).message_count, 1);
    }
}
