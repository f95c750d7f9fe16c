//! Command-line interface definition for Sofi Chat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat and one-shot status, model and
//! statistics commands.

use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sofi AI - terminal chat client
///
/// Chat with the Sofi AI backend, which picks the best model for every
/// question. Replies are revealed as they are typed and code is highlighted.
#[derive(Parser, Debug, Clone)]
#[command(name = "sofi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL from config
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Override where statistics are stored
    #[arg(long)]
    pub stats_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Sofi Chat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Show replies at once instead of revealing them
        #[arg(long)]
        no_animation: bool,
    },

    /// Check whether the backend is reachable
    Status,

    /// List the models the backend can route to
    Models {
        /// Output as JSON instead of a table
        #[arg(short, long)]
        json: bool,
    },

    /// Show stored usage statistics
    Stats {
        /// Output as JSON instead of text
        #[arg(short, long)]
        json: bool,

        /// Reset every counter to zero
        #[arg(long)]
        reset: bool,
    },

    /// Describe what the assistant can do
    Features,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Configuration overrides carried by the flags
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend_url: self.backend_url.clone(),
            stats_path: self.stats_path.clone(),
            no_animation: matches!(
                self.command,
                Commands::Chat {
                    no_animation: true
                }
            ),
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            backend_url: None,
            stats_path: None,
            command: Commands::Chat {
                no_animation: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Chat {
                no_animation: false
            }
        ));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["sofi", "chat"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert!(matches!(cli.command, Commands::Chat { .. }));
        assert!(!cli.overrides().no_animation);
    }

    #[test]
    fn test_cli_parse_chat_without_animation() {
        let cli = Cli::try_parse_from(["sofi", "chat", "--no-animation"]).unwrap();
        assert!(cli.overrides().no_animation);
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "sofi",
            "--backend-url",
            "http://example.com:8080",
            "--stats-path",
            "/tmp/stats.json",
            "status",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(
            overrides.backend_url,
            Some("http://example.com:8080".to_string())
        );
        assert_eq!(overrides.stats_path, Some(PathBuf::from("/tmp/stats.json")));
        assert!(!overrides.no_animation);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_cli_parse_models_json() {
        let cli = Cli::try_parse_from(["sofi", "models", "--json"]).unwrap();
        if let Commands::Models { json } = cli.command {
            assert!(json);
        } else {
            panic!("Expected Models command");
        }
    }

    #[test]
    fn test_cli_parse_stats_reset() {
        let cli = Cli::try_parse_from(["sofi", "stats", "--reset"]).unwrap();
        if let Commands::Stats { json, reset } = cli.command {
            assert!(!json);
            assert!(reset);
        } else {
            panic!("Expected Stats command");
        }
    }

    #[test]
    fn test_cli_parse_features() {
        let cli = Cli::try_parse_from(["sofi", "features"]).unwrap();
        assert!(matches!(cli.command, Commands::Features));
    }

    #[test]
    fn test_cli_parse_verbose_and_config() {
        let cli = Cli::try_parse_from(["sofi", "-v", "--config", "custom.yaml", "status"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["sofi"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["sofi", "run"]).is_err());
    }
}
