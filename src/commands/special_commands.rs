//! Special commands parser for interactive chat mode
//!
//! This module parses the special commands that can be entered during an
//! interactive chat session instead of a message. Special commands allow
//! users to:
//! - Clear the conversation
//! - Check the backend and list its models
//! - View usage statistics and the feature list
//! - Copy a code block to the clipboard
//! - Pick an example prompt to edit and send
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive. Anything that
//! does not start with `/` (other than `exit`/`quit`) is a chat message.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session or the view rather than being sent
/// to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the conversation back to the greeting, after confirmation
    ///
    /// Also resets the usage statistics.
    Clear,

    /// Check the backend and show the status panel
    ShowStatus,

    /// Reload and list the backend's models
    ListModels,

    /// Show usage statistics
    ShowStats,

    /// Show the feature list
    Features,

    /// Copy a code block to the clipboard
    ///
    /// `/copy` copies the most recent block, `/copy N` the N-th one.
    Copy(Option<usize>),

    /// Example prompts
    ///
    /// `/examples` lists them, `/examples N` puts the N-th one in the line
    /// editor for editing before it is sent.
    Examples(Option<usize>),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the backend as a chat message.
    None,
}

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for
/// chat messages.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if `/copy` or `/examples` receives something
/// other than a positive number.
///
/// # Examples
///
/// ```
/// use sofi_chat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/CLEAR").unwrap(), SpecialCommand::Clear);
/// assert_eq!(parse_special_command("/copy 2").unwrap(), SpecialCommand::Copy(Some(2)));
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/frobnicate").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/clear" => Ok(SpecialCommand::Clear),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/models" => Ok(SpecialCommand::ListModels),
        "/stats" => Ok(SpecialCommand::ShowStats),
        "/features" => Ok(SpecialCommand::Features),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        "/copy" => Ok(SpecialCommand::Copy(None)),
        input if input.starts_with("/copy ") => {
            parse_number("/copy", &input["/copy ".len()..]).map(|n| SpecialCommand::Copy(Some(n)))
        }

        "/examples" => Ok(SpecialCommand::Examples(None)),
        input if input.starts_with("/examples ") => {
            parse_number("/examples", &input["/examples ".len()..])
                .map(|n| SpecialCommand::Examples(Some(n)))
        }

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn parse_number(command: &str, arg: &str) -> Result<usize, CommandError> {
    let arg = arg.trim();
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

/// Display help information for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

CONVERSATION:
  /clear          - Clear the conversation (asks for confirmation)
  /copy [n]       - Copy code block n to the clipboard (default: latest)
  /examples [n]   - List example prompts, or edit example n before sending

BACKEND:
  /status         - Check the connection and show the status panel
  /models         - List the models the backend can choose from

INFORMATION:
  /stats          - Show messages sent, tokens used and average response time
  /features       - Show what Sofi AI can do
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  exit            - Exit the chat
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Anything else is sent to Sofi AI as a message
  - Code blocks in replies are labelled with their /copy number
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clear() {
        assert_eq!(parse_special_command("/clear").unwrap(), SpecialCommand::Clear);
    }

    #[test]
    fn test_parse_show_status() {
        assert_eq!(
            parse_special_command("/status").unwrap(),
            SpecialCommand::ShowStatus
        );
    }

    #[test]
    fn test_parse_list_models() {
        assert_eq!(
            parse_special_command("/models").unwrap(),
            SpecialCommand::ListModels
        );
    }

    #[test]
    fn test_parse_stats_and_features() {
        assert_eq!(parse_special_command("/stats").unwrap(), SpecialCommand::ShowStats);
        assert_eq!(
            parse_special_command("/features").unwrap(),
            SpecialCommand::Features
        );
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_exit_variants() {
        for input in ["exit", "quit", "/exit", "/quit", "EXIT", "  quit  "] {
            assert_eq!(
                parse_special_command(input).unwrap(),
                SpecialCommand::Exit,
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_copy() {
        assert_eq!(parse_special_command("/copy").unwrap(), SpecialCommand::Copy(None));
        assert_eq!(
            parse_special_command("/copy 3").unwrap(),
            SpecialCommand::Copy(Some(3))
        );
        assert_eq!(
            parse_special_command("/COPY   12 ").unwrap(),
            SpecialCommand::Copy(Some(12))
        );
    }

    #[test]
    fn test_parse_copy_rejects_bad_index() {
        for arg in ["0", "-1", "two"] {
            let err = parse_special_command(&format!("/copy {}", arg)).unwrap_err();
            assert_eq!(
                err,
                CommandError::UnsupportedArgument {
                    command: "/copy".to_string(),
                    arg: arg.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_parse_examples() {
        assert_eq!(
            parse_special_command("/examples").unwrap(),
            SpecialCommand::Examples(None)
        );
        assert_eq!(
            parse_special_command("/Examples 2").unwrap(),
            SpecialCommand::Examples(Some(2))
        );
        assert_eq!(
            parse_special_command("/examples zero").unwrap_err(),
            CommandError::UnsupportedArgument {
                command: "/examples".to_string(),
                arg: "zero".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(parse_special_command("/Clear").unwrap(), SpecialCommand::Clear);
        assert_eq!(
            parse_special_command("/STATUS").unwrap(),
            SpecialCommand::ShowStatus
        );
    }

    #[test]
    fn test_parse_regular_text_returns_none() {
        assert_eq!(
            parse_special_command("How do I sort a list in Python?").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("exit the loop early").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_empty_string_returns_none() {
        assert_eq!(parse_special_command("").unwrap(), SpecialCommand::None);
        assert_eq!(parse_special_command("   ").unwrap(), SpecialCommand::None);
    }

    #[test]
    fn test_parse_unknown_command_is_error() {
        let err = parse_special_command("/frobnicate now").unwrap_err();
        assert_eq!(
            err,
            CommandError::UnknownCommand("/frobnicate now".to_string())
        );
        assert!(err.to_string().contains("/help"));
    }
}
