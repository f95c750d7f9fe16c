/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes the following command modules:

- `chat`     — Interactive chat session
- `status`   — One-shot backend health check
- `models`   — Model listing
- `stats`    — Stored usage statistics
- `features` — Feature list

These handlers are intentionally small and use the library components:
the backend, the session controller, the view, and the store.
*/

use crate::backend::{ChatBackend, HttpBackend};
use crate::config::Config;
use crate::error::{Result, SofiError};
use crate::view::{example_prompt, TerminalView, View, EXAMPLE_PROMPTS, FEATURES};
use std::sync::Arc;

// Special commands parser for interactive chat
pub mod special_commands;

// Model listing command
pub mod models;

// Statistics command
pub mod stats;

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Creates the HTTP backend, the statistics store and a terminal view,
    //! then runs a readline-based loop that hands every line either to the
    //! special-command handler or to the session as a chat message.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::reveal::Animator;
    use crate::session::ChatSession;
    use crate::status::{check_backend_status, load_models};
    use crate::storage::FileStore;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the backend client, the store or the line editor
    /// cannot be created. Failures during the session are shown in the chat
    /// and never end it.
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(&config.backend)?);
        let store = FileStore::from_config(&config.storage)?;
        tracing::debug!("Statistics stored at {}", store.path().display());

        let mut session =
            ChatSession::new(backend, Box::new(store), Animator::new(&config.reveal));
        let mut view = TerminalView::new();
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config);
        session.start(&mut view);
        check_backend_status(session.backend(), &mut view).await;
        load_models(session.backend(), &mut view).await;

        let prompt = format!("{} ", ">".magenta().bold());
        let mut prefill: Option<String> = None;

        loop {
            let line = match prefill.take() {
                Some(text) => rl.readline_with_initial(&prompt, (&text, "")),
                None => rl.readline(&prompt),
            };
            match line {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if let Err(e) = rl.add_history_entry(trimmed) {
                        tracing::debug!("Failed to record history entry: {}", e);
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {}
                        Ok(SpecialCommand::Exit) => break,
                        Ok(command) => {
                            prefill =
                                handle_special_command(&mut session, &mut view, command).await;
                            continue;
                        }
                        Err(e) => {
                            view.error(&e.to_string());
                            continue;
                        }
                    }

                    let outcome = session.send_message(&mut view, &line).await;
                    tracing::debug!("Message outcome: {:?}", outcome);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Execute one parsed special command
    ///
    /// `SpecialCommand::None` and `SpecialCommand::Exit` are handled by the
    /// caller and ignored here.
    ///
    /// # Returns
    ///
    /// Text to place in the line editor for the next prompt, if any
    pub async fn handle_special_command(
        session: &mut ChatSession,
        view: &mut TerminalView,
        command: SpecialCommand,
    ) -> Option<String> {
        match command {
            SpecialCommand::Examples(None) => view.print_examples(EXAMPLE_PROMPTS),
            SpecialCommand::Examples(Some(number)) => match example_prompt(number) {
                Some(prompt) => return Some(prompt.to_string()),
                None => view.error(&format!(
                    "No example {}; there are {}",
                    number,
                    EXAMPLE_PROMPTS.len()
                )),
            },
            SpecialCommand::Clear => {
                if !session.clear_conversation(view) {
                    view.notice("Conversation kept");
                }
            }
            SpecialCommand::ShowStatus => {
                check_backend_status(session.backend(), view).await;
                view.print_dashboard();
            }
            SpecialCommand::ListModels => {
                load_models(session.backend(), view).await;
                view.print_models();
            }
            SpecialCommand::ShowStats => view.print_statistics(),
            SpecialCommand::Features => view.show_features(FEATURES),
            SpecialCommand::Copy(index) => match view.copy_code(index) {
                Some(copied) => view.notice(&format!("Copied code block {} to the clipboard", copied)),
                None => view.error("No such code block to copy"),
            },
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
        None
    }

    fn print_welcome_banner(config: &Config) {
        println!();
        println!("{}", "Sofi AI".magenta().bold());
        println!(
            "{}",
            format!("Backend: {}", config.backend.base_url).dimmed()
        );
        println!(
            "{}",
            "Type /help for commands, exit to quit.".dimmed()
        );
        println!();
    }

}

// Status command handler
pub mod status {
    //! One-shot backend health check.

    use super::*;
    use crate::status::check_backend_status;
    use crate::view::ConnectionState;

    /// Check the backend once and print the connection state
    ///
    /// # Errors
    ///
    /// Returns `SofiError::Transport` when the backend is unreachable, so the
    /// process exits non-zero
    pub async fn run_status(config: &Config) -> Result<()> {
        let backend = HttpBackend::new(&config.backend)?;
        let mut view = TerminalView::new();

        view.notice(&format!("Backend: {}", backend.base_url()));
        let state = check_backend_status(&backend, &mut view).await;

        match state {
            ConnectionState::Online { .. } => Ok(()),
            _ => Err(SofiError::Transport(format!(
                "backend at {} is not reachable",
                backend.base_url()
            ))
            .into()),
        }
    }
}

// Features command handler
pub mod features {
    //! Feature list output.

    use super::*;

    /// Print the feature list
    pub fn show_features() {
        let mut view = TerminalView::new();
        view.show_features(FEATURES);
    }
}
