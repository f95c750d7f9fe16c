//! ANSI terminal view
//!
//! Messages are printed as they are inserted. A reply being revealed is
//! printed character by character; when its final markup arrives the partial
//! rows are erased and the formatted reply is drawn in their place. Code
//! blocks are numbered so `/copy N` can put them on the clipboard through an
//! OSC 52 escape sequence.
//!
//! Dashboard indicators (connection, models, statistics) are kept in memory
//! and printed on demand by the chat commands.

use crate::backend::ModelDescriptor;
use crate::stats::StatsSnapshot;
use crate::transcript::{Message, MessageId, Sender};
use crate::view::markup::{code_blocks_in_markup, strip_ansi, MarkupRenderer};
use crate::view::{ConnectionState, View};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};
use unicode_width::UnicodeWidthStr;

/// Width assumed when `COLUMNS` is unset or invalid
pub const DEFAULT_WIDTH: usize = 80;

/// Last-known values of the status indicators
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Connection indicator
    pub connection: ConnectionState,
    /// Rendered model list
    pub models: Vec<ModelDescriptor>,
    /// Model count, `None` until models were requested
    pub model_count: Option<usize>,
    /// Current model indicator
    pub current_model: Option<String>,
    /// Statistics panel
    pub statistics: Option<StatsSnapshot>,
    /// Last-response clock
    pub last_response: Option<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    id: MessageId,
    sender: Sender,
    time: String,
    markup: String,
}

/// A reply currently being revealed
#[derive(Debug, Clone, Default)]
struct Live {
    id: MessageId,
    printed: String,
}

/// A code block that `/copy` can target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    /// Message the block belongs to
    pub message: MessageId,
    /// Block content
    pub code: String,
}

/// Chat view that renders to a terminal
pub struct TerminalView {
    out: Box<dyn Write + Send>,
    input: Box<dyn BufRead + Send>,
    renderer: MarkupRenderer,
    width: usize,
    entries: Vec<Entry>,
    live: Option<Live>,
    copy_targets: Vec<CopyTarget>,
    typing_shown: bool,
    dashboard: Dashboard,
}

impl TerminalView {
    /// View on stdout and stdin, styled when stdout is a terminal
    pub fn new() -> Self {
        let styled = io::stdout().is_terminal();
        Self::with_io(
            Box::new(io::stdout()),
            Box::new(io::BufReader::new(io::stdin())),
            MarkupRenderer::new(styled),
        )
    }

    /// View on arbitrary streams
    pub fn with_io(
        out: Box<dyn Write + Send>,
        input: Box<dyn BufRead + Send>,
        renderer: MarkupRenderer,
    ) -> Self {
        Self {
            out,
            input,
            renderer,
            width: terminal_width(),
            entries: Vec::new(),
            live: None,
            copy_targets: Vec::new(),
            typing_shown: false,
            dashboard: Dashboard::default(),
        }
    }

    /// Override the wrap width used to erase partially revealed replies
    pub fn set_width(&mut self, width: usize) {
        self.width = width.max(1);
    }

    /// Indicator values as last set
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Registered copy targets, `/copy 1` being the first
    pub fn copy_targets(&self) -> &[CopyTarget] {
        &self.copy_targets
    }

    /// Put a code block on the clipboard
    ///
    /// `index` is 1-based; `None` selects the most recent block.
    ///
    /// # Returns
    ///
    /// The index copied, or `None` when no such block exists
    pub fn copy_code(&mut self, index: Option<usize>) -> Option<usize> {
        let index = match index {
            Some(i) => i,
            None => self.copy_targets.len(),
        };
        let target = index
            .checked_sub(1)
            .and_then(|i| self.copy_targets.get(i))?
            .code
            .clone();

        let sequence = osc52(&target);
        self.emit(&sequence);
        tracing::debug!("Copied code block {} ({} bytes)", index, target.len());
        Some(index)
    }

    /// Print a one-line notice
    pub fn notice(&mut self, text: &str) {
        let line = if self.renderer.is_styled() {
            text.dimmed().to_string()
        } else {
            text.to_string()
        };
        self.emit(&format!("{}\n", line));
    }

    /// Print an error line
    pub fn error(&mut self, text: &str) {
        let line = if self.renderer.is_styled() {
            text.red().to_string()
        } else {
            text.to_string()
        };
        self.emit(&format!("{}\n", line));
    }

    /// Print the connection, model and statistics panel
    pub fn print_dashboard(&mut self) {
        let dashboard = self.dashboard.clone();
        let mut lines = vec![self.connection_line(&dashboard.connection)];

        lines.push(format!(
            "Models available: {}",
            dashboard
                .model_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
        ));
        lines.push(format!(
            "Current model: {}",
            dashboard.current_model.as_deref().unwrap_or("-")
        ));
        lines.push(format!(
            "Last response: {}",
            dashboard.last_response.as_deref().unwrap_or("--:--")
        ));

        let mut text = lines.join("\n");
        text.push('\n');
        self.emit(&text);
        self.print_statistics();
    }

    /// Print the statistics panel
    pub fn print_statistics(&mut self) {
        let Some(stats) = self.dashboard.statistics.clone() else {
            self.emit("Messages: 0 | Tokens: 0 | Avg response: 0.00s\n");
            return;
        };
        self.emit(&format!(
            "Messages: {} | Tokens: {} | Avg response: {}\n",
            stats.message_count, stats.tokens_used, stats.average_response
        ));
    }

    /// Print the rendered model list
    pub fn print_models(&mut self) {
        let models = self.dashboard.models.clone();
        if models.is_empty() {
            self.notice("No models available");
            return;
        }

        let mut text = format!("{} models available\n", models.len());
        for model in &models {
            let name = if self.renderer.is_styled() {
                model.name.bold().to_string()
            } else {
                model.name.clone()
            };
            text.push_str(&format!("  • {}", name));
            if !model.best_for.is_empty() {
                text.push_str(&format!(" ({})", model.best_for.join(", ")));
            }
            text.push('\n');
        }
        self.emit(&text);
    }

    /// Print the numbered example prompts
    pub fn print_examples(&mut self, prompts: &[&str]) {
        let mut text = String::from("Example prompts (use /examples N to edit one before sending)\n");
        for (i, prompt) in prompts.iter().enumerate() {
            text.push_str(&format!("  {}. {}\n", i + 1, prompt));
        }
        self.emit(&text);
    }

    fn connection_line(&self, state: &ConnectionState) -> String {
        let dot = match (state, self.renderer.is_styled()) {
            (ConnectionState::Online { .. }, true) => "●".green().to_string(),
            (ConnectionState::Offline, true) => "●".red().to_string(),
            (ConnectionState::Unknown, true) => "●".yellow().to_string(),
            (_, false) => "●".to_string(),
        };
        match state {
            ConnectionState::Online { key_status } => {
                format!("{} {} ({})", dot, state, key_status)
            }
            _ => format!("{} {}", dot, state),
        }
    }

    fn header(&self, sender: Sender, time: &str) -> String {
        let name = sender.display_name();
        if !self.renderer.is_styled() {
            return format!("{} · {}\n", name, time);
        }
        let name = match sender {
            Sender::User => name.cyan().bold(),
            Sender::Assistant => name.magenta().bold(),
        };
        format!("{} {}\n", name, format!("· {}", time).dimmed())
    }

    fn copy_base(&self, id: MessageId) -> usize {
        self.copy_targets.iter().filter(|t| t.message != id).count() + 1
    }

    fn draw(&mut self, entry: &Entry) {
        let base = self.copy_base(entry.id);
        let body = self.renderer.render(&entry.markup, base);
        let header = self.header(entry.sender, &entry.time);
        self.emit(&format!("{}{}\n\n", header, body.trim_end_matches('\n')));
    }

    fn erase_live(&mut self, id: MessageId) {
        let Some(live) = self.live.take() else {
            return;
        };
        if live.id != id {
            self.live = Some(live);
            return;
        }

        let rows = rows_used(&live.printed, self.width);
        let mut sequence = String::from("\r");
        if rows > 1 {
            sequence.push_str(&format!("\x1b[{}F", rows - 1));
        }
        sequence.push_str("\x1b[J");
        self.emit(&sequence);
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for TerminalView {
    fn render_message(&mut self, message: &Message, markup: &str) {
        let entry = Entry {
            id: message.id,
            sender: message.sender,
            time: message.time_label(),
            markup: markup.to_string(),
        };
        self.draw(&entry);
        self.entries.push(entry);
    }

    fn open_message(&mut self, message: &Message) {
        let header = self.header(message.sender, &message.time_label());
        self.emit(&header);
        self.entries.push(Entry {
            id: message.id,
            sender: message.sender,
            time: message.time_label(),
            markup: String::new(),
        });
        self.live = Some(Live {
            id: message.id,
            printed: String::new(),
        });
    }

    fn append_markup(&mut self, id: MessageId, markup: &str) {
        let Some(position) = self.entries.iter().position(|e| e.id == id) else {
            return;
        };

        let base = self.copy_base(id) + code_blocks_in_markup(&self.entries[position].markup).len();
        let mut text = self.renderer.render(markup, base);
        if markup.starts_with("<pre>") {
            let at_line_start = self
                .live
                .as_ref()
                .map_or(true, |l| l.printed.is_empty() || l.printed.ends_with('\n'));
            if !at_line_start {
                text.insert(0, '\n');
            }
        }
        self.entries[position].markup.push_str(markup);

        if let Some(live) = self.live.as_mut().filter(|l| l.id == id) {
            live.printed.push_str(&strip_ansi(&text));
        }
        self.emit(&text);
    }

    fn replace_markup(&mut self, id: MessageId, markup: &str) {
        let Some(position) = self.entries.iter().position(|e| e.id == id) else {
            return;
        };

        self.erase_live(id);
        self.entries[position].markup = markup.to_string();
        let base = self.copy_base(id);
        let body = self.renderer.render(markup, base);
        self.emit(&format!("{}\n\n", body.trim_end_matches('\n')));
    }

    fn render_complete(&mut self, id: MessageId) {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return;
        };
        let blocks = code_blocks_in_markup(&entry.markup);
        self.copy_targets.retain(|t| t.message != id);
        self.copy_targets
            .extend(blocks.into_iter().map(|block| CopyTarget {
                message: id,
                code: block.code,
            }));
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!("Failed to flush terminal: {}", e);
        }
    }

    fn set_typing(&mut self, visible: bool) {
        if visible && !self.typing_shown {
            let text = format!("{} is typing…", Sender::Assistant.display_name());
            let text = if self.renderer.is_styled() {
                text.dimmed().italic().to_string()
            } else {
                text
            };
            self.emit(&text);
        } else if !visible && self.typing_shown {
            self.emit("\r\x1b[2K");
        }
        self.typing_shown = visible;
    }

    fn clear_input(&mut self) {
        // The line editor consumed the input line already.
    }

    fn set_connection(&mut self, state: &ConnectionState) {
        self.dashboard.connection = state.clone();
        let line = self.connection_line(state);
        self.emit(&format!("{}\n", line));
    }

    fn set_models(&mut self, models: &[ModelDescriptor]) {
        self.dashboard.models = models.to_vec();
        self.dashboard.model_count = Some(models.len());
    }

    fn set_model_count(&mut self, count: usize) {
        self.dashboard.model_count = Some(count);
        if count == 0 {
            self.dashboard.models.clear();
        }
    }

    fn set_current_model(&mut self, model: &str) {
        self.dashboard.current_model = Some(model.to_string());
    }

    fn set_statistics(&mut self, stats: &StatsSnapshot) {
        self.dashboard.statistics = Some(stats.clone());
    }

    fn set_last_response(&mut self, time: &str) {
        self.dashboard.last_response = Some(time.to_string());
    }

    fn retain_messages(&mut self, keep: &[MessageId]) {
        self.entries.retain(|e| keep.contains(&e.id));
        self.copy_targets.retain(|t| keep.contains(&t.message));
        self.live = None;

        self.emit("\x1b[2J\x1b[H");
        for entry in self.entries.clone() {
            self.draw(&entry);
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.emit(&format!("{} [y/N] ", prompt));
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    fn show_features(&mut self, features: &[&str]) {
        let mut markup = String::from("<strong>Sofi AI features</strong><br>");
        for feature in features {
            markup.push_str(&crate::formatter::format_message_text(feature));
            markup.push('\n');
        }
        let text = self.renderer.render(&markup, 1);
        self.emit(&text);
    }
}

/// Wrap width from the `COLUMNS` environment variable
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Terminal rows taken by `text` when wrapped at `width` columns
///
/// Lines are measured in display columns, so wide characters such as CJK
/// and emoji count twice. Counts the row the cursor ends on, so text ending
/// in a newline uses one more row than its last line.
pub fn rows_used(text: &str, width: usize) -> usize {
    let width = width.max(1);
    text.split('\n')
        .map(|line| UnicodeWidthStr::width(line).div_ceil(width).max(1))
        .sum()
}

/// OSC 52 sequence that sets the system clipboard to `text`
pub fn osc52(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
