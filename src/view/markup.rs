//! Terminal rendering of formatted message markup
//!
//! Converts the small markup dialect produced by
//! [`format_message_text`](crate::formatter::format_message_text) into
//! ANSI-styled text. Fenced code blocks are highlighted with syntect and
//! labelled with the `/copy` index that copies them.

use crate::formatter::{unescape_html, CodeBlock, PLAINTEXT_LANGUAGE};
use colored::Colorize;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;

/// Theme used for code blocks
pub const CODE_THEME: &str = "base16-ocean.dark";

struct Patterns {
    token: Regex,
    pre: Regex,
    ansi: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        token: Regex::new(
            r#"(?s)<pre><code class="language-([^"]*)">(.*?)</code></pre>|<(/?)(strong|em|code|a|br)\b[^>]*>"#,
        )
        .expect("Invalid regex pattern"),
        pre: Regex::new(r#"(?s)<pre><code class="language-([^"]*)">(.*?)</code></pre>"#)
            .expect("Invalid regex pattern"),
        ansi: Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("Invalid regex pattern"),
    })
}

fn syntaxes() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn themes() -> &'static ThemeSet {
    static THEMES: OnceLock<ThemeSet> = OnceLock::new();
    THEMES.get_or_init(ThemeSet::load_defaults)
}

#[derive(Debug, Default, Clone, Copy)]
struct Inline {
    bold: bool,
    italic: bool,
    code: bool,
    link: bool,
}

/// Renders message markup for an ANSI terminal
///
/// A plain renderer emits the same layout without escape sequences, for
/// output that is not a terminal.
///
/// # Examples
///
/// ```
/// use sofi_chat::view::markup::MarkupRenderer;
///
/// let renderer = MarkupRenderer::plain();
/// let text = renderer.render("Hi <strong>there</strong><br><br>&lt;ok&gt;", 1);
/// assert_eq!(text, "Hi there\n\n<ok>");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MarkupRenderer {
    styled: bool,
}

impl MarkupRenderer {
    /// Create a renderer; `styled` enables colors and highlighting
    pub fn new(styled: bool) -> Self {
        Self { styled }
    }

    /// Renderer without any escape sequences
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Whether output carries ANSI styling
    pub fn is_styled(&self) -> bool {
        self.styled
    }

    /// Render markup to terminal text
    ///
    /// Code blocks are numbered from `copy_base` in order of appearance.
    pub fn render(&self, markup: &str, copy_base: usize) -> String {
        let mut out = String::new();
        let mut inline = Inline::default();
        let mut last = 0;
        let mut block_index = copy_base;

        for caps in patterns().token.captures_iter(markup) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            self.push_text(&mut out, &markup[last..whole.start()], inline);
            last = whole.end();

            if let Some(code) = caps.get(2) {
                let block = CodeBlock {
                    language: Some(caps[1].to_string()),
                    code: unescape_html(code.as_str()),
                };
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&self.render_block(&block, block_index));
                block_index += 1;
                continue;
            }

            let closing = &caps[3] == "/";
            match &caps[4] {
                "br" => out.push('\n'),
                "strong" => inline.bold = !closing,
                "em" => inline.italic = !closing,
                "code" => inline.code = !closing,
                "a" => inline.link = !closing,
                _ => {}
            }
        }
        self.push_text(&mut out, &markup[last..], inline);

        out
    }

    /// Render one code block with its copy label, ending in a newline
    pub fn render_block(&self, block: &CodeBlock, copy_index: usize) -> String {
        let language = block.language_or_plaintext();
        let label = format!("── {} ── /copy {}", language, copy_index);

        let mut out = String::new();
        if self.styled {
            out.push_str(&format!("  {}\n", label.dimmed()));
        } else {
            out.push_str(&format!("  {}\n", label));
        }

        if self.styled {
            out.push_str(&highlight(&block.code, language));
        } else {
            for line in block.code.lines() {
                out.push_str(&format!("  {}\n", line));
            }
        }

        out
    }

    fn push_text(&self, out: &mut String, raw: &str, inline: Inline) {
        if raw.is_empty() {
            return;
        }
        let text = unescape_html(raw);
        if !self.styled {
            out.push_str(&text);
            return;
        }

        let mut styled = text.normal();
        if inline.code {
            styled = styled.yellow();
        }
        if inline.link {
            styled = styled.blue().underline();
        }
        if inline.bold {
            styled = styled.bold();
        }
        if inline.italic {
            styled = styled.italic();
        }
        out.push_str(&styled.to_string());
    }
}

fn highlight(code: &str, language: &str) -> String {
    let syntax_set = syntaxes();
    let syntax = if language == PLAINTEXT_LANGUAGE {
        syntax_set.find_syntax_plain_text()
    } else {
        syntax_set
            .find_syntax_by_token(language)
            .unwrap_or_else(|| syntax_set.find_syntax_plain_text())
    };

    let Some(theme) = themes().themes.get(CODE_THEME) else {
        return code.lines().map(|line| format!("  {}\n", line)).collect();
    };
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut out = String::new();
    for line in code.lines() {
        let ranges: Vec<(Style, &str)> = highlighter
            .highlight_line(line, syntax_set)
            .unwrap_or_default();
        let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
        out.push_str(&format!("  {}\x1b[0m\n", escaped));
    }
    out
}

/// Code blocks contained in rendered markup, in order
///
/// # Examples
///
/// ```
/// use sofi_chat::formatter::format_message_text;
/// use sofi_chat::view::markup::code_blocks_in_markup;
///
/// let markup = format_message_text("```rust\nlet a = 1 < 2;\n```");
/// let blocks = code_blocks_in_markup(&markup);
/// assert_eq!(blocks[0].code, "let a = 1 < 2;");
/// ```
pub fn code_blocks_in_markup(markup: &str) -> Vec<CodeBlock> {
    patterns()
        .pre
        .captures_iter(markup)
        .map(|caps: Captures| CodeBlock {
            language: Some(caps[1].to_string()),
            code: unescape_html(&caps[2]),
        })
        .collect()
}

/// Remove ANSI escape sequences
pub fn strip_ansi(text: &str) -> String {
    patterns().ansi.replace_all(text, "").into_owned()
}
